// src/browse/classify.rs
// =============================================================================
// Decides how a preview response is read and how it is shown.
//
// Two stages, both pure functions with no I/O:
// 1. The response Content-Type picks how to read the body:
//    "application/json" -> JSON with a rawText field, anything else -> bytes
// 2. The file extension picks how to show it:
//    - text: "md" is markdown, everything else is plain text
//    - bytes: jpg/jpeg/png/gif are images, mp4 is video, the rest can only
//      be downloaded
//
// The extension decides, not the bytes. The server doesn't sniff content, so
// neither do we.
// =============================================================================

/// How to read a preview body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// JSON body carrying the file text in "rawText"
    JsonText,
    /// The file's bytes, as-is
    RawBinary,
}

/// How to show a binary preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    Image,
    Video,
    Unsupported,
}

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];
const VIDEO_EXTENSIONS: [&str; 1] = ["mp4"];

// Stage 1: pick the read strategy from the Content-Type header
//
// `extension` is accepted so both stages share one entry point, but it
// never influences this stage.
pub fn classify(_extension: &str, content_type: &str) -> RenderStrategy {
    if content_type.contains("application/json") {
        RenderStrategy::JsonText
    } else {
        RenderStrategy::RawBinary
    }
}

// Stage 2 for JsonText: should the text be rendered as markdown?
pub fn is_markdown(extension: &str) -> bool {
    extension.eq_ignore_ascii_case("md")
}

// Stage 2 for RawBinary
pub fn binary_kind(extension: &str) -> BinaryKind {
    let extension = extension.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        BinaryKind::Image
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        BinaryKind::Video
    } else {
        BinaryKind::Unsupported
    }
}

// Extension of a repo path, lowercased
//
// This is the text after the last "." anywhere in the path. A path with no
// dot yields the whole path, which never matches a known extension.
//
// Examples:
//   "images/cat.JPG" -> "jpg"
//   "data.tar.gz"    -> "gz"
//   "Makefile"       -> "makefile"
pub fn extension_of(path: &str) -> String {
    path.rsplit('.').next().unwrap_or(path).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_content_type_is_text() {
        assert_eq!(classify("csv", "application/json"), RenderStrategy::JsonText);
        assert_eq!(
            classify("md", "application/json; charset=utf-8"),
            RenderStrategy::JsonText
        );
    }

    #[test]
    fn test_other_content_types_are_binary() {
        for content_type in ["image/png", "video/mp4", "application/octet-stream", "text/plain", ""] {
            // Even a .md file is binary when the server didn't send JSON
            assert_eq!(classify("md", content_type), RenderStrategy::RawBinary);
        }
    }

    #[test]
    fn test_image_extensions() {
        for ext in ["jpg", "jpeg", "png", "gif", "JPG", "Png"] {
            assert_eq!(binary_kind(ext), BinaryKind::Image, "{ext}");
        }
    }

    #[test]
    fn test_video_extensions() {
        assert_eq!(binary_kind("mp4"), BinaryKind::Video);
        assert_eq!(binary_kind("MP4"), BinaryKind::Video);
    }

    #[test]
    fn test_everything_else_is_unsupported() {
        for ext in ["webp", "mov", "pdf", "csv", "svg", "bmp", "", "makefile"] {
            assert_eq!(binary_kind(ext), BinaryKind::Unsupported, "{ext}");
        }
    }

    #[test]
    fn test_markdown_flag() {
        assert!(is_markdown("md"));
        assert!(is_markdown("MD"));
        assert!(!is_markdown("markdown"));
        assert!(!is_markdown("txt"));
        assert!(!is_markdown("csv"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("images/cat.JPG"), "jpg");
        assert_eq!(extension_of("data.tar.gz"), "gz");
        assert_eq!(extension_of("Makefile"), "makefile");
        assert_eq!(extension_of("docs.v2/LICENSE"), "v2/license");
    }
}
