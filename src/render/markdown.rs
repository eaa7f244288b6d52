// src/render/markdown.rs
// =============================================================================
// This module turns Markdown (README.md, .md previews) into plain terminal
// text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Is a streaming parser, so we render as we go
//
// Output conventions:
// - Headings are followed by an underline ("=" for level 1, "-" otherwise)
// - List items start with "  * " (or "  1. " for ordered lists)
// - Code blocks are indented by four spaces
// - Links become "text (url)"
// - Images become "[image: alt] (url)"
// =============================================================================

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};

// Renders markdown to terminal text
//
// Example:
//   "# Title\n\nSee [docs](https://x.io)"
// becomes
//   "Title\n=====\n\nSee docs (https://x.io)\n"
pub fn render_markdown(markdown: &str) -> String {
    let mut out = String::new();

    // Text of the heading being built, so we know how long the underline is
    let mut heading: Option<String> = None;
    // One entry per open list: Some(next number) for ordered lists
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut in_code_block = false;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading(..)) => {
                heading = Some(String::new());
            }
            Event::End(Tag::Heading(level, ..)) => {
                if let Some(text) = heading.take() {
                    let underline = if level == HeadingLevel::H1 { '=' } else { '-' };
                    out.push_str(&text);
                    out.push('\n');
                    out.extend(std::iter::repeat(underline).take(text.chars().count()));
                    out.push_str("\n\n");
                }
            }

            Event::Start(Tag::List(start)) => {
                lists.push(start);
            }
            Event::End(Tag::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                // A nested item starts on its own line
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                let depth = lists.len().saturating_sub(1);
                out.push_str(&"  ".repeat(depth + 1));
                match lists.last_mut() {
                    Some(Some(number)) => {
                        out.push_str(&format!("{number}. "));
                        *number += 1;
                    }
                    _ => out.push_str("* "),
                }
            }
            Event::End(Tag::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }

            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
            }
            Event::End(Tag::CodeBlock(_)) => {
                in_code_block = false;
                out.push('\n');
            }

            Event::End(Tag::Paragraph) => {
                // Paragraphs inside list items stay on the item's line
                if lists.is_empty() {
                    out.push_str("\n\n");
                }
            }

            Event::Start(Tag::Image(_, _, _)) => {
                push_text(&mut out, &mut heading, "[image: ");
            }
            Event::End(Tag::Image(_, dest_url, _)) => {
                push_text(&mut out, &mut heading, &format!("] ({dest_url})"));
            }
            Event::End(Tag::Link(_, dest_url, _)) => {
                push_text(&mut out, &mut heading, &format!(" ({dest_url})"));
            }

            Event::Text(text) => {
                if in_code_block {
                    for line in text.lines() {
                        out.push_str("    ");
                        out.push_str(line);
                        out.push('\n');
                    }
                } else {
                    push_text(&mut out, &mut heading, &text);
                }
            }
            Event::Code(code) => {
                push_text(&mut out, &mut heading, &format!("`{code}`"));
            }
            Event::SoftBreak => push_text(&mut out, &mut heading, " "),
            Event::HardBreak => out.push('\n'),
            Event::Rule => out.push_str("----------\n\n"),

            // Emphasis, raw HTML, footnotes, tables: text comes through as
            // Text events, the markup itself is dropped
            _ => {}
        }
    }

    let trimmed = out.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

// Text goes into the heading being built, or straight to the output
fn push_text(out: &mut String, heading: &mut Option<String>, text: &str) {
    match heading {
        Some(heading) => heading.push_str(text),
        None => out.push_str(text),
    }
}
