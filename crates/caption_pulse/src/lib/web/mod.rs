//! Text acquisition for non-video URLs.

pub mod loader;

use std::future::Future;

use scraper::{ElementRef, Html, Selector};
use url::Url;

pub trait PageLoader {
    const USER_AGENT: &'static str;

    /// Fetches `url` and returns its readable text, paragraphs separated by blank lines.
    fn load_text(&self, url: &Url) -> impl Future<Output = anyhow::Result<String>>;
}

/// Extracts the readable text of an HTML document.
///
/// The first `article`, `main` or `body` element is used as the root; headings,
/// paragraphs, list items, quotes and preformatted blocks are collected in
/// document order and joined with blank lines.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Some(root) = pick_root(&document) else {
        return String::new();
    };

    let mut blocks: Vec<String> = Vec::new();
    collect_blocks(root, &mut blocks);
    blocks.join("\n\n")
}

fn pick_root(document: &Html) -> Option<ElementRef<'_>> {
    ["article", "main", "body"]
        .into_iter()
        .filter_map(|tag| Selector::parse(tag).ok())
        .find_map(|selector| document.select(&selector).next())
        .or_else(|| Some(document.root_element()))
}

fn collect_blocks(element: ElementRef<'_>, blocks: &mut Vec<String>) {
    for child in element.children().filter_map(ElementRef::wrap) {
        let tag = child.value().name();
        if matches!(
            tag,
            "script" | "style" | "template" | "noscript" | "svg" | "nav" | "header" | "footer"
        ) {
            continue;
        }

        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "p" | "li" | "blockquote" => {
                let text = collapse_whitespace(&child.text().collect::<String>());
                if !text.is_empty() {
                    blocks.push(text);
                }
            }
            "pre" => {
                let text = child.text().collect::<String>();
                let text = text.trim_matches('\n');
                if !text.trim().is_empty() {
                    blocks.push(text.to_string());
                }
            }
            _ => collect_blocks(child, blocks),
        }
    }
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
