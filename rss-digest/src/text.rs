//! Text helpers for preparing article pages for summarization.

use scraper::{Html, Selector};

/// Readable text of an article page: its paragraphs when it has any,
/// otherwise the whole markup with tags stripped.
pub fn article_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let paragraphs = Selector::parse("p")
        .map(|selector| {
            document
                .select(&selector)
                .map(|p| p.text().collect::<Vec<_>>().join(" "))
                .map(|text| normalize_whitespace(&text))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if paragraphs.is_empty() {
        strip_tags(html)
    } else {
        paragraphs.join("\n")
    }
}

/// Simple tag removal for markup without paragraph structure.
pub fn strip_tags(html: &str) -> String {
    let text = html
        .chars()
        .fold((String::new(), false), |(mut text, in_tag), c| match c {
            '<' => (text, true),
            '>' => {
                text.push(' ');
                (text, false)
            }
            _ if !in_tag => {
                text.push(c);
                (text, in_tag)
            }
            _ => (text, in_tag),
        })
        .0;
    normalize_whitespace(&text)
}

/// The first `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
