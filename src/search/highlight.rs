//! Search term highlighting for result titles and snippets

use regex::RegexBuilder;

const MARK_OPEN: &str = "<mark class=\"search-highlight\">";
const MARK_CLOSE: &str = "</mark>";

/// Snippets snap forward to a word start when one is this close
const WORD_SNAP_CHARS: usize = 20;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// HTML-escape `text` and wrap every case-insensitive occurrence of a query term in `<mark>`.
/// Terms match the raw text, never the entities escaping produces.
pub fn highlight_terms(text: &str, query: &str) -> String {
    let mut terms: Vec<&str> = query.split_whitespace().collect();
    if terms.is_empty() {
        return escape_html(text);
    }
    // Longest first so overlapping terms mark the widest match
    terms.sort_by(|a, b| b.len().cmp(&a.len()));
    let alternation: Vec<String> = terms.iter().map(|term| regex::escape(term)).collect();

    let pattern = match RegexBuilder::new(&alternation.join("|"))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::debug!(error = %e, "Highlight pattern rejected");
            return escape_html(text);
        }
    };

    let mut html = String::with_capacity(text.len() + 32);
    let mut last = 0;
    for found in pattern.find_iter(text) {
        html.push_str(&escape_html(&text[last..found.start()]));
        html.push_str(MARK_OPEN);
        html.push_str(&escape_html(found.as_str()));
        html.push_str(MARK_CLOSE);
        last = found.end();
    }
    html.push_str(&escape_html(&text[last..]));
    html
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn lower_chars(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Window of at most `max_chars` around the first query term, with ellipses
/// where text was cut, highlighted
pub fn snippet(content: &str, query: &str, max_chars: usize) -> String {
    let chars: Vec<char> = content.chars().collect();
    let lowered = lower_chars(content);

    let mut start = 0;
    for term in query.split_whitespace() {
        if let Some(position) = find_chars(&lowered, &lower_chars(term)) {
            start = position.saturating_sub(max_chars / 2);
            if start > 0 {
                if let Some(offset) = chars[start..].iter().position(|c| *c == ' ') {
                    if offset < WORD_SNAP_CHARS {
                        start += offset + 1;
                    }
                }
            }
            break;
        }
    }

    let end = (start + max_chars).min(chars.len());
    let mut window: String = chars[start.min(end)..end].iter().collect();
    if start > 0 {
        window.insert_str(0, "...");
    }
    if start + max_chars < chars.len() {
        window.push_str("...");
    }

    highlight_terms(&window, query)
}
