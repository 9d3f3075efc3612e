// src/utils/html.rs

/// Sanitizes question text with ammonia's default allow-list.
///
/// Plain text, including bare `<`, `>` and `&`, is returned exactly as given.
/// Only text that carries markup is rewritten: safe inline tags such as `<b>`
/// survive, while `<script>` (with its body), `<iframe>` and event-handler
/// attributes are stripped. The output is stable under a second pass.
pub fn clean_html(input: &str) -> String {
    let cleaned = ammonia::clean(input);
    if cleaned == escape_text(input) {
        // no markup: ammonia only entity-escaped the text
        input.to_string()
    } else {
        cleaned
    }
}

/// What the HTML serializer emits for a plain text node.
fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
    out
}
