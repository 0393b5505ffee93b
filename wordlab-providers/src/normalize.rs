/// Reduce a model's free-text answer to a single lowercase word.
///
/// Punctuation other than hyphens and apostrophes is dropped, then the first
/// whitespace-delimited token is kept. Typographic apostrophes count as `'`.
/// Returns `None` when nothing is left.
pub fn normalize_word(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{02BC}' => '\'',
            other => other,
        })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '\'')
        .collect();

    cleaned
        .split_whitespace()
        .next()
        .map(|word| word.to_lowercase())
}
