/// Trim and collapse internal whitespace runs (including newlines) to one space.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize `\r\n` and lone `\r` to `\n`.
pub fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Lower-case a label and drop trailing punctuation, e.g. "Well No.:" → "well no".
pub fn label_key(s: &str) -> String {
    clean_text(s)
        .trim_end_matches(['.', ':', ' '])
        .to_lowercase()
}
