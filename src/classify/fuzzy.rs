//! Token-order-insensitive fuzzy similarity on a 0–100 scale.

/// Lower-case, split on anything that is not alphanumeric, sort the tokens
/// and rejoin with single spaces.
fn sorted_tokens(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Insertion/deletion distance (no substitutions) between two char slices.
fn indel_distance(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &a_ch in a {
        for (j, &b_ch) in b.iter().enumerate() {
            curr[j + 1] = if a_ch == b_ch {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let lcs = prev[b.len()];
    a.len() + b.len() - 2 * lcs
}

/// Normalized indel similarity of the two strings after token sorting.
/// Either side empty after tokenizing scores 0.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = sorted_tokens(a).chars().collect();
    let b: Vec<char> = sorted_tokens(b).chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let total = (a.len() + b.len()) as f64;
    100.0 * (1.0 - indel_distance(&a, &b) as f64 / total)
}
