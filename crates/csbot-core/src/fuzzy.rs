//! Token-set similarity scoring (0–100).
//!
//! Order-independent overlap measure: both strings are tokenized, the shared
//! token set is split out from each side's leftovers, and the score is the
//! best edit-similarity among the three recombined strings. Robust to word
//! reordering and to one string being a subset of the other. Pure and
//! deterministic.

use std::collections::BTreeSet;

/// Token-set similarity between two strings, 0 (disjoint) to 100 (equal sets).
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let set_a = tokens(a);
    let set_b = tokens(b);
    if set_a.is_empty() || set_b.is_empty() {
        // No tokens on one side: equal only when both are empty.
        return if set_a == set_b { 100 } else { 0 };
    }

    let common: Vec<&str> = set_a.intersection(&set_b).map(String::as_str).collect();
    let only_a: Vec<&str> = set_a.difference(&set_b).map(String::as_str).collect();
    let only_b: Vec<&str> = set_b.difference(&set_a).map(String::as_str).collect();

    let base = common.join(" ");
    let combined_a = join_nonempty(&base, &only_a.join(" "));
    let combined_b = join_nonempty(&base, &only_b.join(" "));

    similarity_ratio(&base, &combined_a)
        .max(similarity_ratio(&base, &combined_b))
        .max(similarity_ratio(&combined_a, &combined_b))
}

/// Lowercased tokens split on non-alphanumeric boundaries; BTreeSet keeps
/// iteration (and therefore recombination) sorted and stable.
fn tokens(s: &str) -> BTreeSet<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_nonempty(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{} {}", left, right),
    }
}

/// Edit similarity of two strings as a rounded percentage.
fn similarity_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    let distance = levenshtein(&a, &b);
    (100.0 * (longest - distance) as f64 / longest as f64).round() as u8
}

/// Classic two-row Levenshtein distance.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitute.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
