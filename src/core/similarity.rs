use std::collections::BTreeSet;

/// Similarity of two normalized keys in [0, 1].
///
/// Takes the better of normalized Levenshtein (catches typos and
/// abbreviations) and token-set Jaccard (catches reordered words).
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    strsim::normalized_levenshtein(a, b).max(token_set_jaccard(a, b))
}

pub fn token_set_jaccard(a: &str, b: &str) -> f64 {
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}
