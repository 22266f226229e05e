//! Fuzzy name matching for the agent directory.
//!
//! Drives both the live-typing suggestions and the "did you mean"
//! fallback when an exact lookup misses.

/// Threshold used for general matching when the caller has no reason
/// to loosen it. Suggestion and fallback callers pass their own.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Classic dynamic-programming edit distance (insertion, deletion,
/// substitution each cost 1), over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row rolling matrix
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                curr[j] = prev[j - 1];
            } else {
                let substitution = prev[j - 1] + 1;
                let insertion = curr[j - 1] + 1;
                let deletion = prev[j] + 1;
                curr[j] = substitution.min(insertion).min(deletion);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized similarity between two strings, in [0, 1].
///
/// Callers are expected to pass already-lowercased strings; this
/// function compares exactly what it is given.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let (shorter, longer, shorter_len, longer_len) = if len_a > len_b {
        (b, a, len_b, len_a)
    } else {
        (a, b, len_a, len_b)
    };

    // Containment scores by length ratio
    if longer.contains(shorter) {
        return shorter_len as f64 / longer_len as f64;
    }

    let distance = levenshtein(a, b);
    1.0 - (distance as f64 / longer_len as f64)
}

/// Rank candidates against a query.
///
/// An exact (case-insensitive) match short-circuits and is returned
/// alone. Otherwise a candidate is kept when it contains the query,
/// when the query contains it (and it is longer than 2 characters, so
/// trivial fragments don't swallow everything), or when its similarity
/// clears `threshold`. Substring matches rank above pure-similarity
/// matches; within a group, higher similarity first.
pub fn search(query: &str, candidates: &[String], threshold: f64) -> Vec<String> {
    if query.is_empty() || candidates.is_empty() {
        return Vec::new();
    }

    let query_lower = query.to_lowercase();

    // Exact match wins outright
    if let Some(exact) = candidates
        .iter()
        .find(|c| !c.is_empty() && c.to_lowercase() == query_lower)
    {
        return vec![exact.clone()];
    }

    let mut matches: Vec<(String, bool, f64)> = Vec::new();

    for candidate in candidates {
        if candidate.is_empty() {
            continue;
        }
        let candidate_lower = candidate.to_lowercase();

        let contains_query = candidate_lower.contains(&query_lower);
        let contained_in_query = query_lower.contains(&candidate_lower)
            && candidate_lower.chars().count() > 2;
        let score = similarity(&query_lower, &candidate_lower);

        if contains_query || contained_in_query || score >= threshold {
            matches.push((candidate.clone(), contains_query || contained_in_query, score));
        }
    }

    // Substring matches first, then by descending similarity. The sort
    // is stable, so equal scores keep input order.
    matches.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal))
    });

    matches.into_iter().map(|(name, _, _)| name).collect()
}
