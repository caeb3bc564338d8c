//! Relevance scoring between a query and candidate text.
//!
//! Two pure functions are composed additively during tree descent: a fuzzy
//! partial-match similarity and a term-frequency weighted overlap score.
//! Both are stateless and operate on lowercased input.

use std::collections::HashMap;

/// Split text on whitespace into lowercase tokens, keeping only fully
/// alphanumeric ones. Punctuation-bearing tokens are dropped, not stripped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|token| token.chars().all(char::is_alphanumeric))
        .map(|token| token.to_lowercase())
        .collect()
}

/// Fuzzy partial-match similarity in `[0, 1]`.
///
/// Case-insensitive. The shorter string slides over the longer one in
/// windows of its own length; each window is scored with the indel ratio
/// `2 * lcs / (|a| + |b|)` and the best window wins. An exact substring
/// match therefore scores 1.0. Returns 0.0 when either side is empty.
pub fn fuzzy(query: &str, candidate: &str) -> f64 {
    let query: Vec<char> = query.to_lowercase().chars().collect();
    let candidate: Vec<char> = candidate.to_lowercase().chars().collect();
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let (needle, haystack) = if query.len() <= candidate.len() {
        (&query, &candidate)
    } else {
        (&candidate, &query)
    };

    let mut best = 0.0_f64;
    for start in 0..=(haystack.len() - needle.len()) {
        let window = &haystack[start..start + needle.len()];
        let ratio = indel_ratio(needle, window);
        if ratio > best {
            best = ratio;
        }
    }
    best
}

fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    (2 * lcs_length(a, b)) as f64 / total as f64
}

/// Longest common subsequence length with a two-row rolling table.
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}

/// Term-frequency weighted overlap score in `[0, ∞)`.
///
/// For each distinct query token found in the candidate, adds
/// `tf / (tf + 1.5) * (1 + ln(1 + query_count))` where `tf` is the
/// candidate's occurrence count, then normalizes by the candidate's token
/// count. Returns 0.0 if either side tokenizes to nothing.
pub fn overlap(query: &str, candidate: &str) -> f64 {
    let query_tokens = tokenize(query);
    let candidate_tokens = tokenize(candidate);
    if query_tokens.is_empty() || candidate_tokens.is_empty() {
        return 0.0;
    }

    let mut query_counts: HashMap<&str, usize> = HashMap::new();
    for token in &query_tokens {
        *query_counts.entry(token.as_str()).or_insert(0) += 1;
    }
    let mut candidate_counts: HashMap<&str, usize> = HashMap::new();
    for token in &candidate_tokens {
        *candidate_counts.entry(token.as_str()).or_insert(0) += 1;
    }

    // First-appearance order keeps the float summation deterministic.
    let mut score = 0.0;
    let mut seen: Vec<&str> = Vec::new();
    for token in &query_tokens {
        let token = token.as_str();
        if seen.contains(&token) {
            continue;
        }
        seen.push(token);

        let tf = candidate_counts.get(token).copied().unwrap_or(0);
        if tf == 0 {
            continue;
        }
        let tf = tf as f64;
        let query_count = query_counts[token] as f64;
        score += tf / (tf + 1.5) * (1.0 + (1.0 + query_count).ln());
    }
    score / candidate_tokens.len() as f64
}

/// Combined relevance of a query against one candidate string.
pub fn combined_score(query: &str, candidate: &str) -> f64 {
    fuzzy(query, candidate) + overlap(query, candidate)
}
