//! Cheap lexical closeness score between a query and a candidate term.
//!
//! This is a blend of heuristics, not an edit distance. The weights are part
//! of the contract: suggestion thresholds downstream (e.g. the >40 fast path)
//! are tuned against exactly these numbers.

const EXACT_MATCH: f64 = 100.0;
const CONTAINMENT: f64 = 80.0;
const ORDERED_MATCH_WEIGHT: f64 = 60.0;
const FIRST_CHAR_BONUS: f64 = 10.0;
const COMMON_SUBSTRING_WEIGHT: f64 = 2.0;

/// Score how close `a` and `b` are, in `[0, 100]`.
///
/// 1. Case-folded equality → 100.
/// 2. One contains the other → 80. The empty string is contained in
///    everything.
/// 3. Otherwise the sum of:
///    - in-order character matches of the shorter string against the longer
///      one, as a fraction × 60
///    - a length-difference bonus (≤1: +20, ≤2: +10, ≤3: +5)
///    - +10 when both start with the same character
///    - longest common substring length × 2
///
///    clamped to 100.
///
/// Lengths are counted in chars. The shorter side is picked by length and
/// then lexical order, so `score(a, b) == score(b, a)`.
pub fn score(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        return EXACT_MATCH;
    }
    if a.contains(&b) || b.contains(&a) {
        return CONTAINMENT;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (shorter, longer) = if (a_chars.len(), &a) <= (b_chars.len(), &b) {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    let mut total = ordered_match_score(shorter, longer);
    total += length_bonus(longer.len() - shorter.len());
    if shorter[0] == longer[0] {
        total += FIRST_CHAR_BONUS;
    }
    total += longest_common_substring(shorter, longer) as f64 * COMMON_SUBSTRING_WEIGHT;

    total.min(EXACT_MATCH)
}

/// Walk `shorter`, matching each char to its next occurrence in `longer`
/// after the previous match. Unmatched chars are skipped.
fn ordered_match_score(shorter: &[char], longer: &[char]) -> f64 {
    let mut cursor = 0;
    let mut matched = 0usize;

    for c in shorter {
        if let Some(offset) = longer[cursor..].iter().position(|x| x == c) {
            matched += 1;
            cursor += offset + 1;
        }
    }

    (matched as f64 * ORDERED_MATCH_WEIGHT) / shorter.len() as f64
}

fn length_bonus(diff: usize) -> f64 {
    match diff {
        0 | 1 => 20.0,
        2 => 10.0,
        3 => 5.0,
        _ => 0.0,
    }
}

/// Brute force over every substring of `shorter`; inputs are short query terms.
fn longest_common_substring(shorter: &[char], longer: &[char]) -> usize {
    let mut best = 0;
    for start in 0..shorter.len() {
        // Longest first, so the first hit for this start is the best one.
        for end in (start + 1..=shorter.len()).rev() {
            let len = end - start;
            if len <= best {
                break;
            }
            let needle = &shorter[start..end];
            if longer.windows(len).any(|w| w == needle) {
                best = len;
                break;
            }
        }
    }
    best
}
