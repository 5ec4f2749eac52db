//! Sequence similarity used by the fuzzy pass of the chain resolver.
//!
//! Implements the Ratcliff/Obershelp "gestalt pattern matching" ratio:
//! find the longest common block, recurse on the unmatched pieces to its left
//! and right, and score `2 * matched / (len(a) + len(b))`.

/// Minimum ratio an alias must reach to count as a fuzzy match.
pub const FUZZY_MATCH_CUTOFF: f64 = 0.6;

/// Similarity of two strings in `0.0..=1.0`, compared char by char.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Total size of all matching blocks between `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Among equally long blocks the one starting earliest in `a` wins, then the
/// one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run[j + 1] = length of the common run ending at (i - 1, j)
    let mut run = vec![0usize; b.len() + 1];

    for i in alo..ahi {
        let mut next = vec![0usize; b.len() + 1];
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let k = run[j] + 1;
            next[j + 1] = k;
            if k > best_size {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_size = k;
            }
        }
        run = next;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert!(approx(ratio("arbitrum", "arbitrum"), 1.0));
        assert!(approx(ratio("", ""), 1.0));
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(approx(ratio("xyz", "eth"), 0.0));
        assert!(approx(ratio("abc", ""), 0.0));
    }

    #[test]
    fn single_typo_scores_above_cutoff() {
        // "arbitru" matches, the final char differs: 2 * 7 / 16
        let score = ratio("arbitrun", "arbitrum");
        assert!(approx(score, 0.875));
        assert!(score >= FUZZY_MATCH_CUTOFF);
    }

    #[test]
    fn recurses_around_the_longest_block() {
        // "ether" then "um" on the right: 2 * 7 / 16
        assert!(approx(ratio("etherium", "ethereum"), 0.875));
        // only "bcd" matches, the leftover "a" and "x" do not: 2 * 3 / 8
        assert!(approx(ratio("abcd", "bcdx"), 0.75));
        // "cde" first, then "ab" on the left: 2 * 5 / 11
        assert!(approx(ratio("abxcde", "abcde"), 10.0 / 11.0));
    }

    #[test]
    fn depends_on_argument_order() {
        // blocks "e", "re", "m" one way; "e", "e", "re", "m" the other
        assert!(approx(ratio("ethereum", "teyrevm"), 8.0 / 15.0));
        assert!(approx(ratio("teyrevm", "ethereum"), 10.0 / 15.0));
    }
}
