//! Consistency scoring across repeated grading attempts.
//!
//! Pure functions over a question's attempt set: grade spread, pairwise
//! response similarity, and the blended consistency score.

use serde::{Deserialize, Serialize};

/// One successful attempt's contribution to the analysis.
#[derive(Debug, Clone, Copy)]
pub struct AttemptSample<'a> {
    pub grade: f64,
    pub response: &'a str,
}

/// Derived metrics for one question's attempt set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyMetrics {
    /// `clamp(1 − 2σ, 0, 1)`; a std-dev of 0.5 or more collapses to 0.
    pub grade_stability: f64,
    /// Mean pairwise text-similarity ratio; 0 for a single attempt.
    pub response_similarity: f64,
    /// `0.7 · stability + 0.3 · similarity`.
    pub consistency_score: f64,
    /// The contributing grades, in attempt order.
    pub grade_values: Vec<f64>,
    /// Population standard deviation of the grades.
    pub grade_std_dev: f64,
}

/// Analyze a non-empty attempt set.
///
/// Callers must guarantee at least one sample; an empty slice is a
/// programming error.
pub fn analyze(samples: &[AttemptSample<'_>]) -> ConsistencyMetrics {
    assert!(!samples.is_empty(), "analyze requires at least one attempt");

    let grade_values: Vec<f64> = samples.iter().map(|s| s.grade).collect();
    let grade_std_dev = population_std_dev(&grade_values);
    let grade_stability = (1.0 - grade_std_dev * 2.0).clamp(0.0, 1.0);

    let mut pair_scores = Vec::new();
    for i in 0..samples.len() {
        for j in (i + 1)..samples.len() {
            pair_scores.push(similarity_ratio(samples[i].response, samples[j].response));
        }
    }
    let response_similarity = if pair_scores.is_empty() {
        0.0
    } else {
        pair_scores.iter().sum::<f64>() / pair_scores.len() as f64
    };

    let consistency_score = grade_stability * 0.7 + response_similarity * 0.3;

    ConsistencyMetrics {
        grade_stability,
        response_similarity,
        consistency_score,
        grade_values,
        grade_std_dev,
    }
}

fn population_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Ratcliff/Obershelp similarity ratio in [0, 1]: twice the total matched
/// characters over the combined length. Two empty strings compare as 1.0.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Total characters covered by recursively matching the longest common
/// block, then the regions left and right of it.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (ai, bi, size) = longest_match(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..ai], &b[..bi])
        + matching_chars(&a[ai + size..], &b[bi + size..])
}

/// Longest common contiguous block, earliest position on ties.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let run = prev[j] + 1;
                current[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        prev = current;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples<'a>(pairs: &'a [(f64, &'a str)]) -> Vec<AttemptSample<'a>> {
        pairs
            .iter()
            .map(|(grade, response)| AttemptSample {
                grade: *grade,
                response,
            })
            .collect()
    }

    #[test]
    fn identical_grades_are_fully_stable() {
        let s = samples(&[
            (0.8, "Grade: 0.8"),
            (0.8, "Grade: 0.8"),
            (0.8, "Grade: 0.8"),
            (0.8, "Grade: 0.8"),
            (0.8, "Grade: 0.8"),
        ]);
        let metrics = analyze(&s);
        assert_eq!(metrics.grade_stability, 1.0);
        assert_eq!(metrics.grade_std_dev, 0.0);
        assert_eq!(metrics.response_similarity, 1.0);
        assert_eq!(metrics.consistency_score, 1.0);
        assert_eq!(metrics.grade_values, vec![0.8; 5]);
    }

    #[test]
    fn alternating_grades_collapse_stability() {
        let s = samples(&[(0.0, "a"), (1.0, "b"), (0.0, "c"), (1.0, "d"), (0.0, "e")]);
        let metrics = analyze(&s);
        assert!((metrics.grade_std_dev - 0.489897948556636).abs() < 1e-12);
        assert_eq!(metrics.grade_stability, 0.0);
    }

    #[test]
    fn two_point_split_hits_half_std_dev() {
        let s = samples(&[(0.0, "a"), (1.0, "b")]);
        let metrics = analyze(&s);
        assert!((metrics.grade_std_dev - 0.5).abs() < 1e-12);
        assert_eq!(metrics.grade_stability, 0.0);
    }

    #[test]
    fn single_attempt_has_zero_similarity() {
        let s = samples(&[(0.7, "only one response")]);
        let metrics = analyze(&s);
        assert_eq!(metrics.response_similarity, 0.0);
        assert_eq!(metrics.grade_stability, 1.0);
        assert!((metrics.consistency_score - 0.7).abs() < 1e-12);
    }

    #[test]
    fn analyze_is_idempotent() {
        let s = samples(&[
            (0.6, "The answer is mostly right. Grade: 0.6"),
            (0.7, "Pretty good answer. Grade: 0.7"),
            (0.6, "The answer is mostly right. Grade: 0.6"),
        ]);
        let first = analyze(&s);
        let second = analyze(&s);
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "at least one attempt")]
    fn empty_input_panics() {
        analyze(&[]);
    }

    #[test]
    fn similarity_identical_strings() {
        assert_eq!(similarity_ratio("abcdef", "abcdef"), 1.0);
    }

    #[test]
    fn similarity_disjoint_strings() {
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn similarity_both_empty() {
        assert_eq!(similarity_ratio("", ""), 1.0);
    }

    #[test]
    fn similarity_partial_overlap() {
        // "abcd" vs "bcde": block "bcd" matches, 2*3/8 = 0.75.
        assert!((similarity_ratio("abcd", "bcde") - 0.75).abs() < 1e-12);
    }

    #[test]
    fn similarity_recurses_around_longest_block() {
        // "ab xx cd" vs "ab yy cd": blocks "ab " and " cd" match, 6 chars of
        // 16 combined: 2*6/16.
        let ratio = similarity_ratio("ab xx cd", "ab yy cd");
        assert!((ratio - 0.75).abs() < 1e-12);
    }

    #[test]
    fn similarity_of_near_identical_sentences_is_high_but_not_one() {
        let ratio = similarity_ratio("grading answer one", "grading answer two");
        assert!(ratio > 0.7);
        assert!(ratio < 1.0);
    }
}
