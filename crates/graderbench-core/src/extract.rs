//! Grade extraction from free-text model responses.
//!
//! A tiered, ordered fallback parser: explicit label, standalone number,
//! spelled-out number, default. The first matching tier wins, and within the
//! standalone-number tier the *last* occurrence wins (taken as the model's
//! concluding statement). Grade extraction is regex/keyword driven; it has a
//! known accuracy ceiling on adversarial text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Confidence;

/// "grade: 0.8", "Score: 1" and friends. Applied to lowercased text.
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:grade|score|rating|mark):\s*([0-9]\.[0-9]|[01])")
        .expect("label pattern is valid")
});

/// The label pattern again, case-insensitive, for stripping feedback text.
static LABEL_STRIP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:grade|score|rating|mark):\s*(?:[0-9]\.[0-9]|[01])")
        .expect("label strip pattern is valid")
});

/// Spelled-out grades, checked by substring containment in this exact order.
const WORD_GRADES: &[(&str, f64)] = &[
    ("zero", 0.0),
    ("one", 1.0),
    ("half", 0.5),
    ("zero point five", 0.5),
    ("point five", 0.5),
    ("0", 0.0),
    ("1", 1.0),
    ("0.5", 0.5),
];

/// Grade used when no tier matches.
const DEFAULT_GRADE: f64 = 0.5;

/// Extract a numeric grade in [0, 1] and a parse-confidence tier from a
/// model response.
pub fn extract_grade(response: &str) -> (f64, Confidence) {
    let lowered = response.to_lowercase();

    if let Some(caps) = LABEL_RE.captures(&lowered) {
        let grade: f64 = caps[1].parse().expect("label capture is numeric");
        return (clamp01(grade), Confidence::High);
    }

    if let Some(grade) = last_standalone_number(response) {
        return (clamp01(grade), Confidence::Medium);
    }

    for (word, grade) in WORD_GRADES {
        if lowered.contains(word) {
            return (*grade, Confidence::Low);
        }
    }

    (DEFAULT_GRADE, Confidence::VeryLow)
}

/// Strip the explicit grade label (tier 1 pattern) from a response, leaving
/// the surrounding feedback text. Standalone numeric mentions are left alone.
pub fn extract_feedback(response: &str) -> String {
    LABEL_STRIP_RE.replace_all(response, "").trim().to_string()
}

/// Accuracy of an extracted grade against the reference grade.
pub fn accuracy(extracted: f64, reference: f64) -> f64 {
    (1.0 - (extracted - reference).abs()).clamp(0.0, 1.0)
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Scan for the last standalone `d.d` or bare `0`/`1` token.
///
/// The `regex` crate has no look-around, so the pattern
/// `(?<![a-zA-Z0-9])([0-9]\.[0-9]|[01])(?![0-9])` is scanned by hand. The
/// `d.d` alternative is tried first at each position; when its trailing-digit
/// check fails, a bare `0`/`1` at the same position still counts, mirroring
/// the alternation retry of a backtracking engine.
fn last_standalone_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut last = None;
    let mut i = 0;
    while i < len {
        if i > 0 && bytes[i - 1].is_ascii_alphanumeric() {
            i += 1;
            continue;
        }
        let dot_form = i + 2 < len
            && bytes[i].is_ascii_digit()
            && bytes[i + 1] == b'.'
            && bytes[i + 2].is_ascii_digit();
        if dot_form && (i + 3 >= len || !bytes[i + 3].is_ascii_digit()) {
            let value: f64 = text[i..i + 3].parse().expect("digit-dot-digit is numeric");
            last = Some(value);
            i += 3;
            continue;
        }
        if (bytes[i] == b'0' || bytes[i] == b'1')
            && (i + 1 >= len || !bytes[i + 1].is_ascii_digit())
        {
            last = Some(f64::from(bytes[i] - b'0'));
            i += 1;
            continue;
        }
        i += 1;
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_label_is_high_confidence() {
        let (grade, confidence) = extract_grade("The answer is decent. Grade: 0.8");
        assert_eq!(grade, 0.8);
        assert_eq!(confidence, Confidence::High);
    }

    #[test]
    fn label_variants_all_match() {
        for text in [
            "score: 0.7",
            "Rating: 0.7",
            "MARK:  0.7",
            "grade:0.7",
        ] {
            let (grade, confidence) = extract_grade(text);
            assert_eq!(grade, 0.7, "failed on {text}");
            assert_eq!(confidence, Confidence::High);
        }
    }

    #[test]
    fn label_with_integer_grade() {
        assert_eq!(extract_grade("Grade: 1"), (1.0, Confidence::High));
        assert_eq!(extract_grade("Grade: 0"), (0.0, Confidence::High));
    }

    #[test]
    fn label_out_of_range_is_clamped() {
        let (grade, confidence) = extract_grade("grade: 9.9");
        assert_eq!(grade, 1.0);
        assert_eq!(confidence, Confidence::High);
    }

    #[test]
    fn last_standalone_number_wins() {
        let (grade, confidence) =
            extract_grade("The answer covers 0.3 of the material but I concluded 0.9");
        assert_eq!(grade, 0.9);
        assert_eq!(confidence, Confidence::Medium);
    }

    #[test]
    fn standalone_number_ignores_adjacent_alphanumerics() {
        // "v0.9" is glued to a letter; the bare trailing 1 is the only
        // standalone match.
        let (grade, confidence) = extract_grade("see v0.9 of the rubric, part 1");
        assert_eq!(grade, 1.0);
        assert_eq!(confidence, Confidence::Medium);
    }

    #[test]
    fn standalone_number_rejects_longer_decimals_but_keeps_leading_digit() {
        // "0.55" is not a d.d token, but its leading "0" stands alone once
        // the longer alternative fails its trailing-digit check.
        let (grade, confidence) = extract_grade("similarity was 0.55 overall");
        assert_eq!(grade, 0.0);
        assert_eq!(confidence, Confidence::Medium);
    }

    #[test]
    fn standalone_number_at_end_of_text() {
        let (grade, confidence) = extract_grade("I would give this 0.6");
        assert_eq!(grade, 0.6);
        assert_eq!(confidence, Confidence::Medium);
    }

    #[test]
    fn spelled_out_half_is_low_confidence() {
        let (grade, confidence) = extract_grade("I would award half marks for this answer");
        assert_eq!(grade, 0.5);
        assert_eq!(confidence, Confidence::Low);
    }

    #[test]
    fn word_order_zero_before_one() {
        // "zero" appears in the lexicon before "one" and both are present.
        let (grade, confidence) = extract_grade("not zero, but not everyone would agree");
        assert_eq!(grade, 0.0);
        assert_eq!(confidence, Confidence::Low);
    }

    #[test]
    fn no_cue_falls_back_to_default() {
        let (grade, confidence) = extract_grade("This answer is quite thorough.");
        assert_eq!(grade, 0.5);
        assert_eq!(confidence, Confidence::VeryLow);
    }

    #[test]
    fn empty_response_falls_back_to_default() {
        assert_eq!(extract_grade(""), (0.5, Confidence::VeryLow));
    }

    #[test]
    fn feedback_strips_label_and_trims() {
        let text = "Grade: 0.8\nGood coverage of the key points.";
        assert_eq!(extract_feedback(text), "Good coverage of the key points.");
    }

    #[test]
    fn feedback_leaves_standalone_numbers() {
        let text = "Covers about 0.7 of the material.";
        assert_eq!(extract_feedback(text), text);
    }

    #[test]
    fn accuracy_exact_match() {
        assert_eq!(accuracy(0.8, 0.8), 1.0);
    }

    #[test]
    fn accuracy_distance() {
        assert!((accuracy(0.2, 0.9) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn accuracy_is_clamped() {
        // A clamped extracted grade can still be at distance > 1 only if the
        // reference escapes [0,1]; guard the floor anyway.
        assert_eq!(accuracy(0.0, 1.0), 0.0);
    }
}
