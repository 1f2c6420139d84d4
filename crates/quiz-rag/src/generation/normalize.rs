//! Option length normalization and answer linkage

/// Suffix appended to truncated options
const ELLIPSIS: &str = "...";

/// Trim an option and cap it at `max_chars` characters.
///
/// Longer options keep their first `max_chars - 3` characters plus `...`,
/// so the result is exactly `max_chars` long.
pub fn format_option(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// [`format_option`] over every option
pub fn format_options(options: &[String], max_chars: usize) -> Vec<String> {
    options.iter().map(|o| format_option(o, max_chars)).collect()
}

/// Resolve the correct index against already-normalized options.
///
/// An out-of-range index falls back to 0.
pub fn link_correct_answer(options: &[String], correct_index: usize) -> (usize, String) {
    match options.get(correct_index) {
        Some(text) => (correct_index, text.clone()),
        None => {
            if !options.is_empty() {
                tracing::debug!(
                    "Correct index {} out of range for {} options, using 0",
                    correct_index,
                    options.len()
                );
            }
            (0, options.first().cloned().unwrap_or_default())
        }
    }
}

/// Map an answer letter (A-D, any case) to an index, 0 when unrecognized
pub fn answer_letter_index(letter: &str) -> usize {
    match letter.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('A') => 0,
        Some('B') => 1,
        Some('C') => 2,
        Some('D') => 3,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_option_unchanged() {
        assert_eq!(format_option("  Paris ", 100), "Paris");
        let exact = "y".repeat(100);
        assert_eq!(format_option(&exact, 100), exact);
    }

    #[test]
    fn test_long_option_truncated_to_max() {
        let long = "x".repeat(150);
        let formatted = format_option(&long, 100);
        assert_eq!(formatted.chars().count(), 100);
        assert!(formatted.ends_with("..."));
        assert_eq!(&formatted[..97], &long[..97]);
    }

    #[test]
    fn test_truncation_counts_chars() {
        let long = "é".repeat(120);
        let formatted = format_option(&long, 100);
        assert_eq!(formatted.chars().count(), 100);
    }

    #[test]
    fn test_link_out_of_range_falls_back() {
        let options = vec!["a".to_string(), "b".to_string()];
        assert_eq!(link_correct_answer(&options, 1), (1, "b".to_string()));
        assert_eq!(link_correct_answer(&options, 7), (0, "a".to_string()));
        assert_eq!(link_correct_answer(&[], 2), (0, String::new()));
    }

    #[test]
    fn test_answer_letters() {
        assert_eq!(answer_letter_index("A"), 0);
        assert_eq!(answer_letter_index("c"), 2);
        assert_eq!(answer_letter_index(" D "), 3);
        assert_eq!(answer_letter_index("E"), 0);
        assert_eq!(answer_letter_index(""), 0);
    }

    proptest! {
        #[test]
        fn prop_formatted_option_never_exceeds_max(text in ".{0,300}", max in 4usize..200) {
            let formatted = format_option(&text, max);
            prop_assert!(formatted.chars().count() <= max);
        }

        #[test]
        fn prop_short_options_are_trim_only(text in "[a-zA-Z0-9 ]{0,100}") {
            prop_assert_eq!(format_option(&text, 100), text.trim().to_string());
        }
    }
}
