//! Field normalizers for the inconsistently encoded raw columns.
//!
//! Every parser is total: input that cannot be interpreted yields `None`,
//! never an error and never a substituted default.

/// Suffix carried by rating strings such as "3.1/5".
const RATING_SUFFIX: &str = "/5";

/// Thousands separator used in cost strings such as "1,200".
const THOUSANDS_SEPARATOR: char = ',';

/// Parse a rating string.
///
/// `"3.1/5"` becomes `Some(3.1)`; sentinels like `"NEW"` or `"-"` become `None`.
pub fn parse_rating(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let value = trimmed.strip_suffix(RATING_SUFFIX).unwrap_or(trimmed);
    parse_finite(value.trim())
}

/// Parse a cost string, removing thousands separators.
pub fn parse_cost(raw: &str) -> Option<f64> {
    let value: String = raw.chars().filter(|c| *c != THOUSANDS_SEPARATOR).collect();
    parse_finite(value.trim())
}

/// Map the exact "Yes"/"No" vocabulary to a boolean.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "Yes" => Some(true),
        "No" => Some(false),
        _ => None,
    }
}

/// Parse a vote count.
pub fn parse_votes(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Apply a parser over one column's worth of values.
///
/// Missing cells stay missing.
pub fn normalize_column<T, F>(values: &[Option<&str>], parse: F) -> Vec<Option<T>>
where
    F: Fn(&str) -> Option<T>,
{
    values.iter().map(|v| v.and_then(&parse)).collect()
}

// "NaN" and "inf" parse as f64 but are not usable values here.
fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_with_suffix() {
        assert_eq!(parse_rating("4.1/5"), Some(4.1));
        assert_eq!(parse_rating("3.9 /5"), Some(3.9));
        assert_eq!(parse_rating(" 2.5/5 "), Some(2.5));
    }

    #[test]
    fn test_rating_without_suffix() {
        assert_eq!(parse_rating("3.7"), Some(3.7));
    }

    #[test]
    fn test_rating_sentinels_are_null() {
        assert_eq!(parse_rating("NEW"), None);
        assert_eq!(parse_rating("-"), None);
        assert_eq!(parse_rating(""), None);
        assert_eq!(parse_rating("/5"), None);
        assert_eq!(parse_rating("NaN"), None);
        assert_eq!(parse_rating("inf/5"), None);
    }

    #[test]
    fn test_rating_every_tenth() {
        for whole in 0..5 {
            for tenth in 0..10 {
                let text = format!("{}.{}/5", whole, tenth);
                let expected: f64 = format!("{}.{}", whole, tenth).parse().unwrap();
                assert_eq!(parse_rating(&text), Some(expected), "{}", text);
            }
        }
    }

    #[test]
    fn test_cost_with_separator() {
        assert_eq!(parse_cost("1,200"), Some(1200.0));
        assert_eq!(parse_cost("1,00,000"), Some(100000.0));
        assert_eq!(parse_cost(" 800 "), Some(800.0));
    }

    #[test]
    fn test_cost_unparseable_is_null() {
        assert_eq!(parse_cost("free"), None);
        assert_eq!(parse_cost(""), None);
        assert_eq!(parse_cost(","), None);
    }

    #[test]
    fn test_flag_vocabulary_is_exact() {
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag("No"), Some(false));
        assert_eq!(parse_flag("yes"), None);
        assert_eq!(parse_flag(" Yes"), None);
        assert_eq!(parse_flag("Maybe"), None);
    }

    #[test]
    fn test_votes() {
        assert_eq!(parse_votes("775"), Some(775));
        assert_eq!(parse_votes(" 0 "), Some(0));
        assert_eq!(parse_votes("many"), None);
    }

    #[test]
    fn test_normalize_column_keeps_positions() {
        let values = [Some("4.1/5"), None, Some("NEW"), Some("3.0/5")];
        let parsed = normalize_column(&values, parse_rating);
        assert_eq!(parsed, vec![Some(4.1), None, None, Some(3.0)]);
    }
}
