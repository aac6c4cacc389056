//! Primary cuisine extraction.

/// First entry of a comma-separated cuisine list, trimmed.
///
/// No vocabulary check is made; a missing list gives `None`.
pub fn primary_cuisine(cuisines: Option<&str>) -> Option<String> {
    cuisines.map(|list| list.split(',').next().unwrap_or_default().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_entry() {
        assert_eq!(
            primary_cuisine(Some("North Indian, Chinese")),
            Some("North Indian".to_string())
        );
    }

    #[test]
    fn test_single_entry() {
        assert_eq!(primary_cuisine(Some("Cafe")), Some("Cafe".to_string()));
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        assert_eq!(
            primary_cuisine(Some("  South Indian  ,Biryani")),
            Some("South Indian".to_string())
        );
    }

    #[test]
    fn test_missing_list() {
        assert_eq!(primary_cuisine(None), None);
    }
}
