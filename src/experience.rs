//! Years-of-experience estimation from free text (queries, resume text).

use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound for any single stated figure; larger numbers are capped to it.
pub const MAX_EXPERIENCE_YEARS: u32 = 50;

static RE_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:\.\d+)?\s*\+?\s*(?:years?|yrs?|yoe)\b").expect("years regex")
});

/// Largest "N years" figure mentioned in `text`, capped at [`MAX_EXPERIENCE_YEARS`].
pub fn estimate_years(text: &str) -> Option<u32> {
    RE_YEARS
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .map(|y| y.min(MAX_EXPERIENCE_YEARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_largest_stated_figure() {
        assert_eq!(estimate_years("Java developer with 5 years experience"), Some(5));
        assert_eq!(
            estimate_years("3+ yrs Python, 7 years total, 1 yr management"),
            Some(7)
        );
        assert_eq!(estimate_years("2.5 years in sales"), Some(2));
        assert_eq!(estimate_years("10YOE backend"), Some(10));
    }

    #[test]
    fn no_figure_means_unknown() {
        assert_eq!(estimate_years("senior java developer"), None);
        assert_eq!(estimate_years("founded in 1999 years ago"), None);
        assert_eq!(estimate_years(""), None);
    }

    #[test]
    fn oversized_figures_are_capped() {
        assert_eq!(estimate_years("retired after 65 years in mining"), Some(50));
        assert_eq!(estimate_years("3 years java, 80 yrs combined"), Some(50));
    }
}
