//! Service-catalog helpers: slug derivation and rating aggregation math.

/// Derives the catalog slug from an offering title: lower-cased, spaces to
/// hyphens, everything outside `[a-z0-9_-]` stripped.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Aggregate ratings are stored to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_from_titles() {
        assert_eq!(slugify("Baby Care"), "baby-care");
        assert_eq!(slugify("Elderly Care"), "elderly-care");
        assert_eq!(slugify("Sick Care (24/7)"), "sick-care-247");
        assert_eq!(slugify("  Night   Nurse "), "--night---nurse-");
        assert_eq!(slugify("Déjà Vu Care"), "dj-vu-care");
    }

    #[test]
    fn rating_rounds_to_two_decimals() {
        assert_eq!(round2(4.666_666), 4.67);
        assert_eq!(round2(3.0), 3.0);
        assert_eq!(round2(4.333_333), 4.33);
    }
}
