//! Normalization and validation for Spanish mobile numbers.
use once_cell::sync::Lazy;
use regex::Regex;

/// Country calling code prepended to bare mobile numbers.
const COUNTRY_CODE: &str = "34";

/// Bare 9-digit mobile pattern: 6xx xxx xxx or 7xx xxx xxx.
static MOBILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[67]\d{8}$").expect("mobile pattern"));

/// Country-code-prefixed mobile pattern.
static MOBILE_PREFIXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^34[67]\d{8}$").expect("prefixed mobile pattern"));

/// Reduce a free-form phone string to canonical digits.
///
/// Strips every non-digit character, then prepends the country code when the
/// remainder is a bare 9-digit mobile number. Anything else (already prefixed,
/// landline, foreign, garbage) passes through digit-stripped but otherwise
/// untouched; validity is [`is_valid`]'s concern, not this function's.
pub fn normalize(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if MOBILE.is_match(&digits) {
        format!("{COUNTRY_CODE}{digits}")
    } else {
        digits
    }
}

/// Whether a normalized phone string is a deliverable mobile number.
///
/// Accepts the bare and the country-prefixed mobile shapes only. Callers are
/// expected to [`normalize`] first; punctuation makes anything invalid here.
pub fn is_valid(phone: &str) -> bool {
    MOBILE.is_match(phone) || MOBILE_PREFIXED.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_prefixes_bare_mobiles() {
        assert_eq!(normalize("612345678"), "34612345678");
        assert_eq!(normalize("712345678"), "34712345678");
        assert_eq!(normalize("612 345 678"), "34612345678");
        assert_eq!(normalize("612-345-678"), "34612345678");
    }

    #[test]
    fn normalize_is_idempotent_on_prefixed_input() {
        assert_eq!(normalize("34612345678"), "34612345678");
        assert_eq!(normalize(&normalize("612 345 678")), "34612345678");
    }

    #[test]
    fn normalize_passes_other_shapes_through() {
        // Landline: digits kept, no prefixing.
        assert_eq!(normalize("912345678"), "912345678");
        // Foreign number with punctuation.
        assert_eq!(normalize("+44 20 7946 0000"), "442079460000");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("n/a"), "");
    }

    #[test]
    fn validity_accepts_both_mobile_shapes() {
        assert!(is_valid("612345678"));
        assert!(is_valid("712345678"));
        assert!(is_valid("34612345678"));
    }

    #[test]
    fn validity_rejects_everything_else() {
        assert!(!is_valid("512345678")); // wrong leading digit
        assert!(!is_valid("12345")); // wrong length
        assert!(!is_valid("3461234567")); // truncated prefixed form
        assert!(!is_valid("346123456789")); // too long
        assert!(!is_valid("612 345 678")); // not normalized
        assert!(!is_valid(""));
    }
}
