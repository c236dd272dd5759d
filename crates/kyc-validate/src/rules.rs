//! Per-kind text format rules.

use std::sync::OnceLock;

use kyc_types::Verdict;
use regex::Regex;

fn identity_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[2-9][0-9]{11}$").expect("identity number regex"))
}

fn twelve_digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{12}$").expect("twelve digit regex"))
}

fn tax_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("tax id regex"))
}

fn account_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `\d` would also admit non-ASCII digits.
    RE.get_or_init(|| Regex::new(r"^[0-9]{9,18}$").expect("account number regex"))
}

fn routing_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("routing code regex"))
}

/// 12 digits, first digit 2–9.
pub fn validate_identity_number(value: &str) -> Verdict {
    if value.is_empty() {
        return Verdict::invalid("Identity number is required");
    }
    if identity_number_re().is_match(value) {
        return Verdict::valid();
    }
    if twelve_digits_re().is_match(value) {
        return Verdict::invalid("Identity number must not start with 0 or 1");
    }
    Verdict::invalid(
        "Invalid identity number format. It should be a 12-digit number not starting with 0 or 1",
    )
}

/// 5 uppercase letters, 4 digits, 1 uppercase letter. Case is not folded.
pub fn validate_tax_id(value: &str) -> Verdict {
    if value.is_empty() {
        return Verdict::invalid("Tax ID is required");
    }
    if tax_id_re().is_match(value) {
        Verdict::valid()
    } else {
        Verdict::invalid(
            "Invalid tax ID format. Should be 5 uppercase letters, 4 numbers, and 1 uppercase letter",
        )
    }
}

/// 9–18 ASCII digits, no separators.
pub fn validate_account_number(value: &str) -> Verdict {
    if value.is_empty() {
        return Verdict::invalid("Account number is required");
    }
    if account_number_re().is_match(value) {
        Verdict::valid()
    } else {
        Verdict::invalid("Invalid account number format. Should be 9-18 digits")
    }
}

/// 4 uppercase letters, a literal `0`, 6 uppercase alphanumerics.
pub fn validate_routing_code(value: &str) -> Verdict {
    if value.is_empty() {
        return Verdict::invalid("Routing code is required");
    }
    if routing_code_re().is_match(value) {
        Verdict::valid()
    } else {
        Verdict::invalid(
            "Invalid routing code format. Should be 4 uppercase letters, 0, and 6 alphanumeric characters",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identity_number_accepts_leading_two_through_nine() {
        assert!(validate_identity_number("234567890123").is_valid());
        assert!(validate_identity_number("999999999999").is_valid());
    }

    #[test]
    fn identity_number_leading_zero_or_one_gets_its_own_message() {
        for value in ["000000000000", "123456789012"] {
            let verdict = validate_identity_number(value);
            assert!(!verdict.is_valid());
            assert!(verdict.message.unwrap().contains("must not start with 0 or 1"));
        }
    }

    #[test]
    fn identity_number_wrong_length_gets_format_message() {
        let verdict = validate_identity_number("23456789012");
        assert!(verdict.message.unwrap().starts_with("Invalid identity number format"));
    }

    #[test]
    fn empty_inputs_are_required() {
        assert_eq!(
            validate_identity_number("").message.as_deref(),
            Some("Identity number is required")
        );
        assert_eq!(validate_tax_id("").message.as_deref(), Some("Tax ID is required"));
        assert_eq!(
            validate_account_number("").message.as_deref(),
            Some("Account number is required")
        );
        assert_eq!(
            validate_routing_code("").message.as_deref(),
            Some("Routing code is required")
        );
    }

    #[test]
    fn tax_id_is_case_sensitive() {
        assert!(validate_tax_id("ABCDE1234F").is_valid());
        assert!(!validate_tax_id("abcde1234f").is_valid());
        assert!(!validate_tax_id("ABCDE1234f").is_valid());
        assert!(!validate_tax_id("ABCDE12345").is_valid());
        assert!(!validate_tax_id("ABCDE1234FG").is_valid());
    }

    #[test]
    fn account_number_bounds() {
        assert!(validate_account_number("123456789").is_valid());
        assert!(validate_account_number("123456789012345678").is_valid());
        assert!(!validate_account_number("12345678").is_valid());
        assert!(!validate_account_number("1234567890123456789").is_valid());
        assert!(!validate_account_number("1234-56789").is_valid());
    }

    #[test]
    fn account_number_rejects_non_ascii_digits() {
        // Arabic-Indic digits.
        assert!(!validate_account_number("١٢٣٤٥٦٧٨٩").is_valid());
    }

    #[test]
    fn routing_code_requires_literal_zero() {
        assert!(validate_routing_code("SBIN0001234").is_valid());
        assert!(validate_routing_code("HDFC0ABC123").is_valid());
        assert!(!validate_routing_code("SBIN1001234").is_valid());
        assert!(!validate_routing_code("sbin0001234").is_valid());
        assert!(!validate_routing_code("SBIN000123").is_valid());
    }

    #[test]
    fn surrounding_whitespace_is_not_trimmed() {
        assert!(!validate_tax_id(" ABCDE1234F").is_valid());
        assert!(!validate_identity_number("234567890123 ").is_valid());
    }

    proptest! {
        #[test]
        fn identity_numbers_with_valid_lead_pass(s in "[2-9][0-9]{11}") {
            prop_assert!(validate_identity_number(&s).is_valid());
        }

        #[test]
        fn identity_numbers_with_low_lead_fail(s in "[01][0-9]{11}") {
            prop_assert!(!validate_identity_number(&s).is_valid());
        }

        #[test]
        fn identity_numbers_of_other_lengths_fail(s in "[0-9]{0,11}|[0-9]{13,20}") {
            prop_assert!(!validate_identity_number(&s).is_valid());
        }

        #[test]
        fn tax_ids_matching_pattern_pass(s in "[A-Z]{5}[0-9]{4}[A-Z]") {
            prop_assert!(validate_tax_id(&s).is_valid());
        }

        #[test]
        fn lowercased_tax_ids_fail(s in "[a-z]{5}[0-9]{4}[A-Z]") {
            prop_assert!(!validate_tax_id(&s).is_valid());
        }

        #[test]
        fn account_numbers_in_range_pass(s in "[0-9]{9,18}") {
            prop_assert!(validate_account_number(&s).is_valid());
        }

        #[test]
        fn account_numbers_with_a_letter_fail(prefix in "[0-9]{4,8}", suffix in "[0-9]{4,8}", c in "[a-zA-Z]") {
            let value = format!("{prefix}{c}{suffix}");
            prop_assert!(!validate_account_number(&value).is_valid());
        }

        #[test]
        fn routing_codes_matching_pattern_pass(s in "[A-Z]{4}0[A-Z0-9]{6}") {
            prop_assert!(validate_routing_code(&s).is_valid());
        }

        #[test]
        fn routing_codes_with_nonzero_fifth_char_fail(bank in "[A-Z]{4}", fifth in "[1-9A-Z]", branch in "[A-Z0-9]{6}") {
            let value = format!("{bank}{fifth}{branch}");
            prop_assert!(!validate_routing_code(&value).is_valid());
        }

        #[test]
        fn validators_are_idempotent(s in "\\PC{0,20}") {
            prop_assert_eq!(validate_identity_number(&s), validate_identity_number(&s));
            prop_assert_eq!(validate_tax_id(&s), validate_tax_id(&s));
            prop_assert_eq!(validate_account_number(&s), validate_account_number(&s));
            prop_assert_eq!(validate_routing_code(&s), validate_routing_code(&s));
        }
    }
}
