//! Sensitive-content heuristics.

use once_cell::sync::Lazy;
use regex::Regex;

static SENSITIVE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^cc|cardnum|ccnum|creditcard|csc|cvc|cvv|exp|pass|seccode|securitycode|securitynum|socialsec|socsec|ssn",
    )
    .expect("sensitive name pattern")
});

// Visa, MasterCard, Discover, Amex, Diners Club, JCB.
static CREDIT_CARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(4[0-9]{12}(?:[0-9]{3})?)|(5[1-5][0-9]{14})|(6(?:011|5[0-9]{2})[0-9]{12})|(3[47][0-9]{13})|(3(?:0[0-5]|[68][0-9])[0-9]{11})|((?:2131|1800|35[0-9]{3})[0-9]{11}))$",
    )
    .expect("credit card pattern")
});

static SSN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}-?\d{2}-?\d{4}$").expect("ssn pattern"));

/// Field name or id looks like it holds a credential or card data. Characters
/// other than ASCII letters and digits are dropped before matching.
pub fn is_sensitive_name(name: &str) -> bool {
    let compact: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    SENSITIVE_NAME.is_match(&compact)
}

/// Value has the shape of a card number, ignoring hyphens and spaces.
pub fn looks_like_credit_card(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| *c != '-' && *c != ' ').collect();
    CREDIT_CARD.is_match(&compact)
}

pub fn looks_like_ssn(value: &str) -> bool {
    SSN.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_names() {
        assert!(is_sensitive_name("cc-number"));
        assert!(is_sensitive_name("Credit_Card"));
        assert!(is_sensitive_name("user[password]"));
        assert!(is_sensitive_name("card-cvc"));
        assert!(is_sensitive_name("SSN"));
        assert!(!is_sensitive_name("email"));
        assert!(!is_sensitive_name("color"));
    }

    #[test]
    fn card_shapes() {
        assert!(looks_like_credit_card("4111111111111111"));
        assert!(looks_like_credit_card("4111-1111-1111-1111"));
        assert!(looks_like_credit_card("5500 0000 0000 0004"));
        assert!(looks_like_credit_card("340000000000009"));
        assert!(!looks_like_credit_card("1234567890123456"));
        assert!(!looks_like_credit_card("hello world"));
    }

    #[test]
    fn ssn_shapes() {
        assert!(looks_like_ssn("123-45-6789"));
        assert!(looks_like_ssn("123456789"));
        assert!(!looks_like_ssn("123 45 6789"));
        assert!(!looks_like_ssn("1234-5-6789"));
    }
}
