//! Email normalization and syntax validation.
//!
//! Every email entering the system goes through [`normalize_email`] so that
//! `"A@Example.com "` and `"a@example.com"` resolve to the same identity.

use std::collections::HashSet;

use validator::ValidationError;

lazy_static::lazy_static! {
    /// Accepted email syntax: unreserved local part, a domain containing at
    /// least one dot, and a top-level label of two or more letters.
    ///
    /// ASCII only. Unicode case folding is off so `ſ` and `K` do not pass
    /// as `s` and `k`.
    pub static ref EMAIL_REGEX: regex::Regex =
        regex::Regex::new(r"(?i-u)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap();
}

/// Trims surrounding whitespace and lowercases.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Returns true if `candidate` matches [`EMAIL_REGEX`] exactly.
///
/// No trimming happens here; callers trim first.
pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_REGEX.is_match(candidate)
}

/// Normalizes `raw` and returns it if well formed.
///
/// Syntax is checked before lowercasing; `to_lowercase` maps some non-ASCII
/// characters onto ASCII letters.
pub fn parse_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    is_valid_email(trimmed).then(|| trimmed.to_lowercase())
}

/// Validator-compatible check for a single email field.
pub fn validate_email_address(raw: &str) -> Result<(), ValidationError> {
    if parse_email(raw).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Invalid email address".into());
        Err(err)
    }
}

/// Splits free text into non-empty candidate tokens.
///
/// Tokens are separated by commas, semicolons or any whitespace (newlines and
/// carriage returns included). No validation happens here.
pub fn email_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Extracts every well-formed email from free text.
///
/// Valid tokens from [`email_tokens`] are lowercased and deduplicated,
/// keeping the order in which each address first appears.
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    email_tokens(text)
        .filter(|token| is_valid_email(token))
        .map(str::to_lowercase)
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_tokens_skip_empty_runs() {
        let tokens: Vec<&str> = email_tokens(" a@x.io,,\r\n;A@x.io  junk ").collect();
        assert_eq!(tokens, vec!["a@x.io", "A@x.io", "junk"]);
        assert_eq!(email_tokens(" ,; \n").count(), 0);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@Example.COM "), "a@example.com");
        assert_eq!(normalize_email("a@example.com"), "a@example.com");
    }

    #[test]
    fn test_is_valid_email_accepts_common_forms() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co.uk"));
        assert!(is_valid_email("A_B%C-D@EXAMPLE.IO"));
    }

    #[test]
    fn test_is_valid_email_rejects_malformed() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@example.c"));
        assert!(!is_valid_email("user@example.c0m"));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email(" user@example.com"));
    }

    #[test]
    fn test_non_ascii_lookalikes_rejected() {
        // U+017F and U+212A fold to `s` and `k` under Unicode rules.
        assert!(!is_valid_email("\u{17F}ue@example.com"));
        assert!(!is_valid_email("user@example.\u{212A}z"));
        assert_eq!(parse_email("\u{17F}ue@example.com"), None);
        assert_eq!(parse_email("\u{212A}im@example.com"), None);
        assert!(extract_emails("\u{17F}@x.io").is_empty());
        assert!(extract_emails("\u{212A}@x.io, b\u{FC}ro@example.de").is_empty());
    }

    #[test]
    fn test_parse_email_normalizes_before_matching() {
        assert_eq!(
            parse_email("A@Example.com "),
            Some("a@example.com".to_string())
        );
        assert_eq!(parse_email("not an email"), None);
    }

    #[test]
    fn test_validate_email_address_message() {
        assert!(validate_email_address("ok@example.com").is_ok());
        let err = validate_email_address("nope").unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "Invalid email address");
    }

    #[test]
    fn test_extract_emails_mixed_separators() {
        let emails = extract_emails("x@a.com, y@b.com\nx@a.com");
        assert_eq!(emails, vec!["x@a.com", "y@b.com"]);
    }

    #[test]
    fn test_extract_emails_case_insensitive_dedup() {
        let emails = extract_emails("Alice@Example.com;alice@example.com ALICE@EXAMPLE.COM");
        assert_eq!(emails, vec!["alice@example.com"]);
    }

    #[test]
    fn test_extract_emails_csv_with_header_and_crlf() {
        let csv = "email,name\r\nbob@example.com,Bob\r\ncarol@example.org,Carol\r\n";
        let emails = extract_emails(csv);
        assert_eq!(emails, vec!["bob@example.com", "carol@example.org"]);
    }

    #[test]
    fn test_extract_emails_skips_garbage() {
        assert!(extract_emails("").is_empty());
        assert!(extract_emails(" , ; \n\t").is_empty());
        assert!(extract_emails("name,phone\nBob,555-1234").is_empty());
    }

    #[test]
    fn test_extract_emails_preserves_first_seen_order() {
        let emails = extract_emails("c@x.io b@x.io a@x.io b@x.io");
        assert_eq!(emails, vec!["c@x.io", "b@x.io", "a@x.io"]);
    }
}
