use lazy_static::lazy_static;
use regex::Regex;

use crate::accounts::error::Violation;
use crate::accounts::repo_types::Account;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9+\-\s()]+$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 100;

/// Check the account's field invariants before persistence.
///
/// Returns one entry per violated rule; an empty list means the record is
/// fit to save. Uniqueness of email and username is not checked here, the
/// store enforces it at write time.
pub fn validate(account: &Account) -> Vec<Violation> {
    let mut violations = Vec::new();

    if account.email.trim().is_empty() {
        violations.push(Violation::new("email", "email is required"));
    } else if !is_valid_email(&account.email) {
        violations.push(Violation::new("email", "not a valid email address"));
    }

    if account.username.trim().is_empty() {
        violations.push(Violation::new("username", "username is required"));
    } else {
        let len = account.username.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
            violations.push(Violation::new(
                "username",
                format!(
                    "must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
                ),
            ));
        }
        if !USERNAME_RE.is_match(&account.username) {
            violations.push(Violation::new(
                "username",
                "only letters, digits, hyphens and underscores are allowed",
            ));
        }
    }

    if let Some(phone) = account.phone_number.as_deref() {
        if !PHONE_RE.is_match(phone) {
            violations.push(Violation::new("phone_number", "not a valid phone number"));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with_username(username: &str) -> Account {
        Account::new("jane@example.com", username, "$argon2id$stub-hash")
    }

    #[test]
    fn valid_account_has_no_violations() {
        assert!(validate(&account_with_username("abc")).is_empty());
    }

    #[test]
    fn username_below_three_chars_is_rejected() {
        let violations = validate(&account_with_username("ab"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "username");
    }

    #[test]
    fn username_with_space_fails_the_character_class() {
        let violations = validate(&account_with_username("a b"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "username");
        assert!(violations[0].reason.contains("letters"));
    }

    #[test]
    fn username_over_one_hundred_chars_is_rejected() {
        let violations = validate(&account_with_username(&"a".repeat(101)));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "username");
    }

    #[test]
    fn missing_email_is_required() {
        let mut account = account_with_username("jane_doe");
        account.email = "  ".into();
        let violations = validate(&account);
        assert_eq!(violations[0].field, "email");
        assert!(violations[0].reason.contains("required"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut account = account_with_username("jane_doe");
        account.email = "not-an-email".into();
        let violations = validate(&account);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "email");
    }

    #[test]
    fn phone_number_is_only_checked_when_present() {
        let mut account = account_with_username("jane_doe");
        assert!(validate(&account).is_empty());

        account.phone_number = Some("+33 (0)1 23-45-67".into());
        assert!(validate(&account).is_empty());

        account.phone_number = Some("call me".into());
        let violations = validate(&account);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "phone_number");
    }

    #[test]
    fn violations_accumulate_per_field() {
        let mut account = account_with_username("a b");
        account.email = "nope".into();
        account.phone_number = Some("xyz".into());
        let fields: Vec<&str> = validate(&account).iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["email", "username", "phone_number"]);
    }
}
