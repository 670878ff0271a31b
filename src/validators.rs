/// Input validators
///
/// Field-level checks applied at the route boundary before anything
/// reaches the database. Length limits double as a cheap guard against
/// oversized payloads.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 250;
const MIN_EMAIL_LENGTH: usize = 5;
const MIN_USERNAME_LENGTH: usize = 5;
const MAX_USERNAME_LENGTH: usize = 16;
const MIN_PASSWORD_LENGTH: usize = 6;
// bcrypt only hashes the first 72 bytes
const MAX_PASSWORD_LENGTH: usize = 72;
const MAX_FIRST_NAME_LENGTH: usize = 50;
const MAX_LAST_NAME_LENGTH: usize = 100;
const MAX_CONTACT_EMAIL_LENGTH: usize = 50;
const MAX_PHONE_LENGTH: usize = 13;
const MAX_EXTRA_LENGTH: usize = 255;

lazy_static! {
    // RFC 5322 simplified, practical validation
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    static ref USERNAME_REGEX: Regex = Regex::new(r"^\w+$").unwrap();

    // E.164: leading +, up to 15 digits
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+[1-9]\d{1,14}$").unwrap();
}

pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }
    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort(
            "email".to_string(),
            MIN_EMAIL_LENGTH,
        ));
    }
    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong(
            "email".to_string(),
            MAX_EMAIL_LENGTH,
        ));
    }
    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Usernames are 5-16 word characters.
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }
    if trimmed.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort(
            "username".to_string(),
            MIN_USERNAME_LENGTH,
        ));
    }
    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong(
            "username".to_string(),
            MAX_USERNAME_LENGTH,
        ));
    }
    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Length check only; strength policy is out of scope here.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        ));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        ));
    }
    Ok(())
}

/// E.164 phone number, max 13 characters as stored.
pub fn is_valid_phone(phone: &str) -> Result<String, ValidationError> {
    let trimmed = phone.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("phone".to_string()));
    }
    if trimmed.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::TooLong(
            "phone".to_string(),
            MAX_PHONE_LENGTH,
        ));
    }
    if !PHONE_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("phone".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates the mutable fields of a contact payload. Optional fields are
/// checked only when present.
pub struct ContactFields {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub extra: Option<String>,
}

pub fn is_valid_contact(
    first_name: &str,
    last_name: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
    extra: Option<&str>,
) -> Result<ContactFields, ValidationError> {
    let first_name = first_name.trim();
    if first_name.is_empty() {
        return Err(ValidationError::EmptyField("first_name".to_string()));
    }
    if first_name.len() > MAX_FIRST_NAME_LENGTH {
        return Err(ValidationError::TooLong(
            "first_name".to_string(),
            MAX_FIRST_NAME_LENGTH,
        ));
    }

    if let Some(last) = last_name {
        if last.len() > MAX_LAST_NAME_LENGTH {
            return Err(ValidationError::TooLong(
                "last_name".to_string(),
                MAX_LAST_NAME_LENGTH,
            ));
        }
    }

    let email = match email {
        Some(e) => {
            let e = is_valid_email(e)?;
            if e.len() > MAX_CONTACT_EMAIL_LENGTH {
                return Err(ValidationError::TooLong(
                    "email".to_string(),
                    MAX_CONTACT_EMAIL_LENGTH,
                ));
            }
            Some(e)
        }
        None => None,
    };

    let phone = match phone {
        Some(p) => Some(is_valid_phone(p)?),
        None => None,
    };

    if let Some(x) = extra {
        if x.len() > MAX_EXTRA_LENGTH {
            return Err(ValidationError::TooLong(
                "extra".to_string(),
                MAX_EXTRA_LENGTH,
            ));
        }
    }

    Ok(ContactFields {
        first_name: first_name.to_string(),
        last_name: last_name.map(|s| s.trim().to_string()),
        email,
        phone,
        extra: extra.map(|s| s.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_email() {
        assert!(is_valid_email("tony.stark@mail.com").is_ok());
    }

    #[test]
    fn trims_email_whitespace() {
        assert_eq!(
            is_valid_email("  tony.stark@mail.com  ").unwrap(),
            "tony.stark@mail.com"
        );
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["notanemail", "user@", "@example.com", "user@@example.com"] {
            assert!(is_valid_email(email).is_err(), "should reject {}", email);
        }
    }

    #[test]
    fn rejects_overlong_email() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&email).is_err());
    }

    #[test]
    fn accepts_valid_username() {
        assert!(is_valid_username("ironman").is_ok());
    }

    #[test]
    fn rejects_short_and_long_usernames() {
        assert!(is_valid_username("abc").is_err());
        assert!(is_valid_username(&"a".repeat(17)).is_err());
    }

    #[test]
    fn rejects_non_word_username() {
        assert!(is_valid_username("iron man").is_err());
        assert!(is_valid_username("iron-man!").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(is_valid_password("12345").is_err());
        assert!(is_valid_password("123123123").is_ok());
        assert!(is_valid_password(&"a".repeat(73)).is_err());
    }

    #[test]
    fn accepts_e164_phone() {
        assert!(is_valid_phone("+380671234567").is_ok());
    }

    #[test]
    fn rejects_phone_without_plus() {
        assert!(is_valid_phone("0671234567").is_err());
    }

    #[test]
    fn contact_requires_first_name() {
        assert!(is_valid_contact("", None, None, None, None).is_err());
    }

    #[test]
    fn contact_optional_fields_checked_when_present() {
        assert!(is_valid_contact("Tony", None, Some("bad"), None, None).is_err());
        assert!(
            is_valid_contact("Tony", None, None, Some("nope"), None).is_err()
        );
        assert!(is_valid_contact(
            "Tony",
            Some("Stark"),
            Some("tony@mail.com"),
            Some("+380671234567"),
            Some("billionaire")
        )
        .is_ok());
    }
}
