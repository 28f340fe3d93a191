//! Local checks run before any credential reaches the backend.

use crate::error::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;

const MISSING_FIELDS: &str = "Please fill in all fields";

/// Sign-up form as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub username: String,
    pub full_name: String,
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// # Errors
///
/// Returns [`AuthError::Validation`] if any field is blank or the password
/// is shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn validate_sign_up(form: &SignUpForm) -> Result<(), AuthError> {
    if [&form.email, &form.password, &form.username, &form.full_name]
        .iter()
        .any(|field| blank(field))
    {
        return Err(AuthError::Validation(MISSING_FIELDS.into()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// # Errors
///
/// Returns [`AuthError::Validation`] if the email or password is blank.
pub fn validate_sign_in(email: &str, password: &str) -> Result<(), AuthError> {
    if blank(email) || password.is_empty() {
        return Err(AuthError::Validation(MISSING_FIELDS.into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn form(email: &str, password: &str, username: &str, full_name: &str) -> SignUpForm {
        SignUpForm {
            email: email.into(),
            password: password.into(),
            username: username.into(),
            full_name: full_name.into(),
        }
    }

    #[rstest]
    #[case::no_email(form("", "secret1", "ada", "Ada L"))]
    #[case::no_password(form("a@b.c", "", "ada", "Ada L"))]
    #[case::whitespace_username(form("a@b.c", "secret1", "   ", "Ada L"))]
    #[case::no_full_name(form("a@b.c", "secret1", "ada", ""))]
    fn sign_up_requires_every_field(#[case] input: SignUpForm) {
        let err = validate_sign_up(&input).expect_err("blank field");
        assert_eq!(err.to_string(), "Please fill in all fields");
    }

    #[rstest]
    #[case("12345", false)]
    #[case("123456", true)]
    #[case("ñandú!", true)]
    fn password_length_is_counted_in_characters(#[case] password: &str, #[case] ok: bool) {
        let result = validate_sign_up(&form("a@b.c", password, "ada", "Ada L"));
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn short_password_message() {
        let err = validate_sign_up(&form("a@b.c", "abc", "ada", "Ada L")).expect_err("short");
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }

    #[test]
    fn sign_in_requires_both_fields() {
        assert!(validate_sign_in("", "pw").is_err());
        assert!(validate_sign_in("a@b.c", "").is_err());
        assert!(validate_sign_in("a@b.c", "pw").is_ok());
    }
}
