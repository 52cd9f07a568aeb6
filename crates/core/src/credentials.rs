//! Credential shape checks and Argon2id password hashing

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::{Error, Result};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 20;
pub const PASSWORD_MIN: usize = 8;

const EMAIL_TLDS: &[&str] = &["com", "net", "org", "info"];

/// Username must be 3-20 characters
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if (USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "username must be {USERNAME_MIN}-{USERNAME_MAX} characters"
        )))
    }
}

/// Email must look like `local@domain.tld`
///
/// The local part is at least three of `[A-Za-z0-9.]`, the domain is
/// alphanumeric and the top-level domain one of com, net, org or info.
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || Error::Validation(format!("'{email}' is not a valid email address"));

    let (local, host) = email.split_once('@').ok_or_else(invalid)?;
    let (domain, tld) = host.rsplit_once('.').ok_or_else(invalid)?;

    let local_ok = local.len() >= 3
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.');
    let domain_ok = !domain.is_empty() && domain.chars().all(|c| c.is_ascii_alphanumeric());

    if local_ok && domain_ok && EMAIL_TLDS.contains(&tld) {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Password must be at least 8 characters
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() >= PASSWORD_MIN {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )))
    }
}

/// Hash a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Credential(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
///
/// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| Error::Credential(format!("stored password hash is invalid: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Credential(format!("password verification failed: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_bounds() {
        assert!(validate_username("al").is_err());
        assert!(validate_username("ali").is_ok());
        assert!(validate_username(&"x".repeat(20)).is_ok());
        assert!(validate_username(&"x".repeat(21)).is_err());
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("first.last@mail.org").is_ok());
        assert!(validate_email("bob@example.info").is_ok());

        assert!(validate_email("al@example.com").is_err());
        assert!(validate_email("alice@example.io").is_err());
        assert!(validate_email("alice@exa-mple.com").is_err());
        assert!(validate_email("alice.example.com").is_err());
        assert!(validate_email("alice@.com").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("hunter22").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("hunter22").unwrap();
        let b = hash_password("hunter22").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("hunter22", "not-a-phc-string"),
            Err(Error::Credential(_))
        ));
    }
}
