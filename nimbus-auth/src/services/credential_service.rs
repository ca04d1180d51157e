use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use nimbus_shared::errors::{AppError, ErrorCode};

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    let too_weak = |msg: &str| AppError::new(ErrorCode::PasswordTooWeak, msg);

    let length = password.chars().count();
    if length < 12 {
        return Err(too_weak("password must be at least 12 characters long"));
    }
    if length > 32 {
        return Err(too_weak("password must be at most 32 characters long"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(too_weak("password must contain at least one uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(too_weak("password must contain at least one lowercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(too_weak("password must contain at least one number"));
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(too_weak("password must contain at least one special character"));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), AppError> {
    let invalid = |msg: &str| AppError::new(ErrorCode::ValidationError, msg);

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("name cannot be empty or just spaces"));
    }

    let length = trimmed.chars().count();
    if length < 2 {
        return Err(invalid("name must be at least 2 characters long"));
    }
    if length > 30 {
        return Err(invalid("name must be at most 30 characters long"));
    }
    if !trimmed.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(invalid("name must start with a letter"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c == ' ' || c == '-' || c == '\'')
    {
        return Err(invalid(
            "name can only contain letters, spaces, hyphens, and apostrophes",
        ));
    }
    if trimmed.contains("  ") {
        return Err(invalid("name cannot contain consecutive spaces"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("Str0ng!Passw0rd123").unwrap();

        assert!(verify_password("Str0ng!Passw0rd123", &hash).unwrap());
        assert!(!verify_password("wrong-password-0!A", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("Str0ng!Passw0rd123").unwrap();
        let b = hash_password("Str0ng!Passw0rd123").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Str0ng!Passw0rd123").is_ok());
        // too short
        assert!(validate_password("Sh0rt!aa").is_err());
        // over 32 chars
        assert!(validate_password(&format!("Aa1!{}", "x".repeat(30))).is_err());
        // missing character classes
        assert!(validate_password("alllowercase1!aa").is_err());
        assert!(validate_password("ALLUPPERCASE1!AA").is_err());
        assert!(validate_password("NoDigitsHere!abc").is_err());
        assert!(validate_password("NoSpecials12345a").is_err());
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("Alice").is_ok());
        assert!(validate_name("Mary-Jane O'Neil").is_ok());
        assert!(validate_name("  ").is_err());
        assert!(validate_name("A").is_err());
        assert!(validate_name(&"a".repeat(31)).is_err());
        assert!(validate_name("1Alice").is_err());
        assert!(validate_name("Alice42").is_err());
        assert!(validate_name("Alice  Smith").is_err());
    }
}
