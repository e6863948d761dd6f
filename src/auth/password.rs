use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?;
    Ok(hash.to_string())
}

/// Re-hash `password` with the salt embedded in `hash`; the digest comparison
/// is constant-time inside argon2.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Like `verify_password`, but a malformed hash counts as a failed check.
pub fn check_password(password: &str, hash: &str) -> bool {
    match verify_password(password, hash) {
        Ok(ok) => ok,
        Err(e) => {
            log::warn!("Password check failed on malformed hash: {e}");
            false
        }
    }
}
