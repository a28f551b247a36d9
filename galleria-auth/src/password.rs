use uuid::Uuid;

use crate::AuthError;

pub fn hash_password(plain: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    match bcrypt::verify(plain, hash) {
        Ok(ok) => Ok(ok),
        Err(bcrypt::BcryptError::InvalidHash(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Initial password for a freshly provisioned tenant.
pub fn generate_password(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        out.push_str(&Uuid::new_v4().simple().to_string());
    }
    out.truncate(len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let h = hash_password("hunter22", 4).unwrap();
        assert!(h.starts_with("$2"));
        assert!(verify_password("hunter22", &h).unwrap());
        assert!(!verify_password("hunter23", &h).unwrap());
    }

    #[test]
    fn garbage_hash_is_a_mismatch() {
        assert!(!verify_password("x", "not-a-hash").unwrap());
        assert!(!verify_password("x", "").unwrap());
        assert!(!verify_password("x", "$2b$04$short").unwrap());
    }

    #[test]
    fn generated_passwords_have_requested_length() {
        let a = generate_password(10);
        let b = generate_password(40);
        assert_eq!(a.len(), 10);
        assert_eq!(b.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
