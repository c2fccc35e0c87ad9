use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

/// PBKDF2 rounds. Existing records were written with this count, so it
/// cannot change without rehashing every stored password.
pub const ITERATIONS: u32 = 1000;
const HASH_LEN: usize = 64;
const SALT_LEN: usize = 16;

/// Salt and derived hash, both hex-encoded as stored in the users table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    pub salt: String,
    pub hash: String,
}

/// Generate a fresh random salt (16 bytes, 32 hex chars)
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a password with PBKDF2-HMAC-SHA512.
///
/// With no salt a new one is generated. The salt is used as its hex text, not
/// the decoded bytes, which keeps hashes compatible with existing records.
pub fn hash_password(password: &str, salt: Option<&str>) -> HashedPassword {
    let salt = salt.map(str::to_string).unwrap_or_else(generate_salt);
    let hash = derive(password, &salt, ITERATIONS);
    HashedPassword { salt, hash }
}

/// Recompute the hash with the stored salt and compare in constant time.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let computed = derive(password, salt, ITERATIONS);
    computed.as_bytes().ct_eq(expected_hash.as_bytes()).into()
}

fn derive(password: &str, salt: &str, rounds: u32) -> String {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), rounds, &mut out);
    hex::encode(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_matches_reference_vector() {
        // PBKDF2-HMAC-SHA512, P = "password", S = "salt", c = 1, dkLen = 64
        assert_eq!(
            derive("password", "salt", 1),
            "867f70cf1ade02cff3752599a3a53dc4af34c7a669815ae5d513554e1c8cf252\
             c02d470a285a0501bad999bfe943c08f050235d7d68b1da55e63f73b60a57fce"
        );
    }

    #[test]
    fn same_salt_same_hash() {
        let first = hash_password("secret1", Some("00112233445566778899aabbccddeeff"));
        let second = hash_password("secret1", Some("00112233445566778899aabbccddeeff"));
        assert_eq!(first, second);
    }

    #[test]
    fn fresh_salts_differ() {
        let first = hash_password("secret1", None);
        let second = hash_password("secret1", None);
        assert_ne!(first.salt, second.salt);
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn output_shape() {
        let hashed = hash_password("secret1", None);
        assert_eq!(hashed.salt.len(), SALT_LEN * 2);
        assert_eq!(hashed.hash.len(), HASH_LEN * 2);
        assert_ne!(hashed.hash, "secret1");
        assert!(hashed.hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn verify_accepts_only_the_right_password() {
        let hashed = hash_password("secret1", None);
        assert!(verify_password("secret1", &hashed.salt, &hashed.hash));
        assert!(!verify_password("secret2", &hashed.salt, &hashed.hash));
        assert!(!verify_password("secret1", &generate_salt(), &hashed.hash));
    }

    #[test]
    fn verify_rejects_truncated_hash() {
        let hashed = hash_password("secret1", None);
        assert!(!verify_password("secret1", &hashed.salt, &hashed.hash[..64]));
    }
}
