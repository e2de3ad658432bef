//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Encoded form is `pbkdf2_sha256$<iterations>$<salt_b64>$<hash_b64>`, the
//! same layout the imported user fixtures carry. [`verify_password`] honors
//! the iteration count stored in the record, so hashes created under older
//! cost settings keep verifying after the default changes.

use super::SecurityError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

const ALGORITHM: &str = "pbkdf2_sha256";
const ITERATIONS: u32 = 390_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Hashes `plain` with a fresh random salt at the current cost setting.
///
/// # Errors
/// Returns [`SecurityError::Internal`] if the OS random source fails.
pub fn hash_password(plain: &str) -> Result<String, SecurityError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::fill(&mut salt).map_err(|e| SecurityError::Internal {
        message: e.to_string().into(),
        context: Some("Failed to generate salt".into()),
    })?;

    let digest = derive(plain.as_bytes(), &salt, ITERATIONS);

    Ok(format!(
        "{ALGORITHM}${ITERATIONS}${}${}",
        BASE64.encode(salt),
        BASE64.encode(digest)
    ))
}

/// Checks `plain` against an encoded hash.
///
/// Returns `Ok(false)` for a well-formed hash that does not match.
///
/// # Errors
/// Returns [`SecurityError::Hash`] if `encoded` is not a well-formed
/// `pbkdf2_sha256` record.
pub fn verify_password(plain: &str, encoded: &str) -> Result<bool, SecurityError> {
    let mut parts = encoded.split('$');
    let (algorithm, iterations, salt, hash) =
        match (parts.next(), parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(algorithm), Some(iterations), Some(salt), Some(hash), None) => {
                (algorithm, iterations, salt, hash)
            },
            _ => {
                return Err(SecurityError::Hash {
                    message: "Expected 4 dollar-separated fields".into(),
                    context: None,
                });
            },
        };

    if algorithm != ALGORITHM {
        return Err(SecurityError::Hash {
            message: format!("Unsupported algorithm: {algorithm}").into(),
            context: None,
        });
    }

    let iterations: u32 = iterations.parse().map_err(|_| SecurityError::Hash {
        message: format!("Invalid iteration count: {iterations}").into(),
        context: None,
    })?;
    if iterations == 0 {
        return Err(SecurityError::Hash {
            message: "Iteration count must be positive".into(),
            context: None,
        });
    }

    let salt = BASE64.decode(salt).map_err(|e| SecurityError::Hash {
        message: e.to_string().into(),
        context: Some("Invalid salt encoding".into()),
    })?;
    let expected = BASE64.decode(hash).map_err(|e| SecurityError::Hash {
        message: e.to_string().into(),
        context: Some("Invalid hash encoding".into()),
    })?;

    let digest = derive(plain.as_bytes(), &salt, iterations);
    Ok(slow_eq(&digest, &expected))
}

fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
    out
}

// Bitwise fold over the full length; no early exit on mismatch.
fn slow_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_layout_is_stable() {
        let encoded = hash_password("secret123").unwrap();
        let parts: Vec<&str> = encoded.split('$').collect();

        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2_sha256");
        assert_eq!(parts[1], "390000");
        assert_eq!(BASE64.decode(parts[2]).unwrap().len(), SALT_LEN);
        assert_eq!(BASE64.decode(parts[3]).unwrap().len(), HASH_LEN);
    }

    #[test]
    fn verify_accepts_other_iteration_counts() {
        let salt = [7u8; SALT_LEN];
        let digest = derive(b"legacy-pass", &salt, 1_000);
        let encoded = format!(
            "pbkdf2_sha256$1000${}${}",
            BASE64.encode(salt),
            BASE64.encode(digest)
        );

        assert!(verify_password("legacy-pass", &encoded).unwrap());
        assert!(!verify_password("wrong", &encoded).unwrap());
    }

    #[test]
    fn malformed_records_are_errors_not_mismatches() {
        assert!(matches!(
            verify_password("x", "not-a-hash").unwrap_err(),
            SecurityError::Hash { .. }
        ));
        assert!(matches!(
            verify_password("x", "md5$1$YQ==$YQ==").unwrap_err(),
            SecurityError::Hash { .. }
        ));
        assert!(matches!(
            verify_password("x", "pbkdf2_sha256$zero$YQ==$YQ==").unwrap_err(),
            SecurityError::Hash { .. }
        ));
    }
}
