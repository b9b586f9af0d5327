// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
/** Secure token generation and signing for session cookies
This module provides cryptographically secure token generation
and HMAC-SHA256 signing so a client cannot forge a session id. */
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default token size in bytes (32 bytes = 256 bits of entropy)
const DEFAULT_TOKEN_BYTES: usize = 32;

/// Separator between the token and its signature
const SIGNATURE_SEPARATOR: char = '.';

/** Generate a cryptographically secure random token
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_secure_token() -> String {
    generate_secure_token_with_size(DEFAULT_TOKEN_BYTES)
}

/** Generate a cryptographically secure random token with specified size
# Arguments
* `bytes` - The size of the random token in bytes
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/// Signs tokens as `token.signature` and checks signatures in constant time
#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        Self { key: secret.as_bytes().to_vec() }
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length
        HmacSha256::new_from_slice(&self.key).unwrap_or_else(|_| unreachable!())
    }

    /// Append the base64url HMAC-SHA256 of `token`
    pub fn sign(&self, token: &str) -> String {
        let mut mac = self.mac();
        mac.update(token.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{token}{SIGNATURE_SEPARATOR}{signature}")
    }

    /// Return the raw token if the signature matches
    pub fn verify<'a>(&self, signed: &'a str) -> Option<&'a str> {
        let (token, signature) = signed.rsplit_once(SIGNATURE_SEPARATOR)?;
        if token.is_empty() {
            return None;
        }
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(token.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation() {
        // Generate two tokens and verify they're different
        let token1 = generate_secure_token();
        let token2 = generate_secure_token();

        assert_ne!(token1, token2);

        // 32 bytes of entropy encoded in base64 is 43 chars
        assert_eq!(token1.len(), 43);

        let small_token = generate_secure_token_with_size(16);
        let large_token = generate_secure_token_with_size(64);

        assert!(small_token.len() < token1.len());
        assert!(large_token.len() > token1.len());
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = TokenSigner::new("a-test-secret-of-decent-length");
        let token = generate_secure_token();
        let signed = signer.sign(&token);

        assert!(signed.starts_with(&token));
        assert_eq!(signer.verify(&signed), Some(token.as_str()));
    }

    #[test]
    fn test_rejects_tampering() {
        let signer = TokenSigner::new("a-test-secret-of-decent-length");
        let signed = signer.sign("abc");

        // unsigned, swapped token, truncated signature, garbage
        assert_eq!(signer.verify("abc"), None);
        assert_eq!(signer.verify(&signed.replacen("abc", "abd", 1)), None);
        assert_eq!(signer.verify(&signed[..signed.len() - 2]), None);
        assert_eq!(signer.verify("abc.!!!"), None);
        assert_eq!(signer.verify(".signature"), None);
    }

    #[test]
    fn test_other_secret_rejected() {
        let signed = TokenSigner::new("first-secret-value").sign("abc");
        let other = TokenSigner::new("second-secret-value");
        assert_eq!(other.verify(&signed), None);
    }
}
