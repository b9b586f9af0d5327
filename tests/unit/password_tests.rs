// ============================
// tests/unit/password_tests.rs
// ============================
use gymdesk_backend::auth::{validate_password_strength, PasswordRequirements};

use crate::test_utils::fast_hasher;

#[test]
fn test_password_hashing_and_verification() {
    let hasher = fast_hasher();
    let hash = hasher.hash("SecureP@ssw0rd").unwrap();

    assert_ne!(hash, "SecureP@ssw0rd");
    assert!(hash.starts_with("$scrypt$"));
    assert!(hasher.verify(&hash, "SecureP@ssw0rd"));
    assert!(!hasher.verify(&hash, "SecureP@ssw0rD"));
}

#[test]
fn test_same_password_hashes_differently() {
    let hasher = fast_hasher();
    let first = hasher.hash("password123").unwrap();
    let second = hasher.hash("password123").unwrap();

    assert_ne!(first, second);
    assert!(hasher.verify(&first, "password123"));
    assert!(hasher.verify(&second, "password123"));
}

#[test]
fn test_password_strength_validation() {
    let requirements = PasswordRequirements::default();

    assert!(validate_password_strength("SecureP@ssw0rd", &requirements));
    // too short
    assert!(!validate_password_strength("Sh0rt!", &requirements));
    // missing uppercase
    assert!(!validate_password_strength("securep@ssw0rd", &requirements));
    // missing digit
    assert!(!validate_password_strength("SecureP@ssword", &requirements));
    // missing special character
    assert!(!validate_password_strength("SecurePassw0rd", &requirements));

    let relaxed = PasswordRequirements {
        min_length: 8,
        require_uppercase: false,
        require_lowercase: true,
        require_digit: true,
        require_special: false,
    };
    assert!(validate_password_strength("securepassw0rd", &relaxed));
}
