//! Credential crypto engine tests
//!
//! Covers key derivation determinism and sensitivity, constant-time
//! comparison, and the random material used for salts and API keys.

use cormorant::crypto::{
    KdfConfig, SALT_LENGTH, constant_time_eq, derive_key, random_bytes, secure_token,
};

use super::helpers::*;

// ===== KEY DERIVATION TESTS =====

#[test]
fn test_derive_key_round_trip_determinism() {
    let config = test_kdf();
    let salt = random_bytes(SALT_LENGTH).expect("Failed to generate salt");

    let key1 = derive_key("correct-horse", &salt, &config).expect("Failed to derive key");
    let key2 = derive_key("correct-horse", &salt, &config).expect("Failed to derive key");

    assert_eq!(key1, key2, "Identical inputs must derive identical keys");
}

#[test]
fn test_derive_key_output_length_fixed_by_config() {
    let config = KdfConfig {
        output_length: 48,
        ..test_kdf()
    };
    let key = derive_key("pw", [1u8; SALT_LENGTH], &config).expect("Failed to derive key");
    assert_eq!(key.len(), 48);
}

#[test]
fn test_derived_key_is_not_the_plaintext() {
    let config = test_kdf();
    let password = "correct-horse";
    let key = derive_key(password, [1u8; SALT_LENGTH], &config).expect("Failed to derive key");
    assert_ne!(key.as_slice(), password.as_bytes());
}

#[test]
fn test_derive_key_differs_across_salts() {
    let config = test_kdf();
    let salt1 = random_bytes(SALT_LENGTH).unwrap();
    let salt2 = random_bytes(SALT_LENGTH).unwrap();
    assert_ne!(salt1, salt2, "CSPRNG produced identical salts");

    let key1 = derive_key("pw", &salt1, &config).unwrap();
    let key2 = derive_key("pw", &salt2, &config).unwrap();
    assert_ne!(key1, key2);
}

#[test]
fn test_derive_key_differs_across_configs() {
    let salt = [1u8; SALT_LENGTH];
    let key1 = derive_key("pw", salt, &test_kdf()).unwrap();
    let key2 = derive_key(
        "pw",
        salt,
        &KdfConfig {
            memory_kib: 16,
            ..test_kdf()
        },
    )
    .unwrap();
    assert_ne!(key1, key2);
}

// ===== COMPARISON TESTS =====

#[test]
fn test_constant_time_eq_full_width() {
    let a = vec![0x42u8; 64];
    let mut b = a.clone();
    assert!(constant_time_eq(&a, &b));

    // Mismatch at the first byte and at the last byte both report unequal
    b[0] ^= 1;
    assert!(!constant_time_eq(&a, &b));
    b[0] ^= 1;
    b[63] ^= 1;
    assert!(!constant_time_eq(&a, &b));
}

#[test]
fn test_constant_time_eq_length_mismatch() {
    assert!(!constant_time_eq(&[1, 2, 3], &[1, 2, 3, 4]));
}

// ===== RANDOM MATERIAL TESTS =====

#[test]
fn test_random_bytes_requested_length() {
    for len in [0, 1, 64, 1024] {
        assert_eq!(random_bytes(len).unwrap().len(), len);
    }
}

#[test]
fn test_secure_token_printable_entropy() {
    let token = secure_token(40).expect("Failed to generate token");
    assert_eq!(token.len(), 40);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn test_secure_tokens_do_not_repeat() {
    let mut tokens: Vec<String> = (0..32)
        .map(|_| secure_token(40).expect("Failed to generate token"))
        .collect();
    tokens.sort();
    tokens.dedup();
    assert_eq!(tokens.len(), 32, "Generated tokens must be unique");
}
