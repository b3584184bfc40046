// Integration tests for the crypto module: key/plaintext validation, round
// trips over varied payloads, IV uniqueness, and wrong-key behavior.

use std::collections::HashSet;

use deltaseal::crypto::{self, CryptoError, EncryptedPayload, SecretKey, ValidationError};

const KEY: &str = "12345678901234567890123456789012";
const OTHER_KEY: &str = "abcdefghijklmnopqrstuvwxyzABCDEF";

const KEY_MSG: &str = "Secret key must be exactly 32 characters";

#[test]
fn bad_key_lengths_rejected() {
    let payload = crypto::encrypt(b"x", KEY).unwrap();
    for key in ["12345", "", "123456789012345678901234567890123"] {
        let err = crypto::encrypt(b"plaintext", key).unwrap_err();
        assert_eq!(err.to_string(), KEY_MSG);
        let err = crypto::decrypt(&payload, key).unwrap_err();
        assert_eq!(err.to_string(), KEY_MSG);
    }
}

#[test]
fn absent_key_rejected() {
    let err = SecretKey::from_optional(None).unwrap_err();
    assert_eq!(err, ValidationError::KeyLength);
    assert_eq!(err.to_string(), KEY_MSG);
}

#[test]
fn empty_plaintext_rejected() {
    let empty_text = "";
    let empty_buf: Vec<u8> = Vec::new();
    for plaintext in [empty_text.as_bytes(), empty_buf.as_slice()] {
        let err = crypto::encrypt(plaintext, KEY).unwrap_err();
        assert_eq!(err, CryptoError::Validation(ValidationError::EmptyPlaintext));
        assert_eq!(err.to_string(), "Text to encrypt cannot be empty");
    }
}

#[test]
fn missing_envelope_fields_rejected() {
    for raw in [&br#"{"iv":"00112233445566778899aabbccddeeff"}"#[..], br#"{"content":"ab"}"#] {
        let err = EncryptedPayload::from_json(raw).unwrap_err();
        assert_eq!(err.to_string(), "Invalid encrypted data structure");
    }

    let empty = EncryptedPayload {
        iv: String::new(),
        content: "00".into(),
    };
    let err = crypto::decrypt(&empty, KEY).unwrap_err();
    assert_eq!(err.to_string(), "Invalid encrypted data structure");
}

#[test]
fn roundtrip_ascii_unicode_and_large() {
    let large: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    let cases: Vec<Vec<u8>> = vec![
        b"Hello, World!".to_vec(),
        "Merenkulku ⚓ 海洋 навигация 🚢".as_bytes().to_vec(),
        large,
    ];
    for plaintext in cases {
        let payload = crypto::encrypt(&plaintext, KEY).unwrap();
        assert_eq!(crypto::decrypt(&payload, KEY).unwrap(), plaintext);
    }
}

#[test]
fn iv_and_content_unique_per_call() {
    let mut ivs = HashSet::new();
    let mut contents = HashSet::new();
    for _ in 0..10 {
        let payload = crypto::encrypt(b"identical plaintext", KEY).unwrap();
        assert_eq!(payload.iv.len(), 32);
        ivs.insert(payload.iv);
        contents.insert(payload.content);
    }
    assert_eq!(ivs.len(), 10);
    assert_eq!(contents.len(), 10);
}

#[test]
fn wrong_key_never_yields_plaintext() {
    let plaintext = b"position: 60.123N 24.987E".to_vec();
    for _ in 0..20 {
        let payload = crypto::encrypt(&plaintext, KEY).unwrap();
        match crypto::decrypt(&payload, OTHER_KEY) {
            Err(err) => assert!(matches!(err, CryptoError::Decrypt(_))),
            Ok(garbage) => assert_ne!(garbage, plaintext),
        }
    }
}
