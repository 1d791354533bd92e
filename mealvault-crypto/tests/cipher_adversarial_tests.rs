//! Adversarial tests for the field cipher and key store.
//!
//! Tests wrong-key decryption, token tampering, truncation, and key-file
//! lifecycle. These validate the guarantees the stores and the audit log rely
//! on: a token either decrypts to the original plaintext or fails loudly.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mealvault_crypto::{CryptoError, FieldCipher, KeyFile, MasterKey, NONCE_SIZE, TAG_SIZE};

// ── Wrong Key ──

#[test]
fn decrypt_with_wrong_key_fails() {
    let cipher_a = FieldCipher::new(&MasterKey::generate());
    let cipher_b = FieldCipher::new(&MasterKey::generate());

    let token = cipher_a.encrypt_field("sensitive member data").unwrap();
    let err = cipher_b.decrypt_field(&token).unwrap_err();

    match err {
        CryptoError::Decryption(msg) => {
            assert!(
                msg.contains("wrong key") || msg.contains("tampered"),
                "should indicate wrong key, got: {msg}"
            );
        }
        other => panic!("expected CryptoError::Decryption, got: {other:?}"),
    }
}

// ── Token Tampering ──

#[test]
fn every_byte_position_tampering_detected() {
    let cipher = FieldCipher::new(&MasterKey::generate());
    let token = cipher.encrypt_field("integrity-protected field").unwrap();
    let blob = STANDARD.decode(&token).unwrap();

    for i in 0..blob.len() {
        let mut tampered = blob.clone();
        tampered[i] ^= 0xFF;
        let retoken = STANDARD.encode(&tampered);
        assert!(
            cipher.decrypt_field(&retoken).is_err(),
            "tampering at byte {i} should be detected"
        );
    }
}

#[test]
fn appended_bytes_detected() {
    let cipher = FieldCipher::new(&MasterKey::generate());
    let token = cipher.encrypt_field("original").unwrap();
    let mut blob = STANDARD.decode(&token).unwrap();
    blob.push(0xFF);
    assert!(cipher.decrypt_field(&STANDARD.encode(&blob)).is_err());
}

#[test]
fn garbage_token_is_rejected_not_panicked() {
    let cipher = FieldCipher::new(&MasterKey::generate());
    assert!(cipher.decrypt_field("not base64 at all!!!").is_err());
    assert!(cipher.decrypt_field("").is_err());
    // Valid base64, but shorter than nonce + tag
    assert!(cipher.decrypt_field(&STANDARD.encode(b"tiny")).is_err());
}

// ── Truncation ──

#[test]
fn truncated_blob_fails() {
    let cipher = FieldCipher::new(&MasterKey::generate());
    let blob = cipher.seal_bytes(b"data that will be truncated").unwrap();
    assert!(cipher.open_bytes(&blob[..NONCE_SIZE + TAG_SIZE - 1]).is_err());
    assert!(cipher.open_bytes(&blob[..blob.len() - 1]).is_err());
}

// ── Boundary Conditions ──

#[test]
fn empty_plaintext_round_trips() {
    let cipher = FieldCipher::new(&MasterKey::generate());
    let token = cipher.encrypt_field("").unwrap();
    assert_eq!(cipher.decrypt_field(&token).unwrap(), "");
}

#[test]
fn unicode_round_trips() {
    let cipher = FieldCipher::new(&MasterKey::generate());
    let name = "Çiğdem Łukasińska 慕容";
    let token = cipher.encrypt_field(name).unwrap();
    assert_eq!(cipher.decrypt_field(&token).unwrap(), name);
}

#[test]
fn large_blob_round_trips() {
    let cipher = FieldCipher::new(&MasterKey::generate());
    let large = vec![0xAB; 1024 * 1024];
    let blob = cipher.seal_bytes(&large).unwrap();
    assert_eq!(cipher.open_bytes(&blob).unwrap(), large);
}

#[test]
fn blob_layout_is_nonce_then_ciphertext() {
    let cipher = FieldCipher::new(&MasterKey::generate());
    let blob = cipher.seal_bytes(b"x").unwrap();
    assert_eq!(blob.len(), NONCE_SIZE + 1 + TAG_SIZE);
}

// ── Key File Lifecycle ──

#[test]
fn ensure_generates_once_then_noops() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = KeyFile::new(dir.path().join("secret.key"));

    assert!(key_file.ensure().unwrap());
    let first = key_file.load().unwrap().as_bytes().to_vec();

    assert!(!key_file.ensure().unwrap());
    let second = key_file.load().unwrap().as_bytes().to_vec();
    assert_eq!(first, second);
}

#[test]
fn load_without_ensure_is_key_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = KeyFile::new(dir.path().join("missing.key"));
    match key_file.load() {
        Err(CryptoError::KeyNotFound(path)) => assert!(path.ends_with("missing.key")),
        other => panic!("expected KeyNotFound, got: {other:?}"),
    }
}

#[test]
fn truncated_key_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.key");
    std::fs::write(&path, STANDARD.encode([0u8; 7])).unwrap();
    match KeyFile::new(&path).load() {
        Err(CryptoError::InvalidKeyLength { expected: 32, actual: 7 }) => {}
        other => panic!("expected InvalidKeyLength, got: {other:?}"),
    }
}

#[test]
fn same_key_file_yields_interoperable_ciphers() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = KeyFile::new(dir.path().join("secret.key"));
    key_file.ensure().unwrap();

    let writer = FieldCipher::new(&key_file.load().unwrap());
    let reader = FieldCipher::new(&key_file.load().unwrap());

    let token = writer.encrypt_field("shared state").unwrap();
    assert_eq!(reader.decrypt_field(&token).unwrap(), "shared state");
}

// ── Properties ──

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn any_string_round_trips(s in ".*") {
            let cipher = FieldCipher::new(&MasterKey::generate());
            let token = cipher.encrypt_field(&s).unwrap();
            prop_assert_eq!(cipher.decrypt_field(&token).unwrap(), s);
        }

        #[test]
        fn any_bytes_seal_and_open(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let cipher = FieldCipher::new(&MasterKey::generate());
            let blob = cipher.seal_bytes(&data).unwrap();
            prop_assert_eq!(cipher.open_bytes(&blob).unwrap(), data);
        }
    }
}
