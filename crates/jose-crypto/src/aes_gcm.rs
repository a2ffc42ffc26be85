//! AES-256-GCM content encryption with a detached tag.
//!
//! JWE carries the IV, ciphertext and authentication tag as separate
//! fields, so `seal` splits the `aes-gcm` output and `open` re-joins it.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::types::{AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH};

/// Output of [`seal`]: the three byte fields of a JWE content encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedContent {
    pub iv: [u8; AES_GCM_IV_LENGTH],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; AES_GCM_TAG_LENGTH],
}

/// Generate a random 12-byte IV for AES-GCM.
pub fn generate_iv() -> Result<[u8; AES_GCM_IV_LENGTH], CryptoError> {
    let mut iv = [0u8; AES_GCM_IV_LENGTH];
    getrandom::getrandom(&mut iv).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(iv)
}

/// Generate a random 256-bit content encryption key.
pub fn generate_cek() -> Result<Zeroizing<[u8; AES_KEY_LENGTH]>, CryptoError> {
    let mut cek = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    getrandom::getrandom(cek.as_mut()).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(cek)
}

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    if key.len() != AES_KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength {
            expected: AES_KEY_LENGTH,
            got: key.len(),
        });
    }
    Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
///
/// # Arguments
/// * `key` - 32-byte content encryption key
/// * `plaintext` - Bytes to encrypt
/// * `aad` - Additional authenticated data (for JWE, the ASCII protected header)
pub fn seal(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<SealedContent, CryptoError> {
    let cipher = cipher_for(key)?;
    let iv = generate_iv()?;
    let nonce = Nonce::from_slice(&iv);

    let mut ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    // aes-gcm appends the tag to the ciphertext
    let tag_offset = ciphertext.len() - AES_GCM_TAG_LENGTH;
    let mut tag = [0u8; AES_GCM_TAG_LENGTH];
    tag.copy_from_slice(&ciphertext[tag_offset..]);
    ciphertext.truncate(tag_offset);

    Ok(SealedContent {
        iv,
        ciphertext,
        tag,
    })
}

/// Decrypt and authenticate a detached-tag AES-256-GCM ciphertext.
pub fn open(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if iv.len() != AES_GCM_IV_LENGTH {
        return Err(CryptoError::InvalidIvLength {
            expected: AES_GCM_IV_LENGTH,
            got: iv.len(),
        });
    }
    if tag.len() != AES_GCM_TAG_LENGTH {
        return Err(CryptoError::InvalidTagLength {
            expected: AES_GCM_TAG_LENGTH,
            got: tag.len(),
        });
    }
    let cipher = cipher_for(key)?;
    let nonce = Nonce::from_slice(iv);

    let mut ct_with_tag = Vec::with_capacity(ciphertext.len() + tag.len());
    ct_with_tag.extend_from_slice(ciphertext);
    ct_with_tag.extend_from_slice(tag);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: &ct_with_tag,
                aad,
            },
        )
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        getrandom::getrandom(&mut key).unwrap();
        key
    }

    #[test]
    fn seal_open_round_trip() {
        let key = random_key();
        let sealed = seal(&key, b"Hello, World!", b"header").unwrap();
        let opened = open(&key, &sealed.iv, &sealed.ciphertext, &sealed.tag, b"header").unwrap();
        assert_eq!(opened, b"Hello, World!");
    }

    #[test]
    fn ciphertext_matches_plaintext_length() {
        let key = random_key();
        let sealed = seal(&key, &[7u8; 45], b"").unwrap();
        assert_eq!(sealed.ciphertext.len(), 45);
    }

    #[test]
    fn different_iv_each_time() {
        let key = random_key();
        let a = seal(&key, b"test", b"").unwrap();
        let b = seal(&key, b"test", b"").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn rejects_wrong_aad() {
        let key = random_key();
        let sealed = seal(&key, b"secret", b"aad-1").unwrap();
        assert!(open(&key, &sealed.iv, &sealed.ciphertext, &sealed.tag, b"aad-2").is_err());
    }

    #[test]
    fn rejects_tampered_tag() {
        let key = random_key();
        let mut sealed = seal(&key, b"secret", b"").unwrap();
        sealed.tag[0] ^= 0xff;
        assert!(open(&key, &sealed.iv, &sealed.ciphertext, &sealed.tag, b"").is_err());
    }

    #[test]
    fn rejects_wrong_key() {
        let sealed = seal(&random_key(), b"secret", b"").unwrap();
        let err = open(&random_key(), &sealed.iv, &sealed.ciphertext, &sealed.tag, b"").unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed(_)));
    }

    #[test]
    fn rejects_bad_lengths() {
        let key = random_key();
        assert!(matches!(
            seal(&key[..16], b"x", b""),
            Err(CryptoError::InvalidKeyLength { expected: 32, got: 16 })
        ));
        assert!(matches!(
            open(&key, &[0u8; 8], b"", &[0u8; 16], b""),
            Err(CryptoError::InvalidIvLength { expected: 12, got: 8 })
        ));
        assert!(matches!(
            open(&key, &[0u8; 12], b"", &[0u8; 4], b""),
            Err(CryptoError::InvalidTagLength { expected: 16, got: 4 })
        ));
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = random_key();
        let sealed = seal(&key, b"", b"").unwrap();
        assert!(sealed.ciphertext.is_empty());
        let opened = open(&key, &sealed.iv, &sealed.ciphertext, &sealed.tag, b"").unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn generated_ceks_differ() {
        let a = generate_cek().unwrap();
        let b = generate_cek().unwrap();
        assert_ne!(*a, *b);
    }
}
