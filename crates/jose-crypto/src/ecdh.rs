//! ECDH-ES key agreement on P-256 (RFC 7518 §4.6).
//!
//! The sender generates an ephemeral key pair per recipient, agrees a shared
//! secret with the recipient's static key, and runs the Concat KDF over it to
//! obtain the 256-bit KEK that wraps the content encryption key.

use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{EncodedPoint, PublicKey, SecretKey};
use serde_json::Value;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::base64url::{base64url_decode, base64url_encode};
use crate::error::CryptoError;
use crate::types::{AES_KEY_LENGTH, P256_COORDINATE_LENGTH};

/// Result of the sender side of an ECDH-ES agreement.
pub struct SenderAgreement {
    /// Derived key encryption key.
    pub kek: Zeroizing<[u8; AES_KEY_LENGTH]>,
    /// Ephemeral public key, as a JWK, to place in the recipient header (`epk`).
    pub epk: Value,
}

/// Concat KDF (NIST SP 800-56A, single-pass for <=256 bits).
///
/// For ECDH-ES+A256KW:
///   SHA-256(00000001 || Z || algID || partyUInfo || partyVInfo || suppPubInfo)
///
/// Where:
///   algID = [len(alg):4 BE][alg bytes]
///   partyUInfo = [0:4 BE] (empty)
///   partyVInfo = [0:4 BE] (empty)
///   suppPubInfo = [keydatalen:4 BE]
pub fn concat_kdf(z: &[u8], alg: &str, key_data_len_bits: u32) -> Zeroizing<[u8; AES_KEY_LENGTH]> {
    let mut hasher = Sha256::new();

    // Round counter (always 1 for <= 256 bits)
    hasher.update(1u32.to_be_bytes());
    hasher.update(z);

    hasher.update((alg.len() as u32).to_be_bytes());
    hasher.update(alg.as_bytes());

    // PartyUInfo and PartyVInfo: empty
    hasher.update(0u32.to_be_bytes());
    hasher.update(0u32.to_be_bytes());

    hasher.update(key_data_len_bits.to_be_bytes());

    let mut digest = hasher.finalize();
    let mut kek = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    kek.copy_from_slice(&digest);
    digest.as_mut_slice().zeroize();
    kek
}

/// Sender side: agree a KEK with `recipient` using a fresh ephemeral key.
///
/// `alg` is the JWE `alg` value fed into the Concat KDF algorithm ID.
pub fn ecdh_es_sender_kek(recipient: &PublicKey, alg: &str) -> Result<SenderAgreement, CryptoError> {
    let ephemeral_secret = EphemeralSecret::random(&mut p256::elliptic_curve::rand_core::OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral_secret);

    let shared_secret = ephemeral_secret.diffie_hellman(recipient);
    let kek = concat_kdf(
        shared_secret.raw_secret_bytes().as_slice(),
        alg,
        (AES_KEY_LENGTH * 8) as u32,
    );

    Ok(SenderAgreement {
        kek,
        epk: export_p256_public_jwk(&ephemeral_public)?,
    })
}

/// Recipient side: recompute the KEK from the sender's ephemeral public key.
pub fn ecdh_es_recipient_kek(
    secret: &SecretKey,
    epk: &PublicKey,
    alg: &str,
) -> Zeroizing<[u8; AES_KEY_LENGTH]> {
    let shared_secret = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), epk.as_affine());
    concat_kdf(
        shared_secret.raw_secret_bytes().as_slice(),
        alg,
        (AES_KEY_LENGTH * 8) as u32,
    )
}

fn jwk_coordinate(jwk: &Value, field: &'static str) -> Result<Vec<u8>, CryptoError> {
    let b64 = jwk
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or(CryptoError::MissingJwkField(field))?;
    let bytes =
        base64url_decode(b64).map_err(|e| CryptoError::InvalidJwk(format!("{}: {}", field, e)))?;
    if bytes.len() > P256_COORDINATE_LENGTH {
        return Err(CryptoError::InvalidJwk(format!(
            "{}: {} bytes exceeds P-256 coordinate length",
            field,
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Import a P-256 public key from a JWK JSON value.
pub fn import_p256_public_jwk(jwk: &Value) -> Result<PublicKey, CryptoError> {
    if let Some(crv) = jwk.get("crv").and_then(|v| v.as_str()) {
        if crv != "P-256" {
            return Err(CryptoError::InvalidJwk(format!("unsupported curve {}", crv)));
        }
    }
    let x_bytes = jwk_coordinate(jwk, "x")?;
    let y_bytes = jwk_coordinate(jwk, "y")?;

    // Build uncompressed SEC1 point: 0x04 || x(32) || y(32)
    // Left-pad coordinates to 32 bytes; JWKs may omit leading zeros.
    let mut uncompressed = Vec::with_capacity(1 + 2 * P256_COORDINATE_LENGTH);
    uncompressed.push(0x04);
    uncompressed.extend(std::iter::repeat_n(0u8, P256_COORDINATE_LENGTH - x_bytes.len()));
    uncompressed.extend_from_slice(&x_bytes);
    uncompressed.extend(std::iter::repeat_n(0u8, P256_COORDINATE_LENGTH - y_bytes.len()));
    uncompressed.extend_from_slice(&y_bytes);

    let point = EncodedPoint::from_bytes(&uncompressed)
        .map_err(|e| CryptoError::InvalidJwk(format!("invalid EC point: {}", e)))?;

    PublicKey::from_encoded_point(&point)
        .into_option()
        .ok_or_else(|| CryptoError::InvalidJwk("EC point not on P-256 curve".to_string()))
}

/// Import a P-256 private key from a JWK JSON value (the `d` member).
pub fn import_p256_private_jwk(jwk: &Value) -> Result<SecretKey, CryptoError> {
    let d_b64 = jwk
        .get("d")
        .and_then(|v| v.as_str())
        .ok_or(CryptoError::MissingJwkField("d"))?;
    let mut d_bytes =
        base64url_decode(d_b64).map_err(|e| CryptoError::InvalidJwk(format!("d: {}", e)))?;
    let secret = SecretKey::from_slice(&d_bytes)
        .map_err(|e| CryptoError::InvalidJwk(format!("invalid private key scalar: {}", e)));
    d_bytes.zeroize();
    secret
}

/// Export a P-256 public key as a JWK JSON value.
pub fn export_p256_public_jwk(key: &PublicKey) -> Result<Value, CryptoError> {
    let point = key.to_encoded_point(false);
    let (Some(x), Some(y)) = (point.x(), point.y()) else {
        return Err(CryptoError::InvalidJwk(
            "public key has no affine coordinates".to_string(),
        ));
    };

    Ok(serde_json::json!({
        "kty": "EC",
        "crv": "P-256",
        "x": base64url_encode(x.as_slice()),
        "y": base64url_encode(y.as_slice())
    }))
}

/// Export a P-256 secret key as a private JWK JSON value.
pub fn export_p256_private_jwk(key: &SecretKey) -> Result<Value, CryptoError> {
    let mut jwk = export_p256_public_jwk(&key.public_key())?;
    let scalar_bytes = Zeroizing::new(key.to_bytes().to_vec());
    jwk["d"] = Value::String(base64url_encode(&scalar_bytes));
    Ok(jwk)
}

/// Generate a new random P-256 secret key.
pub fn generate_p256_secret() -> SecretKey {
    SecretKey::random(&mut p256::elliptic_curve::rand_core::OsRng)
}
