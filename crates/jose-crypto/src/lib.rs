//! Cryptographic primitives for JOSE envelopes.
//!
//! This crate provides pure-Rust implementations of:
//! - base64url (RFC 4648 §5, unpadded)
//! - AES-256-GCM content encryption with a detached tag
//! - AES-KW key wrapping (RFC 3394)
//! - ECDH-ES key agreement on P-256 with Concat KDF (RFC 7518 §4.6)
//! - Canonical JSON for deterministic protected headers
//!
//! Envelope assembly and recipient handling live in `dag-jose`.

pub mod aes_gcm;
pub mod aes_kw;
pub mod base64url;
pub mod canonical;
pub mod ecdh;
pub mod error;
pub mod types;

pub use aes_gcm::{generate_cek, generate_iv, open, seal, SealedContent};
pub use aes_kw::{unwrap_key, wrap_key};
pub use base64url::{base64url_decode, base64url_encode};
pub use canonical::canonical_json;
pub use ecdh::{
    concat_kdf, ecdh_es_recipient_kek, ecdh_es_sender_kek, export_p256_private_jwk,
    export_p256_public_jwk, generate_p256_secret, import_p256_private_jwk, import_p256_public_jwk,
    SenderAgreement,
};
pub use error::CryptoError;
pub use p256::{PublicKey as P256PublicKey, SecretKey as P256SecretKey};
pub use types::{AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH, AES_KW_OVERHEAD};
