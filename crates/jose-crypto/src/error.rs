use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Invalid IV length: expected {expected} bytes, got {got}")]
    InvalidIvLength { expected: usize, got: usize },

    #[error("Invalid tag length: expected {expected} bytes, got {got}")]
    InvalidTagLength { expected: usize, got: usize },

    #[error("Base64url decode error: {0}")]
    Base64Decode(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("AES-KW wrap failed: {0}")]
    WrapFailed(String),

    #[error("AES-KW unwrap failed: {0}")]
    UnwrapFailed(String),

    #[error("JWK missing {0}")]
    MissingJwkField(&'static str),

    #[error("Invalid JWK: {0}")]
    InvalidJwk(String),

    #[error("canonicalJSON: non-finite number is not representable in JSON")]
    NonFiniteNumber,

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}
