use thiserror::Error;

#[derive(Debug, Error)]
pub enum DagJoseError {
    #[error("Invalid base64url encoding: {0}")]
    InvalidEncoding(String),

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Malformed compact form: {0}")]
    MalformedCompactForm(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("JWE decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("JWE encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("CBOR encode error: {0}")]
    CborEncode(String),

    #[error("CBOR decode error: {0}")]
    CborDecode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] jose_crypto::CryptoError),
}

pub type Result<T> = std::result::Result<T, DagJoseError>;
