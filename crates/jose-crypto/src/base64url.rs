use base64ct::{Base64UrlUnpadded, Encoding};

use crate::error::CryptoError;

/// Base64url encode bytes without padding.
pub fn base64url_encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

/// Base64url decode an unpadded string to bytes.
///
/// Rejects the standard alphabet (`+`, `/`), `=` padding, and lengths that
/// cannot come from [`base64url_encode`].
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    Base64UrlUnpadded::decode_vec(s).map_err(|e| CryptoError::Base64Decode(e.to_string()))
}
