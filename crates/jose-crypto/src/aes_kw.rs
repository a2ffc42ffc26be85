//! AES-256 Key Wrap (RFC 3394) for per-recipient content encryption keys.

use aes_kw::Kek;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::types::{AES_KEY_LENGTH, AES_KW_OVERHEAD};

/// Smallest wrapped key AES-KW accepts: a 16-byte key plus the integrity block.
const MIN_WRAPPED_LENGTH: usize = 16 + AES_KW_OVERHEAD;

fn kek_array(kek: &[u8]) -> Result<[u8; AES_KEY_LENGTH], CryptoError> {
    kek.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: AES_KEY_LENGTH,
        got: kek.len(),
    })
}

/// Wrap `key` with a 32-byte KEK.
///
/// The output is `key.len() + 8` bytes. `key` must be at least 16 bytes and
/// a multiple of 8.
pub fn wrap_key(kek: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let kek = Kek::from(kek_array(kek)?);
    let mut wrapped = vec![0u8; key.len() + AES_KW_OVERHEAD];
    kek.wrap(key, &mut wrapped)
        .map_err(|e| CryptoError::WrapFailed(format!("{:?}", e)))?;
    Ok(wrapped)
}

/// Unwrap a key previously produced by [`wrap_key`].
pub fn unwrap_key(kek: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if wrapped.len() < MIN_WRAPPED_LENGTH || wrapped.len() % AES_KW_OVERHEAD != 0 {
        return Err(CryptoError::UnwrapFailed(format!(
            "wrapped key has invalid length {}",
            wrapped.len()
        )));
    }
    let kek = Kek::from(kek_array(kek)?);
    let mut key = Zeroizing::new(vec![0u8; wrapped.len() - AES_KW_OVERHEAD]);
    kek.unwrap(wrapped, key.as_mut_slice())
        .map_err(|e| CryptoError::UnwrapFailed(format!("{:?}", e)))?;
    Ok(key)
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
    fn wrap_unwrap_round_trip() {
        let kek = random_key();
        let cek = random_key();
        let wrapped = wrap_key(&kek, &cek).unwrap();
        assert_eq!(wrapped.len(), 40);
        let unwrapped = unwrap_key(&kek, &wrapped).unwrap();
        assert_eq!(unwrapped.as_slice(), cek.as_slice());
    }

    #[test]
    fn rfc3394_vector_256_bit_kek() {
        // RFC 3394 §4.6: wrap 256 bits of key data with a 256-bit KEK
        let kek = hex::decode("000102030405060708090A0B0C0D0E0F101112131415161718191A1B1C1D1E1F")
            .unwrap();
        let key = hex::decode("00112233445566778899AABBCCDDEEFF000102030405060708090A0B0C0D0E0F")
            .unwrap();
        let expected = hex::decode(
            "28C9F404C4B810F4CBCCB35CFB87F8263F5786E2D80ED326CBC7F0E71A99F43BFB988B9B7A02DD21",
        )
        .unwrap();
        assert_eq!(wrap_key(&kek, &key).unwrap(), expected);
    }

    #[test]
    fn wrong_kek_fails() {
        let wrapped = wrap_key(&random_key(), &random_key()).unwrap();
        assert!(matches!(
            unwrap_key(&random_key(), &wrapped),
            Err(CryptoError::UnwrapFailed(_))
        ));
    }

    #[test]
    fn rejects_short_kek() {
        assert!(matches!(
            wrap_key(&[0u8; 16], &random_key()),
            Err(CryptoError::InvalidKeyLength { expected: 32, got: 16 })
        ));
    }

    #[test]
    fn rejects_truncated_wrapped_key() {
        assert!(unwrap_key(&random_key(), &[0u8; 12]).is_err());
        assert!(unwrap_key(&random_key(), &[0u8; 39]).is_err());
    }
}
