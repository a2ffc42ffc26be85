//! Content addresses as envelope payloads.

use cid::Cid;

use crate::error::{DagJoseError, Result};

/// A self-describing content identifier that can be sealed in an envelope.
///
/// The envelope only needs a validity check and a canonical byte form; the
/// addressing scheme itself is opaque here.
pub trait ContentAddress: Sized {
    /// Whether this value is a well-formed content address.
    fn is_valid(&self) -> bool;

    /// Canonical binary form, used as the encryption payload.
    fn to_bytes(&self) -> Vec<u8>;

    /// Rebuild from canonical bytes. Fails with
    /// [`DagJoseError::InvalidPayload`] on anything else.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;
}

impl ContentAddress for Cid {
    fn is_valid(&self) -> bool {
        Cid::try_from(Cid::to_bytes(self).as_slice()).is_ok_and(|parsed| parsed == *self)
    }

    fn to_bytes(&self) -> Vec<u8> {
        Cid::to_bytes(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let cid = Cid::try_from(bytes)
            .map_err(|e| DagJoseError::InvalidPayload(format!("not a CID: {}", e)))?;
        // `Cid::try_from` stops at the end of the CID; reject trailing bytes.
        if Cid::to_bytes(&cid) != bytes {
            return Err(DagJoseError::InvalidPayload(
                "CID bytes are not canonical".to_string(),
            ));
        }
        Ok(cid)
    }
}
