/// AES-GCM IV length in bytes (96 bits per NIST recommendation).
pub const AES_GCM_IV_LENGTH: usize = 12;

/// AES-GCM tag length in bytes (128 bits).
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// AES key length in bytes (256 bits). Used for CEKs and KEKs alike.
pub const AES_KEY_LENGTH: usize = 32;

/// Bytes AES-KW adds to the wrapped key (one 64-bit integrity block).
pub const AES_KW_OVERHEAD: usize = 8;

/// Length of a single P-256 affine coordinate in bytes.
pub const P256_COORDINATE_LENGTH: usize = 32;
