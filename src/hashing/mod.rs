//! BLAKE3 helpers for AI-result cache keys.

use blake3::Hasher;

use crate::provider::AiRequest;

/// Computes a stable 32-byte key for memoizing an [`AiRequest`].
///
/// The key covers every field that changes what a provider would return:
/// content, context, max length and temperature. `include_metadata` only
/// shapes the local response envelope, so it is deliberately excluded.
/// Fields are length-prefixed so adjacent values cannot be confused.
pub fn hash_request(request: &AiRequest) -> [u8; 32] {
    let mut hasher = Hasher::new();

    hasher.update(&(request.content.len() as u64).to_le_bytes());
    hasher.update(request.content.as_bytes());

    match &request.context {
        Some(context) => {
            hasher.update(&[1]);
            hasher.update(&(context.len() as u64).to_le_bytes());
            hasher.update(context.as_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }

    match request.max_length {
        Some(max_length) => {
            hasher.update(&[1]);
            hasher.update(&max_length.to_le_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }

    match request.temperature {
        Some(temperature) => {
            hasher.update(&[1]);
            hasher.update(&temperature.to_bits().to_le_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }

    *hasher.finalize().as_bytes()
}

/// Hex rendering of [`hash_request`], usable directly as a cache key.
#[inline]
pub fn request_key(request: &AiRequest) -> String {
    blake3::Hash::from_bytes(hash_request(request))
        .to_hex()
        .to_string()
}

/// Computes a 64-bit BLAKE3 hash, truncated from 256 bits.
///
/// Used for compact identifiers in logs and metrics. Collisions only cause a
/// cache miss or a duplicated log id, never data corruption, so 64 bits is
/// plenty for the entry counts this crate sees.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}
