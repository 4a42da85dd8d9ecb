//! BLAKE3 helpers for deterministic cache keys.

use blake3::Hasher;

#[inline]
pub fn hash_prompt(prompt: &str) -> [u8; 32] {
    *blake3::hash(prompt.as_bytes()).as_bytes()
}

/// Hashes an ordered list of fields into one 32-byte key.
///
/// Each field is prefixed with its length, so `["ab", "c"]` and `["a", "bc"]`
/// never collide. Field order is significant.
pub fn hash_fields(fields: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Hasher::new();
    for field in fields {
        hasher.update(&(field.len() as u64).to_le_bytes());
        hasher.update(field);
    }
    *hasher.finalize().as_bytes()
}

/// Lowercase hex rendering of a 32-byte key.
#[inline]
pub fn key_to_hex(key: &[u8; 32]) -> String {
    blake3::Hash::from(*key).to_hex().to_string()
}
