//! Keccak-256 adapter — the original Keccak padding (`0x01`), not NIST SHA3-256.

use sha3::{Digest, Keccak256};

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}
