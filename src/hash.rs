//! Hash mixing for the value model.
//!
//! All model types hash through the same two-round 32-bit mixer so that
//! structurally equal values produce equal codes regardless of how they were
//! assembled. Each composite type seeds the mix with its own constant and
//! finalizes with [`finish`].

#[inline]
pub(crate) fn mix(h: u32, k: u32) -> u32 {
    let mut k = k.wrapping_mul(0xcc9e_2d51);
    k = k.rotate_left(15);
    k = k.wrapping_mul(0x1b87_3593);

    let mut h = h ^ k;
    h = h.rotate_left(13);
    h.wrapping_mul(5).wrapping_add(0xe654_6b64)
}

#[inline]
pub(crate) fn finish(h: u32) -> u32 {
    let mut h = h;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// Mixes two component codes under a seed and finalizes.
#[inline]
pub(crate) fn hash2(seed: u32, a: u32, b: u32) -> u32 {
    finish(mix(mix(seed, a), b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_order_sensitive() {
        assert_ne!(finish(mix(mix(0, 1), 2)), finish(mix(mix(0, 2), 1)));
    }

    #[test]
    fn test_finish_deterministic() {
        assert_eq!(hash2(0x8b9c_f328, 17, 42), hash2(0x8b9c_f328, 17, 42));
        assert_ne!(hash2(0x8b9c_f328, 17, 42), hash2(0x543c_0c9b, 17, 42));
    }
}
