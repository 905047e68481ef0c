//! Random number generation frontend (component C6): pools hardware
//! entropy through an HMAC_DRBG, and derives deterministic sub-keys the
//! BIP32-like way. Built on [`crate::aes`] and [`crate::hash::Sha256`];
//! the persistent pool itself lives in the global partition
//! ([`crate::storage`]) and is passed in by the caller rather than owned
//! here, so this module stays a pure function of its inputs.

use crate::aes::ExpandedKey;
use crate::drbg::DrbgState;
use crate::hash::{sha256d, Sha256};

/// Multiplier applied to the 256-bit target when draining the hardware
/// noise source (spec §4.6).
use crate::config::RNG_SAFETY_FACTOR;

/// Failures specific to the RNG frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RngError {
    /// The persistent pool did not match its stored checksum.
    ChecksumMismatch,
    /// The hardware noise source reported a failure.
    HardwareFailure,
}

/// The hardware noise source (§6, "Hardware RNG"). Implementations return
/// the estimated entropy in bits on success, a negative value on hardware
/// failure, and zero when the caller should sample again.
pub trait HardwareRng {
    fn sample(&mut self, buf: &mut [u8; 32]) -> i32;
}

/// `get_random_256`: produce a uniformly distributed 256-bit value
/// suitable as an ECDSA nonce or private key.
///
/// `pool` and `checksum` are the persistent 32-octet pool and its
/// double-SHA-256 checksum (global partition bytes 64..95 and 96..127);
/// both are updated in place and must be persisted by the caller before
/// the next command is acknowledged, per the ordering guarantee in §5.
pub fn get_random_256(
    pool: &mut [u8; 32],
    checksum: &mut [u8; 32],
    hardware: &mut impl HardwareRng,
) -> Result<[u8; 32], RngError> {
    if sha256d(pool) != *checksum {
        log::error!("entropy pool checksum mismatch, refusing to produce randomness");
        return Err(RngError::ChecksumMismatch);
    }

    let mut drbg = DrbgState::instantiate(pool);

    let mut accumulator = [0u8; 32];
    drbg.generate(&mut accumulator, None);

    let target_bits = 256i64 * RNG_SAFETY_FACTOR as i64;
    let mut collected_bits: i64 = 0;
    while collected_bits < target_bits {
        let mut sample = [0u8; 32];
        let entropy_bits = hardware.sample(&mut sample);
        if entropy_bits < 0 {
            log::error!("hardware noise source reported a failure mid-drain");
            return Err(RngError::HardwareFailure);
        }
        if entropy_bits == 0 {
            continue;
        }

        drbg.reseed(&sample);
        let mut mixed = [0u8; 32];
        drbg.generate(&mut mixed, Some(&sample));
        for i in 0..32 {
            accumulator[i] ^= mixed[i];
        }
        collected_bits += entropy_bits as i64;
    }

    *pool = accumulator;
    *checksum = sha256d(pool);

    Ok(accumulator)
}

/// `generate_deterministic_256`: derive a pseudo-random 256-bit value
/// deterministically from a 64-octet seed plus a 32-bit counter
/// (BIP32-like inner construction, spec §4.6).
pub fn generate_deterministic_256(seed: &[u8; 64], counter: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.write(&seed[32..64]);
    hasher.write(&[0x00, 0x00, 0x00, 0x00]);
    hasher.write(&counter.to_be_bytes());
    let h = hasher.finish();

    let key_a: [u8; 16] = seed[0..16].try_into().unwrap();
    let key_b: [u8; 16] = seed[16..32].try_into().unwrap();
    let half_a: [u8; 16] = h[0..16].try_into().unwrap();
    let half_b: [u8; 16] = h[16..32].try_into().unwrap();

    let encrypted_a = ExpandedKey::new(&key_a).encrypt_block(&half_a);
    let encrypted_b = ExpandedKey::new(&key_b).encrypt_block(&half_b);

    let mut out = [0u8; 32];
    out[..16].copy_from_slice(&encrypted_a);
    out[16..].copy_from_slice(&encrypted_b);
    out
}
