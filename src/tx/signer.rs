//! Retry-until-usable signing and DER signature encoding.
//!
//! Wraps [`crate::ecdsa::sign`] with the retry policy spec §7 requires
//! ("`ecdsa_sign` returning 'nonce unusable' causes a fresh nonce to be
//! drawn and the sign retried"), and canonicalises the resulting `(r, s)`
//! pair into the DER encoding a Bitcoin scriptSig embeds.

use crate::bigint::U256;
use crate::ecdsa;
use crate::error::SignError;

/// Supplies fresh 256-bit nonces on demand. Implemented over
/// [`crate::rng::get_random_256`] in the wallet-level glue; test code can
/// hand back a fixed sequence instead.
pub trait NonceSource {
    fn draw_nonce(&mut self) -> Result<U256, SignError>;
}

/// Sign `hash` under `private_key`, drawing nonces from `nonces` and
/// retrying for as long as the nonce turns out unusable. Transaction
/// parsing and block writes do not retry (spec §7); signing is the one
/// layer that does.
pub fn sign_with_retry(
    hash: &U256,
    private_key: &U256,
    nonces: &mut impl NonceSource,
) -> Result<(U256, U256), SignError> {
    loop {
        let k = nonces.draw_nonce()?;
        match ecdsa::sign(hash, private_key, &k) {
            Ok(sig) => return Ok(sig),
            Err(SignError::NonceUnusable) => continue,
            Err(other) => return Err(other),
        }
    }
}

/// DER-encode an unsigned big-endian integer per X.690: strip leading
/// zero bytes (but leave at least one), then prepend a `0x00` pad byte if
/// the high bit of the first remaining byte is set (so it isn't read as
/// negative).
fn encode_integer(value_le: &U256) -> Vec<u8> {
    let mut be: Vec<u8> = value_le.iter().rev().copied().collect();
    while be.len() > 1 && be[0] == 0 {
        be.remove(0);
    }
    if be[0] & 0x80 != 0 {
        be.insert(0, 0x00);
    }

    let mut out = Vec::with_capacity(be.len() + 2);
    out.push(0x02); // INTEGER tag
    out.push(be.len() as u8);
    out.extend_from_slice(&be);
    out
}

/// Encode `(r, s)` as a DER `SEQUENCE { INTEGER r, INTEGER s }` with a
/// trailing `SIGHASH_ALL` hash-type byte appended, ready to embed as a
/// scriptSig push (spec §4.8).
pub fn der_encode_signature(r: &U256, s: &U256) -> Vec<u8> {
    let r_enc = encode_integer(r);
    let s_enc = encode_integer(s);

    let mut body = Vec::with_capacity(r_enc.len() + s_enc.len());
    body.extend_from_slice(&r_enc);
    body.extend_from_slice(&s_enc);

    let mut out = Vec::with_capacity(body.len() + 3);
    out.push(0x30); // SEQUENCE tag
    out.push(body.len() as u8);
    out.extend_from_slice(&body);
    out.push(0x01); // SIGHASH_ALL

    out
}
