//! HMAC_DRBG (NIST SP 800-90A) instantiated with HMAC-SHA-256, security
//! strength 256 bits. Prediction resistance is always off and no reseed
//! counter is tracked — this targets a cooperative single-threaded device,
//! not a shared service with adversarial reseed timing.

use crate::hmac::hmac_sha256;

/// `K`/`V` state. Process-wide in the firmware this crate targets, but
/// modelled here as an explicit value threaded through calls rather than
/// ambient global state, so tests can instantiate independent generators.
#[derive(Clone)]
pub struct DrbgState {
    k: [u8; 32],
    v: [u8; 32],
}

impl DrbgState {
    /// `instantiate`: `K := 0x00...`, `V := 0x01...`, then one update with
    /// `seed_material` as provided data.
    pub fn instantiate(seed_material: &[u8]) -> Self {
        let mut state = DrbgState {
            k: [0x00; 32],
            v: [0x01; 32],
        };
        state.update(Some(seed_material));
        state
    }

    /// `reseed`: one update with `reseed_material` as provided data.
    pub fn reseed(&mut self, reseed_material: &[u8]) {
        self.update(Some(reseed_material));
    }

    /// `generate`: fill `out` with pseudo-random bytes.
    ///
    /// `additional_input` distinguishes "absent" (`None`) from "an explicit
    /// zero-length buffer" (`Some(&[])`) per NIST SP 800-90A — both trigger
    /// an update step, but only a present (possibly empty) buffer is that
    /// update's provided data; `None` means no update runs at all.
    pub fn generate(&mut self, out: &mut [u8], additional_input: Option<&[u8]>) {
        if let Some(input) = additional_input {
            self.update(Some(input));
        }

        let mut produced = 0;
        while produced < out.len() {
            self.v = hmac_sha256(&self.k, &self.v);
            let take = (out.len() - produced).min(32);
            out[produced..produced + take].copy_from_slice(&self.v[..take]);
            produced += take;
        }

        self.update(additional_input);
    }

    /// `K := HMAC_K(V || 0x00 || provided_data)`; `V := HMAC_K(V)`; if
    /// `provided_data` is present, a second pass with the `0x01` marker.
    fn update(&mut self, provided_data: Option<&[u8]>) {
        self.k = self.step(0x00, provided_data);
        self.v = hmac_sha256(&self.k, &self.v);

        if let Some(data) = provided_data {
            self.k = self.step(0x01, Some(data));
            self.v = hmac_sha256(&self.k, &self.v);
        }
    }

    fn step(&self, marker: u8, provided_data: Option<&[u8]>) -> [u8; 32] {
        let mut msg = Vec::with_capacity(32 + 1 + provided_data.map_or(0, |d| d.len()));
        msg.extend_from_slice(&self.v);
        msg.push(marker);
        if let Some(data) = provided_data {
            msg.extend_from_slice(data);
        }
        hmac_sha256(&self.k, &msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn generate_is_deterministic_given_same_seed() {
        let seed = b"seed material for the generator, 32+ bytes long";
        let mut a = DrbgState::instantiate(seed);
        let mut b = DrbgState::instantiate(seed);

        let mut out_a = [0u8; 48];
        let mut out_b = [0u8; 48];
        a.generate(&mut out_a, None);
        b.generate(&mut out_b, None);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn successive_generate_calls_differ() {
        let mut state = DrbgState::instantiate(b"some seed");
        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        state.generate(&mut first, None);
        state.generate(&mut second, None);
        assert_ne!(first, second);
    }

    #[test]
    fn reseed_changes_subsequent_output() {
        let seed = b"initial seed";
        let mut a = DrbgState::instantiate(seed);
        let mut b = DrbgState::instantiate(seed);
        b.reseed(b"extra entropy");

        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        a.generate(&mut out_a, None);
        b.generate(&mut out_b, None);
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn absent_and_empty_additional_input_are_distinct() {
        let seed = b"seed for absent-vs-empty check";
        let mut a = DrbgState::instantiate(seed);
        let mut b = DrbgState::instantiate(seed);

        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        a.generate(&mut out_a, None);
        b.generate(&mut out_b, Some(&[]));
        assert_ne!(
            out_a, out_b,
            "an explicit empty additional_input must still trigger the extra update pass"
        );
    }

    #[test]
    fn output_length_is_exact() {
        let mut state = DrbgState::instantiate(b"length check seed");
        let mut out = [0u8; 17];
        state.generate(&mut out, None);
        assert_eq!(hex(&out).len(), 34);
    }

    /// Known-answer test: instantiate, reseed, generate(32) (discarded),
    /// generate(32). The expected second-generate output was computed with
    /// an independent from-scratch HMAC_DRBG (NIST SP 800-90A, HMAC-SHA-256,
    /// no prediction resistance) reference implementation against this
    /// exact entropy/nonce/reseed input, to catch the class of bug that the
    /// self-consistency tests above cannot: an internally-consistent but
    /// wrong construction (e.g. a swapped `0x00`/`0x01` marker, or a reseed
    /// that omits the second `update` pass).
    #[test]
    fn known_answer_vector_after_reseed() {
        let entropy_input: [u8; 32] = core::array::from_fn(|i| i as u8);
        let nonce: [u8; 16] = core::array::from_fn(|i| (i + 32) as u8);
        let entropy_input_reseed: [u8; 32] = core::array::from_fn(|i| (i + 48) as u8);

        let mut seed_material = Vec::with_capacity(48);
        seed_material.extend_from_slice(&entropy_input);
        seed_material.extend_from_slice(&nonce);

        let mut state = DrbgState::instantiate(&seed_material);
        state.reseed(&entropy_input_reseed);

        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        state.generate(&mut first, None);
        state.generate(&mut second, None);

        assert_eq!(
            hex(&second),
            "738eb61ad6403ab76eba1bf88d05924b77589cf5c1a4bab46d299818af1485ec"
        );
    }
}
