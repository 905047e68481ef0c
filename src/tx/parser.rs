//! Streaming Bitcoin transaction parser.
//!
//! Consumes bytes from an abstract `Read` source through a pair of
//! SHA-256 accumulators — one (`sig_hash`) sees every byte, the other
//! (`tx_hash`) sees every byte except bytes inside input scripts — in the
//! same "read exactly what's promised, error otherwise" style used
//! throughout this crate's parsers, generalised here to track two
//! running hashes instead of returning owned values to a caller.

use std::io::Read;

use crate::address::{base58check_encode, format_amount};
use crate::config::{
    MAX_TRANSACTION_LEN, MAX_TX_INPUTS, MAX_TX_OUTPUTS, MIN_TX_INPUTS, MIN_TX_OUTPUTS,
};
use crate::error::TxError;
use crate::hash::Sha256;

/// Consumed by the parser once per output: receives the formatted amount
/// and address text for confirmation display. Returns `true` if the
/// outputs buffer is already full, which fails the parse.
pub trait OutputSink {
    fn output_seen(&mut self, amount_text: &str, address_text: &str) -> bool;
}

/// The two hashes a successful parse produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTransaction {
    /// Double-SHA-256 of every byte as streamed: the signature hash.
    pub sig_hash: [u8; 32],
    /// SHA-256 (single pass) of every byte except input scripts.
    pub tx_hash: [u8; 32],
}

struct DualHasher {
    sig_hash: Sha256,
    tx_hash: Sha256,
    suppress_tx_hash: bool,
    consumed: usize,
}

impl DualHasher {
    fn new() -> Self {
        DualHasher {
            sig_hash: Sha256::new(),
            tx_hash: Sha256::new(),
            suppress_tx_hash: false,
            consumed: 0,
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        self.sig_hash.write(bytes);
        if !self.suppress_tx_hash {
            self.tx_hash.write(bytes);
        }
        self.consumed += bytes.len();
    }
}

fn read_exact_tracked<R: Read>(
    source: &mut R,
    hasher: &mut DualHasher,
    buf: &mut [u8],
) -> Result<(), TxError> {
    source.read_exact(buf).map_err(|_| TxError::ReadError)?;
    hasher.feed(buf);
    Ok(())
}

fn read_array<R: Read, const N: usize>(
    source: &mut R,
    hasher: &mut DualHasher,
) -> Result<[u8; N], TxError> {
    let mut buf = [0u8; N];
    read_exact_tracked(source, hasher, &mut buf)?;
    Ok(buf)
}

fn read_vec<R: Read>(
    source: &mut R,
    hasher: &mut DualHasher,
    len: usize,
) -> Result<Vec<u8>, TxError> {
    let mut buf = vec![0u8; len];
    read_exact_tracked(source, hasher, &mut buf)?;
    Ok(buf)
}

/// Bitcoin's CompactSize varint: `< 0xfd` is a literal one-byte value;
/// `0xfd`/`0xfe`/`0xff` prefix a little-endian u16/u32/u64.
fn read_varint<R: Read>(source: &mut R, hasher: &mut DualHasher) -> Result<u64, TxError> {
    let prefix = read_array::<R, 1>(source, hasher)?[0];
    match prefix {
        0xfd => Ok(u16::from_le_bytes(read_array(source, hasher)?) as u64),
        0xfe => Ok(u32::from_le_bytes(read_array(source, hasher)?) as u64),
        0xff => Ok(u64::from_le_bytes(read_array(source, hasher)?)),
        n => Ok(n as u64),
    }
}

/// Parse a standard single-sig-pattern transaction from `source`, which
/// is expected to contain exactly `declared_len` bytes. `sink` receives
/// every output's amount/address text as it's decoded (spec §4.8,
/// "per-output side-effect").
pub fn parse_transaction<R: Read>(
    source: &mut R,
    declared_len: usize,
    sink: &mut impl OutputSink,
) -> Result<ParsedTransaction, TxError> {
    if declared_len > MAX_TRANSACTION_LEN {
        return Err(TxError::TooLarge);
    }

    let mut hasher = DualHasher::new();

    let version = read_array::<R, 4>(source, &mut hasher)?;
    if version != [0x01, 0x00, 0x00, 0x00] {
        return Err(TxError::InvalidFormat);
    }

    let input_count = read_varint(source, &mut hasher)?;
    if input_count < MIN_TX_INPUTS || input_count > MAX_TX_INPUTS {
        return Err(TxError::TooManyInputs);
    }

    for _ in 0..input_count {
        let _prevout = read_array::<R, 36>(source, &mut hasher)?;
        let script_len = read_varint(source, &mut hasher)? as usize;
        hasher.suppress_tx_hash = true;
        let _script = read_vec(source, &mut hasher, script_len)?;
        hasher.suppress_tx_hash = false;
        let _sequence = read_array::<R, 4>(source, &mut hasher)?;
    }

    let output_count = read_array::<R, 1>(source, &mut hasher)?[0];
    if output_count < MIN_TX_OUTPUTS || output_count > MAX_TX_OUTPUTS {
        return Err(TxError::TooManyOutputs);
    }

    for _ in 0..output_count {
        let amount_bytes = read_array::<R, 8>(source, &mut hasher)?;
        let amount = u64::from_le_bytes(amount_bytes);

        let script_len = read_varint(source, &mut hasher)?;
        if script_len != 0x19 {
            return Err(TxError::NonStandard);
        }
        let script = read_vec(source, &mut hasher, 0x19)?;
        if script[0] != 0x76
            || script[1] != 0xA9
            || script[2] != 0x14
            || script[23] != 0x88
            || script[24] != 0xAC
        {
            return Err(TxError::NonStandard);
        }
        let hash160: [u8; 20] = script[3..23].try_into().unwrap();

        let amount_text = format_amount(amount);
        let address_text = base58check_encode(0x00, &hash160);
        if sink.output_seen(&amount_text, &address_text) {
            return Err(TxError::TooManyOutputs);
        }
    }

    let locktime = read_array::<R, 4>(source, &mut hasher)?;
    if locktime != [0x00, 0x00, 0x00, 0x00] {
        return Err(TxError::NonStandard);
    }

    let hashtype = read_array::<R, 4>(source, &mut hasher)?;
    if hashtype != [0x01, 0x00, 0x00, 0x00] {
        return Err(TxError::NonStandard);
    }

    if hasher.consumed != declared_len {
        return Err(TxError::InvalidFormat);
    }

    let sig_hash_once = hasher.sig_hash.finish();
    let mut sig_hash = Sha256::digest(&sig_hash_once);
    let mut tx_hash = hasher.tx_hash.finish();

    // Both digests come out of Sha256::finish() in standard big-endian
    // byte order; spec §4.8/§8 require little-endian output here.
    sig_hash.reverse();
    tx_hash.reverse();

    Ok(ParsedTransaction { sig_hash, tx_hash })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingSink {
        seen: Vec<(String, String)>,
    }

    impl OutputSink for RecordingSink {
        fn output_seen(&mut self, amount_text: &str, address_text: &str) -> bool {
            self.seen.push((amount_text.to_string(), address_text.to_string()));
            false
        }
    }

    /// Builds the 217-octet canonical single-input, two-output fixture:
    /// version, one input with an arbitrary 36-byte prevout and a 94-byte
    /// scriptSig placeholder, two P2PKH outputs, zero locktime, hashtype
    /// `0x01000000`.
    fn build_fixture() -> Vec<u8> {
        let mut tx = Vec::new();
        tx.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]); // version
        tx.push(0x01); // input count
        tx.extend_from_slice(&[0xAB; 36]); // prevout, arbitrary
        tx.push(94); // scriptSig length, arbitrary, sized to land the fixture at 217 octets
        tx.extend_from_slice(&[0xCD; 94]); // scriptSig placeholder bytes, arbitrary
        tx.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]); // sequence

        tx.push(0x02); // output count

        let amount_a: u64 = 600_000_000;
        tx.extend_from_slice(&amount_a.to_le_bytes());
        tx.push(0x19);
        tx.push(0x76);
        tx.push(0xA9);
        tx.push(0x14);
        tx.extend_from_slice(&[
            0x00, 0x11, 0x22, 0x33, 0x00, 0x11, 0x22, 0x33, 0x00, 0x11, 0x22, 0x33, 0x00, 0x11,
            0x22, 0x33, 0x00, 0x11, 0x22, 0x33,
        ]);
        tx.push(0x88);
        tx.push(0xAC);

        let amount_b: u64 = 1_234_567;
        tx.extend_from_slice(&amount_b.to_le_bytes());
        tx.push(0x19);
        tx.push(0x76);
        tx.push(0xA9);
        tx.push(0x14);
        tx.extend_from_slice(&[
            0x01, 0x11, 0x22, 0x33, 0x00, 0x11, 0x22, 0x33, 0x00, 0x11, 0x22, 0x33, 0x00, 0x11,
            0x22, 0x33, 0x00, 0x11, 0x22, 0x33,
        ]);
        tx.push(0x88);
        tx.push(0xAC);

        tx.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // locktime
        tx.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]); // hashtype

        tx
    }

    #[test]
    fn fixture_is_217_bytes() {
        assert_eq!(build_fixture().len(), 217);
    }

    #[test]
    fn canonical_fixture_produces_expected_outputs() {
        let tx = build_fixture();
        let len = tx.len();
        let mut source = &tx[..];
        let mut sink = RecordingSink { seen: Vec::new() };

        let parsed = parse_transaction(&mut source, len, &mut sink).unwrap();

        assert_eq!(
            sink.seen,
            vec![
                ("6".to_string(), "11MXTrefsj1ZS3Q5e9D6DxGzZKHWALyo9".to_string()),
                ("0.01234567".to_string(), "16eCeyy63xi5yde9VrX4XCcRrCKZwtUZK".to_string()),
            ]
        );

        // Double-SHA-256 of the full stream, and single SHA-256 of the
        // stream with the 94-byte scriptSig excised, each byte-reversed
        // to little-endian output order per spec §4.8/§8.
        let expected_sig_hash: [u8; 32] = [
            0x37, 0xf8, 0xdf, 0x74, 0x59, 0x5d, 0x6d, 0x7c, 0x9f, 0x29, 0xd1, 0xca, 0x7f, 0x42,
            0x63, 0x60, 0x4b, 0x1d, 0x48, 0x09, 0x6c, 0x50, 0xbc, 0x9a, 0x2a, 0xc5, 0x88, 0xbb,
            0xfb, 0x8b, 0xd7, 0x5e,
        ];
        let expected_tx_hash: [u8; 32] = [
            0xa4, 0x97, 0x2c, 0xb2, 0x54, 0x4d, 0x82, 0xaf, 0x0d, 0xe4, 0x1f, 0x9b, 0x2c, 0x6e,
            0xe4, 0x69, 0xf1, 0x99, 0x27, 0x09, 0x4e, 0x9f, 0xef, 0xc5, 0x85, 0x93, 0x9f, 0x02,
            0x05, 0x65, 0x19, 0xa7,
        ];
        assert_eq!(parsed.sig_hash, expected_sig_hash);
        assert_eq!(parsed.tx_hash, expected_tx_hash);

        // Both hashes are deterministic re-derivations of the same stream.
        let mut source2 = &tx[..];
        let mut sink2 = RecordingSink { seen: Vec::new() };
        let parsed2 = parse_transaction(&mut source2, len, &mut sink2).unwrap();
        assert_eq!(parsed, parsed2);
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut tx = build_fixture();
        tx[0] = 0x02;
        let len = tx.len();
        let mut source = &tx[..];
        let mut sink = RecordingSink { seen: Vec::new() };
        assert_eq!(
            parse_transaction(&mut source, len, &mut sink),
            Err(TxError::InvalidFormat)
        );
    }

    #[test]
    fn zero_inputs_is_rejected() {
        let mut tx = build_fixture();
        tx[4] = 0x00; // input count
        let len = tx.len();
        let mut source = &tx[..];
        let mut sink = RecordingSink { seen: Vec::new() };
        assert_eq!(
            parse_transaction(&mut source, len, &mut sink),
            Err(TxError::TooManyInputs)
        );
    }

    #[test]
    fn nonzero_locktime_is_rejected() {
        let mut tx = build_fixture();
        let locktime_offset = tx.len() - 8;
        tx[locktime_offset] = 0x01;
        let len = tx.len();
        let mut source = &tx[..];
        let mut sink = RecordingSink { seen: Vec::new() };
        assert_eq!(
            parse_transaction(&mut source, len, &mut sink),
            Err(TxError::NonStandard)
        );
    }

    #[test]
    fn malformed_script_pattern_is_rejected() {
        let mut tx = build_fixture();
        // First output's OP_DUP byte, corrupt it.
        let dup_offset = 4 + 1 + 36 + 1 + 94 + 4 + 1 + 8 + 1;
        tx[dup_offset] = 0x00;
        let len = tx.len();
        let mut source = &tx[..];
        let mut sink = RecordingSink { seen: Vec::new() };
        assert_eq!(
            parse_transaction(&mut source, len, &mut sink),
            Err(TxError::NonStandard)
        );
    }

    #[test]
    fn truncated_stream_is_a_read_error() {
        let tx = build_fixture();
        let len = tx.len();
        let mut source = &tx[..len - 10];
        let mut sink = RecordingSink { seen: Vec::new() };
        assert_eq!(
            parse_transaction(&mut source, len, &mut sink),
            Err(TxError::ReadError)
        );
    }

    #[test]
    fn declared_length_mismatch_is_rejected() {
        // Grammar parsing only ever consumes what the fields dictate, not
        // `declared_len` directly, so an over-declared length surfaces as
        // the final consumed-length check failing, not a read fault.
        let tx = build_fixture();
        let mut source = &tx[..];
        let mut sink = RecordingSink { seen: Vec::new() };
        assert_eq!(
            parse_transaction(&mut source, tx.len() + 1, &mut sink),
            Err(TxError::InvalidFormat)
        );
    }

    #[test]
    fn oversized_declared_length_is_rejected_up_front() {
        let tx = build_fixture();
        let mut source = &tx[..];
        let mut sink = RecordingSink { seen: Vec::new() };
        assert_eq!(
            parse_transaction(&mut source, MAX_TRANSACTION_LEN + 1, &mut sink),
            Err(TxError::TooLarge)
        );
    }
}
