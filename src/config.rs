//! Tunable constants.
//!
//! Centralised here rather than scattered through the modules that use
//! them.

/// Upper bound on a transaction's declared length, in bytes (spec §9, open
/// question (a); the source this spec distils from used 200,000).
pub const MAX_TRANSACTION_LEN: usize = 200_000;

/// Minimum and maximum input count a transaction may declare (spec §4.8).
pub const MIN_TX_INPUTS: u64 = 1;
pub const MAX_TX_INPUTS: u64 = 0xFFFE;

/// Minimum and maximum output count a transaction may declare (spec §4.8).
pub const MIN_TX_OUTPUTS: u8 = 1;
pub const MAX_TX_OUTPUTS: u8 = 0xFC;

/// Capacity of the in-memory outputs-confirmation buffer (spec §3).
pub const MAX_OUTPUTS_BUFFERED: usize = 16;

/// Longest BTC amount string, including the NUL terminator (spec §3).
pub const MAX_AMOUNT_TEXT_LEN: usize = 22;

/// Longest Base-58Check address string, including the NUL terminator (spec §3).
pub const MAX_ADDRESS_TEXT_LEN: usize = 36;

/// Multiplier applied to the 256-bit target when draining the hardware
/// noise source (spec §4.6: "until the reported entropy reaches
/// `256 * SAFETY_FACTOR` bits").
pub const RNG_SAFETY_FACTOR: u32 = 2;

/// Initial flow-control credit granted before the host sends any bytes
/// (spec §6).
pub const INITIAL_ACK_INTERVAL: u32 = 16;

/// Number of wallet slots held in the accounts partition.
pub const MAX_WALLET_SLOTS: usize = 8;

/// Size of the global partition, in bytes (spec §6: bytes 0-143 are
/// assigned; rounded up to a block-granular size with headroom for
/// future fields, itself a multiple of the 16-byte XEX block size).
pub const GLOBAL_PARTITION_SIZE: usize = 256;

/// On-disk size of one wallet record (spec's Supplemented Features: handle
/// + private key + public key + name, rounded up to a 16-byte multiple).
pub const WALLET_RECORD_SIZE: usize = 144;

/// Size of the accounts partition: one slot per [`MAX_WALLET_SLOTS`].
pub const ACCOUNTS_PARTITION_SIZE: usize = MAX_WALLET_SLOTS * WALLET_RECORD_SIZE;
