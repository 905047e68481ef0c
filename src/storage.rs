//! Encrypted non-volatile storage (component C7): AES-128 in XEX
//! (tweakable block cipher) mode over a partitioned flat byte space,
//! giving random-access confidentiality with bit-flipping resistance.
//!
//! Built on [`crate::aes`]; the GF(2^128) tweak-doubling polynomial
//! (`x^128 + x^7 + x^2 + x + 1`, i.e. `0x87`) is the one the teacher
//! crate's NCA sector decryption uses, adapted here from a big-endian
//! fixed-sector-number tweak to the spec's little-endian,
//! block-granular address tweak, and extended with an encrypt path (the
//! teacher only ever decrypts NCA sectors read from a cartridge).

use crate::aes::{xor_block, ExpandedKey};
use crate::error::NvError;

const BLOCK_LEN: usize = 16;

/// A raw, unencrypted byte-addressable medium: flash, EEPROM, or a test
/// double. Generic-over-storage the way the teacher crate's format
/// parsers are generic over `Read + Seek`.
pub trait NvMedium {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), NvError>;
    fn write(&mut self, offset: usize, buf: &[u8]) -> Result<(), NvError>;
    fn flush(&mut self) -> Result<(), NvError>;
}

/// Which partition an address is relative to (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Global,
    Accounts,
}

/// Global-partition byte offsets for the fields spec §6 names: reserved
/// header (0..64), entropy pool (64..96), pool checksum (96..128), device
/// UUID (128..144).
pub const GLOBAL_POOL_OFFSET: usize = 64;
pub const GLOBAL_POOL_CHECKSUM_OFFSET: usize = 96;
pub const GLOBAL_DEVICE_UUID_OFFSET: usize = 128;
pub const GLOBAL_DEVICE_UUID_LEN: usize = 16;

struct Keys {
    raw: [u8; 32],
    primary: ExpandedKey,
    tweak: ExpandedKey,
}

/// XEX-mode encrypted storage over a generic [`NvMedium`], partitioned
/// into a fixed-size global area immediately followed by the accounts
/// area (spec §3).
pub struct EncryptedStorage<M: NvMedium> {
    medium: M,
    keys: Option<Keys>,
    global_size: usize,
    accounts_size: usize,
}

impl<M: NvMedium> EncryptedStorage<M> {
    pub fn new(medium: M, global_size: usize, accounts_size: usize) -> Self {
        EncryptedStorage {
            medium,
            keys: None,
            global_size,
            accounts_size,
        }
    }

    /// `set_encryption_key`: the 32-octet key holds the primary
    /// block-cipher key (first 16 octets) and the tweak key (last 16).
    pub fn set_encryption_key(&mut self, key: &[u8; 32]) {
        self.keys = Some(Keys {
            raw: *key,
            primary: ExpandedKey::new(key[..16].try_into().unwrap()),
            tweak: ExpandedKey::new(key[16..].try_into().unwrap()),
        });
    }

    pub fn get_encryption_key(&self, out: &mut [u8; 32]) {
        *out = self.keys.as_ref().map(|k| k.raw).unwrap_or([0u8; 32]);
    }

    pub fn clear_encryption_key(&mut self) {
        self.keys = None;
    }

    pub fn is_encryption_key_nonzero(&self) -> bool {
        self.keys
            .as_ref()
            .map(|k| k.raw.iter().any(|&b| b != 0))
            .unwrap_or(false)
    }

    fn partition_bounds(&self, partition: Partition) -> (usize, usize) {
        match partition {
            Partition::Global => (0, self.global_size),
            Partition::Accounts => (self.global_size, self.global_size + self.accounts_size),
        }
    }

    /// Validates that `[address, address+length)` falls wholly within
    /// `partition`, returning the base physical offset of that partition.
    fn validate_range(
        &self,
        partition: Partition,
        address: usize,
        length: usize,
    ) -> Result<usize, NvError> {
        let (base, size) = self.partition_bounds(partition);
        let end = address.checked_add(length).ok_or(NvError::InvalidAddress)?;
        if end > size {
            return Err(NvError::InvalidAddress);
        }
        Ok(base)
    }

    /// `encrypted_write`: read-modify-write each 16-octet block the range
    /// touches, so writes unaligned to the block grid don't disturb the
    /// untouched bytes sharing a block.
    pub fn encrypted_write(
        &mut self,
        data: &[u8],
        partition: Partition,
        address: usize,
    ) -> Result<(), NvError> {
        let base = self.validate_range(partition, address, data.len())?;
        let keys = self.keys.as_ref().ok_or(NvError::Io)?;

        let mut cur = address;
        let mut consumed = 0usize;
        while consumed < data.len() {
            let block_addr = (cur / BLOCK_LEN) * BLOCK_LEN;
            let within_block = cur - block_addr;
            let take = (BLOCK_LEN - within_block).min(data.len() - consumed);

            let mut cipher = [0u8; BLOCK_LEN];
            self.medium.read(base + block_addr, &mut cipher)?;
            let mut plain = decrypt_block(&cipher, keys, block_addr);
            plain[within_block..within_block + take]
                .copy_from_slice(&data[consumed..consumed + take]);
            let new_cipher = encrypt_block(&plain, keys, block_addr);
            self.medium.write(base + block_addr, &new_cipher)?;

            cur += take;
            consumed += take;
        }

        self.medium.flush()
    }

    pub fn encrypted_read(
        &mut self,
        out: &mut [u8],
        partition: Partition,
        address: usize,
    ) -> Result<(), NvError> {
        let base = self.validate_range(partition, address, out.len())?;
        let keys = self.keys.as_ref().ok_or(NvError::Io)?;

        let mut cur = address;
        let mut produced = 0usize;
        while produced < out.len() {
            let block_addr = (cur / BLOCK_LEN) * BLOCK_LEN;
            let within_block = cur - block_addr;
            let take = (BLOCK_LEN - within_block).min(out.len() - produced);

            let mut cipher = [0u8; BLOCK_LEN];
            self.medium.read(base + block_addr, &mut cipher)?;
            let plain = decrypt_block(&cipher, keys, block_addr);
            out[produced..produced + take]
                .copy_from_slice(&plain[within_block..within_block + take]);

            cur += take;
            produced += take;
        }

        Ok(())
    }

    /// `read_device_uuid`/`write_device_uuid`: accessors for global
    /// partition bytes 128-143, named but never given an interface by
    /// the original contract.
    pub fn read_device_uuid(&mut self) -> Result<[u8; GLOBAL_DEVICE_UUID_LEN], NvError> {
        let mut out = [0u8; GLOBAL_DEVICE_UUID_LEN];
        self.encrypted_read(&mut out, Partition::Global, GLOBAL_DEVICE_UUID_OFFSET)?;
        Ok(out)
    }

    pub fn write_device_uuid(&mut self, uuid: &[u8; GLOBAL_DEVICE_UUID_LEN]) -> Result<(), NvError> {
        self.encrypted_write(uuid, Partition::Global, GLOBAL_DEVICE_UUID_OFFSET)
    }
}

/// `Δ := AES_tweakKey(little_endian(block_address) || zeros)`, doubled
/// once in GF(2^128) (sequence index fixed at 1, spec §4.7).
fn compute_tweak(keys: &Keys, block_address: usize) -> [u8; BLOCK_LEN] {
    let mut nonce = [0u8; BLOCK_LEN];
    nonce[..8].copy_from_slice(&(block_address as u64).to_le_bytes());
    let mut delta = keys.tweak.encrypt_block(&nonce);
    xts_double(&mut delta);
    delta
}

/// Multiply `t`, read as a little-endian 128-bit integer, by the field
/// element `x` in GF(2^128) modulo `x^128 + x^7 + x^2 + x + 1`.
fn xts_double(t: &mut [u8; BLOCK_LEN]) {
    let carry = t[15] >> 7;
    for i in (1..BLOCK_LEN).rev() {
        t[i] = (t[i] << 1) | (t[i - 1] >> 7);
    }
    t[0] <<= 1;
    if carry != 0 {
        t[0] ^= 0x87;
    }
}

fn encrypt_block(plain: &[u8; BLOCK_LEN], keys: &Keys, block_address: usize) -> [u8; BLOCK_LEN] {
    let delta = compute_tweak(keys, block_address);
    let whitened = xor_block(plain, &delta);
    let encrypted = keys.primary.encrypt_block(&whitened);
    xor_block(&encrypted, &delta)
}

fn decrypt_block(cipher: &[u8; BLOCK_LEN], keys: &Keys, block_address: usize) -> [u8; BLOCK_LEN] {
    let delta = compute_tweak(keys, block_address);
    let whitened = xor_block(cipher, &delta);
    let decrypted = keys.primary.decrypt_block(&whitened);
    xor_block(&decrypted, &delta)
}
