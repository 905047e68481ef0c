//! Wallet-record management (component C10): a fixed-size keyed record —
//! handle, private key, derived public key, display name — persisted one
//! slot per [`crate::config::MAX_WALLET_SLOTS`] through
//! [`crate::storage::EncryptedStorage`]'s accounts partition.
//!
//! The record shape itself is a supplemented feature (wallet commands
//! are named but their on-disk layout is not); it follows this crate's
//! convention of a plain struct of fixed-size key material, here made
//! encode/decode-able to a flat byte record instead of looked up from a
//! text key file.

use crate::bigint::U256;
use crate::config::{MAX_WALLET_SLOTS, WALLET_RECORD_SIZE};
use crate::ecdsa::{self, AffinePoint};
use crate::error::WalletError;
use crate::storage::{EncryptedStorage, NvMedium, Partition};

const NAME_LEN: usize = 32;
const OCCUPIED_OFFSET: usize = 0;
const HANDLE_OFFSET: usize = 1;
const PRIVATE_KEY_OFFSET: usize = 5;
const PUBLIC_KEY_OFFSET: usize = 37;
const NAME_OFFSET: usize = 101;

const _: () = assert!(NAME_OFFSET + NAME_LEN <= WALLET_RECORD_SIZE);

/// One wallet slot's contents once decoded. `public_key` is the
/// uncompressed `x || y` encoding of the point `private_key * G`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRecord {
    pub handle: u32,
    pub private_key: U256,
    pub public_key: [u8; 64],
    pub name: String,
}

impl WalletRecord {
    /// Derive a record from a handle, name, and private key; the public
    /// key is computed here rather than trusted from the caller.
    pub fn new(handle: u32, private_key: U256, name: &str) -> Self {
        let field = ecdsa::field_p();
        let point = ecdsa::point_multiply(&ecdsa::generator(), &private_key, &field);
        WalletRecord {
            handle,
            private_key,
            public_key: affine_to_bytes(&point),
            name: name.to_string(),
        }
    }

    fn encode(&self) -> [u8; WALLET_RECORD_SIZE] {
        let mut buf = [0u8; WALLET_RECORD_SIZE];
        buf[OCCUPIED_OFFSET] = 1;
        buf[HANDLE_OFFSET..HANDLE_OFFSET + 4].copy_from_slice(&self.handle.to_le_bytes());
        buf[PRIVATE_KEY_OFFSET..PRIVATE_KEY_OFFSET + 32].copy_from_slice(&self.private_key);
        buf[PUBLIC_KEY_OFFSET..PUBLIC_KEY_OFFSET + 64].copy_from_slice(&self.public_key);

        let name_bytes = self.name.as_bytes();
        let take = name_bytes.len().min(NAME_LEN);
        buf[NAME_OFFSET..NAME_OFFSET + take].copy_from_slice(&name_bytes[..take]);

        buf
    }

    fn decode(buf: &[u8; WALLET_RECORD_SIZE]) -> Option<Self> {
        if buf[OCCUPIED_OFFSET] == 0 {
            return None;
        }
        let handle = u32::from_le_bytes(buf[HANDLE_OFFSET..HANDLE_OFFSET + 4].try_into().unwrap());
        let private_key: U256 = buf[PRIVATE_KEY_OFFSET..PRIVATE_KEY_OFFSET + 32]
            .try_into()
            .unwrap();
        let public_key: [u8; 64] = buf[PUBLIC_KEY_OFFSET..PUBLIC_KEY_OFFSET + 64]
            .try_into()
            .unwrap();

        let name_slice = &buf[NAME_OFFSET..NAME_OFFSET + NAME_LEN];
        let name_len = name_slice.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        let name = String::from_utf8_lossy(&name_slice[..name_len]).into_owned();

        Some(WalletRecord {
            handle,
            private_key,
            public_key,
            name,
        })
    }
}

fn affine_to_bytes(point: &AffinePoint) -> [u8; 64] {
    let mut out = [0u8; 64];
    out[..32].copy_from_slice(&point.x);
    out[32..].copy_from_slice(&point.y);
    out
}

/// Slot-indexed accessor over the accounts partition.
pub struct WalletStore<'a, M: NvMedium> {
    storage: &'a mut EncryptedStorage<M>,
}

impl<'a, M: NvMedium> WalletStore<'a, M> {
    pub fn new(storage: &'a mut EncryptedStorage<M>) -> Self {
        WalletStore { storage }
    }

    fn slot_address(slot: usize) -> usize {
        slot * WALLET_RECORD_SIZE
    }

    /// Persist `record` into `slot`, overwriting whatever was there.
    pub fn store(&mut self, slot: usize, record: &WalletRecord) -> Result<(), WalletError> {
        if slot >= MAX_WALLET_SLOTS {
            return Err(WalletError::InvalidWalletNum);
        }
        let encoded = record.encode();
        self.storage
            .encrypted_write(&encoded, Partition::Accounts, Self::slot_address(slot))
            .map_err(|_| WalletError::WriteError)
    }

    /// Read back `slot`; `Ok(None)` means the slot has never been written.
    pub fn load(&mut self, slot: usize) -> Result<Option<WalletRecord>, WalletError> {
        if slot >= MAX_WALLET_SLOTS {
            return Err(WalletError::InvalidWalletNum);
        }
        let mut buf = [0u8; WALLET_RECORD_SIZE];
        self.storage
            .encrypted_read(&mut buf, Partition::Accounts, Self::slot_address(slot))
            .map_err(|_| WalletError::ReadError)?;
        Ok(WalletRecord::decode(&buf))
    }

    /// Erase `slot` by zeroing it (the `occupied` byte included).
    pub fn erase(&mut self, slot: usize) -> Result<(), WalletError> {
        if slot >= MAX_WALLET_SLOTS {
            return Err(WalletError::InvalidWalletNum);
        }
        let zero = [0u8; WALLET_RECORD_SIZE];
        self.storage
            .encrypted_write(&zero, Partition::Accounts, Self::slot_address(slot))
            .map_err(|_| WalletError::WriteError)
    }

    /// First unoccupied slot, or [`WalletError::Full`] if every slot holds
    /// a record.
    pub fn find_free_slot(&mut self) -> Result<usize, WalletError> {
        for slot in 0..MAX_WALLET_SLOTS {
            if self.load(slot)?.is_none() {
                return Ok(slot);
            }
        }
        Err(WalletError::Full)
    }

    /// Look up the slot holding `handle`.
    pub fn find_by_handle(&mut self, handle: u32) -> Result<(usize, WalletRecord), WalletError> {
        for slot in 0..MAX_WALLET_SLOTS {
            if let Some(record) = self.load(slot)? {
                if record.handle == handle {
                    return Ok((slot, record));
                }
            }
        }
        Err(WalletError::NotThere)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NvError;

    struct MemMedium {
        bytes: Vec<u8>,
    }

    impl NvMedium for MemMedium {
        fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), NvError> {
            buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
            Ok(())
        }
        fn write(&mut self, offset: usize, buf: &[u8]) -> Result<(), NvError> {
            self.bytes[offset..offset + buf.len()].copy_from_slice(buf);
            Ok(())
        }
        fn flush(&mut self) -> Result<(), NvError> {
            Ok(())
        }
    }

    fn fresh_storage() -> EncryptedStorage<MemMedium> {
        let accounts_size = MAX_WALLET_SLOTS * WALLET_RECORD_SIZE;
        let mut s = EncryptedStorage::new(
            MemMedium {
                bytes: vec![0u8; 256 + accounts_size],
            },
            256,
            accounts_size,
        );
        s.set_encryption_key(&[0x5Au8; 32]);
        s
    }

    fn sample_key(seed: u8) -> U256 {
        let mut k = [0u8; 32];
        k[0] = seed;
        k[1] = 1;
        k
    }

    #[test]
    fn store_then_load_round_trips() {
        let mut storage = fresh_storage();
        let mut wallets = WalletStore::new(&mut storage);

        let record = WalletRecord::new(7, sample_key(3), "primary");
        wallets.store(0, &record).unwrap();

        let loaded = wallets.load(0).unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn empty_slot_loads_as_none() {
        let mut storage = fresh_storage();
        let mut wallets = WalletStore::new(&mut storage);
        assert_eq!(wallets.load(0).unwrap(), None);
    }

    #[test]
    fn public_key_is_derived_from_private_key() {
        let record = WalletRecord::new(1, sample_key(9), "derived");
        let field = ecdsa::field_p();
        let point = ecdsa::point_multiply(&ecdsa::generator(), &record.private_key, &field);
        assert_eq!(&record.public_key[..32], &point.x[..]);
        assert_eq!(&record.public_key[32..], &point.y[..]);
    }

    #[test]
    fn find_free_slot_skips_occupied_ones() {
        let mut storage = fresh_storage();
        let mut wallets = WalletStore::new(&mut storage);
        wallets.store(0, &WalletRecord::new(1, sample_key(1), "a")).unwrap();
        wallets.store(1, &WalletRecord::new(2, sample_key(2), "b")).unwrap();

        assert_eq!(wallets.find_free_slot().unwrap(), 2);
    }

    #[test]
    fn find_free_slot_reports_full() {
        let mut storage = fresh_storage();
        let mut wallets = WalletStore::new(&mut storage);
        for slot in 0..MAX_WALLET_SLOTS {
            wallets
                .store(slot, &WalletRecord::new(slot as u32, sample_key(slot as u8), "x"))
                .unwrap();
        }
        assert_eq!(wallets.find_free_slot(), Err(WalletError::Full));
    }

    #[test]
    fn find_by_handle_locates_the_right_slot() {
        let mut storage = fresh_storage();
        let mut wallets = WalletStore::new(&mut storage);
        wallets.store(0, &WalletRecord::new(10, sample_key(1), "a")).unwrap();
        wallets.store(1, &WalletRecord::new(20, sample_key(2), "b")).unwrap();

        let (slot, record) = wallets.find_by_handle(20).unwrap();
        assert_eq!(slot, 1);
        assert_eq!(record.handle, 20);
    }

    #[test]
    fn find_by_handle_missing_is_not_there() {
        let mut storage = fresh_storage();
        let mut wallets = WalletStore::new(&mut storage);
        assert_eq!(wallets.find_by_handle(99), Err(WalletError::NotThere));
    }

    #[test]
    fn erase_clears_a_slot() {
        let mut storage = fresh_storage();
        let mut wallets = WalletStore::new(&mut storage);
        wallets.store(0, &WalletRecord::new(1, sample_key(1), "a")).unwrap();
        wallets.erase(0).unwrap();
        assert_eq!(wallets.load(0).unwrap(), None);
    }

    #[test]
    fn name_longer_than_field_is_truncated() {
        let long_name = "a".repeat(64);
        let record = WalletRecord::new(1, sample_key(4), &long_name);
        let encoded = record.encode();
        let decoded = WalletRecord::decode(&encoded).unwrap();
        assert_eq!(decoded.name.len(), NAME_LEN);
    }
}
