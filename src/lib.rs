//! **strongbox-core** - the device-side core of a hardware Bitcoin
//! signing appliance: constant-time crypto primitives, encrypted
//! non-volatile storage, and a streaming transaction parser/signer.
//!
//! # Modules
//! | Module | Component |
//! |--------|-----------|
//! | [`bigint`]   | Big-integer field arithmetic (C1) |
//! | [`aes`]      | AES-128 block cipher (C2) |
//! | [`hash`]     | SHA-256 / SHA-512 / RIPEMD-160 (C3) |
//! | [`hmac`]     | HMAC-SHA-256 / HMAC-SHA-512 (C4) |
//! | [`drbg`]     | HMAC_DRBG (C4) |
//! | [`ecdsa`]    | ECDSA over secp256k1 (C5) |
//! | [`rng`]      | PRNG frontend (C6) |
//! | [`storage`]  | XEX-encrypted non-volatile storage (C7) |
//! | [`tx`]       | Transaction parser and signer (C8) |
//! | [`address`]  | Base-58Check address and amount formatting (C9) |
//! | [`wallet`]   | Wallet record management (C10) |
//! | [`confirm`]  | User-confirmation callback contract |
//! | [`sanitize`] | Memory sanitisation on wallet-unload |

pub mod address;
pub mod aes;
pub mod bigint;
pub mod confirm;
pub mod config;
pub mod drbg;
pub mod ecdsa;
pub mod error;
pub mod hash;
pub mod hmac;
pub mod rng;
pub mod sanitize;
pub mod storage;
pub mod tx;
pub mod wallet;

pub use error::{CoreError, Result};
