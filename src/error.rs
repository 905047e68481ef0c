//! Library-wide error types.
//!
//! Each subsystem gets its own flat enum (matching the taxonomy in the
//! design spec); [`CoreError`] composes them for callers that cross
//! subsystem boundaries, such as the top-level command dispatcher.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors from the non-volatile / encrypted storage layer (C7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvError {
    /// The requested range falls outside its partition, or `address + length` overflows.
    InvalidAddress,
    /// The underlying medium reported a failure.
    Io,
}

impl fmt::Display for NvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NvError::InvalidAddress => write!(f, "address out of range"),
            NvError::Io => write!(f, "non-volatile medium I/O error"),
        }
    }
}

impl std::error::Error for NvError {}

/// Errors from wallet-record management (C10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletError {
    /// No free slot remains for a new record.
    Full,
    /// The accounts partition holds no records.
    Empty,
    /// A record failed to decode after being read back.
    ReadError,
    /// A record failed to persist.
    WriteError,
    /// No record matches the requested address/handle.
    AddressNotFound,
    /// The referenced handle does not exist.
    NotThere,
    /// No wallet is currently loaded.
    NotLoaded,
    /// The supplied handle is malformed.
    InvalidHandle,
    /// A backup/restore operation failed.
    BackupError,
    /// The RNG subsystem reported a failure mid-operation.
    RngFailure,
    /// The wallet slot number is out of range.
    InvalidWalletNum,
    /// The requested operation is not valid in the current state.
    InvalidOperation,
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::Full => write!(f, "no free wallet slot"),
            WalletError::Empty => write!(f, "no wallet records stored"),
            WalletError::ReadError => write!(f, "failed to read wallet record"),
            WalletError::WriteError => write!(f, "failed to write wallet record"),
            WalletError::AddressNotFound => write!(f, "address not found"),
            WalletError::NotThere => write!(f, "handle does not exist"),
            WalletError::NotLoaded => write!(f, "no wallet loaded"),
            WalletError::InvalidHandle => write!(f, "invalid handle"),
            WalletError::BackupError => write!(f, "backup/restore failed"),
            WalletError::RngFailure => write!(f, "RNG failure"),
            WalletError::InvalidWalletNum => write!(f, "invalid wallet number"),
            WalletError::InvalidOperation => write!(f, "operation not valid in current state"),
        }
    }
}

impl std::error::Error for WalletError {}

/// Errors from transaction parsing (C8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxError {
    /// Truncation, an oversized varint, or a bad magic/version field.
    InvalidFormat,
    /// Input count outside `1..=0xFFFE`.
    TooManyInputs,
    /// Output count outside `1..=0xFC`, or the outputs buffer is full.
    TooManyOutputs,
    /// Declared transaction length exceeds [`crate::config::MAX_TRANSACTION_LEN`].
    TooLarge,
    /// A script, locktime, or hash-type field did not match the one supported pattern.
    NonStandard,
    /// An output amount could not be represented.
    InvalidAmount,
    /// A previous-output reference was malformed.
    InvalidReference,
    /// The byte source faulted; supersedes every other variant.
    ReadError,
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxError::InvalidFormat => write!(f, "invalid transaction format"),
            TxError::TooManyInputs => write!(f, "too many inputs"),
            TxError::TooManyOutputs => write!(f, "too many outputs"),
            TxError::TooLarge => write!(f, "transaction too large"),
            TxError::NonStandard => write!(f, "non-standard transaction"),
            TxError::InvalidAmount => write!(f, "invalid output amount"),
            TxError::InvalidReference => write!(f, "invalid previous-output reference"),
            TxError::ReadError => write!(f, "transaction byte source faulted"),
        }
    }
}

impl std::error::Error for TxError {}

/// Signing-layer failures that are not transaction-format errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignError {
    /// The chosen nonce produced `r == 0` or `s == 0`; caller should retry with a fresh nonce.
    NonceUnusable,
    /// The RNG subsystem could not produce a nonce.
    RngFailure,
}

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignError::NonceUnusable => write!(f, "nonce unusable, retry with a fresh one"),
            SignError::RngFailure => write!(f, "RNG failure while drawing a nonce"),
        }
    }
}

impl std::error::Error for SignError {}

/// Command-level outcomes that are not tied to one subsystem (§7 "Miscellaneous").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The user pressed cancel during a confirmation dialogue.
    PermissionDeniedUser,
    /// The host is not authorised for the requested command.
    PermissionDeniedHost,
    /// The received packet was malformed.
    InvalidPacket,
    /// A parameter exceeded its allowed size.
    ParameterTooLarge,
    /// A packet arrived that the current state did not expect.
    UnexpectedPacket,
    /// A one-time-password check failed.
    OtpMismatch,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::PermissionDeniedUser => write!(f, "permission denied by user"),
            CommandError::PermissionDeniedHost => write!(f, "permission denied to host"),
            CommandError::InvalidPacket => write!(f, "invalid packet"),
            CommandError::ParameterTooLarge => write!(f, "parameter too large"),
            CommandError::UnexpectedPacket => write!(f, "unexpected packet"),
            CommandError::OtpMismatch => write!(f, "one-time password mismatch"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Umbrella error type that the outermost command handler matches on (§7 "Propagation").
#[derive(Debug)]
pub enum CoreError {
    Nv(NvError),
    Wallet(WalletError),
    Tx(TxError),
    Sign(SignError),
    Command(CommandError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Nv(e) => write!(f, "{e}"),
            CoreError::Wallet(e) => write!(f, "{e}"),
            CoreError::Tx(e) => write!(f, "{e}"),
            CoreError::Sign(e) => write!(f, "{e}"),
            CoreError::Command(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Nv(e) => Some(e),
            CoreError::Wallet(e) => Some(e),
            CoreError::Tx(e) => Some(e),
            CoreError::Sign(e) => Some(e),
            CoreError::Command(e) => Some(e),
        }
    }
}

impl From<NvError> for CoreError {
    fn from(e: NvError) -> Self {
        CoreError::Nv(e)
    }
}

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        CoreError::Wallet(e)
    }
}

impl From<TxError> for CoreError {
    fn from(e: TxError) -> Self {
        CoreError::Tx(e)
    }
}

impl From<SignError> for CoreError {
    fn from(e: SignError) -> Self {
        CoreError::Sign(e)
    }
}

impl From<CommandError> for CoreError {
    fn from(e: CommandError) -> Self {
        CoreError::Command(e)
    }
}
