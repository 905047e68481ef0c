//! Confirmation callbacks (spec §6): the interface the device core
//! drives to show output/address/OTP information on the display and
//! wait on the accept/cancel button, without committing to any display
//! or button implementation itself.
//!
//! Shaped after this crate's convention of a trait that describes a
//! collaborator's contract without providing one — callers supply the
//! concrete UI/transport binding.

/// Which command a cancelled confirmation belongs to, so the caller can
/// report a command-specific denial (spec §6, `user_denied`'s argument).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    NewWallet,
    NewAddress,
    SignTransaction,
    Format,
    ChangeName,
    Backup,
    Restore,
    ChangeKey,
    GetMasterKey,
    DeleteWallet,
}

/// A lookup set/spec pair identifying a piece of display text (spec §6,
/// `get_string`/`get_string_length`). The concrete meaning of `set` and
/// `spec` is owned by the display-text table on the other side of this
/// trait; the core only ever passes them through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringRef {
    pub set: u32,
    pub spec: u32,
}

/// Implemented by whatever owns the display and the accept/cancel
/// button. The device core calls these during transaction review and
/// wallet-management commands; none of them are implemented here.
pub trait Confirmation {
    /// Present one output for review. Returns `true` if the outputs
    /// buffer is already full (spec §6: "true on overflow").
    fn new_output_seen(&mut self, amount_text: &str, address_text: &str) -> bool;

    /// Reset the outputs-seen buffer, e.g. before parsing a new transaction.
    fn clear_outputs_seen(&mut self);

    /// Block until the user accepts or cancels. Returns `true` if the
    /// user cancelled.
    fn user_denied(&mut self, command: CommandKind) -> bool;

    /// Show an address for review, alongside the multisig parameters
    /// that apply to it (`1`/`1` for a plain P2PKH address).
    fn display_address(&mut self, text: &str, num_sigs: u32, num_pubkeys: u32);

    /// Show a one-time-password challenge tied to `command`.
    fn display_otp(&mut self, command: CommandKind, text: &str);

    /// Clear whatever `display_otp` put on the screen.
    fn clear_otp(&mut self);

    /// Look up one byte of display text at `pos` within `(set, spec)`.
    fn get_string(&self, reference: StringRef, pos: usize) -> Option<u8>;

    /// Total length of the text identified by `(set, spec)`.
    fn get_string_length(&self, reference: StringRef) -> usize;
}
