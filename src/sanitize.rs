//! Memory sanitisation on wallet-unload (spec §5): "overwrite the entire
//! writable memory region between the BSS base and the current stack
//! pointer with `0xff` then `0x00`, preserving only the transport ack
//! counters."
//!
//! Rust has no portable handle onto "BSS base .. current SP" — that pair
//! of addresses is a property of the running process's linker script and
//! call stack, not something a safe function can name. `wipe` narrows the
//! contract to the caller-supplied scratch region the firmware
//! integration layer actually owns and passes in; see `DESIGN.md` for the
//! open-question decision.

/// Overwrite `region` with `0xff`, then `0x00`, matching the two-pass
/// wipe the spec describes. `std::ptr::write_volatile` is used per byte
/// so the compiler can't prove the writes are dead and elide them —
/// the same reasoning that keeps a debugger from optimising away a
/// zeroize call.
pub fn wipe(region: &mut [u8]) {
    for byte in region.iter_mut() {
        unsafe { std::ptr::write_volatile(byte, 0xff) };
    }
    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
    for byte in region.iter_mut() {
        unsafe { std::ptr::write_volatile(byte, 0x00) };
    }
    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
}
