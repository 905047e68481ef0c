//! Transaction parser and signer (component C8): a streaming Bitcoin
//! transaction validator, sig-hash computer, and DER signature emitter.

pub mod parser;
pub mod signer;

pub use parser::{parse_transaction, OutputSink, ParsedTransaction};
pub use signer::{der_encode_signature, sign_with_retry, NonceSource};
