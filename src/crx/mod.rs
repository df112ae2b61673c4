//! CRX3 signed-container handling
//!
//! The CRLSet snapshot is distributed inside a signed CRX version 3
//! container. This module splits the outer container into its header-proof
//! and payload regions, decodes the protobuf header-proof section, and
//! verifies the payload signature against the key matching a component id.

mod container;
mod errors;
mod proof;
mod verifier;

// Re-export public types
pub use container::{CrxContainer, parse_container};
pub use errors::{FormatError, VerificationError};
pub use proof::{AsymmetricKeyProof, CrxFileHeader, SignedData, decode_header};
pub use verifier::verify_signature;
