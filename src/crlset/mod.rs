//! CRLSet revocation snapshot
//!
//! The trusted container payload embeds a length-prefixed binary revocation
//! table: a JSON header followed by per-issuer blocks of revoked serial
//! numbers. This module parses that table and exposes the immutable,
//! queryable [`CrlSet`] built from it.

mod errors;
mod parser;
mod types;

// Re-export public types
pub use errors::{CrlSetError, CrlSetResult, Truncated};
pub use parser::{parse_crl_set, parse_header_prefix};
pub use types::{CrlSet, RevocationHeader, RevocationIndex, RevocationStatus};
