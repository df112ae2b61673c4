use std::collections::{HashMap, HashSet};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use tracing::warn;

/// JSON header embedded at the front of the binary revocation table.
///
/// Every field defaults so a degenerate but structurally valid document
/// still parses; validating field values is the consumer's concern, not the
/// binary framer's. `DeltaFrom` and the interception lists are carried
/// through unvalidated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevocationHeader {
    #[serde(default, rename = "Version")]
    pub version: u32,

    #[serde(default, rename = "ContentType")]
    pub content_type: String,

    /// Monotonic snapshot version number.
    #[serde(default, rename = "Sequence")]
    pub sequence: u64,

    /// Delta updates are read but never applied.
    #[serde(default, rename = "DeltaFrom")]
    pub delta_from: u64,

    /// Number of issuer blocks in the binary body.
    #[serde(default, rename = "NumParents")]
    pub num_parents: u32,

    /// Base64-encoded SPKI hashes whose CAs are blocked outright.
    #[serde(default, rename = "BlockedSPKIs")]
    pub blocked_spkis: Vec<String>,

    #[serde(default, rename = "KnownInterceptionSPKIs")]
    pub known_interception_spkis: Vec<String>,

    #[serde(default, rename = "BlockedInterceptionSPKIs")]
    pub blocked_interception_spkis: Vec<String>,

    /// Hard expiry as epoch seconds; zero means the snapshot never expires.
    #[serde(default, rename = "NotAfter")]
    pub not_after: u64,
}

/// Issuer-SPKI hash (lower-case hex) to revoked serials (lower-case hex).
pub type RevocationIndex = HashMap<String, HashSet<String>>;

/// Outcome of a revocation check, broadest match first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationStatus {
    /// Neither the issuer nor the serial is listed.
    Ok,
    /// The issuing CA itself is blocked.
    RevokedBySpki,
    /// This specific serial is listed by its issuer.
    RevokedBySerial,
}

/// Immutable revocation snapshot produced by one successful pipeline run.
///
/// Superseded, never mutated: a newer snapshot replaces the cached value
/// while earlier holders keep querying the one they captured.
#[derive(Debug, Clone)]
pub struct CrlSet {
    header: RevocationHeader,
    sequence: u64,
    revocations: RevocationIndex,
    blocked_spkis: HashSet<String>,
}

impl CrlSet {
    /// Build a snapshot from a parsed header and revocation index.
    ///
    /// The header's base64 blocked-SPKI values are decoded to lower-case hex
    /// once, here; entries that fail to decode are logged and skipped.
    pub fn new(header: RevocationHeader, revocations: RevocationIndex) -> Self {
        let blocked_spkis = header
            .blocked_spkis
            .iter()
            .filter_map(|spki| match BASE64.decode(spki) {
                Ok(raw) => Some(hex::encode(raw)),
                Err(e) => {
                    warn!("Ignoring undecodable blocked SPKI entry: {}", e);
                    None
                }
            })
            .collect();

        Self {
            sequence: header.sequence,
            blocked_spkis,
            header,
            revocations,
        }
    }

    pub fn header(&self) -> &RevocationHeader {
        &self.header
    }

    /// Snapshot version number, denormalized from the header.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn revocations(&self) -> &RevocationIndex {
        &self.revocations
    }

    /// Whether the snapshot must no longer be trusted at `now` (epoch
    /// seconds). A zero `NotAfter` never expires.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.header.not_after != 0 && now >= self.header.not_after
    }

    /// Case-insensitive membership test against the blocked-CA set.
    pub fn is_revoked_by_spki(&self, spki_hash: &str) -> bool {
        self.blocked_spkis.contains(&spki_hash.to_ascii_lowercase())
    }

    /// Case-insensitive lookup of a serial under its issuer.
    ///
    /// An issuer absent from the table simply has no revocations for the
    /// presented certificate, so the answer is `false`, not an error.
    pub fn is_revoked_by_serial(&self, spki_hash: &str, serial: &str) -> bool {
        self.revocations
            .get(&spki_hash.to_ascii_lowercase())
            .is_some_and(|serials| serials.contains(&serial.to_ascii_lowercase()))
    }

    /// Full revocation check: the CA-level block wins over the serial-level
    /// listing.
    pub fn check(&self, spki_hash: &str, serial: &str) -> RevocationStatus {
        if self.is_revoked_by_spki(spki_hash) {
            RevocationStatus::RevokedBySpki
        } else if self.is_revoked_by_serial(spki_hash, serial) {
            RevocationStatus::RevokedBySerial
        } else {
            RevocationStatus::Ok
        }
    }
}
