//! Freshness control for the single cached revocation snapshot.
//!
//! [`CrlSetUpdater`] owns the cache cell and serializes refresh decisions:
//! the expiry check, any network activity, and the cache write happen under
//! one lock so overlapping callers cannot trigger duplicate downloads.
//! Snapshots themselves are immutable and handed out as `Arc`s, so cache
//! replacement never invalidates a previously returned value.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::archive::{self, ArchiveError, CRL_SET_ENTRY};
use crate::crlset::{CrlSet, CrlSetError, parse_crl_set, parse_header_prefix};
use crate::crx::{self, FormatError, VerificationError};
use crate::fetch::{ContainerFetcher, FetchError};

/// Default size of the partial fetch used for the sequence probe. Covers the
/// container prefix, header-proof section, and the snapshot's JSON header.
const DEFAULT_PROBE_BYTES: usize = 8192;

/// How `load_latest` decides whether the cached snapshot is good enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Probe the remote sequence number on every call.
    Always,
    /// Only refresh once the cached snapshot passes its NotAfter time.
    OnExpiry,
}

/// Update pipeline errors
///
/// Every stage fails fast; a truncated or tampered snapshot is never
/// partially trusted, and a verification failure never falls back to
/// unverified data.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("fetching container failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("malformed container: {0}")]
    Format(#[from] FormatError),

    #[error("container header-proof section is not a valid protobuf: {0}")]
    HeaderProof(#[from] prost::DecodeError),

    #[error("signature verification failed: {0}")]
    Verification(#[from] VerificationError),

    #[error("container signature did not verify")]
    SignatureMismatch,

    #[error("extracting the snapshot archive member failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("malformed CRLSet: {0}")]
    CrlSet(#[from] CrlSetError),
}

/// Convenient Result type alias
pub type UpdateResult<T> = Result<T, UpdateError>;

/// Owns the cached [`CrlSet`] and refreshes it through the full trust
/// pipeline when the update policy calls for it.
pub struct CrlSetUpdater<F> {
    fetcher: F,
    component_id: String,
    probe_bytes: usize,
    cache: Mutex<Option<Arc<CrlSet>>>,
}

impl<F: ContainerFetcher> CrlSetUpdater<F> {
    pub fn new(fetcher: F, component_id: impl Into<String>) -> Self {
        Self {
            fetcher,
            component_id: component_id.into(),
            probe_bytes: DEFAULT_PROBE_BYTES,
            cache: Mutex::new(None),
        }
    }

    /// Override the partial-fetch size used by the sequence probe.
    pub fn with_probe_bytes(mut self, probe_bytes: usize) -> Self {
        self.probe_bytes = probe_bytes;
        self
    }

    /// The cached snapshot, if any, without touching the network.
    pub async fn cached(&self) -> Option<Arc<CrlSet>> {
        self.cache.lock().await.clone()
    }

    /// Drop the cached snapshot; the next `load_latest` runs the pipeline.
    pub async fn reset(&self) {
        self.cache.lock().await.take();
    }

    /// Return the latest snapshot per the update policy, running the fetch /
    /// verify / parse pipeline when needed.
    ///
    /// With `verify` set, a container whose signature does not match fails
    /// with [`UpdateError::SignatureMismatch`]; unverified data is never
    /// served in its place.
    pub async fn load_latest(
        &self,
        verify: bool,
        policy: UpdatePolicy,
    ) -> UpdateResult<Arc<CrlSet>> {
        let mut cache = self.cache.lock().await;

        if let Some(current) = cache.as_ref() {
            let now = Utc::now().timestamp().max(0) as u64;
            if current.is_expired_at(now) {
                info!(
                    "Cached CRLSet sequence {} has expired, refreshing",
                    current.sequence()
                );
            } else {
                match policy {
                    UpdatePolicy::OnExpiry => {
                        debug!("Returning cached CRLSet sequence {}", current.sequence());
                        return Ok(Arc::clone(current));
                    }
                    UpdatePolicy::Always => {
                        let remote_sequence = self.probe_remote_sequence().await?;
                        if remote_sequence <= current.sequence() {
                            debug!(
                                "Remote sequence {} is not newer than cached {}",
                                remote_sequence,
                                current.sequence()
                            );
                            return Ok(Arc::clone(current));
                        }
                        info!(
                            "Remote sequence {} supersedes cached {}",
                            remote_sequence,
                            current.sequence()
                        );
                    }
                }
            }
        }

        let fresh = Arc::new(self.run_pipeline(verify).await?);
        *cache = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// Lightweight probe: partial fetch, container framing, snapshot header.
    async fn probe_remote_sequence(&self) -> UpdateResult<u64> {
        let prefix = self.fetcher.fetch_partial_container(self.probe_bytes).await?;
        let container = crx::parse_container(&prefix)?;
        let entry_prefix = archive::extract_entry_prefix(container.payload, CRL_SET_ENTRY)?;
        let header = parse_header_prefix(&entry_prefix)?;
        Ok(header.sequence)
    }

    async fn run_pipeline(&self, verify: bool) -> UpdateResult<CrlSet> {
        let bytes = self.fetcher.fetch_full_container().await?;
        let container = crx::parse_container(&bytes)?;

        if verify {
            let header_proof = crx::decode_header(container.header_bytes)?;
            if !crx::verify_signature(&header_proof, container.payload, &self.component_id)? {
                warn!(
                    "Container signature did not verify for component {}",
                    self.component_id
                );
                return Err(UpdateError::SignatureMismatch);
            }
            debug!("Container signature verified");
        }

        let raw = archive::extract_entry(container.payload, CRL_SET_ENTRY)?;
        let (header, revocations) = parse_crl_set(&raw)?;
        info!(
            "Loaded CRLSet sequence {} ({} issuers, {} blocked SPKIs)",
            header.sequence,
            revocations.len(),
            header.blocked_spkis.len()
        );
        Ok(CrlSet::new(header, revocations))
    }
}
