use thiserror::Error;

/// The binary-body boundary at which a truncated snapshot ended early.
///
/// Always indicates the input ran out of bytes, never a logic bug.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncated {
    #[error("input ends before the header length prefix")]
    HeaderLength,

    #[error("input ends before the declared header content")]
    HeaderContent,

    #[error("input ends inside an issuer SPKI hash")]
    SpkiHash,

    #[error("input ends before a serial count")]
    SerialCount,

    #[error("input ends before a serial length byte")]
    SerialLength,

    #[error("input ends inside a serial number")]
    SerialNumber,
}

/// CRLSet parsing errors
#[derive(Error, Debug)]
pub enum CrlSetError {
    #[error("truncated CRLSet: {0}")]
    Truncated(#[from] Truncated),

    #[error("CRLSet header is not valid JSON: {0}")]
    Header(#[from] serde_json::Error),
}

/// Convenient Result type alias
pub type CrlSetResult<T> = Result<T, CrlSetError>;
