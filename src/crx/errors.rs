use thiserror::Error;

/// Structural errors from the outer container framing
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    #[error("container does not start with the Cr24 magic tag")]
    BadMagic,

    #[error("unsupported container version: {0}")]
    UnsupportedVersion(u32),

    #[error("declared header length exceeds the container size")]
    HeaderLengthOverflow,
}

/// Structural errors from signature verification
///
/// A signature that simply does not match is reported as `Ok(false)` by the
/// verifier, never as one of these variants.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("container header carries no signed header data")]
    MissingSignedData,

    #[error("component id must be 32 characters in 'a'..='p'")]
    InvalidComponentId,

    #[error("no signing key matches the component id")]
    NoMatchingKey,

    #[error("crypto backend failure: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),
}
