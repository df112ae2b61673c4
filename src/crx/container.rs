use super::errors::FormatError;

/// ASCII magic tag at the start of every CRX container.
const CRX_MAGIC: &[u8; 4] = b"Cr24";
/// The only container version this crate accepts.
const CRX_VERSION: u32 = 3;
/// Fixed bytes before the header-proof section: magic, version, header length.
const CRX_PREFIX_LEN: usize = 12;

/// Outer signed container split into its header-proof and payload regions.
///
/// Both fields borrow from the input buffer; nothing is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrxContainer<'a> {
    /// Protobuf-encoded header-proof section.
    pub header_bytes: &'a [u8],
    /// Opaque payload (the ZIP archive bytes), untouched.
    pub payload: &'a [u8],
}

/// Validate the outer container framing and split it into header and payload.
///
/// Performs no cryptography; it is the structural precondition for
/// [`verify_signature`](super::verify_signature).
pub fn parse_container(bytes: &[u8]) -> Result<CrxContainer<'_>, FormatError> {
    if bytes.len() < CRX_MAGIC.len() || &bytes[..CRX_MAGIC.len()] != CRX_MAGIC {
        return Err(FormatError::BadMagic);
    }

    if bytes.len() >= 8 {
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != CRX_VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
    }

    // A buffer shorter than the fixed prefix cannot satisfy
    // `12 + header_len <= total_len` for any header length.
    if bytes.len() < CRX_PREFIX_LEN {
        return Err(FormatError::HeaderLengthOverflow);
    }

    let header_len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let header_end = CRX_PREFIX_LEN
        .checked_add(header_len)
        .ok_or(FormatError::HeaderLengthOverflow)?;
    if header_end > bytes.len() {
        return Err(FormatError::HeaderLengthOverflow);
    }

    Ok(CrxContainer {
        header_bytes: &bytes[CRX_PREFIX_LEN..header_end],
        payload: &bytes[header_end..],
    })
}
