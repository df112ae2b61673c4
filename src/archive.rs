//! ZIP payload collaborator
//!
//! The container payload is a ZIP archive with a single interesting member,
//! `crl-set`. Full extraction goes through [`zip::ZipArchive`]; the
//! sequence probe only ever holds a payload prefix, so it reads the local
//! file header directly and inflates whatever the truncated body yields.

use std::io::{Cursor, Read};

use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

/// Name of the archive member carrying the revocation snapshot.
pub const CRL_SET_ENTRY: &str = "crl-set";

/// Fixed-size portion of a ZIP local file header.
const LOCAL_HEADER_LEN: usize = 30;
/// `PK\x03\x04`
const LOCAL_HEADER_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
/// ZIP compression method ids
const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;

/// Upper bound on the extraction pre-allocation; the buffer still grows past
/// this from bytes actually read.
const SIZE_HINT_CAP: u64 = 1 << 20;

/// Archive-related errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("archive has no entry named {0:?}")]
    EntryNotFound(String),

    #[error("payload is not a valid ZIP archive: {0}")]
    Zip(#[from] ZipError),

    #[error("failed to read archive entry: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract a named member from a complete ZIP payload.
pub fn extract_entry(payload: &[u8], name: &str) -> Result<Vec<u8>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(payload))?;
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(ArchiveError::EntryNotFound(name.to_string())),
        Err(e) => return Err(e.into()),
    };

    // entry.size() is archive metadata, not ground truth; cap the hint
    let mut contents = Vec::with_capacity(entry.size().min(SIZE_HINT_CAP) as usize);
    entry.read_to_end(&mut contents)?;
    debug!("Extracted {} bytes from archive entry {:?}", contents.len(), name);
    Ok(contents)
}

/// Best-effort extraction of a member's leading bytes from a payload prefix.
///
/// The prefix only has to cover the first local file header and enough of
/// the body for the caller's needs; the central directory at the end of the
/// archive is never consulted. Returns as many decompressed bytes as the
/// truncated body yields.
pub fn extract_entry_prefix(payload_prefix: &[u8], name: &str) -> Result<Vec<u8>, ArchiveError> {
    if payload_prefix.len() < LOCAL_HEADER_LEN
        || payload_prefix[..LOCAL_HEADER_MAGIC.len()] != LOCAL_HEADER_MAGIC
    {
        return Err(ArchiveError::Zip(ZipError::InvalidArchive(
            "payload prefix does not start with a local file header",
        )));
    }

    let method = u16::from_le_bytes([payload_prefix[8], payload_prefix[9]]);
    let name_len =
        u16::from_le_bytes([payload_prefix[26], payload_prefix[27]]) as usize;
    let extra_len =
        u16::from_le_bytes([payload_prefix[28], payload_prefix[29]]) as usize;

    let name_end = LOCAL_HEADER_LEN + name_len;
    if payload_prefix.len() < name_end {
        return Err(ArchiveError::Zip(ZipError::InvalidArchive(
            "payload prefix ends inside the entry name",
        )));
    }
    if &payload_prefix[LOCAL_HEADER_LEN..name_end] != name.as_bytes() {
        return Err(ArchiveError::EntryNotFound(name.to_string()));
    }

    let data_start = name_end.saturating_add(extra_len);
    let body = payload_prefix.get(data_start..).unwrap_or(&[]);

    match method {
        METHOD_STORED => Ok(body.to_vec()),
        METHOD_DEFLATED => Ok(inflate_prefix(body)),
        _ => Err(ArchiveError::Zip(ZipError::UnsupportedArchive(
            "entry uses an unsupported compression method",
        ))),
    }
}

/// Inflate a possibly-truncated raw-deflate stream, keeping whatever
/// decompressed cleanly before the cut.
fn inflate_prefix(body: &[u8]) -> Vec<u8> {
    let mut decoder = flate2::read::DeflateDecoder::new(body);
    let mut out = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match decoder.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(_) => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::CompressionMethod;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn build_zip(name: &str, data: &[u8], method: CompressionMethod) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(method);
        writer.start_file(name, options).unwrap();
        writer.write_all(data).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_entry() {
        let zip = build_zip("crl-set", b"snapshot-bytes", CompressionMethod::Deflated);
        let extracted = extract_entry(&zip, CRL_SET_ENTRY).unwrap();
        assert_eq!(extracted, b"snapshot-bytes");
    }

    #[test]
    fn test_extract_entry_not_found() {
        let zip = build_zip("other", b"data", CompressionMethod::Deflated);
        assert!(matches!(
            extract_entry(&zip, CRL_SET_ENTRY),
            Err(ArchiveError::EntryNotFound(name)) if name == "crl-set"
        ));
    }

    #[test]
    fn test_forged_uncompressed_size_does_not_drive_allocation() {
        let mut zip = build_zip("crl-set", b"tiny", CompressionMethod::Deflated);
        // Patch the central directory record to declare a ~4 GiB entry; the
        // uncompressed-size field sits 24 bytes past the PK\x01\x02 signature
        let cd = zip
            .windows(4)
            .position(|w| w == [0x50, 0x4b, 0x01, 0x02])
            .unwrap();
        zip[cd + 24..cd + 28].copy_from_slice(&0xffff_fff0u32.to_le_bytes());

        let extracted = extract_entry(&zip, CRL_SET_ENTRY).unwrap();
        assert_eq!(extracted, b"tiny");
    }

    #[test]
    fn test_extract_entry_bad_payload() {
        assert!(matches!(
            extract_entry(b"not a zip", CRL_SET_ENTRY),
            Err(ArchiveError::Zip(_))
        ));
    }

    #[test]
    fn test_prefix_stored_entry() {
        let zip = build_zip("crl-set", b"stored-contents", CompressionMethod::Stored);
        // Cut off the central directory entirely
        let cut = LOCAL_HEADER_LEN + "crl-set".len() + b"stored-contents".len();
        let extracted = extract_entry_prefix(&zip[..cut], CRL_SET_ENTRY).unwrap();
        assert_eq!(extracted, b"stored-contents");
    }

    #[test]
    fn test_prefix_truncated_deflate() {
        let data: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
        let zip = build_zip("crl-set", &data, CompressionMethod::Deflated);
        // Keep the local header plus part of the compressed body
        let cut = (zip.len() / 2).max(LOCAL_HEADER_LEN + "crl-set".len());
        let extracted = extract_entry_prefix(&zip[..cut], CRL_SET_ENTRY).unwrap();
        assert!(!extracted.is_empty());
        assert_eq!(extracted[..], data[..extracted.len()]);
    }

    #[test]
    fn test_prefix_wrong_name() {
        let zip = build_zip("other", b"data", CompressionMethod::Stored);
        assert!(matches!(
            extract_entry_prefix(&zip, CRL_SET_ENTRY),
            Err(ArchiveError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_prefix_not_a_local_header() {
        assert!(matches!(
            extract_entry_prefix(b"garbage that is long enough to scan here", CRL_SET_ENTRY),
            Err(ArchiveError::Zip(_))
        ));
    }
}
