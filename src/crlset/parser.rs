use std::collections::HashMap;

use tracing::debug;

use super::errors::{CrlSetResult, Truncated};
use super::types::{RevocationHeader, RevocationIndex};

/// Length of an issuer SPKI SHA-256 hash in the binary body.
const SPKI_HASH_LEN: usize = 32;

/// Bounds-checked cursor over the snapshot body. Every read names the
/// boundary it would fall off, so truncation surfaces as the right
/// [`Truncated`] variant.
struct Body<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Body<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize, boundary: Truncated) -> Result<&'a [u8], Truncated> {
        let end = self.pos.checked_add(len).ok_or(boundary)?;
        if end > self.bytes.len() {
            return Err(boundary);
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self, boundary: Truncated) -> Result<u8, Truncated> {
        Ok(self.take(1, boundary)?[0])
    }

    fn read_u16_le(&mut self, boundary: Truncated) -> Result<u16, Truncated> {
        let bytes = self.take(2, boundary)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32_le(&mut self, boundary: Truncated) -> Result<u32, Truncated> {
        let bytes = self.take(4, boundary)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

/// Parse the embedded binary revocation table into its header and index.
///
/// Walks the layout strictly sequentially: a little-endian u16 header
/// length, the JSON header, then exactly `NumParents` issuer blocks of
/// `32-byte SPKI hash, u32 serial count, (u8 length, serial bytes)*`.
/// Hashes and serials are stored as lower-case hex. Trailing bytes past the
/// last declared block are not an error.
pub fn parse_crl_set(bytes: &[u8]) -> CrlSetResult<(RevocationHeader, RevocationIndex)> {
    let mut body = Body::new(bytes);
    let header = parse_header(&mut body)?;

    // NumParents is untrusted; the capacity hint must never exceed what the
    // remaining bytes could hold (each issuer block is at least hash + count)
    let fitting_blocks = body.remaining() / (SPKI_HASH_LEN + 4);
    let mut revocations: RevocationIndex =
        HashMap::with_capacity((header.num_parents as usize).min(fitting_blocks));
    for _ in 0..header.num_parents {
        let spki_hash = hex::encode(body.take(SPKI_HASH_LEN, Truncated::SpkiHash)?);
        let serial_count = body.read_u32_le(Truncated::SerialCount)?;

        let serials = revocations.entry(spki_hash).or_default();
        for _ in 0..serial_count {
            let serial_len = body.read_u8(Truncated::SerialLength)? as usize;
            serials.insert(hex::encode(body.take(serial_len, Truncated::SerialNumber)?));
        }
    }

    debug!(
        "Parsed CRLSet sequence {} with {} issuer blocks",
        header.sequence,
        revocations.len()
    );
    Ok((header, revocations))
}

/// Parse only the length-prefixed JSON header.
///
/// Used by the sequence probe, which holds just a prefix of the snapshot.
pub fn parse_header_prefix(bytes: &[u8]) -> CrlSetResult<RevocationHeader> {
    parse_header(&mut Body::new(bytes))
}

fn parse_header(body: &mut Body<'_>) -> CrlSetResult<RevocationHeader> {
    let header_len = body.read_u16_le(Truncated::HeaderLength)? as usize;
    let header_bytes = body.take(header_len, Truncated::HeaderContent)?;
    Ok(serde_json::from_slice(header_bytes)?)
}
