use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::sign::Verifier;
use ring::digest;
use tracing::debug;

use super::errors::VerificationError;
use super::proof::CrxFileHeader;

/// Context string prepended to every CRX3 signed message, NUL included.
const SIGNATURE_CONTEXT: &[u8] = b"CRX3 SignedData\x00";
/// A component id encodes this many bytes of the SHA-256 key hash.
const KEY_HASH_PREFIX_LEN: usize = 16;

/// Verify the container signature for the component identified by
/// `component_id`.
///
/// Scans the RSA proofs, then the ECDSA proofs, for the key whose SHA-256
/// hash prefix matches the component id; that proof supplies the key and
/// signature. The signed message is reconstructed as
/// `context || le32(len(signed_header_data)) || signed_header_data || payload`.
///
/// Returns `Ok(false)` for a cryptographic mismatch. The verification
/// algorithm follows the key type of the matching proof (RSA PKCS#1 v1.5
/// SHA-256 or ECDSA SHA-256).
///
/// # Errors
///
/// Fails with [`VerificationError::MissingSignedData`] if the header has no
/// signed header data, and [`VerificationError::NoMatchingKey`] if no proof
/// matches the component id.
pub fn verify_signature(
    header: &CrxFileHeader,
    payload: &[u8],
    component_id: &str,
) -> Result<bool, VerificationError> {
    let signed_header_data = header
        .signed_header_data
        .as_deref()
        .ok_or(VerificationError::MissingSignedData)?;

    let expected_hash = component_id_to_key_hash(component_id)?;

    let proof = header
        .sha256_with_rsa
        .iter()
        .chain(header.sha256_with_ecdsa.iter())
        .find(|proof| key_hash_prefix(&proof.public_key) == expected_hash)
        .ok_or(VerificationError::NoMatchingKey)?;

    let public_key = PKey::public_key_from_der(&proof.public_key)?;
    let mut verifier = Verifier::new(MessageDigest::sha256(), &public_key)?;
    verifier.update(SIGNATURE_CONTEXT)?;
    verifier.update(&(signed_header_data.len() as u32).to_le_bytes())?;
    verifier.update(signed_header_data)?;
    verifier.update(payload)?;

    let is_valid = verifier.verify(&proof.signature)?;
    debug!(
        "Container signature for component {} verified: {}",
        component_id, is_valid
    );
    Ok(is_valid)
}

/// Lower-case hex of the first 16 bytes of SHA-256 over the raw key bytes.
fn key_hash_prefix(public_key: &[u8]) -> String {
    let hash = digest::digest(&digest::SHA256, public_key);
    hex::encode(&hash.as_ref()[..KEY_HASH_PREFIX_LEN])
}

/// Convert an alphabet-only component id into the key-hash prefix it encodes.
///
/// Each character maps to the hex nibble `c - 'a'`, so the 32-character id is
/// a base-16-in-base-26 encoding of the 16-byte key-hash prefix.
fn component_id_to_key_hash(component_id: &str) -> Result<String, VerificationError> {
    if component_id.len() != 2 * KEY_HASH_PREFIX_LEN {
        return Err(VerificationError::InvalidComponentId);
    }

    component_id
        .chars()
        .map(|c| match c {
            'a'..='p' => {
                char::from_digit(c as u32 - 'a' as u32, 16)
                    .ok_or(VerificationError::InvalidComponentId)
            }
            _ => Err(VerificationError::InvalidComponentId),
        })
        .collect()
}
