//! Shared builders for synthetic CRLSet snapshots and signed containers.

use std::io::{Cursor, Write};

use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::sign::Signer;
use prost::Message;
use ring::digest;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crlset_fetch::crx::{AsymmetricKeyProof, CrxFileHeader, SignedData};

const SIGNATURE_CONTEXT: &[u8] = b"CRX3 SignedData\x00";

/// Encode a binary CRLSet body: length-prefixed JSON header followed by the
/// issuer blocks.
pub fn encode_crl_set(header_json: &str, parents: &[(Vec<u8>, Vec<Vec<u8>>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(header_json.len() as u16).to_le_bytes());
    out.extend_from_slice(header_json.as_bytes());
    for (spki_hash, serials) in parents {
        out.extend_from_slice(spki_hash);
        out.extend_from_slice(&(serials.len() as u32).to_le_bytes());
        for serial in serials {
            out.push(serial.len() as u8);
            out.extend_from_slice(serial);
        }
    }
    out
}

/// Minimal CRLSet header document.
pub fn header_json(sequence: u64, num_parents: usize, not_after: u64) -> String {
    format!(
        r#"{{"ContentType":"CRLSet","Sequence":{sequence},"NumParents":{num_parents},"NotAfter":{not_after},"BlockedSPKIs":[]}}"#
    )
}

/// Wrap data in a one-member ZIP archive named `crl-set`.
pub fn zip_payload(data: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file("crl-set", options).unwrap();
    writer.write_all(data).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Generate a fresh RSA-2048 signing key.
pub fn generate_rsa_key() -> PKey<Private> {
    let rsa = Rsa::generate(2048).unwrap();
    PKey::from_rsa(rsa).unwrap()
}

/// Derive the alphabet-only component id a key's hash prefix encodes.
pub fn component_id_for_key(key: &PKey<Private>) -> String {
    let public_der = key.public_key_to_der().unwrap();
    let hash = digest::digest(&digest::SHA256, &public_der);
    hash.as_ref()[..16]
        .iter()
        .flat_map(|byte| [byte >> 4, byte & 0x0f])
        .map(|nibble| (b'a' + nibble) as char)
        .collect()
}

/// Assemble a signed CRX3 container around `payload`, returning the
/// container bytes and the matching component id.
pub fn build_signed_container(payload: &[u8], key: &PKey<Private>) -> (Vec<u8>, String) {
    let public_der = key.public_key_to_der().unwrap();
    let key_hash = digest::digest(&digest::SHA256, &public_der);

    let signed_data = SignedData {
        crx_id: key_hash.as_ref()[..16].to_vec(),
    };
    let signed_header_data = signed_data.encode_to_vec();

    let mut signer = Signer::new(MessageDigest::sha256(), key).unwrap();
    signer.update(SIGNATURE_CONTEXT).unwrap();
    signer
        .update(&(signed_header_data.len() as u32).to_le_bytes())
        .unwrap();
    signer.update(&signed_header_data).unwrap();
    signer.update(payload).unwrap();
    let signature = signer.sign_to_vec().unwrap();

    let header = CrxFileHeader {
        sha256_with_rsa: vec![AsymmetricKeyProof {
            public_key: public_der,
            signature,
        }],
        sha256_with_ecdsa: Vec::new(),
        signed_header_data: Some(signed_header_data),
    };
    let header_bytes = header.encode_to_vec();

    let mut container = Vec::new();
    container.extend_from_slice(b"Cr24");
    container.extend_from_slice(&3u32.to_le_bytes());
    container.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    container.extend_from_slice(&header_bytes);
    container.extend_from_slice(payload);

    (container, component_id_for_key(key))
}

/// Full synthetic container for a CRLSet with the given sequence and expiry.
pub fn build_crl_set_container(
    key: &PKey<Private>,
    sequence: u64,
    not_after: u64,
    parents: &[(Vec<u8>, Vec<Vec<u8>>)],
) -> (Vec<u8>, String) {
    let body = encode_crl_set(&header_json(sequence, parents.len(), not_after), parents);
    let payload = zip_payload(&body);
    build_signed_container(&payload, key)
}
