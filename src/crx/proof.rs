//! Protobuf schema for the container's header-proof section, mirrored from
//! the CRX3 format's `crx3.proto`.

use prost::Message;

/// Decoded header-proof section of a CRX3 container.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CrxFileHeader {
    /// RSA proofs, in container order.
    #[prost(message, repeated, tag = "2")]
    pub sha256_with_rsa: Vec<AsymmetricKeyProof>,
    /// ECDSA proofs, in container order.
    #[prost(message, repeated, tag = "3")]
    pub sha256_with_ecdsa: Vec<AsymmetricKeyProof>,
    /// Bytes covered by every proof signature, alongside the payload.
    #[prost(bytes = "vec", optional, tag = "10000")]
    pub signed_header_data: Option<Vec<u8>>,
}

/// One candidate signing key and its signature over the reconstructed
/// signed message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AsymmetricKeyProof {
    /// SubjectPublicKeyInfo DER bytes of the signing key.
    #[prost(bytes = "vec", tag = "1")]
    pub public_key: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

/// Contents of [`CrxFileHeader::signed_header_data`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedData {
    /// 16-byte component id (the SHA-256 key-hash prefix, raw).
    #[prost(bytes = "vec", tag = "1")]
    pub crx_id: Vec<u8>,
}

/// Decode the header-proof section of a parsed container.
pub fn decode_header(header_bytes: &[u8]) -> Result<CrxFileHeader, prost::DecodeError> {
    CrxFileHeader::decode(header_bytes)
}
