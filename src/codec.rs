//! Slab wire-format codec
//!
//! Encodes a placement document into the client's exchange string and
//! decodes the same format back. The uncompressed layout is:
//!
//! - 6 magic bytes `CE FA CE D1 02 00`
//! - unique asset count, u32 little-endian
//! - one 20-byte entry per asset: the UUID in mixed-endian group order
//!   (4 LE, 2 LE, 2 LE, 2 BE, 6 BE) followed by the instance count as
//!   u32 little-endian
//! - one 8-byte little-endian record per placement, grouped by asset in
//!   document order: bits [0,16) x, [18,34) z, [36,52) y, [54,62) rot/15,
//!   with zeroed padding bits between fields
//! - 2 zero padding bytes
//!
//! The whole buffer is gzipped at maximum compression with a zeroed
//! timestamp (so output is reproducible), base64-encoded, and wrapped in
//! triple backticks. Counts are always recomputed from the instance lists;
//! whatever the caller stored is ignored.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use uuid::Uuid;

use crate::slab::{AssetBucket, PlacementInstance, SlabDocument};

const MAGIC: [u8; 6] = [0xCE, 0xFA, 0xCE, 0xD1, 0x02, 0x00];
const PADDING: [u8; 2] = [0x00, 0x00];
const HEADER_LEN: usize = 10;
const ASSET_ENTRY_LEN: usize = 20;
const POSITION_ENTRY_LEN: usize = 8;
const DELIMITER: &str = "```";

/// Hard ceiling the client places on one slab's compressed payload.
pub const MAX_COMPRESSED_BYTES: usize = 30720;

/// Returned instead of a payload when the compressed size exceeds
/// [`MAX_COMPRESSED_BYTES`]. Callers must treat it as an error signal, not
/// as a degenerate document.
pub const OVERSIZED_SENTINEL: &str = "``````";

/// Codec failures.
#[derive(Debug)]
pub enum CodecError {
    /// Decode input that cannot be a slab: bad delimiters, bad base64 or
    /// gzip, bad magic, or byte counts inconsistent with the declared
    /// asset/instance counts.
    Malformed(String),
    /// A rotation that is not a multiple of 15 degrees cannot round-trip
    /// through the 8-bit wire field.
    InvalidRotation { asset: Uuid, rot: u32 },
    /// I/O failure from the compression layer.
    Io(std::io::Error),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Malformed(msg) => write!(f, "malformed wire input: {}", msg),
            CodecError::InvalidRotation { asset, rot } => {
                write!(f, "rotation {} on asset {} is not a multiple of 15", rot, asset)
            }
            CodecError::Io(e) => write!(f, "compression i/o error: {}", e),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        CodecError::Io(e)
    }
}

// ----------------------------------------------------------------------
// Encode
// ----------------------------------------------------------------------

/// Encode a document into the wire string, or [`OVERSIZED_SENTINEL`] when
/// the compressed payload exceeds the client's size ceiling.
pub fn encode(document: &SlabDocument) -> Result<String, CodecError> {
    let raw = encode_raw(document)?;

    let mut encoder = GzBuilder::new().mtime(0).write(Vec::new(), Compression::best());
    encoder.write_all(&raw)?;
    let compressed = encoder.finish()?;

    if compressed.len() > MAX_COMPRESSED_BYTES {
        return Ok(OVERSIZED_SENTINEL.to_string());
    }

    Ok(format!("{}{}{}", DELIMITER, BASE64.encode(&compressed), DELIMITER))
}

/// The uncompressed byte layout of a document. Exposed separately so tests
/// can compare against reference payloads below the (implementation-
/// dependent) deflate layer.
pub fn encode_raw(document: &SlabDocument) -> Result<Vec<u8>, CodecError> {
    let buckets = document.buckets();
    let total_instances: usize = buckets.iter().map(|b| b.instances.len()).sum();

    let mut out = Vec::with_capacity(
        HEADER_LEN + buckets.len() * ASSET_ENTRY_LEN + total_instances * POSITION_ENTRY_LEN + 2,
    );

    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&(buckets.len() as u32).to_le_bytes());

    for bucket in buckets {
        out.extend_from_slice(&bucket.id.to_bytes_le());
        out.extend_from_slice(&(bucket.instances.len() as u32).to_le_bytes());
    }

    for bucket in buckets {
        for instance in &bucket.instances {
            out.extend_from_slice(&pack_instance(bucket.id, instance)?.to_le_bytes());
        }
    }

    out.extend_from_slice(&PADDING);
    Ok(out)
}

fn pack_instance(asset: Uuid, instance: &PlacementInstance) -> Result<u64, CodecError> {
    if instance.rot % 15 != 0 {
        return Err(CodecError::InvalidRotation { asset, rot: instance.rot });
    }

    let mut blob = 0u64;
    blob |= u64::from(instance.x & 0xFFFF);
    blob |= u64::from(instance.z & 0xFFFF) << 18;
    blob |= u64::from(instance.y & 0xFFFF) << 36;
    blob |= u64::from((instance.rot / 15) & 0xFF) << 54;
    Ok(blob)
}

// ----------------------------------------------------------------------
// Decode
// ----------------------------------------------------------------------

/// Decode a wire string back into a document. Never partially parses:
/// anything inconsistent fails with [`CodecError::Malformed`].
pub fn decode(input: &str) -> Result<SlabDocument, CodecError> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix(DELIMITER)
        .and_then(|s| s.strip_suffix(DELIMITER))
        .ok_or_else(|| CodecError::Malformed("missing backtick delimiters".into()))?;

    if body.is_empty() {
        return Err(CodecError::Malformed(
            "empty payload (oversized-output sentinel is not a document)".into(),
        ));
    }

    let compressed = BASE64
        .decode(body)
        .map_err(|e| CodecError::Malformed(format!("invalid base64: {}", e)))?;

    let mut raw = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut raw)
        .map_err(|e| CodecError::Malformed(format!("invalid gzip payload: {}", e)))?;

    decode_raw(&raw)
}

/// Decode the uncompressed byte layout.
pub fn decode_raw(raw: &[u8]) -> Result<SlabDocument, CodecError> {
    if raw.len() < HEADER_LEN {
        return Err(CodecError::Malformed(format!(
            "payload is {} bytes, shorter than the {}-byte header",
            raw.len(),
            HEADER_LEN
        )));
    }
    if raw[..MAGIC.len()] != MAGIC {
        return Err(CodecError::Malformed("bad magic bytes".into()));
    }

    let mut count_bytes = [0u8; 4];
    count_bytes.copy_from_slice(&raw[MAGIC.len()..HEADER_LEN]);
    let asset_count = u32::from_le_bytes(count_bytes) as usize;

    let asset_list_len = asset_count
        .checked_mul(ASSET_ENTRY_LEN)
        .filter(|len| HEADER_LEN + len <= raw.len())
        .ok_or_else(|| {
            CodecError::Malformed(format!("asset list truncated ({} entries declared)", asset_count))
        })?;

    let mut document = SlabDocument::new();
    let mut declared_counts = Vec::with_capacity(asset_count);
    for i in 0..asset_count {
        let entry = &raw[HEADER_LEN + i * ASSET_ENTRY_LEN..HEADER_LEN + (i + 1) * ASSET_ENTRY_LEN];
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes.copy_from_slice(&entry[..16]);
        let mut instance_bytes = [0u8; 4];
        instance_bytes.copy_from_slice(&entry[16..]);

        document.push_bucket(AssetBucket::new(Uuid::from_bytes_le(uuid_bytes)));
        declared_counts.push(u32::from_le_bytes(instance_bytes) as usize);
    }

    let positions = &raw[HEADER_LEN + asset_list_len..];
    let total_instances: usize = declared_counts.iter().sum();
    let expected = total_instances * POSITION_ENTRY_LEN + PADDING.len();
    if positions.len() != expected {
        return Err(CodecError::Malformed(format!(
            "{} position bytes for {} declared instances (expected {})",
            positions.len(),
            total_instances,
            expected
        )));
    }

    // Each 8-byte chunk belongs to the asset whose cumulative count range
    // contains its ordinal; consuming counts in document order is the same
    // attribution.
    let mut offset = 0;
    let mut rebuilt = SlabDocument::new();
    for (bucket, declared) in document.buckets().iter().zip(declared_counts) {
        let mut instances = Vec::with_capacity(declared);
        for _ in 0..declared {
            let mut chunk = [0u8; POSITION_ENTRY_LEN];
            chunk.copy_from_slice(&positions[offset..offset + POSITION_ENTRY_LEN]);
            instances.push(unpack_instance(u64::from_le_bytes(chunk)));
            offset += POSITION_ENTRY_LEN;
        }
        rebuilt.push_bucket(AssetBucket::with_instances(bucket.id, instances));
    }

    Ok(rebuilt)
}

fn unpack_instance(blob: u64) -> PlacementInstance {
    PlacementInstance {
        x: (blob & 0xFFFF) as u32,
        z: ((blob >> 18) & 0xFFFF) as u32,
        y: ((blob >> 36) & 0xFFFF) as u32,
        rot: (blob >> 54) as u32 * 15,
    }
}
