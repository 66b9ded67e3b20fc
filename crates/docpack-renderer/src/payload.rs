//! Compressed page payloads.
//!
//! Rendered HTML is stored in the bundle as raw DEFLATE (no zlib header)
//! encoded with standard base64. Browsers inflate it with
//! `DecompressionStream("deflate-raw")`.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

/// Error returned when a payload cannot be produced or restored.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// Payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    /// Compression or inflation failed.
    #[error("deflate stream error: {0}")]
    Deflate(#[from] std::io::Error),
    /// Inflated bytes are not UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Compress text with raw DEFLATE at maximum level and encode as base64.
pub fn compress_text(text: &str) -> Result<String, PayloadError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

/// Decode a base64 raw DEFLATE payload back into text.
pub fn decompress_text(payload: &str) -> Result<String, PayloadError> {
    let compressed = STANDARD.decode(payload)?;
    let mut decoder = DeflateDecoder::new(compressed.as_slice());
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}
