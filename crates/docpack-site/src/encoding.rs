//! Text encoding detection for markdown sources.
//!
//! Sources are small, so the encoding is decided from the first bytes only:
//! a byte-order mark when present, otherwise a zero second byte marks
//! BOM-less UTF-16LE, and everything else is UTF-8.

use std::path::Path;

/// Error returned when source bytes do not match their detected encoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("invalid UTF-16: {0}")]
    Utf16(#[from] std::string::FromUtf16Error),
    #[error("UTF-16 input has an odd number of bytes ({0})")]
    OddLength(usize),
}

/// Encodings recognised by [`TextEncoding::sniff`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    /// Detect the encoding of `bytes` from their prefix.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes {
            [0xEF, 0xBB, 0xBF, ..] => Self::Utf8Bom,
            [0xFF, 0xFE, ..] => Self::Utf16Le,
            [0xFE, 0xFF, ..] => Self::Utf16Be,
            [_, 0x00, ..] => Self::Utf16Le,
            _ => Self::Utf8,
        }
    }

    /// Length of the byte-order mark this encoding expects at the start.
    #[must_use]
    pub fn bom_len(self) -> usize {
        match self {
            Self::Utf8 => 0,
            Self::Utf8Bom => 3,
            Self::Utf16Le | Self::Utf16Be => 2,
        }
    }

    /// Decode `bytes` with this encoding, dropping the byte-order mark.
    ///
    /// `bytes` must be the same slice that was sniffed: a BOM-less UTF-16LE
    /// input is recognised by its content, so nothing is skipped for it.
    pub fn decode(self, bytes: &[u8]) -> Result<String, DecodeError> {
        let has_bom = match self {
            Self::Utf8 => false,
            Self::Utf8Bom => true,
            Self::Utf16Le => bytes.starts_with(&[0xFF, 0xFE]),
            Self::Utf16Be => bytes.starts_with(&[0xFE, 0xFF]),
        };
        let body = if has_bom {
            &bytes[self.bom_len()..]
        } else {
            bytes
        };

        match self {
            Self::Utf8 | Self::Utf8Bom => Ok(String::from_utf8(body.to_vec())?),
            Self::Utf16Le => decode_utf16(body, u16::from_le_bytes),
            Self::Utf16Be => decode_utf16(body, u16::from_be_bytes),
        }
    }
}

fn decode_utf16(body: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, DecodeError> {
    let chunks = body.chunks_exact(2);
    if !chunks.remainder().is_empty() {
        return Err(DecodeError::OddLength(body.len()));
    }
    let units: Vec<u16> = chunks.map(|pair| unit([pair[0], pair[1]])).collect();
    Ok(String::from_utf16(&units)?)
}

/// Sniff and decode `bytes` in one step.
pub fn decode_text(bytes: &[u8]) -> Result<String, DecodeError> {
    TextEncoding::sniff(bytes).decode(bytes)
}

/// Read a source file, decoding it with the sniffed encoding.
///
/// Bytes that do not match the sniffed encoding are decoded lossily as
/// UTF-8 with a warning, so one damaged file does not stop a build.
pub fn read_text(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    match decode_text(&bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Source re-decoded lossily");
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(text: &str, bom: bool) -> Vec<u8> {
        let mut bytes = if bom { vec![0xFF, 0xFE] } else { Vec::new() };
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_sniff_plain_utf8() {
        assert_eq!(TextEncoding::sniff(b"# Title"), TextEncoding::Utf8);
        assert_eq!(TextEncoding::sniff(b""), TextEncoding::Utf8);
        assert_eq!(TextEncoding::sniff(b"#"), TextEncoding::Utf8);
    }

    #[test]
    fn test_sniff_boms() {
        assert_eq!(TextEncoding::sniff(&[0xEF, 0xBB, 0xBF, b'#']), TextEncoding::Utf8Bom);
        assert_eq!(TextEncoding::sniff(&[0xFF, 0xFE, b'#', 0]), TextEncoding::Utf16Le);
        assert_eq!(TextEncoding::sniff(&[0xFE, 0xFF, 0, b'#']), TextEncoding::Utf16Be);
    }

    #[test]
    fn test_sniff_bomless_utf16le() {
        assert_eq!(TextEncoding::sniff(&[b'#', 0x00, b' ', 0x00]), TextEncoding::Utf16Le);
    }

    #[test]
    fn test_decode_utf8_bom_is_dropped() {
        let text = decode_text(&[0xEF, 0xBB, 0xBF, b'h', b'i']).unwrap();
        assert_eq!(text, "hi");
    }

    #[test]
    fn test_decode_utf16le_with_and_without_bom() {
        assert_eq!(decode_text(&utf16le("# Привет", true)).unwrap(), "# Привет");
        assert_eq!(decode_text(&utf16le("# Hello", false)).unwrap(), "# Hello");
    }

    #[test]
    fn test_decode_utf16be() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "中文".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text(&bytes).unwrap(), "中文");
    }

    #[test]
    fn test_decode_odd_utf16_length() {
        let err = decode_text(&[0xFF, 0xFE, b'a', 0x00, b'b']).unwrap_err();
        assert!(matches!(err, DecodeError::OddLength(3)));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode_text(&[b'a', 0xC3, 0x28]).unwrap_err();
        assert!(matches!(err, DecodeError::Utf8(_)));
    }

    #[test]
    fn test_read_text_falls_back_to_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, [b'#', b' ', b'a', 0xC3, 0x28]).unwrap();

        let text = read_text(&path).unwrap();
        assert!(text.starts_with("# a"));
        assert!(text.contains('\u{FFFD}'));
    }
}
