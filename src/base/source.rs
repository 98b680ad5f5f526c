//! Reading and decoding definition source files.

use std::fmt;
use std::fs;
use std::hash::Hasher;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::error::SourceError;

/// Text encoding detected while decoding a source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
}

impl Encoding {
    /// Conventional label for this encoding.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf8Bom => "utf-8-sig",
            Encoding::Utf16Le => "utf-16le",
            Encoding::Utf16Be => "utf-16be",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded file contents plus what was learned while decoding them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedText {
    /// The decoded text, without any byte order mark.
    pub text: Arc<str>,
    /// The detected encoding.
    pub encoding: Encoding,
    /// FxHash of the raw bytes, used to notice on-disk changes.
    pub hash: u64,
}

/// Text-reading service consumed by the outline front end.
///
/// Implementations must be shareable across threads because batch reads
/// scan modules in parallel.
pub trait SourceReader: Send + Sync {
    /// Read and decode the file at `path`.
    fn read(&self, path: &Path) -> Result<DecodedText, SourceError>;
}

/// Reads files straight from the filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read(&self, path: &Path) -> Result<DecodedText, SourceError> {
        let bytes = fs::read(path).map_err(|source| SourceError::Io {
            path: path.to_owned(),
            source,
        })?;
        decode(path, &bytes)
    }
}

/// Hash raw file contents.
pub fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    hasher.finish()
}

/// Decode raw bytes, honouring UTF-8 and UTF-16 byte order marks.
///
/// Content without a BOM must be valid UTF-8.
pub fn decode(path: &Path, bytes: &[u8]) -> Result<DecodedText, SourceError> {
    let (encoding, text) = if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        (Encoding::Utf8Bom, std::str::from_utf8(rest).ok().map(str::to_owned))
    } else if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        (Encoding::Utf16Le, decode_utf16(rest, u16::from_le_bytes))
    } else if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        (Encoding::Utf16Be, decode_utf16(rest, u16::from_be_bytes))
    } else {
        (Encoding::Utf8, std::str::from_utf8(bytes).ok().map(str::to_owned))
    };

    match text {
        Some(text) => Ok(DecodedText {
            text: text.into(),
            encoding,
            hash: content_hash(bytes),
        }),
        None => Err(SourceError::Decode {
            path: path.to_owned(),
            encoding,
        }),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decode_plain_utf8() {
        let decoded = decode(Path::new("a.idl"), b"module A {};").unwrap();
        assert_eq!(decoded.encoding, Encoding::Utf8);
        assert_eq!(&*decoded.text, "module A {};");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let decoded = decode(Path::new("a.idl"), b"\xEF\xBB\xBFmodule A {};").unwrap();
        assert_eq!(decoded.encoding, Encoding::Utf8Bom);
        assert_eq!(&*decoded.text, "module A {};");
    }

    #[test]
    fn test_decode_utf16_le_and_be() {
        let mut le = vec![0xFF, 0xFE];
        let mut be = vec![0xFE, 0xFF];
        for unit in "enum E {}".encode_utf16() {
            le.extend_from_slice(&unit.to_le_bytes());
            be.extend_from_slice(&unit.to_be_bytes());
        }

        let decoded = decode(Path::new("a.proto"), &le).unwrap();
        assert_eq!(decoded.encoding, Encoding::Utf16Le);
        assert_eq!(&*decoded.text, "enum E {}");

        let decoded = decode(Path::new("a.proto"), &be).unwrap();
        assert_eq!(decoded.encoding, Encoding::Utf16Be);
        assert_eq!(&*decoded.text, "enum E {}");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode(Path::new("bad.idl"), b"module \xFF\xFE\xFD").unwrap_err();
        assert!(matches!(err, SourceError::Decode { encoding: Encoding::Utf8, .. }));
    }

    #[test]
    fn test_decode_rejects_odd_utf16_payload() {
        let err = decode(Path::new("bad.idl"), b"\xFF\xFEa").unwrap_err();
        assert!(matches!(err, SourceError::Decode { encoding: Encoding::Utf16Le, .. }));
    }

    #[test]
    fn test_hash_tracks_content() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
    }

    #[test]
    fn test_fs_reader_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsSourceReader.read(&dir.path().join("missing.idl")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn test_fs_reader_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"service S {}").unwrap();

        let decoded = FsSourceReader.read(file.path()).unwrap();
        assert_eq!(&*decoded.text, "service S {}");
        assert_eq!(decoded.hash, content_hash(b"service S {}"));
    }
}
