//! Explicit little-endian binary encoding shared by the persisted file formats.
//!
//! Every persisted entity (scenario, rule, individual) writes its fields one by one
//! through an [`Encoder`] and reads them back through a [`Decoder`]. Nothing relies on
//! in-memory struct layout, so files stay readable across compilers and platforms.
//!
//! Each file starts with a 4-byte magic and a `u16` format version, written with
//! [`Encoder::header`] and checked with [`Decoder::header`].
//!
//! # Example
//!
//! ```
//! use minegen_engine::codec::{Decoder, Encoder};
//!
//! let mut enc = Encoder::new();
//! enc.header(*b"TEST", 1);
//! enc.put_u32(42);
//! enc.put_f64(-0.5);
//! let bytes = enc.into_bytes();
//!
//! let mut dec = Decoder::new(&bytes);
//! dec.header(*b"TEST", 1).unwrap();
//! assert_eq!(dec.u32("answer").unwrap(), 42);
//! assert_eq!(dec.f64("value").unwrap(), -0.5);
//! dec.finish().unwrap();
//! ```

use std::{fs, io, path::Path};

use crate::scenario::ScenarioError;

/// Typed failure produced while decoding a persisted file.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DecodeError {
    #[display("unexpected end of data while reading {context}")]
    UnexpectedEof { context: &'static str },
    #[display("file magic does not match the expected format")]
    BadMagic,
    #[display("unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },
    #[display("invalid value {value} for field {field}")]
    InvalidValue { field: &'static str, value: i64 },
    #[display("{field} mismatch: expected {expected}, found {found}")]
    Mismatch {
        field: &'static str,
        expected: u64,
        found: u64,
    },
    #[display("{count} unexpected trailing bytes")]
    TrailingBytes { count: usize },
    #[display("invalid scenario record: {_0}")]
    Scenario(ScenarioError),
}

/// Growable byte buffer with typed little-endian writers.
#[derive(Debug, Default, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the file magic followed by the format version.
    pub fn header(&mut self, magic: [u8; 4], version: u16) {
        self.buf.extend_from_slice(&magic);
        self.buf.extend_from_slice(&version.to_le_bytes());
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn put_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a length or count field.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not fit in a `u32`.
    pub fn put_len(&mut self, value: usize) {
        let value = u32::try_from(value).expect("length must fit in u32");
        self.put_u32(value);
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over an encoded byte slice.
///
/// Every reader takes a short context name that ends up in the error when the
/// data runs out or a value is out of range.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Number of bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Returns `true` when every byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn take<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], DecodeError> {
        let end = self.pos + N;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or(DecodeError::UnexpectedEof { context })?;
        self.pos = end;
        let mut out = [0; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    /// Reads and checks the file magic and format version.
    pub fn header(&mut self, magic: [u8; 4], version: u16) -> Result<(), DecodeError> {
        if self.take::<4>("magic")? != magic {
            return Err(DecodeError::BadMagic);
        }
        let found = u16::from_le_bytes(self.take("version")?);
        if found != version {
            return Err(DecodeError::UnsupportedVersion {
                found,
                expected: version,
            });
        }
        Ok(())
    }

    pub fn u8(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let [b] = self.take::<1>(context)?;
        Ok(b)
    }

    pub fn bool(&mut self, context: &'static str) -> Result<bool, DecodeError> {
        match self.u8(context)? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(DecodeError::InvalidValue {
                field: context,
                value: i64::from(value),
            }),
        }
    }

    pub fn u32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take(context)?))
    }

    pub fn i32(&mut self, context: &'static str) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.take(context)?))
    }

    pub fn f64(&mut self, context: &'static str) -> Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(self.take(context)?))
    }

    /// Reads a `u8` and checks that it lies in `range`.
    pub fn u8_in(
        &mut self,
        context: &'static str,
        range: std::ops::RangeInclusive<u8>,
    ) -> Result<u8, DecodeError> {
        let value = self.u8(context)?;
        if !range.contains(&value) {
            return Err(DecodeError::InvalidValue {
                field: context,
                value: i64::from(value),
            });
        }
        Ok(value)
    }

    /// Reads a length field and checks it against the expected value.
    pub fn expect_len(
        &mut self,
        context: &'static str,
        expected: usize,
    ) -> Result<(), DecodeError> {
        let found = self.u32(context)?;
        if usize::try_from(found).ok() != Some(expected) {
            return Err(DecodeError::Mismatch {
                field: context,
                expected: expected as u64,
                found: u64::from(found),
            });
        }
        Ok(())
    }

    /// Fails if any bytes remain unread.
    pub fn finish(&self) -> Result<(), DecodeError> {
        let count = self.remaining();
        if count > 0 {
            return Err(DecodeError::TrailingBytes { count });
        }
        Ok(())
    }
}

/// Writes `bytes` to a sibling temporary file and renames it over `path`.
///
/// A crash mid-write leaves the previous file intact. The temporary file is
/// removed if the rename fails.
pub fn write_file_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_input_reports_context() {
        let mut enc = Encoder::new();
        enc.put_u8(7);
        let bytes = enc.into_bytes();

        let mut dec = Decoder::new(&bytes);
        assert_eq!(dec.u8("first").unwrap(), 7);
        assert_eq!(
            dec.u32("second"),
            Err(DecodeError::UnexpectedEof { context: "second" })
        );
    }

    #[test]
    fn test_header_rejects_wrong_magic_and_version() {
        let mut enc = Encoder::new();
        enc.header(*b"ABCD", 2);
        let bytes = enc.into_bytes();

        assert_eq!(
            Decoder::new(&bytes).header(*b"WXYZ", 2),
            Err(DecodeError::BadMagic)
        );
        assert_eq!(
            Decoder::new(&bytes).header(*b"ABCD", 1),
            Err(DecodeError::UnsupportedVersion {
                found: 2,
                expected: 1
            })
        );
        assert!(Decoder::new(&bytes).header(*b"ABCD", 2).is_ok());
    }

    #[test]
    fn test_bool_rejects_non_binary_byte() {
        let bytes = [2];
        let err = Decoder::new(&bytes).bool("flag").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidValue {
                field: "flag",
                value: 2
            }
        );
    }

    #[test]
    fn test_expect_len_and_trailing_bytes() {
        let mut enc = Encoder::new();
        enc.put_len(3);
        enc.put_u8(0);
        let bytes = enc.into_bytes();

        let mut dec = Decoder::new(&bytes);
        assert_eq!(
            dec.clone().expect_len("count", 4),
            Err(DecodeError::Mismatch {
                field: "count",
                expected: 4,
                found: 3
            })
        );
        dec.expect_len("count", 3).unwrap();
        assert_eq!(dec.finish(), Err(DecodeError::TrailingBytes { count: 1 }));
    }

    #[test]
    fn test_write_file_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        write_file_atomic(&path, b"first").unwrap();
        write_file_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!dir.path().join("data.bin.tmp").exists());
    }

    #[test]
    fn test_write_file_atomic_cleans_up_after_failed_rename() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let path = dir.path().join("data.bin");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        assert!(write_file_atomic(&path, b"data").is_err());
        assert!(!dir.path().join("data.bin.tmp").exists());
        assert!(path.join("keep").exists());
    }
}
