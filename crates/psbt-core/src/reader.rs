//! Byte Reader
//!
//! Cursor over an immutable, fully buffered byte slice. Lookahead is a plain
//! index into the slice, so peeking never moves the position that later reads
//! observe.

use crate::error::{Error, Result};

/// Read cursor over a borrowed byte buffer
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next byte without consuming it
    pub fn peek_u8(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.truncated(1))
    }

    /// Consume a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Consume exactly `n` bytes, borrowing them from the underlying buffer
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Consume exactly `N` bytes into a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Consume a length taken from the wire, rejecting lengths beyond the buffer
    pub fn read_var_bytes(&mut self, len: u64) -> Result<&'a [u8]> {
        match usize::try_from(len) {
            Ok(n) => self.read_bytes(n),
            Err(_) => Err(self.truncated(usize::MAX)),
        }
    }

    /// Capacity hint for `count` upcoming records of at least `min_size` bytes each
    ///
    /// Declared counts come straight from untrusted input; the hint never
    /// exceeds what the remaining bytes could possibly hold.
    pub fn capacity_hint(&self, count: u64, min_size: usize) -> usize {
        let fits = self.remaining() / min_size.max(1);
        usize::try_from(count).map_or(fits, |c| c.min(fits))
    }

    fn truncated(&self, needed: usize) -> Error {
        Error::TruncatedInput {
            offset: self.pos,
            needed,
            remaining: self.remaining(),
        }
    }
}

/// Interpret a stored value as an unsigned little-endian integer of its own width
///
/// Widths of 1 to 8 bytes are accepted; anything else is a length mismatch
/// rather than a silent truncation.
pub fn le_uint(field: &'static str, bytes: &[u8]) -> Result<u64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(Error::LengthMismatch {
            field,
            expected: 8,
            actual: bytes.len() as u64,
        });
    }
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x00, 0x01];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.peek_u8().unwrap(), 0x00);
        assert_eq!(reader.peek_u8().unwrap(), 0x00);
        assert_eq!(reader.position(), 0);

        assert_eq!(reader.read_u8().unwrap(), 0x00);
        assert_eq!(reader.peek_u8().unwrap(), 0x01);
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_short_read_reports_truncation() {
        let data = [1, 2, 3];
        let mut reader = ByteReader::new(&data);
        reader.read_u8().unwrap();

        let err = reader.read_array::<4>().unwrap_err();
        assert_eq!(
            err,
            Error::TruncatedInput {
                offset: 1,
                needed: 4,
                remaining: 2
            }
        );
        // Failed reads leave the cursor untouched
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_peek_at_end() {
        let mut reader = ByteReader::new(&[]);
        assert!(reader.is_empty());
        assert!(matches!(
            reader.peek_u8(),
            Err(Error::TruncatedInput { needed: 1, .. })
        ));
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn test_var_bytes_beyond_buffer() {
        let data = [0xaa; 4];
        let mut reader = ByteReader::new(&data);
        assert!(reader.read_var_bytes(u64::MAX).is_err());
        assert_eq!(reader.read_var_bytes(4).unwrap(), &data[..]);
    }

    #[test]
    fn test_le_uint_widths() {
        assert_eq!(le_uint("count", &[0x05]).unwrap(), 5);
        assert_eq!(le_uint("count", &[0x05, 0x01]).unwrap(), 0x0105);
        assert_eq!(le_uint("count", &[0x01, 0x00, 0x00, 0x00]).unwrap(), 1);
        assert_eq!(le_uint("count", &[0xff; 8]).unwrap(), u64::MAX);
    }

    #[test]
    fn test_le_uint_rejects_bad_width() {
        assert_eq!(
            le_uint("count", &[]).unwrap_err(),
            Error::LengthMismatch {
                field: "count",
                expected: 8,
                actual: 0
            }
        );
        assert!(le_uint("count", &[0; 9]).is_err());
    }

    #[test]
    fn test_capacity_hint_is_bounded() {
        let data = [0u8; 10];
        let reader = ByteReader::new(&data);
        assert_eq!(reader.capacity_hint(u64::MAX, 1), 10);
        assert_eq!(reader.capacity_hint(3, 1), 3);
        assert_eq!(reader.capacity_hint(100, 4), 2);
    }
}
