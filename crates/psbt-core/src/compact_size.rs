//! Compact Size Integers
//!
//! Bitcoin's self-describing variable-length unsigned integer. The leading
//! byte selects the width: below `0xfd` it is the value itself, `0xfd`,
//! `0xfe` and `0xff` announce a 2, 4 or 8 byte little-endian payload.
//!
//! Non-minimal encodings (e.g. `0xfd 0x01 0x00` for 1) are accepted.

use crate::error::Result;
use crate::reader::ByteReader;
use serde::Serialize;

/// A decoded compact size integer and the number of bytes it occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompactSize {
    /// Decoded value
    pub value: u64,
    /// Encoded width in bytes (1, 3, 5 or 9)
    pub len: u8,
}

impl CompactSize {
    /// Decode a compact size integer from the reader
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let prefix = reader.read_u8()?;

        let size = match prefix {
            0xff => Self {
                value: u64::from_le_bytes(reader.read_array()?),
                len: 9,
            },
            0xfe => Self {
                value: u32::from_le_bytes(reader.read_array()?) as u64,
                len: 5,
            },
            0xfd => Self {
                value: u16::from_le_bytes(reader.read_array()?) as u64,
                len: 3,
            },
            n => Self {
                value: n as u64,
                len: 1,
            },
        };

        Ok(size)
    }

    /// Minimal encoded width for `value`
    pub fn encoded_len(value: u64) -> u8 {
        if value < 0xfd {
            1
        } else if value <= 0xffff {
            3
        } else if value <= 0xffff_ffff {
            5
        } else {
            9
        }
    }
}

/// Read a compact size integer, discarding its width
pub fn read_compact_size(reader: &mut ByteReader<'_>) -> Result<u64> {
    CompactSize::decode(reader).map(|size| size.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn decode(bytes: &[u8]) -> Result<(u64, u8)> {
        let mut reader = ByteReader::new(bytes);
        CompactSize::decode(&mut reader).map(|size| (size.value, size.len))
    }

    #[test]
    fn test_single_byte_values() {
        for v in 0u8..0xfd {
            assert_eq!(decode(&[v]).unwrap(), (v as u64, 1));
        }
    }

    #[test]
    fn test_fd_prefix() {
        assert_eq!(decode(&[0xfd, 0xfd, 0x00]).unwrap(), (253, 3));
        assert_eq!(decode(&[0xfd, 0xff, 0xff]).unwrap(), (65535, 3));
    }

    #[test]
    fn test_fe_prefix() {
        assert_eq!(decode(&[0xfe, 0x00, 0x00, 0x01, 0x00]).unwrap(), (65536, 5));
        assert_eq!(
            decode(&[0xfe, 0xff, 0xff, 0xff, 0xff]).unwrap(),
            (u32::MAX as u64, 5)
        );
    }

    #[test]
    fn test_ff_prefix() {
        let mut bytes = vec![0xff];
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert_eq!(decode(&bytes).unwrap(), (u64::MAX, 9));
    }

    #[test]
    fn test_non_minimal_accepted() {
        assert_eq!(decode(&[0xfd, 0x01, 0x00]).unwrap(), (1, 3));
        assert_eq!(decode(&[0xfe, 0x05, 0x00, 0x00, 0x00]).unwrap(), (5, 5));
    }

    #[test]
    fn test_truncated_payload() {
        assert!(matches!(
            decode(&[0xfd, 0x01]),
            Err(Error::TruncatedInput { offset: 1, needed: 2, remaining: 1 })
        ));
        assert!(matches!(
            decode(&[0xff, 0, 0, 0]),
            Err(Error::TruncatedInput { needed: 8, .. })
        ));
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_cursor_advances_by_width() {
        let bytes = [0xfd, 0x00, 0x01, 0x07];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(read_compact_size(&mut reader).unwrap(), 256);
        assert_eq!(reader.position(), 3);
        assert_eq!(read_compact_size(&mut reader).unwrap(), 7);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(CompactSize::encoded_len(0), 1);
        assert_eq!(CompactSize::encoded_len(252), 1);
        assert_eq!(CompactSize::encoded_len(253), 3);
        assert_eq!(CompactSize::encoded_len(65535), 3);
        assert_eq!(CompactSize::encoded_len(65536), 5);
        assert_eq!(CompactSize::encoded_len(u32::MAX as u64 + 1), 9);
    }
}
