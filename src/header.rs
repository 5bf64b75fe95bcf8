use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;

use crate::error::LoadError;

pub const HEADER_SIZE: usize = 64;
pub const V3_MAX_IMAGE_SIZE: usize = 128 * 1024;

/// Fields derived from the fixed-offset header words this core cares about.
pub struct Header {
    pub version: u8,
    pub high_begin: u16,
    pub initial_pc: u16,
    pub globals_base: u16,
    pub static_begin: u16,
}

impl Header {
    /// Parse a header out of the first 64 bytes of a story image.
    ///
    /// `bytes` is the whole loaded image. The image-size-vs-version ceiling
    /// is checked by the caller, which knows how many bytes it actually read
    /// from the stream; this only validates the header fields themselves.
    pub fn parse(bytes: &[u8]) -> Result<Header, LoadError> {
        if bytes.len() < HEADER_SIZE {
            return Err(LoadError::InvalidStoryFile {
                reason: format!(
                    "story file truncated: header requires {HEADER_SIZE} bytes, got {}",
                    bytes.len()
                ),
            });
        }

        let version = bytes[0x00];
        if version != 3 {
            return Err(LoadError::UnsupportedVersion { found: version });
        }

        let high_begin = get_mem_addr(bytes, 0x04);
        let initial_pc = get_mem_addr(bytes, 0x06);
        let globals_base = get_mem_addr(bytes, 0x0C);
        let static_begin = get_mem_addr(bytes, 0x0E);

        if static_begin < HEADER_SIZE as u16 {
            return Err(LoadError::InvalidStoryFile {
                reason: format!("static_begin {static_begin:#06x} is below header size"),
            });
        }
        if high_begin < static_begin {
            return Err(LoadError::InvalidStoryFile {
                reason: format!(
                    "high_begin {high_begin:#06x} is below static_begin {static_begin:#06x}"
                ),
            });
        }

        Ok(Header {
            version,
            high_begin,
            initial_pc,
            globals_base,
            static_begin,
        })
    }
}

fn get_mem_addr(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(
            f,
            "
Z-code version:           {}
Start PC:                 {:#06x}
Size of dynamic memory:   {:#06x}
Base of high memory:      {:#06x}
Global variables address: {:#06x}
",
            self.version, self.initial_pc, self.static_begin, self.high_begin, self.globals_base,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(
        version: u8,
        high_begin: u16,
        initial_pc: u16,
        globals_base: u16,
        static_begin: u16,
    ) -> Vec<u8> {
        let mut b = vec![0u8; HEADER_SIZE];
        b[0x00] = version;
        b[0x04..0x06].copy_from_slice(&high_begin.to_be_bytes());
        b[0x06..0x08].copy_from_slice(&initial_pc.to_be_bytes());
        b[0x0C..0x0E].copy_from_slice(&globals_base.to_be_bytes());
        b[0x0E..0x10].copy_from_slice(&static_begin.to_be_bytes());
        b
    }

    #[test]
    fn s1_header_load() {
        let bytes = header_bytes(3, 0x0400, 0x04F5, 0x02B0, 0x0400);
        let header = Header::parse(&bytes).unwrap();
        assert_eq!(header.version, 3);
        assert_eq!(header.initial_pc, 0x04F5);
        assert_eq!(header.static_begin, 0x0400);
        assert_eq!(header.high_begin, 0x0400);
        assert_eq!(header.globals_base, 0x02B0);
    }

    #[test]
    fn s2_bad_version() {
        let bytes = header_bytes(6, 0x0400, 0x04F5, 0x02B0, 0x0400);
        let err = Header::parse(&bytes).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedVersion { found: 6 }));
    }

    #[test]
    fn s3_truncated_header() {
        let bytes = vec![0u8; 30];
        let err = Header::parse(&bytes).unwrap_err();
        assert!(matches!(err, LoadError::InvalidStoryFile { .. }));
    }

    #[test]
    fn rejects_static_begin_below_header() {
        let bytes = header_bytes(3, 0x0400, 0x04F5, 0x02B0, 0x0010);
        let err = Header::parse(&bytes).unwrap_err();
        assert!(matches!(err, LoadError::InvalidStoryFile { .. }));
    }

    #[test]
    fn rejects_high_begin_below_static_begin() {
        let bytes = header_bytes(3, 0x0100, 0x04F5, 0x02B0, 0x0400);
        let err = Header::parse(&bytes).unwrap_err();
        assert!(matches!(err, LoadError::InvalidStoryFile { .. }));
    }
}
