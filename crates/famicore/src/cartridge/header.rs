//! iNES 1.0 header parsing.

use crate::error::Error;

/// Length of the fixed iNES header.
pub const INES_HEADER_LEN: usize = 16;
/// `"NES"` followed by MS-DOS end-of-file.
pub const INES_MAGIC: [u8; 4] = *b"NES\x1A";
/// Program memory bank granularity (16 KiB).
pub const PRG_BANK_SIZE: usize = 16 * 1024;
/// Character memory bank granularity (8 KiB).
pub const CHR_BANK_SIZE: usize = 8 * 1024;
/// Length of the optional trainer block between header and program data.
pub const TRAINER_LEN: usize = 512;

/// Nametable mirroring arrangements this core renders.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mirroring {
    #[default]
    Horizontal,
    Vertical,
}

/// Decoded iNES 1.0 header.
///
/// Bytes 8..15 carry iNES 2.0 and rarely honored 1.0 extensions; this core
/// ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    /// Program memory size in 16 KiB banks.
    pub prg_banks: u8,
    /// Character memory size in 8 KiB banks; 0 means character RAM.
    pub chr_banks: u8,
    /// Mapper id assembled from the two flag bytes.
    pub mapper_id: u8,
    /// Hardwired nametable arrangement.
    pub mirroring: Mirroring,
    /// A 512-byte trainer block precedes the program data.
    pub trainer_present: bool,
}

impl Header {
    /// Parses the 16-byte header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < INES_HEADER_LEN || bytes[..4] != INES_MAGIC {
            return Err(Error::InvalidDataFormat);
        }

        let flags6 = bytes[6];
        let flags7 = bytes[7];
        Ok(Self {
            prg_banks: bytes[4],
            chr_banks: bytes[5],
            mapper_id: (flags7 & 0xF0) | (flags6 >> 4),
            mirroring: if flags6 & 0x01 != 0 {
                Mirroring::Vertical
            } else {
                Mirroring::Horizontal
            },
            trainer_present: flags6 & 0x04 != 0,
        })
    }
}
