use std::fmt;

use crate::bus::AddressRange;

#[derive(Debug)]
pub enum Error {
    /// iNES magic is missing, or the image is shorter than its header claims.
    InvalidDataFormat,
    /// Cartridge requests a mapper id this core does not implement.
    MapperNotImplemented(u8),
    /// Mapper rejects the program-memory bank count.
    InvalidProgramBankCount(u8),
    /// Mapper rejects the character-memory bank count.
    InvalidCharacterBankCount(u8),
    /// A RAM device was bound to a range that is not a whole number of
    /// mirrors of its backing memory.
    AddressRangeNotMultipleOfMemorySize {
        range_len: u32,
        memory_size: u32,
    },
    /// DMA was clocked without a read endpoint wired.
    DmaReadDeviceNotAssigned,
    /// DMA was clocked without a write endpoint wired.
    DmaWriteDeviceNotAssigned,
    /// Two devices were attached to overlapping address ranges.
    BusOverlap {
        attached: AddressRange,
        existing: AddressRange,
    },
    /// Wrapper for I/O errors raised while reading images from disk.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDataFormat => write!(f, "not a valid iNES image"),
            Self::MapperNotImplemented(id) => write!(f, "mapper {id} is not implemented"),
            Self::InvalidProgramBankCount(n) => {
                write!(f, "unsupported program memory bank count: {n}")
            }
            Self::InvalidCharacterBankCount(n) => {
                write!(f, "unsupported character memory bank count: {n}")
            }
            Self::AddressRangeNotMultipleOfMemorySize {
                range_len,
                memory_size,
            } => write!(
                f,
                "address range length {range_len} is not a multiple of memory size {memory_size}"
            ),
            Self::DmaReadDeviceNotAssigned => write!(f, "dma clocked without a read device"),
            Self::DmaWriteDeviceNotAssigned => write!(f, "dma clocked without a write device"),
            Self::BusOverlap { attached, existing } => write!(
                f,
                "device range {attached} overlaps already attached range {existing}"
            ),
            Self::Io(err) => write!(f, "i/o error while reading cartridge: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
