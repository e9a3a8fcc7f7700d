//! Cartridge address translation.
//!
//! Mappers are a closed set; the cartridge holds one [`Mapper`] and routes
//! every bus access through it. Translation results are the packed
//! [`Mapped`] sum rather than trait objects, so the hot path stays free of
//! indirection.

use crate::cartridge::header::Mirroring;
use crate::error::Error;

pub(crate) mod mapper0;
pub(crate) mod mapper2;

pub use mapper0::Nrom;
pub use mapper2::Uxrom;

/// Start of the cartridge program window on the CPU bus.
pub(crate) const PRG_WINDOW_START: u16 = 0x8000;
/// End of the cartridge character window on the PPU bus.
pub(crate) const CHR_WINDOW_END: u16 = 0x1FFF;

/// Outcome of translating one bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mapped {
    /// Offset into program memory.
    Prg(u32),
    /// Offset into character memory.
    Chr(u32),
    /// The mapper answered the access itself.
    Value(u8),
    /// The mapper does not respond at this address.
    None,
}

/// The mapper configurations this core implements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mapper {
    Nrom(Nrom),
    Uxrom(Uxrom),
}

impl Mapper {
    /// Instantiates the mapper for an iNES mapper id.
    pub fn from_id(id: u8, prg_banks: u8, chr_banks: u8) -> Result<Self, Error> {
        match id {
            0 => Ok(Self::Nrom(Nrom::new(prg_banks, chr_banks)?)),
            2 => Ok(Self::Uxrom(Uxrom::new(prg_banks, chr_banks)?)),
            id => Err(Error::MapperNotImplemented(id)),
        }
    }

    /// Translates a read on either bus window.
    pub fn read(&self, addr: u16) -> Mapped {
        match self {
            Self::Nrom(m) => m.read(addr),
            Self::Uxrom(m) => m.read(addr),
        }
    }

    /// Translates a write; bank-select mappers latch their state here.
    pub fn write(&mut self, addr: u16, value: u8) -> Mapped {
        match self {
            Self::Nrom(m) => m.write(addr, value),
            Self::Uxrom(m) => m.write(addr, value),
        }
    }

    /// Restores the initial bank selection.
    pub fn reset(&mut self) {
        match self {
            Self::Nrom(m) => m.reset(),
            Self::Uxrom(m) => m.reset(),
        }
    }

    /// Mapper-controlled mirroring; `None` defers to the cartridge header.
    pub fn mirroring(&self) -> Option<Mirroring> {
        match self {
            Self::Nrom(m) => m.mirroring(),
            Self::Uxrom(m) => m.mirroring(),
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            Self::Nrom(_) => 0,
            Self::Uxrom(_) => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nrom(_) => "NROM",
            Self::Uxrom(_) => "UxROM",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mapper_id_is_rejected() {
        let err = Mapper::from_id(7, 1, 1).unwrap_err();
        assert!(matches!(err, Error::MapperNotImplemented(7)));
    }
}
