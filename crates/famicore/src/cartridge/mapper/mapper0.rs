//! Mapper 0 (NROM).
//!
//! The simplest cartridge board: no banking at all. The CPU sees the whole
//! program memory and the PPU sees the whole character memory directly.
//!
//! | Bus | Address range | Behaviour                                   |
//! |-----|---------------|---------------------------------------------|
//! | CPU | `$8000-$FFFF` | 16 KiB mirrored twice, or linear 32 KiB     |
//! | PPU | `$0000-$1FFF` | 8 KiB character ROM                         |

use crate::cartridge::header::Mirroring;
use crate::cartridge::mapper::{CHR_WINDOW_END, Mapped, PRG_WINDOW_START};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nrom {
    prg_banks: u8,
}

impl Nrom {
    /// Accepts one or two program banks and exactly one character bank.
    pub fn new(prg_banks: u8, chr_banks: u8) -> Result<Self, Error> {
        if !(1..=2).contains(&prg_banks) {
            return Err(Error::InvalidProgramBankCount(prg_banks));
        }
        if chr_banks != 1 {
            return Err(Error::InvalidCharacterBankCount(chr_banks));
        }
        Ok(Self { prg_banks })
    }

    /// NROM-128 mirrors its single 16 KiB bank across the window.
    #[inline]
    fn prg_mask(self) -> u16 {
        if self.prg_banks > 1 { 0x7FFF } else { 0x3FFF }
    }

    pub fn read(self, addr: u16) -> Mapped {
        match addr {
            PRG_WINDOW_START..=0xFFFF => Mapped::Prg((addr & self.prg_mask()) as u32),
            0x0000..=CHR_WINDOW_END => Mapped::Chr(addr as u32),
            _ => Mapped::None,
        }
    }

    /// Program-window writes translate like reads, letting a host patch
    /// program memory in place (reset vectors in test fixtures). Character
    /// memory is ROM on this board, so those writes map to nothing.
    pub fn write(&mut self, addr: u16, _value: u8) -> Mapped {
        match addr {
            PRG_WINDOW_START..=0xFFFF => Mapped::Prg((addr & self.prg_mask()) as u32),
            _ => Mapped::None,
        }
    }

    pub fn reset(&mut self) {}

    pub fn mirroring(self) -> Option<Mirroring> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bank_mirrors_across_the_window() {
        let mapper = Nrom::new(1, 1).unwrap();
        assert_eq!(mapper.read(0x8000), Mapped::Prg(0x0000));
        assert_eq!(mapper.read(0xC000), Mapped::Prg(0x0000));
        assert_eq!(mapper.read(0xFFFC), Mapped::Prg(0x3FFC));
    }

    #[test]
    fn two_banks_map_linearly() {
        let mapper = Nrom::new(2, 1).unwrap();
        assert_eq!(mapper.read(0x8000), Mapped::Prg(0x0000));
        assert_eq!(mapper.read(0xC000), Mapped::Prg(0x4000));
        assert_eq!(mapper.read(0xFFFF), Mapped::Prg(0x7FFF));
    }

    #[test]
    fn character_window_passes_through() {
        let mapper = Nrom::new(1, 1).unwrap();
        assert_eq!(mapper.read(0x1234), Mapped::Chr(0x1234));
    }

    #[test]
    fn rejects_out_of_range_bank_counts() {
        assert!(matches!(
            Nrom::new(3, 1),
            Err(Error::InvalidProgramBankCount(3))
        ));
        assert!(matches!(
            Nrom::new(1, 0),
            Err(Error::InvalidCharacterBankCount(0))
        ));
    }
}
