//! Mapper 2 (UxROM) - simple 16 KiB program banking.
//!
//! | Bus | Address range | Behaviour                                    |
//! |-----|---------------|----------------------------------------------|
//! | CPU | `$8000-$BFFF` | 16 KiB switchable bank (`bank_lo`)           |
//! | CPU | `$C000-$FFFF` | 16 KiB fixed bank (last)                     |
//! | PPU | `$0000-$1FFF` | 8 KiB character ROM, or RAM when none exists |
//!
//! Any write into the program window latches the low nibble as the
//! switchable bank; the high window stays pinned to the last bank so the
//! vectors never move.

use crate::cartridge::header::Mirroring;
use crate::cartridge::mapper::{CHR_WINDOW_END, Mapped, PRG_WINDOW_START};
use crate::error::Error;

const PRG_BANK_LEN: u32 = 0x4000;

/// CPU `$C000`: boundary between the switchable and the fixed window.
const FIXED_WINDOW_START: u16 = 0xC000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uxrom {
    prg_banks: u8,
    chr_banks: u8,
    bank_lo: u8,
    bank_hi: u8,
}

impl Uxrom {
    /// Accepts 1..=255 program banks and at most one character bank.
    pub fn new(prg_banks: u8, chr_banks: u8) -> Result<Self, Error> {
        if prg_banks == 0 {
            return Err(Error::InvalidProgramBankCount(prg_banks));
        }
        if chr_banks > 1 {
            return Err(Error::InvalidCharacterBankCount(chr_banks));
        }
        Ok(Self {
            prg_banks,
            chr_banks,
            bank_lo: 0,
            bank_hi: prg_banks - 1,
        })
    }

    pub fn read(self, addr: u16) -> Mapped {
        match addr {
            PRG_WINDOW_START..FIXED_WINDOW_START => {
                Mapped::Prg(self.bank_lo as u32 * PRG_BANK_LEN + (addr & 0x3FFF) as u32)
            }
            FIXED_WINDOW_START..=0xFFFF => {
                Mapped::Prg(self.bank_hi as u32 * PRG_BANK_LEN + (addr & 0x3FFF) as u32)
            }
            0x0000..=CHR_WINDOW_END => Mapped::Chr(addr as u32),
            _ => Mapped::None,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) -> Mapped {
        match addr {
            PRG_WINDOW_START..=0xFFFF => {
                self.bank_lo = value & 0x0F;
                Mapped::None
            }
            // Boards without character ROM wire RAM into the window instead.
            0x0000..=CHR_WINDOW_END if self.chr_banks == 0 => Mapped::Chr(addr as u32),
            _ => Mapped::None,
        }
    }

    pub fn reset(&mut self) {
        self.bank_lo = 0;
        self.bank_hi = self.prg_banks - 1;
    }

    pub fn mirroring(self) -> Option<Mirroring> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches_low_bank_and_pins_high_bank() {
        let mut mapper = Uxrom::new(8, 1).unwrap();
        assert_eq!(mapper.read(0x8000), Mapped::Prg(0x00000));
        assert_eq!(mapper.read(0xC000), Mapped::Prg(0x1C000));

        mapper.write(0x8000, 0x01);
        assert_eq!(mapper.read(0x8000), Mapped::Prg(0x04000));
        assert_eq!(mapper.read(0xC000), Mapped::Prg(0x1C000));

        mapper.write(0xBFFF, 0x06);
        assert_eq!(mapper.read(0x8000), Mapped::Prg(0x18000));
    }

    #[test]
    fn bank_select_keeps_only_the_low_nibble() {
        let mut mapper = Uxrom::new(16, 1).unwrap();
        mapper.write(0x8000, 0xF3);
        assert_eq!(mapper.read(0x8000), Mapped::Prg(0x03 * 0x4000));
    }

    #[test]
    fn reset_restores_initial_banks() {
        let mut mapper = Uxrom::new(8, 1).unwrap();
        mapper.write(0x8000, 0x05);
        mapper.reset();
        assert_eq!(mapper.read(0x8000), Mapped::Prg(0x00000));
        assert_eq!(mapper.read(0xC000), Mapped::Prg(0x1C000));
    }

    #[test]
    fn character_writes_map_to_ram_only_without_rom() {
        let mut with_rom = Uxrom::new(2, 1).unwrap();
        assert_eq!(with_rom.write(0x0010, 0xAA), Mapped::None);

        let mut with_ram = Uxrom::new(2, 0).unwrap();
        assert_eq!(with_ram.write(0x0010, 0xAA), Mapped::Chr(0x0010));
    }

    #[test]
    fn rejects_zero_program_banks() {
        assert!(matches!(
            Uxrom::new(0, 1),
            Err(Error::InvalidProgramBankCount(0))
        ));
        assert!(matches!(
            Uxrom::new(4, 2),
            Err(Error::InvalidCharacterBankCount(2))
        ));
    }
}
