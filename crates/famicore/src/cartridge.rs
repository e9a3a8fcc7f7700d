//! iNES cartridges and the console's cartridge slot.

use std::path::Path;

use tracing::debug;

use crate::bus::BusDevice;
use crate::cartridge::header::{
    CHR_BANK_SIZE, Header, INES_HEADER_LEN, Mirroring, PRG_BANK_SIZE, TRAINER_LEN,
};
use crate::cartridge::mapper::{Mapped, Mapper};
use crate::error::Error;

pub mod header;
pub mod mapper;

/// A parsed cartridge: program and character memory plus the mapper that
/// translates bus addresses into them.
#[derive(Debug, Clone)]
pub struct Cartridge {
    header: Header,
    prg: Vec<u8>,
    chr: Vec<u8>,
    mapper: Mapper,
}

impl Cartridge {
    /// Builds a cartridge from a complete iNES image held in memory.
    ///
    /// The image must carry the `NES\x1A` magic and as many program and
    /// character bytes as its header declares; anything shorter fails with
    /// [`Error::InvalidDataFormat`]. A zero character-bank count allocates
    /// 8 KiB of character RAM instead.
    pub fn from_ines_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let header = Header::parse(bytes)?;
        let mapper = Mapper::from_id(header.mapper_id, header.prg_banks, header.chr_banks)?;

        let mut offset = INES_HEADER_LEN;
        if header.trainer_present {
            offset += TRAINER_LEN;
        }

        let prg_len = header.prg_banks as usize * PRG_BANK_SIZE;
        let prg = section(bytes, offset, prg_len)?;
        offset += prg_len;

        let chr = if header.chr_banks == 0 {
            vec![0; CHR_BANK_SIZE]
        } else {
            let chr_len = header.chr_banks as usize * CHR_BANK_SIZE;
            section(bytes, offset, chr_len)?
        };

        debug!(
            mapper = header.mapper_id,
            prg_banks = header.prg_banks,
            chr_banks = header.chr_banks,
            mirroring = ?header.mirroring,
            "cartridge image parsed"
        );

        Ok(Self {
            header,
            prg,
            chr,
            mapper,
        })
    }

    /// Loads and parses an iNES image from disk.
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        Self::from_ines_bytes(&bytes)
    }

    /// Resolves a read on either bus window through the mapper.
    pub fn read(&self, addr: u16) -> u8 {
        match self.mapper.read(addr) {
            Mapped::Prg(offset) => self.prg.get(offset as usize).copied().unwrap_or(0),
            Mapped::Chr(offset) => self.chr.get(offset as usize).copied().unwrap_or(0),
            Mapped::Value(value) => value,
            Mapped::None => 0,
        }
    }

    /// Resolves a write through the mapper. Writes landing in program or
    /// character memory update it in place; everything else is either a
    /// mapper latch (already applied) or ignored.
    pub fn write(&mut self, addr: u16, value: u8) {
        match self.mapper.write(addr, value) {
            Mapped::Prg(offset) => {
                if let Some(slot) = self.prg.get_mut(offset as usize) {
                    *slot = value;
                }
            }
            Mapped::Chr(offset) => {
                if let Some(slot) = self.chr.get_mut(offset as usize) {
                    *slot = value;
                }
            }
            Mapped::Value(_) | Mapped::None => {}
        }
    }

    /// Effective mirroring: mapper override first, then the header.
    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring().unwrap_or(self.header.mirroring)
    }

    /// Restores the mapper's initial bank selection.
    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }
}

fn section(bytes: &[u8], offset: usize, len: usize) -> Result<Vec<u8>, Error> {
    bytes
        .get(offset..offset + len)
        .map(<[u8]>::to_vec)
        .ok_or(Error::InvalidDataFormat)
}

/// Hot-insertion point for cartridges.
///
/// The slot is the device attached to both buses (CPU program window, PPU
/// character window), so replacing the cartridge never re-wires the buses.
/// An empty slot reads 0 and swallows writes.
#[derive(Debug, Default)]
pub struct CartridgeSlot {
    cartridge: Option<Cartridge>,
}

impl CartridgeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats a cartridge, returning the previous occupant.
    pub fn insert(&mut self, cartridge: Cartridge) -> Option<Cartridge> {
        self.cartridge.replace(cartridge)
    }

    pub fn eject(&mut self) -> Option<Cartridge> {
        self.cartridge.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    /// Mirroring seen by the PPU; horizontal when the slot is empty.
    pub fn mirroring(&self) -> Mirroring {
        self.cartridge
            .as_ref()
            .map(Cartridge::mirroring)
            .unwrap_or_default()
    }
}

impl BusDevice for CartridgeSlot {
    fn read(&mut self, addr: u16) -> u8 {
        match &self.cartridge {
            Some(cartridge) => cartridge.read(addr),
            None => 0,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if let Some(cartridge) = &mut self.cartridge {
            cartridge.write(addr, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal iNES image builder for the parser tests.
    fn ines_image(prg_banks: u8, chr_banks: u8, flags6: u8, flags7: u8) -> Vec<u8> {
        let mut image = vec![0u8; INES_HEADER_LEN];
        image[..4].copy_from_slice(&header::INES_MAGIC);
        image[4] = prg_banks;
        image[5] = chr_banks;
        image[6] = flags6;
        image[7] = flags7;
        for bank in 0..prg_banks {
            image.extend(std::iter::repeat_n(bank, PRG_BANK_SIZE));
        }
        for bank in 0..chr_banks {
            image.extend(std::iter::repeat_n(0xC0 | bank, CHR_BANK_SIZE));
        }
        image
    }

    #[test]
    fn parses_program_and_character_sections() {
        let cart = Cartridge::from_ines_bytes(&ines_image(2, 1, 0x00, 0x00)).unwrap();
        assert_eq!(cart.read(0x8000), 0);
        assert_eq!(cart.read(0xC000), 1);
        assert_eq!(cart.read(0x0000), 0xC0);
    }

    #[test]
    fn bad_magic_is_invalid_data() {
        let mut image = ines_image(1, 1, 0x00, 0x00);
        image[..4].copy_from_slice(b"NOT!");
        assert!(matches!(
            Cartridge::from_ines_bytes(&image),
            Err(Error::InvalidDataFormat)
        ));
    }

    #[test]
    fn truncated_image_is_invalid_data() {
        let mut image = ines_image(2, 1, 0x00, 0x00);
        image.truncate(INES_HEADER_LEN + PRG_BANK_SIZE);
        assert!(matches!(
            Cartridge::from_ines_bytes(&image),
            Err(Error::InvalidDataFormat)
        ));
    }

    #[test]
    fn trainer_block_is_skipped() {
        let mut image = vec![0u8; INES_HEADER_LEN];
        image[..4].copy_from_slice(&header::INES_MAGIC);
        image[4] = 1;
        image[5] = 1;
        image[6] = 0x04;
        image.extend(std::iter::repeat_n(0xEE, TRAINER_LEN));
        image.extend(std::iter::repeat_n(0x11, PRG_BANK_SIZE));
        image.extend(std::iter::repeat_n(0x22, CHR_BANK_SIZE));

        let cart = Cartridge::from_ines_bytes(&image).unwrap();
        assert_eq!(cart.read(0x8000), 0x11);
        assert_eq!(cart.read(0x0000), 0x22);
    }

    #[test]
    fn zero_character_banks_allocate_writable_ram() {
        // UxROM board without character ROM: the window is RAM.
        let mut cart = Cartridge::from_ines_bytes(&ines_image(1, 0, 0x20, 0x00)).unwrap();
        assert_eq!(cart.mapper().id(), 2);
        cart.write(0x0123, 0x7E);
        assert_eq!(cart.read(0x0123), 0x7E);
    }

    #[test]
    fn program_writes_patch_program_memory_in_place() {
        let mut cart = Cartridge::from_ines_bytes(&ines_image(1, 1, 0x00, 0x00)).unwrap();
        cart.write(0xFFFC, 0x34);
        cart.write(0xFFFD, 0x12);
        assert_eq!(cart.read(0xFFFC), 0x34);
        assert_eq!(cart.read(0xFFFD), 0x12);
    }

    #[test]
    fn repeated_reads_are_deterministic() {
        let cart = Cartridge::from_ines_bytes(&ines_image(2, 1, 0x00, 0x00)).unwrap();
        let first = cart.read(0x9ABC);
        assert_eq!(cart.read(0x9ABC), first);
    }

    #[test]
    fn empty_slot_reads_zero() {
        let mut slot = CartridgeSlot::new();
        assert_eq!(slot.read(0x8000), 0);
        slot.write(0x8000, 0xFF);
        assert_eq!(slot.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn slot_exposes_cartridge_mirroring() {
        let mut slot = CartridgeSlot::new();
        let cart = Cartridge::from_ines_bytes(&ines_image(1, 1, 0x01, 0x00)).unwrap();
        slot.insert(cart);
        assert_eq!(slot.mirroring(), Mirroring::Vertical);
    }
}
