#![allow(dead_code)]

use anyhow::Result;
use famicore::Console;
use famicore::cartridge::Cartridge;
use famicore::cartridge::header::{CHR_BANK_SIZE, INES_HEADER_LEN, INES_MAGIC, PRG_BANK_SIZE};

/// Builds a minimal iNES image. Program banks are filled with their own
/// bank index so bank-switching tests can tell them apart.
pub fn ines_image(prg_banks: u8, chr_banks: u8, flags6: u8, flags7: u8) -> Vec<u8> {
    let mut image = vec![0u8; INES_HEADER_LEN];
    image[..4].copy_from_slice(&INES_MAGIC);
    image[4] = prg_banks;
    image[5] = chr_banks;
    image[6] = flags6;
    image[7] = flags7;
    for bank in 0..prg_banks {
        image.extend(std::iter::repeat_n(bank, PRG_BANK_SIZE));
    }
    for _ in 0..chr_banks {
        image.extend(std::iter::repeat_n(0u8, CHR_BANK_SIZE));
    }
    image
}

/// NROM image with `program` at `$8000`, the reset vector aimed at it, and
/// the NMI vector at `$8080`.
pub fn program_image(program: &[u8]) -> Vec<u8> {
    let mut image = ines_image(1, 1, 0x00, 0x00);
    let prg = INES_HEADER_LEN;
    image[prg..prg + program.len()].copy_from_slice(program);
    // One 16 KiB bank mirrors across the window, so offset $3FFC lands on
    // the $FFFC reset vector and $3FFA on the NMI vector.
    image[prg + 0x3FFA] = 0x80;
    image[prg + 0x3FFB] = 0x80;
    image[prg + 0x3FFC] = 0x00;
    image[prg + 0x3FFD] = 0x80;
    image
}

/// Powered-on console with `program` seated and reset.
pub fn console_with_program(program: &[u8]) -> Result<Console> {
    let mut console = Console::new()?;
    let cartridge = Cartridge::from_ines_bytes(&program_image(program))?;
    console.insert_cartridge(cartridge);
    Ok(console)
}

/// Steps whole instructions until the program counter reaches `stop`.
pub fn run_until_pc(console: &mut Console, stop: u16) {
    let mut guard = 0u32;
    while console.cpu().pc() < stop {
        console.advance_instruction();
        guard += 1;
        assert!(guard < 100_000, "program never reached {stop:#06X}");
    }
}

/// Ticks the master clock until the PPU sits at `(scanline, dot)`.
pub fn run_until_ppu_at(console: &mut Console, scanline: i16, dot: u16) {
    let mut guard = 0u32;
    while !(console.ppu().scanline() == scanline && console.ppu().dot() == dot) {
        console.clock();
        guard += 1;
        assert!(guard < 200_000, "ppu never reached ({scanline}, {dot})");
    }
}
