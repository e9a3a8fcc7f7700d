//! Table-driven disassembler.
//!
//! Decodes straight off the live bus with the same lookup table the
//! executor uses, so the listing can never drift from execution.

use std::collections::BTreeMap;

use crate::bus::Bus;
use crate::cpu::addressing::Addressing;
use crate::cpu::lookup::LOOKUP_TABLE;

/// Disassembles `[start..=stop]`, keyed by each instruction's start address.
///
/// Operands are rendered in conventional notation; branch targets are
/// resolved against the already-advanced program counter and shown next to
/// the raw displacement.
pub fn disassemble(bus: &Bus, start: u16, stop: u16) -> BTreeMap<u16, String> {
    let mut listing = BTreeMap::new();
    let mut addr = start as u32;

    while addr <= stop as u32 {
        let line_addr = addr as u16;
        let opcode = bus.read(addr as u16);
        addr += 1;
        let instruction = &LOOKUP_TABLE[opcode as usize];

        let lo = bus.read(addr as u16);
        let hi = bus.read(addr.wrapping_add(1) as u16);
        let word = u16::from_le_bytes([lo, hi]);
        addr += instruction.addressing.operand_len() as u32;

        let operands = match instruction.addressing {
            Addressing::Implied => String::new(),
            Addressing::Immediate => format!(" #${lo:02X}"),
            Addressing::ZeroPage => format!(" ${lo:02X}"),
            Addressing::ZeroPageX => format!(" ${lo:02X},X"),
            Addressing::ZeroPageY => format!(" ${lo:02X},Y"),
            Addressing::IndirectX => format!(" (${lo:02X},X)"),
            Addressing::IndirectY => format!(" (${lo:02X}),Y"),
            Addressing::Absolute => format!(" ${word:04X}"),
            Addressing::AbsoluteX => format!(" ${word:04X},X"),
            Addressing::AbsoluteY => format!(" ${word:04X},Y"),
            Addressing::Indirect => format!(" (${word:04X})"),
            Addressing::Relative => {
                let target = (addr as u16).wrapping_add(lo as i8 as i16 as u16);
                format!(" ${lo:02X} [${target:04X}]")
            }
        };

        listing.insert(line_addr, format!("{}{}", instruction.mnemonic, operands));
    }

    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::AddressRange;
    use crate::ram::Ram;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn bus_with(program: &[u8], origin: u16) -> Bus {
        let ram = Ram::new(0x10000, AddressRange::new(0x0000, 0xFFFF)).unwrap();
        let mut bus = Bus::new();
        bus.attach(AddressRange::new(0x0000, 0xFFFF), Rc::new(RefCell::new(ram)))
            .unwrap();
        for (offset, byte) in program.iter().enumerate() {
            bus.write(origin + offset as u16, *byte);
        }
        bus
    }

    #[test]
    fn formats_each_operand_shape() {
        let bus = bus_with(
            &[
                0xA9, 0x0A, // LDA #$0A
                0x85, 0x42, // STA $42
                0xB5, 0x42, // LDA $42,X
                0x8D, 0x34, 0x12, // STA $1234
                0xBD, 0x34, 0x12, // LDA $1234,X
                0x6C, 0xFF, 0x02, // JMP ($02FF)
                0xA1, 0x40, // LDA ($40,X)
                0xB1, 0x40, // LDA ($40),Y
                0xD0, 0xFA, // BNE $FA
                0xEA, // NOP
            ],
            0x8000,
        );

        let listing = disassemble(&bus, 0x8000, 0x8016);
        assert_eq!(listing[&0x8000], "LDA #$0A");
        assert_eq!(listing[&0x8002], "STA $42");
        assert_eq!(listing[&0x8004], "LDA $42,X");
        assert_eq!(listing[&0x8006], "STA $1234");
        assert_eq!(listing[&0x8009], "LDA $1234,X");
        assert_eq!(listing[&0x800C], "JMP ($02FF)");
        assert_eq!(listing[&0x800F], "LDA ($40,X)");
        assert_eq!(listing[&0x8011], "LDA ($40),Y");
        assert_eq!(listing[&0x8013], "BNE $FA [$800F]");
        assert_eq!(listing[&0x8015], "NOP");
    }

    #[test]
    fn keys_are_instruction_start_addresses() {
        let bus = bus_with(&[0xA2, 0x0A, 0x8E, 0x00, 0x00, 0xEA], 0x8000);
        let listing = disassemble(&bus, 0x8000, 0x8005);
        let addrs: Vec<u16> = listing.keys().copied().collect();
        assert_eq!(addrs, [0x8000, 0x8002, 0x8005]);
    }
}
