use std::fmt;

use crate::cpu::addressing::Addressing as A;

/// Operation selector for the execution dispatch.
///
/// The 56 documented operations plus [`Mnemonic::Xxx`], the sink every
/// remaining undocumented opcode funnels into. The handful of undocumented
/// opcodes with well-known benign behavior (`NOP` shapes and the `$EB` SBC
/// alias) are mapped onto their documented counterparts instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    /// Undocumented-opcode sink; executes as a no-op.
    Xxx,
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(self, Self::Xxx) {
            return write!(f, "???");
        }
        let name = format!("{self:?}").to_ascii_uppercase();
        write!(f, "{name}")
    }
}

/// One slot of the opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub addressing: A,
    /// Base cycle count; branch and page-cross penalties come on top.
    pub cycles: u8,
}

// Short aliases keeping the 16x16 table readable.
const IMP: A = A::Implied;
const IMM: A = A::Immediate;
const REL: A = A::Relative;
const ZP0: A = A::ZeroPage;
const ZPX: A = A::ZeroPageX;
const ZPY: A = A::ZeroPageY;
const ABS: A = A::Absolute;
const ABX: A = A::AbsoluteX;
const ABY: A = A::AbsoluteY;
const IND: A = A::Indirect;
const IZX: A = A::IndirectX;
const IZY: A = A::IndirectY;

macro_rules! op {
    ($mnemonic:ident, $addressing:ident, $cycles:literal) => {
        Instruction {
            mnemonic: Mnemonic::$mnemonic,
            addressing: $addressing,
            cycles: $cycles,
        }
    };
}

#[rustfmt::skip]
pub(crate) static LOOKUP_TABLE: [Instruction; 256] = [
    // 0x00
    op!(Brk, IMP, 7), op!(Ora, IZX, 6), op!(Xxx, IMP, 2), op!(Xxx, IMP, 8),
    op!(Nop, ZP0, 3), op!(Ora, ZP0, 3), op!(Asl, ZP0, 5), op!(Xxx, IMP, 5),
    op!(Php, IMP, 3), op!(Ora, IMM, 2), op!(Asl, IMP, 2), op!(Xxx, IMP, 2),
    op!(Nop, ABS, 4), op!(Ora, ABS, 4), op!(Asl, ABS, 6), op!(Xxx, IMP, 6),
    // 0x10
    op!(Bpl, REL, 2), op!(Ora, IZY, 5), op!(Xxx, IMP, 2), op!(Xxx, IMP, 8),
    op!(Nop, ZPX, 4), op!(Ora, ZPX, 4), op!(Asl, ZPX, 6), op!(Xxx, IMP, 6),
    op!(Clc, IMP, 2), op!(Ora, ABY, 4), op!(Nop, IMP, 2), op!(Xxx, IMP, 7),
    op!(Nop, ABX, 4), op!(Ora, ABX, 4), op!(Asl, ABX, 7), op!(Xxx, IMP, 7),
    // 0x20
    op!(Jsr, ABS, 6), op!(And, IZX, 6), op!(Xxx, IMP, 2), op!(Xxx, IMP, 8),
    op!(Bit, ZP0, 3), op!(And, ZP0, 3), op!(Rol, ZP0, 5), op!(Xxx, IMP, 5),
    op!(Plp, IMP, 4), op!(And, IMM, 2), op!(Rol, IMP, 2), op!(Xxx, IMP, 2),
    op!(Bit, ABS, 4), op!(And, ABS, 4), op!(Rol, ABS, 6), op!(Xxx, IMP, 6),
    // 0x30
    op!(Bmi, REL, 2), op!(And, IZY, 5), op!(Xxx, IMP, 2), op!(Xxx, IMP, 8),
    op!(Nop, ZPX, 4), op!(And, ZPX, 4), op!(Rol, ZPX, 6), op!(Xxx, IMP, 6),
    op!(Sec, IMP, 2), op!(And, ABY, 4), op!(Nop, IMP, 2), op!(Xxx, IMP, 7),
    op!(Nop, ABX, 4), op!(And, ABX, 4), op!(Rol, ABX, 7), op!(Xxx, IMP, 7),
    // 0x40
    op!(Rti, IMP, 6), op!(Eor, IZX, 6), op!(Xxx, IMP, 2), op!(Xxx, IMP, 8),
    op!(Nop, ZP0, 3), op!(Eor, ZP0, 3), op!(Lsr, ZP0, 5), op!(Xxx, IMP, 5),
    op!(Pha, IMP, 3), op!(Eor, IMM, 2), op!(Lsr, IMP, 2), op!(Xxx, IMP, 2),
    op!(Jmp, ABS, 3), op!(Eor, ABS, 4), op!(Lsr, ABS, 6), op!(Xxx, IMP, 6),
    // 0x50
    op!(Bvc, REL, 2), op!(Eor, IZY, 5), op!(Xxx, IMP, 2), op!(Xxx, IMP, 8),
    op!(Nop, ZPX, 4), op!(Eor, ZPX, 4), op!(Lsr, ZPX, 6), op!(Xxx, IMP, 6),
    op!(Cli, IMP, 2), op!(Eor, ABY, 4), op!(Nop, IMP, 2), op!(Xxx, IMP, 7),
    op!(Nop, ABX, 4), op!(Eor, ABX, 4), op!(Lsr, ABX, 7), op!(Xxx, IMP, 7),
    // 0x60
    op!(Rts, IMP, 6), op!(Adc, IZX, 6), op!(Xxx, IMP, 2), op!(Xxx, IMP, 8),
    op!(Nop, ZP0, 3), op!(Adc, ZP0, 3), op!(Ror, ZP0, 5), op!(Xxx, IMP, 5),
    op!(Pla, IMP, 4), op!(Adc, IMM, 2), op!(Ror, IMP, 2), op!(Xxx, IMP, 2),
    op!(Jmp, IND, 5), op!(Adc, ABS, 4), op!(Ror, ABS, 6), op!(Xxx, IMP, 6),
    // 0x70
    op!(Bvs, REL, 2), op!(Adc, IZY, 5), op!(Xxx, IMP, 2), op!(Xxx, IMP, 8),
    op!(Nop, ZPX, 4), op!(Adc, ZPX, 4), op!(Ror, ZPX, 6), op!(Xxx, IMP, 6),
    op!(Sei, IMP, 2), op!(Adc, ABY, 4), op!(Nop, IMP, 2), op!(Xxx, IMP, 7),
    op!(Nop, ABX, 4), op!(Adc, ABX, 4), op!(Ror, ABX, 7), op!(Xxx, IMP, 7),
    // 0x80
    op!(Nop, IMM, 2), op!(Sta, IZX, 6), op!(Nop, IMM, 2), op!(Xxx, IMP, 6),
    op!(Sty, ZP0, 3), op!(Sta, ZP0, 3), op!(Stx, ZP0, 3), op!(Xxx, IMP, 3),
    op!(Dey, IMP, 2), op!(Nop, IMM, 2), op!(Txa, IMP, 2), op!(Xxx, IMP, 2),
    op!(Sty, ABS, 4), op!(Sta, ABS, 4), op!(Stx, ABS, 4), op!(Xxx, IMP, 4),
    // 0x90
    op!(Bcc, REL, 2), op!(Sta, IZY, 6), op!(Xxx, IMP, 2), op!(Xxx, IMP, 6),
    op!(Sty, ZPX, 4), op!(Sta, ZPX, 4), op!(Stx, ZPY, 4), op!(Xxx, IMP, 4),
    op!(Tya, IMP, 2), op!(Sta, ABY, 5), op!(Txs, IMP, 2), op!(Xxx, IMP, 5),
    op!(Xxx, IMP, 5), op!(Sta, ABX, 5), op!(Xxx, IMP, 5), op!(Xxx, IMP, 5),
    // 0xA0
    op!(Ldy, IMM, 2), op!(Lda, IZX, 6), op!(Ldx, IMM, 2), op!(Xxx, IMP, 6),
    op!(Ldy, ZP0, 3), op!(Lda, ZP0, 3), op!(Ldx, ZP0, 3), op!(Xxx, IMP, 3),
    op!(Tay, IMP, 2), op!(Lda, IMM, 2), op!(Tax, IMP, 2), op!(Xxx, IMP, 2),
    op!(Ldy, ABS, 4), op!(Lda, ABS, 4), op!(Ldx, ABS, 4), op!(Xxx, IMP, 4),
    // 0xB0
    op!(Bcs, REL, 2), op!(Lda, IZY, 5), op!(Xxx, IMP, 2), op!(Xxx, IMP, 5),
    op!(Ldy, ZPX, 4), op!(Lda, ZPX, 4), op!(Ldx, ZPY, 4), op!(Xxx, IMP, 4),
    op!(Clv, IMP, 2), op!(Lda, ABY, 4), op!(Tsx, IMP, 2), op!(Xxx, IMP, 4),
    op!(Ldy, ABX, 4), op!(Lda, ABX, 4), op!(Ldx, ABY, 4), op!(Xxx, IMP, 4),
    // 0xC0
    op!(Cpy, IMM, 2), op!(Cmp, IZX, 6), op!(Nop, IMM, 2), op!(Xxx, IMP, 8),
    op!(Cpy, ZP0, 3), op!(Cmp, ZP0, 3), op!(Dec, ZP0, 5), op!(Xxx, IMP, 5),
    op!(Iny, IMP, 2), op!(Cmp, IMM, 2), op!(Dex, IMP, 2), op!(Xxx, IMP, 2),
    op!(Cpy, ABS, 4), op!(Cmp, ABS, 4), op!(Dec, ABS, 6), op!(Xxx, IMP, 6),
    // 0xD0
    op!(Bne, REL, 2), op!(Cmp, IZY, 5), op!(Xxx, IMP, 2), op!(Xxx, IMP, 8),
    op!(Nop, ZPX, 4), op!(Cmp, ZPX, 4), op!(Dec, ZPX, 6), op!(Xxx, IMP, 6),
    op!(Cld, IMP, 2), op!(Cmp, ABY, 4), op!(Nop, IMP, 2), op!(Xxx, IMP, 7),
    op!(Nop, ABX, 4), op!(Cmp, ABX, 4), op!(Dec, ABX, 7), op!(Xxx, IMP, 7),
    // 0xE0
    op!(Cpx, IMM, 2), op!(Sbc, IZX, 6), op!(Nop, IMM, 2), op!(Xxx, IMP, 8),
    op!(Cpx, ZP0, 3), op!(Sbc, ZP0, 3), op!(Inc, ZP0, 5), op!(Xxx, IMP, 5),
    op!(Inx, IMP, 2), op!(Sbc, IMM, 2), op!(Nop, IMP, 2), op!(Sbc, IMM, 2),
    op!(Cpx, ABS, 4), op!(Sbc, ABS, 4), op!(Inc, ABS, 6), op!(Xxx, IMP, 6),
    // 0xF0
    op!(Beq, REL, 2), op!(Sbc, IZY, 5), op!(Xxx, IMP, 2), op!(Xxx, IMP, 8),
    op!(Nop, ZPX, 4), op!(Sbc, ZPX, 4), op!(Inc, ZPX, 6), op!(Xxx, IMP, 6),
    op!(Sed, IMP, 2), op!(Sbc, ABY, 4), op!(Nop, IMP, 2), op!(Xxx, IMP, 7),
    op!(Nop, ABX, 4), op!(Sbc, ABX, 4), op!(Inc, ABX, 7), op!(Xxx, IMP, 7),
];
