//! 6502 CPU interpreter.
//!
//! A table-driven fetch/decode/execute core. One [`Cpu::clock`] call is one
//! CPU cycle; real work happens on the cycle that dispatches an instruction
//! and the remaining cycles burn down a counter so instructions retire with
//! hardware-accurate timing. Decimal mode is recorded in the status
//! register but never applied, matching the console's CPU variant.

use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::bus::Bus;
use crate::cpu::addressing::Addressing;
use crate::cpu::lookup::LOOKUP_TABLE;
use crate::memory::cpu::{
    IRQ_VECTOR_LO, NMI_VECTOR_LO, RESET_VECTOR_LO, STACK_PAGE_START,
};

pub mod addressing;
pub mod disasm;
mod lookup;
mod status;

pub use lookup::{Instruction, Mnemonic};
pub use status::Status;

/// Lightweight register capture for tracing and debugging.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuSnapshot {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
}

pub struct Cpu {
    a: u8,     // Accumulator
    x: u8,     // X index register
    y: u8,     // Y index register
    s: u8,     // Stack pointer
    p: Status, // Processor status
    pc: u16,   // Program counter

    /// Opcode currently retiring; consulted by the NOP penalty check.
    opcode: u8,
    /// Effective address produced by the addressing mode.
    addr_abs: u16,
    /// Sign-extended branch displacement.
    addr_rel: u16,
    /// Cycles left before the next instruction may dispatch.
    cycles_remaining: u8,
    /// Cycles executed since reset (wrapping).
    total_cycles: u64,

    bus: Rc<Bus>,
}

impl Cpu {
    /// Creates a CPU wired to `bus`. Registers hold power-on defaults;
    /// call [`Cpu::reset`] to load the reset vector.
    pub fn new(bus: Rc<Bus>) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            p: Status::UNUSED,
            pc: 0,
            opcode: 0,
            addr_abs: 0,
            addr_rel: 0,
            cycles_remaining: 0,
            total_cycles: 0,
            bus,
        }
    }

    /// Loads the reset vector and restores the documented post-reset state.
    /// The sequence occupies 8 cycles before the first instruction runs.
    pub fn reset(&mut self) {
        self.pc = self.read_vector(RESET_VECTOR_LO);
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.s = 0xFD;
        self.p = Status::UNUSED;
        self.opcode = 0;
        self.addr_abs = 0;
        self.addr_rel = 0;
        self.cycles_remaining = 8;
        self.total_cycles = 0;
    }

    /// Maskable interrupt. Ignored while the I flag is set.
    pub fn irq(&mut self) {
        if self.p.contains(Status::INTERRUPT) {
            return;
        }
        self.interrupt(IRQ_VECTOR_LO, 7);
    }

    /// Non-maskable interrupt.
    pub fn nmi(&mut self) {
        self.interrupt(NMI_VECTOR_LO, 8);
    }

    fn interrupt(&mut self, vector: u16, cycles: u8) {
        self.push((self.pc >> 8) as u8);
        self.push(self.pc as u8);
        self.p.remove(Status::BREAK);
        self.p.insert(Status::UNUSED);
        self.push(self.p.bits());
        self.p.insert(Status::INTERRUPT);
        self.pc = self.read_vector(vector);
        self.cycles_remaining = cycles;
    }

    /// Advances one CPU cycle.
    ///
    /// Dispatch happens on the first cycle of an instruction; every later
    /// cycle only burns the remaining-cycle counter so the instruction
    /// occupies its documented duration on the bus.
    pub fn clock(&mut self) {
        if self.cycles_remaining == 0 {
            self.opcode = self.bus.read(self.pc);
            self.p.insert(Status::UNUSED);
            self.pc = self.pc.wrapping_add(1);

            let instruction = LOOKUP_TABLE[self.opcode as usize];
            self.cycles_remaining = instruction.cycles;
            let crossed = self.resolve_operand_address(instruction.addressing);
            let honors_cross = self.execute(&instruction);
            self.cycles_remaining += crossed & honors_cross;

            self.p.insert(Status::UNUSED);
        }
        self.total_cycles = self.total_cycles.wrapping_add(1);
        self.cycles_remaining -= 1;
    }

    /// `true` between instructions; the next clock will dispatch.
    pub fn is_complete(&self) -> bool {
        self.cycles_remaining == 0
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn status(&self) -> Status {
        self.p
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Captures the current registers.
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            pc: self.pc,
            a: self.a,
            x: self.x,
            y: self.y,
            s: self.s,
            p: self.p.bits(),
        }
    }

    // ---------------------------------------------------------------------
    // Addressing
    // ---------------------------------------------------------------------

    /// Computes the effective address for `mode`, advancing the program
    /// counter past the operand bytes. Returns 1 when indexing crossed a
    /// page in a mode that can charge for it, else 0.
    fn resolve_operand_address(&mut self, mode: Addressing) -> u8 {
        match mode {
            Addressing::Implied => {
                // The operand, if any, is the accumulator.
                self.addr_abs = self.pc;
                0
            }
            Addressing::Immediate => {
                self.addr_abs = self.pc;
                self.pc = self.pc.wrapping_add(1);
                0
            }
            Addressing::ZeroPage => {
                self.addr_abs = self.operand_byte() as u16;
                0
            }
            Addressing::ZeroPageX => {
                self.addr_abs = self.operand_byte().wrapping_add(self.x) as u16;
                0
            }
            Addressing::ZeroPageY => {
                self.addr_abs = self.operand_byte().wrapping_add(self.y) as u16;
                0
            }
            Addressing::Absolute => {
                self.addr_abs = self.operand_word();
                0
            }
            Addressing::AbsoluteX => {
                let base = self.operand_word();
                self.addr_abs = base.wrapping_add(self.x as u16);
                self.page_crossed(base)
            }
            Addressing::AbsoluteY => {
                let base = self.operand_word();
                self.addr_abs = base.wrapping_add(self.y as u16);
                self.page_crossed(base)
            }
            Addressing::Relative => {
                self.addr_rel = self.operand_byte() as i8 as i16 as u16;
                0
            }
            Addressing::Indirect => {
                let pointer = self.operand_word();
                let lo = self.bus.read(pointer);
                // Hardware never carries into the pointer high byte: a
                // pointer ending in $FF wraps to the start of its own page.
                let hi_addr = if pointer & 0x00FF == 0x00FF {
                    pointer & 0xFF00
                } else {
                    pointer + 1
                };
                let hi = self.bus.read(hi_addr);
                self.addr_abs = u16::from_le_bytes([lo, hi]);
                0
            }
            Addressing::IndirectX => {
                let pointer = self.operand_byte().wrapping_add(self.x);
                let lo = self.bus.read(pointer as u16);
                let hi = self.bus.read(pointer.wrapping_add(1) as u16);
                self.addr_abs = u16::from_le_bytes([lo, hi]);
                0
            }
            Addressing::IndirectY => {
                let pointer = self.operand_byte();
                let lo = self.bus.read(pointer as u16);
                let hi = self.bus.read(pointer.wrapping_add(1) as u16);
                let base = u16::from_le_bytes([lo, hi]);
                self.addr_abs = base.wrapping_add(self.y as u16);
                self.page_crossed(base)
            }
        }
    }

    #[inline]
    fn operand_byte(&mut self) -> u8 {
        let byte = self.bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    #[inline]
    fn operand_word(&mut self) -> u16 {
        let lo = self.operand_byte();
        let hi = self.operand_byte();
        u16::from_le_bytes([lo, hi])
    }

    #[inline]
    fn page_crossed(&self, base: u16) -> u8 {
        u8::from(self.addr_abs & 0xFF00 != base & 0xFF00)
    }

    /// Reads the instruction operand: the accumulator in implied mode,
    /// otherwise the byte at the effective address.
    #[inline]
    fn fetch(&self, instruction: &Instruction) -> u8 {
        if instruction.addressing == Addressing::Implied {
            self.a
        } else {
            self.bus.read(self.addr_abs)
        }
    }

    /// Stores a read-modify-write result back where it came from.
    #[inline]
    fn store(&mut self, instruction: &Instruction, value: u8) {
        if instruction.addressing == Addressing::Implied {
            self.a = value;
        } else {
            self.bus.write(self.addr_abs, value);
        }
    }

    fn read_vector(&self, lo_addr: u16) -> u16 {
        let lo = self.bus.read(lo_addr);
        let hi = self.bus.read(lo_addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    // ---------------------------------------------------------------------
    // Stack
    // ---------------------------------------------------------------------

    fn push(&mut self, value: u8) {
        self.bus.write(STACK_PAGE_START | self.s as u16, value);
        self.s = self.s.wrapping_sub(1);
    }

    fn pull(&mut self) -> u8 {
        self.s = self.s.wrapping_add(1);
        self.bus.read(STACK_PAGE_START | self.s as u16)
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Runs the operation. The return value is 1 when the operation honors
    /// the addressing mode's page-cross penalty (memory reads do, stores
    /// and read-modify-writes bake the cycle into their base cost).
    fn execute(&mut self, instruction: &Instruction) -> u8 {
        match instruction.mnemonic {
            Mnemonic::Adc => {
                let m = self.fetch(instruction);
                self.add_to_accumulator(m);
                1
            }
            Mnemonic::Sbc => {
                // Subtraction is addition of the one's complement; the
                // borrow rides on the inverted carry.
                let m = self.fetch(instruction) ^ 0xFF;
                self.add_to_accumulator(m);
                1
            }
            Mnemonic::And => {
                self.a &= self.fetch(instruction);
                self.p.set_zn(self.a);
                1
            }
            Mnemonic::Ora => {
                self.a |= self.fetch(instruction);
                self.p.set_zn(self.a);
                1
            }
            Mnemonic::Eor => {
                self.a ^= self.fetch(instruction);
                self.p.set_zn(self.a);
                1
            }
            Mnemonic::Asl => {
                let m = self.fetch(instruction);
                self.p.set(Status::CARRY, m & 0x80 != 0);
                let result = m << 1;
                self.p.set_zn(result);
                self.store(instruction, result);
                0
            }
            Mnemonic::Lsr => {
                let m = self.fetch(instruction);
                self.p.set(Status::CARRY, m & 0x01 != 0);
                let result = m >> 1;
                self.p.set_zn(result);
                self.store(instruction, result);
                0
            }
            Mnemonic::Rol => {
                let m = self.fetch(instruction);
                let carry_in = self.p.contains(Status::CARRY) as u8;
                self.p.set(Status::CARRY, m & 0x80 != 0);
                let result = (m << 1) | carry_in;
                self.p.set_zn(result);
                self.store(instruction, result);
                0
            }
            Mnemonic::Ror => {
                let m = self.fetch(instruction);
                let carry_in = self.p.contains(Status::CARRY) as u8;
                self.p.set(Status::CARRY, m & 0x01 != 0);
                let result = (carry_in << 7) | (m >> 1);
                self.p.set_zn(result);
                self.store(instruction, result);
                0
            }
            Mnemonic::Bit => {
                let m = self.fetch(instruction);
                self.p.set(Status::ZERO, self.a & m == 0);
                self.p.set(Status::NEGATIVE, m & 0x80 != 0);
                self.p.set(Status::OVERFLOW, m & 0x40 != 0);
                0
            }
            Mnemonic::Cmp => {
                let m = self.fetch(instruction);
                self.compare(self.a, m);
                1
            }
            Mnemonic::Cpx => {
                let m = self.fetch(instruction);
                self.compare(self.x, m);
                0
            }
            Mnemonic::Cpy => {
                let m = self.fetch(instruction);
                self.compare(self.y, m);
                0
            }
            Mnemonic::Inc => {
                let result = self.fetch(instruction).wrapping_add(1);
                self.p.set_zn(result);
                self.store(instruction, result);
                0
            }
            Mnemonic::Dec => {
                let result = self.fetch(instruction).wrapping_sub(1);
                self.p.set_zn(result);
                self.store(instruction, result);
                0
            }
            Mnemonic::Inx => {
                self.x = self.x.wrapping_add(1);
                self.p.set_zn(self.x);
                0
            }
            Mnemonic::Iny => {
                self.y = self.y.wrapping_add(1);
                self.p.set_zn(self.y);
                0
            }
            Mnemonic::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.p.set_zn(self.x);
                0
            }
            Mnemonic::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.p.set_zn(self.y);
                0
            }
            Mnemonic::Lda => {
                self.a = self.fetch(instruction);
                self.p.set_zn(self.a);
                1
            }
            Mnemonic::Ldx => {
                self.x = self.fetch(instruction);
                self.p.set_zn(self.x);
                1
            }
            Mnemonic::Ldy => {
                self.y = self.fetch(instruction);
                self.p.set_zn(self.y);
                1
            }
            Mnemonic::Sta => {
                self.bus.write(self.addr_abs, self.a);
                0
            }
            Mnemonic::Stx => {
                self.bus.write(self.addr_abs, self.x);
                0
            }
            Mnemonic::Sty => {
                self.bus.write(self.addr_abs, self.y);
                0
            }
            Mnemonic::Tax => {
                self.x = self.a;
                self.p.set_zn(self.x);
                0
            }
            Mnemonic::Tay => {
                self.y = self.a;
                self.p.set_zn(self.y);
                0
            }
            Mnemonic::Txa => {
                self.a = self.x;
                self.p.set_zn(self.a);
                0
            }
            Mnemonic::Tya => {
                self.a = self.y;
                self.p.set_zn(self.a);
                0
            }
            Mnemonic::Tsx => {
                self.x = self.s;
                self.p.set_zn(self.x);
                0
            }
            Mnemonic::Txs => {
                self.s = self.x;
                0
            }
            Mnemonic::Pha => {
                self.push(self.a);
                0
            }
            Mnemonic::Pla => {
                self.a = self.pull();
                self.p.set_zn(self.a);
                0
            }
            Mnemonic::Php => {
                // The pushed copy carries B and U; the live register keeps
                // neither.
                let pushed = self.p | Status::BREAK | Status::UNUSED;
                self.push(pushed.bits());
                self.p.remove(Status::BREAK);
                self.p.remove(Status::UNUSED);
                0
            }
            Mnemonic::Plp => {
                let mut p = Status::from_bits_truncate(self.pull());
                p.remove(Status::BREAK);
                p.insert(Status::UNUSED);
                self.p = p;
                0
            }
            Mnemonic::Jmp => {
                self.pc = self.addr_abs;
                0
            }
            Mnemonic::Jsr => {
                let return_addr = self.pc.wrapping_sub(1);
                self.push((return_addr >> 8) as u8);
                self.push(return_addr as u8);
                self.pc = self.addr_abs;
                0
            }
            Mnemonic::Rts => {
                let lo = self.pull();
                let hi = self.pull();
                self.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
                0
            }
            Mnemonic::Brk => {
                self.pc = self.pc.wrapping_add(1);
                self.push((self.pc >> 8) as u8);
                self.push(self.pc as u8);
                let pushed = self.p | Status::BREAK | Status::UNUSED;
                self.push(pushed.bits());
                self.p.remove(Status::BREAK);
                self.p.insert(Status::INTERRUPT);
                self.pc = self.read_vector(IRQ_VECTOR_LO);
                0
            }
            Mnemonic::Rti => {
                let mut p = Status::from_bits_truncate(self.pull());
                p.remove(Status::BREAK);
                p.remove(Status::UNUSED);
                self.p = p;
                let lo = self.pull();
                let hi = self.pull();
                self.pc = u16::from_le_bytes([lo, hi]);
                0
            }
            Mnemonic::Bcc => {
                self.branch_if(!self.p.contains(Status::CARRY));
                0
            }
            Mnemonic::Bcs => {
                self.branch_if(self.p.contains(Status::CARRY));
                0
            }
            Mnemonic::Beq => {
                self.branch_if(self.p.contains(Status::ZERO));
                0
            }
            Mnemonic::Bne => {
                self.branch_if(!self.p.contains(Status::ZERO));
                0
            }
            Mnemonic::Bmi => {
                self.branch_if(self.p.contains(Status::NEGATIVE));
                0
            }
            Mnemonic::Bpl => {
                self.branch_if(!self.p.contains(Status::NEGATIVE));
                0
            }
            Mnemonic::Bvc => {
                self.branch_if(!self.p.contains(Status::OVERFLOW));
                0
            }
            Mnemonic::Bvs => {
                self.branch_if(self.p.contains(Status::OVERFLOW));
                0
            }
            Mnemonic::Clc => {
                self.p.remove(Status::CARRY);
                0
            }
            Mnemonic::Sec => {
                self.p.insert(Status::CARRY);
                0
            }
            Mnemonic::Cld => {
                self.p.remove(Status::DECIMAL);
                0
            }
            Mnemonic::Sed => {
                self.p.insert(Status::DECIMAL);
                0
            }
            Mnemonic::Cli => {
                self.p.remove(Status::INTERRUPT);
                0
            }
            Mnemonic::Sei => {
                self.p.insert(Status::INTERRUPT);
                0
            }
            Mnemonic::Clv => {
                self.p.remove(Status::OVERFLOW);
                0
            }
            Mnemonic::Nop => {
                // Only the absolute-X NOP shapes charge for a page cross.
                u8::from(matches!(
                    self.opcode,
                    0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC
                ))
            }
            Mnemonic::Xxx => 0,
        }
    }

    /// Shared ADC/SBC core; SBC passes the inverted operand.
    fn add_to_accumulator(&mut self, m: u8) {
        let a = self.a as u16;
        let m = m as u16;
        let carry_in = self.p.contains(Status::CARRY) as u16;
        let sum = a + m + carry_in;

        self.p.set(Status::CARRY, sum > 0xFF);
        self.p
            .set(Status::OVERFLOW, (!(a ^ m) & (a ^ sum)) & 0x0080 != 0);
        self.a = sum as u8;
        self.p.set_zn(self.a);
    }

    fn compare(&mut self, register: u8, m: u8) {
        let result = (register as u16).wrapping_sub(m as u16);
        self.p.set(Status::CARRY, register >= m);
        self.p.set_zn(result as u8);
    }

    /// Taken branches cost one cycle, two when the target sits on another
    /// page than the instruction that follows the branch.
    fn branch_if(&mut self, taken: bool) {
        if !taken {
            return;
        }
        self.cycles_remaining += 1;
        self.addr_abs = self.pc.wrapping_add(self.addr_rel);
        if self.addr_abs & 0xFF00 != self.pc & 0xFF00 {
            self.cycles_remaining += 1;
        }
        self.pc = self.addr_abs;
    }
}

impl Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "A:{:02X} X:{:02X} Y:{:02X} S:{:02X} P:{:?} PC:{:04X} CYC:{}",
            self.a, self.x, self.y, self.s, self.p, self.pc, self.total_cycles
        )
    }
}

impl Display for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "A:{:02X} X:{:02X} Y:{:02X} S:{:02X} P:{:02X} PC:{:04X}",
            self.a,
            self.x,
            self.y,
            self.s,
            self.p.bits(),
            self.pc
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::AddressRange;
    use crate::ram::Ram;
    use std::cell::RefCell;

    /// CPU over a flat 64 KiB RAM with `program` placed at `origin` and the
    /// reset vector pointing at it.
    fn cpu_with_program(program: &[u8], origin: u16) -> Cpu {
        let ram = Ram::new(0x10000, AddressRange::new(0x0000, 0xFFFF)).unwrap();
        let ram = Rc::new(RefCell::new(ram));
        let mut bus = Bus::new();
        bus.attach(AddressRange::new(0x0000, 0xFFFF), ram).unwrap();
        let bus = Rc::new(bus);

        for (offset, byte) in program.iter().enumerate() {
            bus.write(origin.wrapping_add(offset as u16), *byte);
        }
        bus.write(RESET_VECTOR_LO, origin as u8);
        bus.write(RESET_VECTOR_LO + 1, (origin >> 8) as u8);

        let mut cpu = Cpu::new(bus);
        cpu.reset();
        // Burn the reset sequence so the first step lands on the program.
        while !cpu.is_complete() {
            cpu.clock();
        }
        cpu
    }

    /// Runs exactly one instruction and returns its cycle cost.
    fn step(cpu: &mut Cpu) -> u64 {
        let before = cpu.total_cycles();
        cpu.clock();
        while !cpu.is_complete() {
            cpu.clock();
        }
        cpu.total_cycles() - before
    }

    #[test]
    fn reset_restores_documented_state() {
        let cpu = cpu_with_program(&[0xEA], 0x8000);
        let snap = cpu.snapshot();
        assert_eq!(snap.pc, 0x8000);
        assert_eq!((snap.a, snap.x, snap.y), (0, 0, 0));
        assert_eq!(snap.s, 0xFD);
        assert_eq!(snap.p, Status::UNUSED.bits());
        assert_eq!(cpu.total_cycles(), 8);
    }

    #[test]
    fn unused_flag_survives_every_instruction() {
        // LDA #$00, PHP, SEC, PLP
        let mut cpu = cpu_with_program(&[0xA9, 0x00, 0x08, 0x38, 0x28], 0x8000);
        for _ in 0..4 {
            step(&mut cpu);
            assert!(cpu.status().contains(Status::UNUSED));
        }
    }

    #[test]
    fn adc_sets_carry_zero_and_overflow() {
        // LDA #$50, ADC #$50 -> 0xA0, V set, C clear
        let mut cpu = cpu_with_program(&[0xA9, 0x50, 0x69, 0x50], 0x8000);
        step(&mut cpu);
        step(&mut cpu);
        let snap = cpu.snapshot();
        assert_eq!(snap.a, 0xA0);
        assert!(cpu.status().v());
        assert!(!cpu.status().c());
        assert!(cpu.status().n());

        // LDA #$FF, SEC, ADC #$00 -> 0x00 with carry out
        let mut cpu = cpu_with_program(&[0xA9, 0xFF, 0x38, 0x69, 0x00], 0x8000);
        step(&mut cpu);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.snapshot().a, 0x00);
        assert!(cpu.status().c());
        assert!(cpu.status().z());
    }

    #[test]
    fn sbc_borrows_through_inverted_carry() {
        // SEC, LDA #$10, SBC #$20 -> 0xF0, borrow (C clear), N set
        let mut cpu = cpu_with_program(&[0x38, 0xA9, 0x10, 0xE9, 0x20], 0x8000);
        step(&mut cpu);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.snapshot().a, 0xF0);
        assert!(!cpu.status().c());
        assert!(cpu.status().n());
    }

    #[test]
    fn ror_uses_a_mask_not_a_product() {
        // SEC, LDA #$02, ROR A -> carry in lands in bit 7, bit 0 out
        let mut cpu = cpu_with_program(&[0x38, 0xA9, 0x02, 0x6A], 0x8000);
        step(&mut cpu);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.snapshot().a, 0x81);
        assert!(!cpu.status().c());
        assert!(cpu.status().n());
    }

    #[test]
    fn indirect_jmp_reproduces_the_page_wrap_bug() {
        // JMP ($02FF): low byte at $02FF, high byte from $0200, not $0300.
        let mut cpu = cpu_with_program(&[0x6C, 0xFF, 0x02], 0x8000);
        cpu.bus.write(0x02FF, 0x34);
        cpu.bus.write(0x0200, 0x12);
        cpu.bus.write(0x0300, 0x56);
        step(&mut cpu);
        assert_eq!(cpu.pc(), 0x1234);
    }

    #[test]
    fn zero_page_pointers_wrap_within_page_zero() {
        // LDX #$01, LDA ($FF,X): pointer bytes come from $00/$01.
        let mut cpu = cpu_with_program(&[0xA2, 0x01, 0xA1, 0xFF], 0x8000);
        cpu.bus.write(0x0000, 0x20);
        cpu.bus.write(0x0001, 0x03);
        cpu.bus.write(0x0320, 0x99);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.snapshot().a, 0x99);

        // LDY #$00, LDA ($FF),Y: pointer high byte comes from $00.
        let mut cpu = cpu_with_program(&[0xA0, 0x00, 0xB1, 0xFF], 0x8000);
        cpu.bus.write(0x00FF, 0x40);
        cpu.bus.write(0x0000, 0x03);
        cpu.bus.write(0x0340, 0x77);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.snapshot().a, 0x77);
    }

    #[test]
    fn branch_cycle_costs() {
        // BNE not taken: base 2.
        let mut cpu = cpu_with_program(&[0xA9, 0x00, 0xD0, 0x10], 0x8000);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 2);

        // BNE taken, same page: base + 1.
        let mut cpu = cpu_with_program(&[0xA9, 0x01, 0xD0, 0x10], 0x8000);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 3);

        // BNE taken backwards across a page boundary: base + 2.
        let mut cpu = cpu_with_program(&[0xA9, 0x01, 0xD0, 0x80], 0x8000);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 4);
        assert_eq!(cpu.pc(), 0x7F84);
    }

    #[test]
    fn page_cross_penalty_applies_to_reads_not_stores() {
        // LDX #$01, LDA $80FF,X crosses into $8100.
        let mut cpu = cpu_with_program(&[0xA2, 0x01, 0xBD, 0xFF, 0x80], 0x8000);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 5);

        // STA with the same crossing keeps its fixed 5-cycle cost.
        let mut cpu = cpu_with_program(&[0xA2, 0x01, 0x9D, 0xFF, 0x80], 0x8000);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 5);
    }

    #[test]
    fn penalty_nops_honor_the_crossing() {
        let mut cpu = cpu_with_program(&[0xA2, 0x01, 0x1C, 0xFF, 0x80], 0x8000);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 5);

        // Plain implied NOP stays at 2.
        let mut cpu = cpu_with_program(&[0xEA], 0x8000);
        assert_eq!(step(&mut cpu), 2);
    }

    #[test]
    fn jsr_rts_round_trip() {
        // JSR $8010 ... target: RTS back to the instruction after JSR.
        let mut cpu = cpu_with_program(&[0x20, 0x10, 0x80], 0x8000);
        cpu.bus.write(0x8010, 0x60);
        step(&mut cpu);
        assert_eq!(cpu.pc(), 0x8010);
        assert_eq!(cpu.snapshot().s, 0xFB);
        step(&mut cpu);
        assert_eq!(cpu.pc(), 0x8003);
        assert_eq!(cpu.snapshot().s, 0xFD);
    }

    #[test]
    fn brk_pushes_status_with_break_set_and_vectors_through_fffe() {
        let mut cpu = cpu_with_program(&[0x00], 0x8000);
        cpu.bus.write(IRQ_VECTOR_LO, 0x00);
        cpu.bus.write(IRQ_VECTOR_LO + 1, 0x90);
        step(&mut cpu);

        assert_eq!(cpu.pc(), 0x9000);
        assert!(cpu.status().i());
        assert!(!cpu.status().b());
        // Pushed bytes: PC hi, PC lo (= $8002), then status with B|U.
        assert_eq!(cpu.bus.read(0x01FD), 0x80);
        assert_eq!(cpu.bus.read(0x01FC), 0x02);
        let pushed = Status::from_bits_truncate(cpu.bus.read(0x01FB));
        assert!(pushed.contains(Status::BREAK));
        assert!(pushed.contains(Status::UNUSED));
    }

    #[test]
    fn nmi_is_taken_even_with_interrupts_disabled() {
        let mut cpu = cpu_with_program(&[0x78, 0xEA], 0x8000);
        cpu.bus.write(NMI_VECTOR_LO, 0x00);
        cpu.bus.write(NMI_VECTOR_LO + 1, 0xA0);
        step(&mut cpu);
        assert!(cpu.status().i());

        cpu.irq();
        assert_eq!(cpu.pc(), 0x8001);
        cpu.nmi();
        while !cpu.is_complete() {
            cpu.clock();
        }
        assert_eq!(cpu.pc(), 0xA000);
    }

    #[test]
    fn illegal_opcodes_fall_through_as_no_ops() {
        // $02 is a sink entry: nothing changes but PC and the clock.
        let mut cpu = cpu_with_program(&[0x02, 0xEA], 0x8000);
        let before = cpu.snapshot();
        assert_eq!(step(&mut cpu), 2);
        let after = cpu.snapshot();
        assert_eq!(after.a, before.a);
        assert_eq!(after.s, before.s);
        assert_eq!(after.pc, 0x8001);
    }
}
