use bitflags::bitflags;

bitflags! {
    /// The 8-bit processor status register (P).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N V U B D I Z C
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Carry (C): addition carried out of bit 7, or subtraction needed
        /// no borrow.
        const CARRY = 0b0000_0001;

        /// Zero (Z): the last result was zero.
        const ZERO = 0b0000_0010;

        /// Interrupt disable (I): maskable interrupts are held off.
        const INTERRUPT = 0b0000_0100;

        /// Decimal (D): recorded and restored but never consulted by the
        /// arithmetic; this CPU variant has no BCD mode.
        const DECIMAL = 0b0000_1000;

        /// Break (B): only ever meaningful in the byte pushed to the stack
        /// by BRK and PHP.
        const BREAK = 0b0001_0000;

        /// Unused (U): held set whenever the register is written out.
        const UNUSED = 0b0010_0000;

        /// Overflow (V): signed arithmetic overflowed.
        const OVERFLOW = 0b0100_0000;

        /// Negative (N): bit 7 of the last result.
        const NEGATIVE = 0b1000_0000;
    }
}

impl Status {
    /// Updates Z and N from a result byte.
    #[inline]
    pub(crate) fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    pub fn c(&self) -> bool {
        self.contains(Status::CARRY)
    }

    pub fn z(&self) -> bool {
        self.contains(Status::ZERO)
    }

    pub fn i(&self) -> bool {
        self.contains(Status::INTERRUPT)
    }

    pub fn d(&self) -> bool {
        self.contains(Status::DECIMAL)
    }

    pub fn b(&self) -> bool {
        self.contains(Status::BREAK)
    }

    pub fn v(&self) -> bool {
        self.contains(Status::OVERFLOW)
    }

    pub fn n(&self) -> bool {
        self.contains(Status::NEGATIVE)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::UNUSED
    }
}
