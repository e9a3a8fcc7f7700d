//! Shared definitions for the console memory map.
//!
//! Centralizing address-related constants keeps the hardware layout in one
//! location and prevents magic numbers from sneaking into other modules.

/// CPU memory map details.
pub mod cpu {
    /// Start of the internal RAM window (mirrored every 2 KiB).
    pub const RAM_START: u16 = 0x0000;
    /// End of the internal RAM window.
    pub const RAM_END: u16 = 0x1FFF;
    /// Backing size of the internal RAM (2 KiB, mirrored four times).
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;

    /// First address of the hardware stack page.
    pub const STACK_PAGE_START: u16 = 0x0100;

    /// NMI vector low byte address (`$FFFA`).
    pub const NMI_VECTOR_LO: u16 = 0xFFFA;
    /// NMI vector high byte address (`$FFFB`).
    pub const NMI_VECTOR_HI: u16 = 0xFFFB;
    /// Reset vector low byte address (`$FFFC`).
    pub const RESET_VECTOR_LO: u16 = 0xFFFC;
    /// Reset vector high byte address (`$FFFD`).
    pub const RESET_VECTOR_HI: u16 = 0xFFFD;
    /// IRQ/BRK vector low byte address (`$FFFE`).
    pub const IRQ_VECTOR_LO: u16 = 0xFFFE;
    /// IRQ/BRK vector high byte address (`$FFFF`).
    pub const IRQ_VECTOR_HI: u16 = 0xFFFF;

    /// OAM DMA trigger register (`$4014`).
    pub const OAM_DMA: u16 = 0x4014;
    /// Controller port 1 (`$4016`).
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Controller port 2 (`$4017`).
    pub const CONTROLLER_PORT_2: u16 = 0x4017;

    /// Start of the cartridge program window.
    pub const PRG_WINDOW_START: u16 = 0x8000;
    /// Last CPU address.
    pub const CPU_ADDR_END: u16 = 0xFFFF;
}

/// PPU register layout, VRAM windows, and mirror rules.
pub mod ppu {
    /// First CPU-visible PPU register address.
    pub const REGISTER_BASE: u16 = 0x2000;
    /// Last CPU address at which the registers repeat.
    pub const REGISTER_MIRROR_END: u16 = 0x3FFF;
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// End of the cartridge character window on the PPU bus.
    pub const CHR_WINDOW_END: u16 = 0x1FFF;
    /// Pattern table base address for table 0.
    pub const PATTERN_TABLE_0: u16 = 0x0000;
    /// Pattern table base address for table 1.
    pub const PATTERN_TABLE_1: u16 = 0x1000;

    /// Base address of nametable 0.
    pub const NAMETABLE_BASE: u16 = 0x2000;
    /// Size of a single nametable in bytes.
    pub const NAMETABLE_SIZE: u16 = 0x0400;
    /// Last address of the mirrored nametable region.
    pub const NAMETABLE_END: u16 = 0x3EFF;

    /// Palette RAM base address (`$3F00`).
    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Palette RAM byte count (32 bytes, mirrored every 32 bytes).
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    /// Address mask applied to every PPU bus access.
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// Object attribute memory size (64 sprites x 4 bytes).
    pub const OAM_RAM_SIZE: usize = 256;
    /// Sprites evaluated into the per-scanline list at most.
    pub const SPRITES_PER_SCANLINE: usize = 8;

    /// CPU-visible PPU register identifiers.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` - PPUCTRL
        Control = 0x2000,
        /// `$2001` - PPUMASK
        Mask = 0x2001,
        /// `$2002` - PPUSTATUS
        Status = 0x2002,
        /// `$2003` - OAMADDR
        OamAddr = 0x2003,
        /// `$2004` - OAMDATA
        OamData = 0x2004,
        /// `$2005` - PPUSCROLL
        Scroll = 0x2005,
        /// `$2006` - PPUADDR
        Addr = 0x2006,
        /// `$2007` - PPUDATA
        Data = 0x2007,
    }

    impl Register {
        /// Raw address backing the register.
        pub const fn addr(self) -> u16 {
            self as u16
        }

        /// Resolves the canonical register for a CPU address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}
