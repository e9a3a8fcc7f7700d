//! CPU-visible PPU registers and the internal scroll address.

use bitflags::bitflags;

use crate::memory::ppu as ppu_mem;

bitflags! {
    /// PPU control register (`$2000`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N M S B s I Y X
    /// ```
    /// - `X`/`Y`: base nametable select
    /// - `I`: VRAM increment (0=+1, 1=+32)
    /// - `s`: sprite pattern table (8x8 sprites)
    /// - `B`: background pattern table
    /// - `S`: sprite size (0=8x8, 1=8x16)
    /// - `M`: master/slave select
    /// - `N`: raise NMI at v-blank start
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Control: u8 {
        const NAMETABLE_X = 0b0000_0001;
        const NAMETABLE_Y = 0b0000_0010;
        const INCREMENT_32 = 0b0000_0100;
        const SPRITE_TABLE = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_SIZE_16 = 0b0010_0000;
        const MASTER_SLAVE = 0b0100_0000;
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::empty()
    }
}

impl Control {
    /// VRAM step applied after every `$2007` access.
    pub(crate) fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) {
            32
        } else {
            1
        }
    }

    /// Pattern table base for 8x8 sprites.
    pub(crate) fn sprite_pattern_base(self) -> u16 {
        if self.contains(Control::SPRITE_TABLE) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            ppu_mem::PATTERN_TABLE_0
        }
    }

    /// Pattern table base for background tiles.
    pub(crate) fn background_pattern_base(self) -> u16 {
        if self.contains(Control::BACKGROUND_TABLE) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            ppu_mem::PATTERN_TABLE_0
        }
    }

    /// Sprite height in scanlines (8 or 16).
    pub(crate) fn sprite_height(self) -> i16 {
        if self.contains(Control::SPRITE_SIZE_16) {
            16
        } else {
            8
        }
    }

    pub(crate) fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }
}

bitflags! {
    /// PPU mask register (`$2001`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Mask: u8 {
        /// Render in grayscale.
        const GRAYSCALE = 0b0000_0001;
        /// Show the background in the left 8 pixel columns.
        const BACKGROUND_LEFT = 0b0000_0010;
        /// Show sprites in the left 8 pixel columns.
        const SPRITES_LEFT = 0b0000_0100;
        /// Enable background rendering.
        const BACKGROUND = 0b0000_1000;
        /// Enable sprite rendering.
        const SPRITES = 0b0001_0000;
        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::empty()
    }
}

impl Mask {
    pub(crate) fn render_background(self) -> bool {
        self.contains(Mask::BACKGROUND)
    }

    pub(crate) fn render_sprites(self) -> bool {
        self.contains(Mask::SPRITES)
    }

    /// Scroll updates only run while either plane renders.
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Mask::BACKGROUND | Mask::SPRITES)
    }
}

bitflags! {
    /// PPU status register (`$2002`). Only the top three bits exist; the
    /// rest decay to whatever the data bus last carried.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct StatusReg: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        const VBLANK = 0b1000_0000;
    }
}

impl Default for StatusReg {
    fn default() -> Self {
        Self::empty()
    }
}

// Layout of the 15-bit scroll address (bits 0-14):
//  14 13 12 11 10 9 8 7 6 5 4 3 2 1 0
//  [fine_y ][Y][X][coarse_y ][coarse_x]
const COARSE_X_MASK: u16 = 0x001F;
const COARSE_Y_MASK: u16 = 0x03E0;
const NAMETABLE_X_MASK: u16 = 0x0400;
const NAMETABLE_Y_MASK: u16 = 0x0800;
const FINE_Y_MASK: u16 = 0x7000;
const ADDR_MASK: u16 = 0x7FFF;

const COARSE_Y_SHIFT: u16 = 5;
const FINE_Y_SHIFT: u16 = 12;

/// The PPU's 15-bit composite scroll address (the `v` and `t` registers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct LoopyAddr(u16);

impl LoopyAddr {
    #[inline]
    pub(crate) fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub(crate) fn set_raw(&mut self, value: u16) {
        self.0 = value & ADDR_MASK;
    }

    /// Coarse X tile column (0..31).
    #[inline]
    pub(crate) fn coarse_x(self) -> u16 {
        self.0 & COARSE_X_MASK
    }

    #[inline]
    pub(crate) fn set_coarse_x(&mut self, value: u16) {
        self.0 = (self.0 & !COARSE_X_MASK) | (value & COARSE_X_MASK);
    }

    /// Coarse Y tile row (0..31; rows 30/31 alias into the attribute area).
    #[inline]
    pub(crate) fn coarse_y(self) -> u16 {
        (self.0 & COARSE_Y_MASK) >> COARSE_Y_SHIFT
    }

    #[inline]
    pub(crate) fn set_coarse_y(&mut self, value: u16) {
        self.0 = (self.0 & !COARSE_Y_MASK) | ((value << COARSE_Y_SHIFT) & COARSE_Y_MASK);
    }

    #[inline]
    pub(crate) fn nametable_x(self) -> bool {
        self.0 & NAMETABLE_X_MASK != 0
    }

    #[inline]
    pub(crate) fn set_nametable_x(&mut self, set: bool) {
        if set {
            self.0 |= NAMETABLE_X_MASK;
        } else {
            self.0 &= !NAMETABLE_X_MASK;
        }
    }

    #[inline]
    pub(crate) fn flip_nametable_x(&mut self) {
        self.0 ^= NAMETABLE_X_MASK;
    }

    #[inline]
    pub(crate) fn nametable_y(self) -> bool {
        self.0 & NAMETABLE_Y_MASK != 0
    }

    #[inline]
    pub(crate) fn set_nametable_y(&mut self, set: bool) {
        if set {
            self.0 |= NAMETABLE_Y_MASK;
        } else {
            self.0 &= !NAMETABLE_Y_MASK;
        }
    }

    #[inline]
    pub(crate) fn flip_nametable_y(&mut self) {
        self.0 ^= NAMETABLE_Y_MASK;
    }

    /// Fine Y pixel row within the tile (0..7).
    #[inline]
    pub(crate) fn fine_y(self) -> u16 {
        (self.0 & FINE_Y_MASK) >> FINE_Y_SHIFT
    }

    #[inline]
    pub(crate) fn set_fine_y(&mut self, value: u16) {
        self.0 = (self.0 & !FINE_Y_MASK) | ((value << FINE_Y_SHIFT) & FINE_Y_MASK);
    }

    /// Post-access increment applied by `$2007` reads and writes.
    #[inline]
    pub(crate) fn increment(&mut self, step: u16) {
        self.0 = self.0.wrapping_add(step) & ADDR_MASK;
    }
}
