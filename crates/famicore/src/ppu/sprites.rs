//! Sprite evaluation and the per-scanline sprite pipeline.

use bitflags::bitflags;

bitflags! {
    /// Attribute bits stored in sprite byte 2.
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    /// - `V`: vertical flip
    /// - `H`: horizontal flip
    /// - `P`: behind-background priority
    /// - `p`: sprite palette select (0..=3)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct SpriteAttributes: u8 {
        const PALETTE = 0b0000_0011;
        const BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

impl Default for SpriteAttributes {
    fn default() -> Self {
        Self::empty()
    }
}

impl SpriteAttributes {
    pub(crate) fn palette(self) -> u8 {
        self.bits() & Self::PALETTE.bits()
    }
}

/// One OAM entry in hardware byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct OamSprite {
    pub(crate) y: u8,
    pub(crate) tile: u8,
    pub(crate) attributes: SpriteAttributes,
    pub(crate) x: u8,
}

impl OamSprite {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            y: bytes[0],
            tile: bytes[1],
            attributes: SpriteAttributes::from_bits_retain(bytes[2]),
            x: bytes[3],
        }
    }
}

/// A sprite slot armed for the current scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct SpriteSlot {
    /// Pattern bitplane 0, shifted once per dot after X expires.
    pattern_low: u8,
    /// Pattern bitplane 1, shifted once per dot after X expires.
    pattern_high: u8,
    attributes: SpriteAttributes,
    /// Dots to wait before this sprite starts outputting.
    x_counter: u8,
    /// Slot holds OAM sprite 0.
    sprite0: bool,
}

/// Sprite pixel produced for a single dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpritePixel {
    /// Palette index already offset into the sprite half (4..=7), or 0.
    pub(crate) palette: u8,
    /// 2-bit color index; 0 means transparent.
    pub(crate) color: u8,
    /// Sprite wins over a non-transparent background pixel.
    pub(crate) in_front: bool,
    /// The pixel came from OAM sprite 0.
    pub(crate) is_sprite0: bool,
}

/// The eight sprite shifter pairs for the scanline in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpritePipeline {
    slots: [SpriteSlot; 8],
    active: u8,
}

impl SpritePipeline {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Arms one slot with pre-fetched pattern bytes.
    ///
    /// Horizontal flip is applied here by reversing the bitplanes, so the
    /// shifters always walk pixels left to right.
    pub(crate) fn load(&mut self, index: usize, sprite: &OamSprite, low: u8, high: u8, sprite0: bool) {
        let (mut low, mut high) = (low, high);
        if sprite.attributes.contains(SpriteAttributes::FLIP_HORIZONTAL) {
            low = low.reverse_bits();
            high = high.reverse_bits();
        }
        self.slots[index] = SpriteSlot {
            pattern_low: low,
            pattern_high: high,
            attributes: sprite.attributes,
            x_counter: sprite.x,
            sprite0,
        };
        self.active = self.active.max(index as u8 + 1);
    }

    /// Per-dot update: sprites still waiting count down, armed sprites
    /// advance their shifters.
    pub(crate) fn tick(&mut self) {
        for slot in self.slots.iter_mut().take(self.active as usize) {
            if slot.x_counter > 0 {
                slot.x_counter -= 1;
            } else {
                slot.pattern_low <<= 1;
                slot.pattern_high <<= 1;
            }
        }
    }

    /// First non-transparent pixel among the armed sprites, in priority
    /// order. Transparent everywhere yields the default (color 0).
    pub(crate) fn sample(&self) -> SpritePixel {
        for slot in self.slots.iter().take(self.active as usize) {
            if slot.x_counter > 0 {
                continue;
            }
            let bit0 = slot.pattern_low >> 7;
            let bit1 = slot.pattern_high >> 7;
            let color = (bit1 << 1) | bit0;
            if color != 0 {
                return SpritePixel {
                    palette: slot.attributes.palette() + 4,
                    color,
                    in_front: !slot
                        .attributes
                        .contains(SpriteAttributes::BEHIND_BACKGROUND),
                    is_sprite0: slot.sprite0,
                };
            }
        }
        SpritePixel::default()
    }
}
