//! First-match device bus shared by the CPU and PPU address spaces.
//!
//! The bus is an ordered list of `(range, device)` pairs. A read is answered
//! by the first device whose range contains the address and falls back to 0;
//! a write that matches nothing is silently dropped. Ranges attached to one
//! bus must be pairwise disjoint, which is validated at attach time.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::Error;

/// Inclusive address interval a device answers on.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    pub start: u16,
    pub end: u16,
}

impl AddressRange {
    pub const fn new(start: u16, end: u16) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[inline]
    pub const fn contains(self, addr: u16) -> bool {
        addr >= self.start && addr <= self.end
    }

    #[inline]
    pub const fn overlaps(self, other: AddressRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of addresses covered by the range.
    #[inline]
    pub const fn len(self) -> u32 {
        (self.end as u32) - (self.start as u32) + 1
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#06X}..={:#06X}]", self.start, self.end)
    }
}

/// Contract every memory-mapped piece of hardware implements.
///
/// Both operations are mandatory; "does not respond" is expressed per call
/// by the bus conventions (reads fall back to 0, writes are dropped).
pub trait BusDevice {
    fn read(&mut self, addr: u16) -> u8;

    fn write(&mut self, addr: u16, value: u8);
}

/// Non-owning handle to a device shared between the console and its buses.
pub type DeviceHandle = Rc<RefCell<dyn BusDevice>>;

#[derive(Default)]
pub struct Bus {
    devices: Vec<(AddressRange, DeviceHandle)>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `device` to `range`.
    ///
    /// Fails with [`Error::BusOverlap`] when the range intersects any range
    /// already attached; overlapping device windows are a wiring error, not
    /// a runtime condition.
    pub fn attach(&mut self, range: AddressRange, device: DeviceHandle) -> Result<(), Error> {
        if let Some((existing, _)) = self.devices.iter().find(|(r, _)| r.overlaps(range)) {
            return Err(Error::BusOverlap {
                attached: range,
                existing: *existing,
            });
        }
        self.devices.push((range, device));
        Ok(())
    }

    /// Reads the value produced by the first device claiming `addr`, else 0.
    pub fn read(&self, addr: u16) -> u8 {
        for (range, device) in &self.devices {
            if range.contains(addr) {
                return device.borrow_mut().read(addr);
            }
        }
        0
    }

    /// Delivers `value` to the first device claiming `addr`; no match is a no-op.
    pub fn write(&self, addr: u16, value: u8) {
        for (range, device) in &self.devices {
            if range.contains(addr) {
                device.borrow_mut().write(addr, value);
                return;
            }
        }
    }

    /// DMA-facing read; identical routing to [`Bus::read`].
    #[inline]
    pub fn dma_read(&self, addr: u16) -> u8 {
        self.read(addr)
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.devices.iter().map(|(range, _)| range))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Device that answers every read with a fixed byte and records writes.
    struct Stub {
        value: u8,
        last_write: Option<(u16, u8)>,
    }

    impl Stub {
        fn handle(value: u8) -> Rc<RefCell<Stub>> {
            Rc::new(RefCell::new(Stub {
                value,
                last_write: None,
            }))
        }
    }

    impl BusDevice for Stub {
        fn read(&mut self, _addr: u16) -> u8 {
            self.value
        }

        fn write(&mut self, addr: u16, value: u8) {
            self.last_write = Some((addr, value));
        }
    }

    #[test]
    fn routes_to_first_matching_device() {
        let mut bus = Bus::new();
        let low = Stub::handle(0x11);
        let high = Stub::handle(0x22);
        bus.attach(AddressRange::new(0x0000, 0x0FFF), low).unwrap();
        bus.attach(AddressRange::new(0x1000, 0x1FFF), high).unwrap();

        assert_eq!(bus.read(0x0123), 0x11);
        assert_eq!(bus.read(0x1FFF), 0x22);
    }

    #[test]
    fn unmatched_read_returns_zero_and_write_is_dropped() {
        let mut bus = Bus::new();
        let dev = Stub::handle(0xAB);
        bus.attach(AddressRange::new(0x4000, 0x40FF), dev.clone())
            .unwrap();

        assert_eq!(bus.read(0x8000), 0);
        bus.write(0x8000, 0xFF);
        assert_eq!(dev.borrow().last_write, None);
    }

    #[test]
    fn writes_reach_the_owning_device() {
        let mut bus = Bus::new();
        let dev = Stub::handle(0);
        bus.attach(AddressRange::new(0x2000, 0x2007), dev.clone())
            .unwrap();

        bus.write(0x2006, 0x3F);
        assert_eq!(dev.borrow().last_write, Some((0x2006, 0x3F)));
    }

    #[test]
    fn rejects_overlapping_ranges() {
        let mut bus = Bus::new();
        bus.attach(AddressRange::new(0x0000, 0x1FFF), Stub::handle(0))
            .unwrap();
        let err = bus
            .attach(AddressRange::new(0x1FFF, 0x3FFF), Stub::handle(0))
            .unwrap_err();
        assert!(matches!(err, Error::BusOverlap { .. }));
    }
}
