//! OAM direct memory access.
//!
//! A CPU write to `$4014` latches a source page; the controller then
//! occupies the CPU's scheduler slot, alternating one CPU-bus read (even
//! master cycles) with one OAM write (odd master cycles) until all 256
//! bytes have moved. A sync flag defers the start to an odd master cycle so
//! the read/write alternation lines up.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::bus::{Bus, BusDevice};
use crate::error::Error;
use crate::ppu::Ppu;

/// Read endpoint the controller pulls source bytes from.
pub trait DmaSource {
    fn dma_read(&self, addr: u16) -> u8;
}

impl DmaSource for Bus {
    fn dma_read(&self, addr: u16) -> u8 {
        Bus::dma_read(self, addr)
    }
}

/// Write endpoint the controller pushes bytes into.
pub trait DmaSink {
    fn dma_write(&mut self, offset: u8, value: u8);
}

impl DmaSink for Ppu {
    fn dma_write(&mut self, offset: u8, value: u8) {
        self.write_oam(offset, value);
    }
}

/// The write-only `$4014` register. Writes park the page here until the
/// controller picks it up at its next scheduler slot.
#[derive(Debug, Default)]
pub struct DmaTrigger {
    page: Cell<Option<u8>>,
}

impl DmaTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    fn take(&self) -> Option<u8> {
        self.page.take()
    }
}

impl BusDevice for DmaTrigger {
    fn read(&mut self, _addr: u16) -> u8 {
        0
    }

    fn write(&mut self, _addr: u16, value: u8) {
        self.page.set(Some(value));
    }
}

/// The OAM DMA state machine.
///
/// Endpoints are non-owning handles wired by the console once the buses
/// exist; clocking an unwired controller is a construction-order bug and
/// reports as an error.
pub struct DmaController {
    trigger: Rc<RefCell<DmaTrigger>>,
    page: u8,
    offset: u8,
    latch: u8,
    transfer_in_progress: bool,
    /// Start is deferred until an odd master cycle.
    sync: bool,
    source: Option<Rc<dyn DmaSource>>,
    sink: Option<Rc<RefCell<dyn DmaSink>>>,
}

impl DmaController {
    /// Creates an unwired controller listening on `trigger`.
    pub fn new(trigger: Rc<RefCell<DmaTrigger>>) -> Self {
        Self {
            trigger,
            page: 0,
            offset: 0,
            latch: 0,
            transfer_in_progress: false,
            sync: true,
            source: None,
            sink: None,
        }
    }

    /// Wires the read and write endpoints. Done last during construction,
    /// after every device and bus exists.
    pub fn wire(&mut self, source: Rc<dyn DmaSource>, sink: Rc<RefCell<dyn DmaSink>>) {
        self.source = Some(source);
        self.sink = Some(sink);
    }

    /// Picks up any parked `$4014` write, then reports whether a transfer
    /// should occupy the CPU slot.
    pub fn transfer_in_progress(&mut self) -> bool {
        if let Some(page) = self.trigger.borrow().take() {
            self.page = page;
            self.offset = 0;
            self.transfer_in_progress = true;
            trace!(page, "oam dma transfer started");
        }
        self.transfer_in_progress
    }

    /// Runs one CPU slot of the transfer.
    ///
    /// `master_cycles` is the scheduler's wrapping tick counter; its parity
    /// steers the sync deferral and the read/write alternation.
    pub fn clock(&mut self, master_cycles: u64) -> Result<(), Error> {
        if !self.transfer_in_progress {
            return Ok(());
        }
        let source = self
            .source
            .as_ref()
            .ok_or(Error::DmaReadDeviceNotAssigned)?;
        let sink = self.sink.as_ref().ok_or(Error::DmaWriteDeviceNotAssigned)?;

        if self.sync {
            if master_cycles % 2 == 1 {
                self.sync = false;
            }
            return Ok(());
        }

        if master_cycles % 2 == 0 {
            let addr = (u16::from(self.page) << 8) | u16::from(self.offset);
            self.latch = source.dma_read(addr);
        } else {
            sink.borrow_mut().dma_write(self.offset, self.latch);
            self.offset = self.offset.wrapping_add(1);
            if self.offset == 0 {
                self.transfer_in_progress = false;
                self.sync = true;
                trace!(page = self.page, "oam dma transfer finished");
            }
        }
        Ok(())
    }

    /// Aborts any transfer and re-arms the sync deferral.
    pub fn reset(&mut self) {
        self.trigger.borrow().take();
        self.page = 0;
        self.offset = 0;
        self.latch = 0;
        self.transfer_in_progress = false;
        self.sync = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PatternSource;

    impl DmaSource for PatternSource {
        fn dma_read(&self, addr: u16) -> u8 {
            // Page in the high byte, offset echoed back in the low byte.
            (addr & 0xFF) as u8 ^ (addr >> 8) as u8
        }
    }

    #[derive(Default)]
    struct CaptureSink {
        bytes: Vec<(u8, u8)>,
    }

    impl DmaSink for CaptureSink {
        fn dma_write(&mut self, offset: u8, value: u8) {
            self.bytes.push((offset, value));
        }
    }

    fn wired() -> (DmaController, Rc<RefCell<DmaTrigger>>, Rc<RefCell<CaptureSink>>) {
        let trigger = Rc::new(RefCell::new(DmaTrigger::new()));
        let sink = Rc::new(RefCell::new(CaptureSink::default()));
        let mut dma = DmaController::new(trigger.clone());
        dma.wire(Rc::new(PatternSource), sink.clone());
        (dma, trigger, sink)
    }

    #[test]
    fn unwired_clock_reports_missing_endpoints() {
        let trigger = Rc::new(RefCell::new(DmaTrigger::new()));
        let mut dma = DmaController::new(trigger.clone());
        trigger.borrow_mut().write(0x4014, 0x02);
        assert!(dma.transfer_in_progress());
        assert!(matches!(
            dma.clock(0),
            Err(Error::DmaReadDeviceNotAssigned)
        ));
    }

    #[test]
    fn copies_a_full_page_in_order() {
        let (mut dma, trigger, sink) = wired();
        trigger.borrow_mut().write(0x4014, 0x02);

        let mut cycles = 0u64;
        while dma.transfer_in_progress() {
            dma.clock(cycles).unwrap();
            cycles += 1;
            assert!(cycles < 2000);
        }

        let bytes = &sink.borrow().bytes;
        assert_eq!(bytes.len(), 256);
        assert_eq!(bytes[0], (0, 0x02));
        assert_eq!(bytes[255], (255, 255 ^ 0x02));
        for (i, (offset, value)) in bytes.iter().enumerate() {
            assert_eq!(*offset, i as u8);
            assert_eq!(*value, i as u8 ^ 0x02);
        }
    }

    #[test]
    fn start_waits_for_an_odd_cycle() {
        let (mut dma, trigger, sink) = wired();
        trigger.borrow_mut().write(0x4014, 0x00);
        assert!(dma.transfer_in_progress());

        dma.clock(0).unwrap(); // even: still syncing
        assert!(sink.borrow().bytes.is_empty());
        dma.clock(1).unwrap(); // odd: sync drops
        dma.clock(2).unwrap(); // even: first read
        dma.clock(3).unwrap(); // odd: first write lands
        assert_eq!(sink.borrow().bytes.len(), 1);
    }

    #[test]
    fn reset_aborts_and_rearms() {
        let (mut dma, trigger, _sink) = wired();
        trigger.borrow_mut().write(0x4014, 0x03);
        assert!(dma.transfer_in_progress());
        dma.reset();
        assert!(!dma.transfer_in_progress());
    }
}
