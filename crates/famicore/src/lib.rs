//! Clock-accurate emulation core for the NES family of 8-bit consoles.
//!
//! The [`Console`] owns every piece of hardware: a 6502-family CPU over a
//! device-list bus, a dot-driven PPU with its own address space, the
//! cartridge slot shared by both buses, OAM DMA, and two controller ports.
//! One [`Console::clock`] call is one master tick: the PPU advances every
//! tick, the CPU (or an active DMA transfer) every third, and a v-blank NMI
//! raised by the PPU is delivered on the same tick it appears.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, error};

use crate::bus::{AddressRange, Bus};
use crate::cartridge::{Cartridge, CartridgeSlot};
use crate::controller::{Buttons, ControlPad, ControllerPorts};
use crate::cpu::Cpu;
use crate::dma::{DmaController, DmaTrigger};
use crate::error::Error;
use crate::memory::{cpu as cpu_mem, ppu as ppu_mem};
use crate::ppu::Ppu;
use crate::ram::Ram;
use crate::video::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH, VideoSink};

pub mod audio;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod dma;
pub mod error;
pub mod memory;
pub mod ppu;
pub mod ram;
pub mod shifter;
pub mod video;

pub use cpu::CpuSnapshot;

/// NTSC frame period driven by [`Console::update`].
const FRAME_PERIOD: f64 = 1.0 / 60.0;

/// The whole console: every device, both buses, and the master clock.
pub struct Console {
    cpu: Cpu,
    cpu_bus: Rc<Bus>,
    ppu: Rc<RefCell<Ppu>>,
    ram: Rc<RefCell<Ram>>,
    slot: Rc<RefCell<CartridgeSlot>>,
    controllers: Rc<RefCell<ControllerPorts>>,
    dma: DmaController,
    video: Rc<RefCell<dyn VideoSink>>,
    audio: Option<Rc<RefCell<dyn audio::AudioSink>>>,
    clock_count: u64,
    residual_time: f64,
}

/// Builder for configuring and constructing a powered-on console.
///
/// Keeps the constructor argument list short and the defaults explicit.
pub struct ConsoleBuilder {
    video: Option<Rc<RefCell<dyn VideoSink>>>,
    audio: Option<Rc<RefCell<dyn audio::AudioSink>>>,
    pads: [Option<ControlPad>; 2],
}

impl Default for ConsoleBuilder {
    fn default() -> Self {
        Self {
            video: None,
            audio: None,
            // Most hosts want at least one pad; the second port starts empty.
            pads: [Some(ControlPad::new()), None],
        }
    }
}

impl ConsoleBuilder {
    /// Creates a builder with defaults: an internal frame buffer, no audio
    /// sink, one control pad in port 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the video sink the PPU renders into.
    pub fn video(mut self, video: Rc<RefCell<dyn VideoSink>>) -> Self {
        self.video = Some(video);
        self
    }

    /// Supplies the audio sink handle (no samples are produced yet).
    pub fn audio(mut self, audio: Rc<RefCell<dyn audio::AudioSink>>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Plugs `pad` into `port` (0 or 1) at construction time.
    pub fn controller(mut self, port: usize, pad: ControlPad) -> Self {
        self.pads[port] = Some(pad);
        self
    }

    /// Leaves `port` empty at construction time.
    pub fn no_controller(mut self, port: usize) -> Self {
        self.pads[port] = None;
        self
    }

    /// Wires every device and powers the console on.
    ///
    /// Construction order matters: devices first, then the buses, then
    /// CPU/PPU, and the DMA endpoints last once both ends exist.
    pub fn build(self) -> Result<Console, Error> {
        let video = self
            .video
            .unwrap_or_else(|| Rc::new(RefCell::new(FrameBuffer::new())));

        let ram = Rc::new(RefCell::new(Ram::new(
            cpu_mem::INTERNAL_RAM_SIZE,
            AddressRange::new(cpu_mem::RAM_START, cpu_mem::RAM_END),
        )?));
        let slot = Rc::new(RefCell::new(CartridgeSlot::new()));
        let trigger = Rc::new(RefCell::new(DmaTrigger::new()));
        let controllers = Rc::new(RefCell::new(ControllerPorts::new()));
        for (port, pad) in self.pads.into_iter().enumerate() {
            if let Some(pad) = pad {
                controllers.borrow_mut().plug(port, pad);
            }
        }

        let mut ppu_bus = Bus::new();
        ppu_bus.attach(
            AddressRange::new(0x0000, ppu_mem::CHR_WINDOW_END),
            slot.clone(),
        )?;
        let ppu = Rc::new(RefCell::new(Ppu::new(ppu_bus, slot.clone(), video.clone())));

        let mut cpu_bus = Bus::new();
        cpu_bus.attach(
            AddressRange::new(cpu_mem::RAM_START, cpu_mem::RAM_END),
            ram.clone(),
        )?;
        cpu_bus.attach(
            AddressRange::new(ppu_mem::REGISTER_BASE, ppu_mem::REGISTER_MIRROR_END),
            ppu.clone(),
        )?;
        cpu_bus.attach(
            AddressRange::new(cpu_mem::OAM_DMA, cpu_mem::OAM_DMA),
            trigger.clone(),
        )?;
        cpu_bus.attach(
            AddressRange::new(cpu_mem::CONTROLLER_PORT_1, cpu_mem::CONTROLLER_PORT_2),
            controllers.clone(),
        )?;
        cpu_bus.attach(
            AddressRange::new(cpu_mem::PRG_WINDOW_START, cpu_mem::CPU_ADDR_END),
            slot.clone(),
        )?;
        let cpu_bus = Rc::new(cpu_bus);

        let cpu = Cpu::new(cpu_bus.clone());

        let mut dma = DmaController::new(trigger);
        dma.wire(cpu_bus.clone(), ppu.clone());

        video
            .borrow_mut()
            .set_resolution(SCREEN_WIDTH, SCREEN_HEIGHT);

        let mut console = Console {
            cpu,
            cpu_bus,
            ppu,
            ram,
            slot,
            controllers,
            dma,
            video,
            audio: self.audio,
            clock_count: 0,
            residual_time: 0.0,
        };
        console.reset();
        Ok(console)
    }
}

impl Console {
    /// Creates a [`ConsoleBuilder`] with defaults.
    pub fn builder() -> ConsoleBuilder {
        ConsoleBuilder::new()
    }

    /// Constructs a powered-on console with default wiring.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Advances one master tick.
    ///
    /// Within a tick the PPU moves first, then the CPU slot (every third
    /// tick, surrendered to DMA while a transfer runs), and finally any NMI
    /// the PPU raised this tick is delivered so the next instruction fetch
    /// cannot miss it.
    pub fn clock(&mut self) {
        self.ppu.borrow_mut().clock();

        if self.clock_count % 3 == 0 {
            if self.dma.transfer_in_progress() {
                if let Err(err) = self.dma.clock(self.clock_count) {
                    error!(%err, "dma clocked before wiring finished");
                }
            } else {
                self.cpu.clock();
            }
        }

        if self.ppu.borrow_mut().take_nmi() {
            self.cpu.nmi();
        }

        self.clock_count = self.clock_count.wrapping_add(1);
    }

    /// Paces emulation to 60 Hz against wall-clock time.
    ///
    /// Accumulates `elapsed` into a residual; once the residual is spent,
    /// runs master ticks until the PPU completes a frame. Returns `true`
    /// when a frame was produced by this call.
    pub fn update(&mut self, elapsed: Duration) -> bool {
        if self.residual_time > 0.0 {
            self.residual_time -= elapsed.as_secs_f64();
            return false;
        }
        self.residual_time += FRAME_PERIOD - elapsed.as_secs_f64();
        while !self.ppu.borrow_mut().take_frame_complete() {
            self.clock();
        }
        true
    }

    /// Runs master ticks until exactly one CPU instruction has executed.
    pub fn advance_instruction(&mut self) {
        // Finish whatever is in flight (reset sequence included), step into
        // the next instruction, then run it to completion.
        while !self.cpu.is_complete() {
            self.clock();
        }
        while self.cpu.is_complete() {
            self.clock();
        }
        while !self.cpu.is_complete() {
            self.clock();
        }
    }

    /// Runs master ticks until the frame completes, then finishes the
    /// instruction left in flight.
    pub fn advance_frame(&mut self) {
        while !self.ppu.borrow_mut().take_frame_complete() {
            self.clock();
        }
        while !self.cpu.is_complete() {
            self.clock();
        }
    }

    /// Zeroes the clocks, re-asserts the video geometry, and resets the
    /// CPU, PPU, DMA, and cartridge.
    pub fn reset(&mut self) {
        self.clock_count = 0;
        self.residual_time = 0.0;
        if let Some(cartridge) = self.slot.borrow_mut().cartridge_mut() {
            cartridge.reset();
        }
        self.ppu.borrow_mut().reset();
        self.dma.reset();
        self.video
            .borrow_mut()
            .set_resolution(SCREEN_WIDTH, SCREEN_HEIGHT);
        self.cpu.reset();
        debug!("console reset");
    }

    /// Seats a cartridge and power-cycles the console.
    ///
    /// The slot sits on both buses, so the swap also moves the PPU's
    /// pattern memory and mirroring source in one step.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        debug!(
            mapper = cartridge.mapper().name(),
            mirroring = ?cartridge.mirroring(),
            "cartridge inserted"
        );
        self.slot.borrow_mut().insert(cartridge);
        self.reset();
    }

    /// Removes the cartridge, returning it, and resets the console.
    pub fn eject_cartridge(&mut self) -> Option<Cartridge> {
        let cartridge = self.slot.borrow_mut().eject();
        self.reset();
        cartridge
    }

    /// Loads an iNES image from disk and inserts it.
    pub fn load_cartridge_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let cartridge = Cartridge::from_ines_file(path)?;
        self.insert_cartridge(cartridge);
        Ok(())
    }

    /// Plugs a pad into `port` (0 or 1), returning the previous occupant.
    pub fn plug_controller(&mut self, port: usize, pad: ControlPad) -> Option<ControlPad> {
        self.controllers.borrow_mut().plug(port, pad)
    }

    pub fn unplug_controller(&mut self, port: usize) -> Option<ControlPad> {
        self.controllers.borrow_mut().unplug(port)
    }

    /// Updates the pressed-button set on the pad in `port`, if any. The
    /// game observes whatever is pressed at the instant it strobes.
    pub fn set_buttons(&mut self, port: usize, buttons: Buttons) {
        if let Some(pad) = self.controllers.borrow_mut().get_mut(port) {
            pad.set_buttons(buttons);
        }
    }

    /// Reads a CPU-bus address through the live bus. Side effects apply
    /// exactly as they would for the CPU (status reads clear v-blank).
    pub fn peek(&self, addr: u16) -> u8 {
        self.cpu_bus.read(addr)
    }

    /// Writes a CPU-bus address through the live bus.
    pub fn poke(&self, addr: u16, value: u8) {
        self.cpu_bus.write(addr, value);
    }

    /// Disassembles CPU-visible memory in `[start..=stop]`.
    pub fn disassemble(&self, start: u16, stop: u16) -> BTreeMap<u16, String> {
        cpu::disasm::disassemble(&self.cpu_bus, start, stop)
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn ppu(&self) -> Ref<'_, Ppu> {
        self.ppu.borrow()
    }

    pub fn ppu_mut(&self) -> RefMut<'_, Ppu> {
        self.ppu.borrow_mut()
    }

    pub fn ram(&self) -> Ref<'_, Ram> {
        self.ram.borrow()
    }

    /// Audio sink handle, when one was supplied.
    pub fn audio_sink(&self) -> Option<&Rc<RefCell<dyn audio::AudioSink>>> {
        self.audio.as_ref()
    }

    /// Master ticks since the last reset (wrapping).
    pub fn clock_count(&self) -> u64 {
        self.clock_count
    }
}
