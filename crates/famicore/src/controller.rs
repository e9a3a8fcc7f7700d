//! Standard game pad and the CPU-visible controller ports.
//!
//! The pad is read through `$4016`/`$4017`: a write latches the currently
//! pressed buttons into an 8-bit shift register, each following read emits
//! one bit, A first.

use bitflags::bitflags;

use crate::bus::BusDevice;
use crate::shifter::Piso;

bitflags! {
    /// Pressed-button mask, A in the most significant bit.
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// A B s S U D L R
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const A = 0b1000_0000;
        const B = 0b0100_0000;
        const SELECT = 0b0010_0000;
        const START = 0b0001_0000;
        const UP = 0b0000_1000;
        const DOWN = 0b0000_0100;
        const LEFT = 0b0000_0010;
        const RIGHT = 0b0000_0001;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Buttons::empty()
    }
}

/// Serially-readable control pad with latch/strobe behavior.
///
/// The host may update the pressed set at any time; the snapshot a game
/// observes is whatever is pressed at the instant it strobes the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ControlPad {
    buttons: Buttons,
    shifter: Piso<8>,
}

impl ControlPad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the currently pressed set.
    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.buttons = buttons;
    }

    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    /// Updates a single button's pressed state.
    pub fn set_button(&mut self, button: Buttons, pressed: bool) {
        self.buttons.set(button, pressed);
    }

    /// Latches the pressed set into the shift register.
    pub fn strobe(&mut self) {
        self.shifter.load(self.buttons.bits() as u16);
    }

    /// Emits the next serial bit (A first); zeros once exhausted.
    pub fn serial_read(&mut self) -> u8 {
        self.shifter.output()
    }
}

/// The two controller ports mapped at `$4016`/`$4017`.
///
/// Pads are hot-swappable; an empty port reads 0.
#[derive(Debug, Default)]
pub struct ControllerPorts {
    ports: [Option<ControlPad>; 2],
}

impl ControllerPorts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a pad, returning whatever was previously plugged in.
    pub fn plug(&mut self, port: usize, pad: ControlPad) -> Option<ControlPad> {
        self.ports[port].replace(pad)
    }

    pub fn unplug(&mut self, port: usize) -> Option<ControlPad> {
        self.ports[port].take()
    }

    pub fn get_mut(&mut self, port: usize) -> Option<&mut ControlPad> {
        self.ports.get_mut(port)?.as_mut()
    }

    #[inline]
    fn port_index(addr: u16) -> usize {
        (addr & 1) as usize
    }
}

impl BusDevice for ControllerPorts {
    fn read(&mut self, addr: u16) -> u8 {
        match &mut self.ports[Self::port_index(addr)] {
            Some(pad) => pad.serial_read(),
            None => 0,
        }
    }

    fn write(&mut self, addr: u16, _value: u8) {
        if let Some(pad) = &mut self.ports[Self::port_index(addr)] {
            pad.strobe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::cpu::{CONTROLLER_PORT_1, CONTROLLER_PORT_2};

    #[test]
    fn serial_read_emits_a_first() {
        let mut pad = ControlPad::new();
        pad.set_buttons(Buttons::A | Buttons::UP);
        pad.strobe();

        let bits: Vec<u8> = (0..8).map(|_| pad.serial_read()).collect();
        assert_eq!(bits, [1, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(pad.serial_read(), 0);
    }

    #[test]
    fn restrobe_latches_the_new_buttons() {
        let mut pad = ControlPad::new();
        pad.set_buttons(Buttons::A | Buttons::UP);
        pad.strobe();
        pad.serial_read();

        pad.set_buttons(Buttons::B);
        pad.strobe();
        let bits: Vec<u8> = (0..8).map(|_| pad.serial_read()).collect();
        assert_eq!(bits, [0, 1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn empty_port_reads_zero() {
        let mut ports = ControllerPorts::new();
        ports.write(CONTROLLER_PORT_1, 1);
        assert_eq!(ports.read(CONTROLLER_PORT_1), 0);
    }

    #[test]
    fn ports_are_independent() {
        let mut ports = ControllerPorts::new();
        let mut one = ControlPad::new();
        one.set_buttons(Buttons::START);
        let mut two = ControlPad::new();
        two.set_buttons(Buttons::A);
        ports.plug(0, one);
        ports.plug(1, two);

        ports.write(CONTROLLER_PORT_1, 1);
        ports.write(CONTROLLER_PORT_2, 1);
        assert_eq!(ports.read(CONTROLLER_PORT_2), 1);
        assert_eq!(ports.read(CONTROLLER_PORT_1), 0);
    }
}
