/* Chip documentation: "BCM2835 ARM Peripherals", chapter 6 (General Purpose I/O) */

use super::{
	Direction,
	Gpio,
	Pin,
};

#[allow(dead_code)]
mod consts {
	// byte offsets into the GPIO register block
	pub const GPFSEL0: usize = 0x00; // function select, 10 pins per register
	pub const GPSET0:  usize = 0x1c; // write 1 to drive pin high
	pub const GPCLR0:  usize = 0x28; // write 1 to drive pin low
	pub const GPLEV0:  usize = 0x34; // pin level, read only

	pub const FSEL_MASK:   u32 = 0b111;
	pub const FSEL_INPUT:  u32 = 0b000;
	pub const FSEL_OUTPUT: u32 = 0b001;

	pub const PIN_COUNT: u8 = 54;
}

use self::consts::*;

/// Access to the 32-bit GPIO registers
pub trait GpioRegisters {
	fn read_register(&self, offset: usize) -> u32;
	fn write_register(&mut self, offset: usize, value: u32);
}

pub struct Bcm2835<R: GpioRegisters> {
	registers: R,
}

impl<R: GpioRegisters> Bcm2835<R> {
	pub fn new(registers: R) -> Self {
		Bcm2835 { registers }
	}

	// (register offset, bit mask) in a bank of one-bit-per-pin registers
	fn bank_bit(base: usize, pin: Pin) -> (usize, u32) {
		assert!(pin.0 < PIN_COUNT, "{} doesn't exist on BCM2835", pin);
		(base + 4 * (pin.0 as usize / 32), 1u32 << (pin.0 % 32))
	}
}

impl<R: GpioRegisters> Gpio for Bcm2835<R> {
	fn set_direction(&mut self, pin: Pin, direction: Direction) {
		assert!(pin.0 < PIN_COUNT, "{} doesn't exist on BCM2835", pin);
		let offset = GPFSEL0 + 4 * (pin.0 as usize / 10);
		let shift = 3 * (pin.0 as u32 % 10);
		let function = match direction {
			Direction::Input => FSEL_INPUT,
			Direction::Output => FSEL_OUTPUT,
		};
		let fsel = self.registers.read_register(offset);
		let fsel = (fsel & !(FSEL_MASK << shift)) | (function << shift);
		self.registers.write_register(offset, fsel);
	}

	fn write_pin(&mut self, pin: Pin, level: bool) {
		let base = if level { GPSET0 } else { GPCLR0 };
		let (offset, mask) = Self::bank_bit(base, pin);
		self.registers.write_register(offset, mask);
	}

	fn read_pin(&mut self, pin: Pin) -> bool {
		let (offset, mask) = Self::bank_bit(GPLEV0, pin);
		0 != self.registers.read_register(offset) & mask
	}
}
