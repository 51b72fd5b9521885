use std::fmt;

use crate::gpio::{
	Direction,
	Gpio,
	Pin,
};

mod range;

pub use self::range::{
	AddressRange,
	InvalidRange,
};

pub const ADDRESS_WIDTH: usize = 15;
pub const DATA_WIDTH: usize = 8;
pub const ADDRESS_LIMIT: u32 = 1u32 << ADDRESS_WIDTH;

/// Cell address; only the lowest `ADDRESS_WIDTH` bits are valid.
pub type Address = u16;

/// Control lines of a 28C chip; all of them are active low.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ControlLine {
	ChipEnable,
	OutputEnable,
	WriteEnable,
}

impl fmt::Display for ControlLine {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			ControlLine::ChipEnable => "/CE",
			ControlLine::OutputEnable => "/OE",
			ControlLine::WriteEnable => "/WE",
		})
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BusLineMap {
	/// A0 first
	pub address: [Pin; ADDRESS_WIDTH],
	/// D0 first
	pub data: [Pin; DATA_WIDTH],
	pub chip_enable: Pin,
	pub output_enable: Pin,
	pub write_enable: Pin,
}

impl BusLineMap {
	/// Reference wiring on a Raspberry Pi header, as BCM GPIO numbers.
	///
	/// In wiringPi numbering this is A0-A14 = 8,9,7,0,2,3,12,13,14,30,21,22,23,24,25,
	/// D0-D7 = 15,16,1,4,5,6,10,11, CE = 27, OE = 28, WE = 29.
	pub const fn raspberry_pi() -> Self {
		BusLineMap {
			address: [
				Pin(2), Pin(3), Pin(4), Pin(17), Pin(27),
				Pin(22), Pin(10), Pin(9), Pin(11), Pin(0),
				Pin(5), Pin(6), Pin(13), Pin(19), Pin(26),
			],
			data: [
				Pin(14), Pin(15), Pin(18), Pin(23),
				Pin(24), Pin(25), Pin(8), Pin(7),
			],
			chip_enable: Pin(16),
			output_enable: Pin(20),
			write_enable: Pin(21),
		}
	}

	pub fn control(&self, line: ControlLine) -> Pin {
		match line {
			ControlLine::ChipEnable => self.chip_enable,
			ControlLine::OutputEnable => self.output_enable,
			ControlLine::WriteEnable => self.write_enable,
		}
	}

	pub fn control_line_of(&self, pin: Pin) -> Option<ControlLine> {
		[ControlLine::ChipEnable, ControlLine::OutputEnable, ControlLine::WriteEnable]
			.iter()
			.cloned()
			.find(|&line| self.control(line) == pin)
	}

	pub fn data_bit_of(&self, pin: Pin) -> Option<usize> {
		self.data.iter().position(|&p| p == pin)
	}
}

impl Default for BusLineMap {
	fn default() -> Self {
		Self::raspberry_pi()
	}
}

/// Logical EEPROM bus on top of raw GPIO pins.
///
/// Doesn't know anything about timing; see `CycleEngine` for that.
pub struct PinBus<G: Gpio> {
	gpio: G,
	map: BusLineMap,
	data_direction: Option<Direction>,
}

impl<G: Gpio> PinBus<G> {
	pub fn new(map: BusLineMap, gpio: G) -> Self {
		PinBus {
			gpio,
			map,
			data_direction: None,
		}
	}

	pub fn map(&self) -> &BusLineMap {
		&self.map
	}

	pub fn gpio(&self) -> &G {
		&self.gpio
	}

	pub fn gpio_mut(&mut self) -> &mut G {
		&mut self.gpio
	}

	pub fn into_gpio(self) -> G {
		self.gpio
	}

	/// address and control lines become outputs; address low, control
	/// lines inactive (high)
	pub fn configure_outputs(&mut self) {
		for &pin in self.map.address.iter() {
			self.gpio.set_direction(pin, Direction::Output);
			self.gpio.write_pin(pin, false);
		}

		for &pin in [self.map.chip_enable, self.map.output_enable, self.map.write_enable].iter() {
			self.gpio.set_direction(pin, Direction::Output);
		}
		for &pin in [self.map.chip_enable, self.map.output_enable, self.map.write_enable].iter() {
			self.gpio.write_pin(pin, true);
		}
	}

	pub fn set_address(&mut self, address: Address) {
		assert!((address as u32) < ADDRESS_LIMIT, "address 0x{:04x} outside of bus", address);
		for (bit, &pin) in self.map.address.iter().enumerate() {
			self.gpio.write_pin(pin, 0 != (address >> bit) & 1);
		}
	}

	/// `None` until `set_data_direction` was called
	pub fn data_direction(&self) -> Option<Direction> {
		self.data_direction
	}

	pub fn set_data_direction(&mut self, direction: Direction) {
		for &pin in self.map.data.iter() {
			self.gpio.set_direction(pin, direction);
		}
		self.data_direction = Some(direction);
	}

	pub fn set_data(&mut self, data: u8) {
		debug_assert_eq!(self.data_direction, Some(Direction::Output), "driving data bus while not an output");
		for (bit, &pin) in self.map.data.iter().enumerate() {
			self.gpio.write_pin(pin, 0 != (data >> bit) & 1);
		}
	}

	// read from D7 down to D0
	pub fn get_data(&mut self) -> u8 {
		debug_assert_eq!(self.data_direction, Some(Direction::Input), "sampling data bus while not an input");
		let mut data = 0u8;
		for &pin in self.map.data.iter().rev() {
			data = (data << 1) | (self.gpio.read_pin(pin) as u8);
		}
		data
	}

	pub fn set_control_line(&mut self, line: ControlLine, level: bool) {
		let pin = self.map.control(line);
		self.gpio.write_pin(pin, level);
	}

	// active low
	pub fn assert_line(&mut self, line: ControlLine) {
		self.set_control_line(line, false);
	}

	pub fn release_line(&mut self, line: ControlLine) {
		self.set_control_line(line, true);
	}

	pub fn delay(&mut self, duration: std::time::Duration) {
		self.gpio.delay(duration);
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::gpio::SimulatedChip;

	fn bus() -> PinBus<SimulatedChip> {
		let map = BusLineMap::default();
		let mut bus = PinBus::new(map, SimulatedChip::new(map));
		bus.configure_outputs();
		bus
	}

	#[test]
	fn reference_map_has_distinct_pins() {
		let map = BusLineMap::raspberry_pi();
		let mut pins: Vec<Pin> = map.address.iter().chain(map.data.iter()).cloned().collect();
		pins.push(map.chip_enable);
		pins.push(map.output_enable);
		pins.push(map.write_enable);
		let count = pins.len();
		pins.sort();
		pins.dedup();
		assert_eq!(pins.len(), count);
		assert_eq!(count, ADDRESS_WIDTH + DATA_WIDTH + 3);
	}

	#[test]
	fn configure_outputs_idles_bus() {
		let bus = bus();
		let map = *bus.map();
		let chip = bus.gpio();
		for &pin in map.address.iter() {
			assert_eq!(chip.direction(pin), Some(Direction::Output));
			assert!(!chip.level(pin), "{} should be low", pin);
		}
		for &line in [ControlLine::ChipEnable, ControlLine::OutputEnable, ControlLine::WriteEnable].iter() {
			assert_eq!(chip.direction(map.control(line)), Some(Direction::Output));
			assert!(chip.level(map.control(line)), "{} should be inactive", line);
		}
	}

	#[test]
	fn address_lsb_first() {
		let mut bus = bus();
		bus.set_address(0x4001);
		let map = *bus.map();
		assert!(bus.gpio().level(map.address[0]));
		for bit in 1..14 {
			assert!(!bus.gpio().level(map.address[bit]));
		}
		assert!(bus.gpio().level(map.address[14]));
		assert_eq!(bus.gpio().address(), 0x4001);
	}

	#[test]
	#[should_panic]
	fn address_outside_bus() {
		bus().set_address(0x8000);
	}

	#[test]
	fn data_lsb_first() {
		let mut bus = bus();
		assert_eq!(bus.data_direction(), None);
		bus.set_data_direction(Direction::Output);
		assert_eq!(bus.data_direction(), Some(Direction::Output));
		bus.set_data(0b1000_0011);
		let map = *bus.map();
		let levels: Vec<bool> = map.data.iter().map(|&pin| bus.gpio().level(pin)).collect();
		assert_eq!(levels, vec![true, true, false, false, false, false, false, true]);
	}

	#[test]
	fn control_line_lookup() {
		let map = BusLineMap::default();
		assert_eq!(map.control_line_of(map.write_enable), Some(ControlLine::WriteEnable));
		assert_eq!(map.control_line_of(map.data[0]), None);
		assert_eq!(map.data_bit_of(map.data[7]), Some(7));
		assert_eq!(map.data_bit_of(map.chip_enable), None);
	}
}
