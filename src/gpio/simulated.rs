use std::collections::HashMap;
use std::time::Duration;

use crate::bus::{
	ADDRESS_LIMIT,
	Address,
	BusLineMap,
	ControlLine,
};

use super::{
	Direction,
	Gpio,
	Pin,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
	/// control line changed level; `active` means driven low
	Strobe { line: ControlLine, active: bool },
	Delay(Duration),
	/// cell latched on the rising /WE edge
	Program { address: Address, data: u8 },
}

/// 28C256-like chip wired to a `BusLineMap`, for tests and dry runs.
///
/// Address and data are latched when /WE goes high while /CE is low; the chip
/// drives the data lines while /CE and /OE are low, /WE is high and the pins
/// are configured as inputs. Delays don't sleep. Floating pins read as high.
///
/// Writes complete instantly unless `set_busy_reads` says otherwise: while
/// busy, every read returns the complement of the cell's D7.
pub struct SimulatedChip {
	map: BusLineMap,
	memory: Vec<u8>,
	levels: HashMap<Pin, bool>,
	directions: HashMap<Pin, Direction>,
	events: Vec<Event>,
	busy_reads: usize,
	busy: usize,
}

impl SimulatedChip {
	/// erased chip (all cells 0xff)
	pub fn new(map: BusLineMap) -> Self {
		Self::filled(map, 0xff)
	}

	pub fn filled(map: BusLineMap, value: u8) -> Self {
		SimulatedChip {
			map,
			memory: vec![value; ADDRESS_LIMIT as usize],
			levels: HashMap::new(),
			directions: HashMap::new(),
			events: Vec::new(),
			busy_reads: 0,
			busy: 0,
		}
	}

	/// number of read cycles after each write that still see the chip
	/// programming; `usize::MAX` never finishes
	pub fn set_busy_reads(&mut self, reads: usize) {
		self.busy_reads = reads;
	}

	pub fn memory(&self) -> &[u8] {
		&self.memory
	}

	pub fn memory_mut(&mut self) -> &mut [u8] {
		&mut self.memory
	}

	pub fn events(&self) -> &[Event] {
		&self.events
	}

	pub fn take_events(&mut self) -> Vec<Event> {
		std::mem::replace(&mut self.events, Vec::new())
	}

	/// cells programmed so far, in order
	pub fn programmed(&self) -> Vec<(Address, u8)> {
		self.events.iter().filter_map(|e| match *e {
			Event::Program { address, data } => Some((address, data)),
			_ => None,
		}).collect()
	}

	/// number of times /OE got asserted
	pub fn read_cycles(&self) -> usize {
		self.events.iter().filter(|e| match e {
			Event::Strobe { line: ControlLine::OutputEnable, active: true } => true,
			_ => false,
		}).count()
	}

	pub fn level(&self, pin: Pin) -> bool {
		self.levels.get(&pin).cloned().unwrap_or(true)
	}

	pub fn direction(&self, pin: Pin) -> Option<Direction> {
		self.directions.get(&pin).cloned()
	}

	/// address currently driven on the address lines
	pub fn address(&self) -> Address {
		let mut address: Address = 0;
		for (bit, &pin) in self.map.address.iter().enumerate() {
			if self.level(pin) {
				address |= 1 << bit;
			}
		}
		address
	}

	fn driven_data(&self) -> u8 {
		let mut data = 0u8;
		for (bit, &pin) in self.map.data.iter().enumerate() {
			if self.level(pin) {
				data |= 1 << bit;
			}
		}
		data
	}

	fn is_active(&self, line: ControlLine) -> bool {
		!self.level(self.map.control(line))
	}
}

impl Gpio for SimulatedChip {
	fn set_direction(&mut self, pin: Pin, direction: Direction) {
		self.directions.insert(pin, direction);
	}

	fn write_pin(&mut self, pin: Pin, level: bool) {
		let previous = self.level(pin);
		self.levels.insert(pin, level);

		let line = match self.map.control_line_of(pin) {
			Some(line) if previous != level => line,
			_ => return,
		};
		self.events.push(Event::Strobe { line, active: !level });

		if line == ControlLine::OutputEnable && level && self.busy != usize::MAX {
			self.busy = self.busy.saturating_sub(1);
		}

		let write_done = line == ControlLine::WriteEnable && level;
		if write_done && self.is_active(ControlLine::ChipEnable) && !self.is_active(ControlLine::OutputEnable) {
			let address = self.address();
			let data = self.driven_data();
			self.memory[address as usize] = data;
			self.events.push(Event::Program { address, data });
			self.busy = self.busy_reads;
		}
	}

	fn read_pin(&mut self, pin: Pin) -> bool {
		let driving = self.is_active(ControlLine::ChipEnable)
			&& self.is_active(ControlLine::OutputEnable)
			&& !self.is_active(ControlLine::WriteEnable);

		match self.map.data_bit_of(pin) {
			Some(bit) if driving && self.direction(pin) == Some(Direction::Input) => {
				let mut cell = self.memory[self.address() as usize];
				if 0 != self.busy {
					cell ^= 0x80;
				}
				0 != (cell >> bit) & 1
			},
			_ => self.level(pin),
		}
	}

	fn delay(&mut self, duration: Duration) {
		self.events.push(Event::Delay(duration));
	}
}
