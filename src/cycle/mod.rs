use std::time::{
	Duration,
	Instant,
};

use crate::bus::{
	Address,
	ControlLine,
	PinBus,
};
use crate::gpio::{
	Direction,
	Gpio,
};

mod strobe;

pub use self::strobe::Strobe;

/// Delays mandated by the chip datasheet.
///
/// Not tunables: the defaults match the reference hardware (28C256, ~150ns
/// access time); other silicon needs values derived from its own datasheet.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Timing {
	/// minimum time strobes stay asserted before sampling / releasing
	pub settle: Duration,
	/// worst case byte program time
	pub write_cycle: Duration,
}

impl Default for Timing {
	fn default() -> Self {
		Timing {
			settle: Duration::from_micros(1),
			write_cycle: Duration::from_millis(10),
		}
	}
}

/// How to wait for the chip to finish programming a byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum WriteCompletion {
	/// always wait `Timing::write_cycle`
	FixedDelay,
	/// poll D7 until it shows the written value (at most `timeout`)
	DataPolling { timeout: Duration },
}

impl Default for WriteCompletion {
	fn default() -> Self {
		WriteCompletion::FixedDelay
	}
}

/// Single-byte bus cycles
pub trait Cycles {
	fn read_cycle(&mut self, address: Address) -> u8;

	/// returns after the chip finished programming
	fn write_cycle(&mut self, address: Address, data: u8);
}

/// The only owner of the bus; runs timed read and write cycles on it.
pub struct CycleEngine<G: Gpio> {
	bus: PinBus<G>,
	timing: Timing,
	completion: WriteCompletion,
}

impl<G: Gpio> CycleEngine<G> {
	/// configures the bus; the data bus starts as input
	pub fn new(mut bus: PinBus<G>, timing: Timing, completion: WriteCompletion) -> Self {
		bus.configure_outputs();
		bus.set_data_direction(Direction::Input);
		CycleEngine {
			bus,
			timing,
			completion,
		}
	}

	pub fn timing(&self) -> Timing {
		self.timing
	}

	pub fn completion(&self) -> WriteCompletion {
		self.completion
	}

	pub fn data_direction(&self) -> Option<Direction> {
		self.bus.data_direction()
	}

	pub fn bus(&self) -> &PinBus<G> {
		&self.bus
	}

	pub fn into_bus(self) -> PinBus<G> {
		self.bus
	}

	fn wait_for_completion(&mut self, address: Address, data: u8) {
		match self.completion {
			WriteCompletion::FixedDelay => {
				self.bus.delay(self.timing.write_cycle);
			},
			WriteCompletion::DataPolling { timeout } => {
				// while programming the chip outputs the complement of D7
				let deadline = Instant::now() + timeout;
				loop {
					let polled = self.read_cycle(address);
					if (polled ^ data) & 0x80 == 0 {
						return;
					}
					if Instant::now() >= deadline {
						warn!("write cycle at 0x{:04X} didn't complete within {:?}", address, timeout);
						return;
					}
				}
			},
		}
	}
}

impl<G: Gpio> Cycles for CycleEngine<G> {
	fn read_cycle(&mut self, address: Address) -> u8 {
		self.bus.set_data_direction(Direction::Input);
		self.bus.set_address(address);

		let settle = self.timing.settle;
		let data;
		{
			let mut ce = Strobe::assert(&mut self.bus, ControlLine::ChipEnable);
			let mut oe = ce.strobe(ControlLine::OutputEnable);
			oe.delay(settle);
			data = oe.get_data();
			// releases /OE, then /CE
		}
		trace!("read  0x{:04X}: 0x{:02X}", address, data);
		data
	}

	fn write_cycle(&mut self, address: Address, data: u8) {
		trace!("write 0x{:04X}: 0x{:02X}", address, data);
		self.bus.set_address(address);
		self.bus.set_data_direction(Direction::Output);
		self.bus.set_data(data);

		let settle = self.timing.settle;
		{
			let mut ce = Strobe::assert(&mut self.bus, ControlLine::ChipEnable);
			let mut we = ce.strobe(ControlLine::WriteEnable);
			we.delay(settle);
			// releases /WE, then /CE
		}

		self.wait_for_completion(address, data);
	}
}

impl<'a, C: Cycles + ?Sized> Cycles for &'a mut C {
	fn read_cycle(&mut self, address: Address) -> u8 {
		C::read_cycle(*self, address)
	}

	fn write_cycle(&mut self, address: Address, data: u8) {
		C::write_cycle(*self, address, data)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::bus::BusLineMap;
	use crate::gpio::{
		Event,
		SimulatedChip,
	};

	fn engine(completion: WriteCompletion) -> CycleEngine<SimulatedChip> {
		let map = BusLineMap::default();
		let bus = PinBus::new(map, SimulatedChip::filled(map, 0x00));
		CycleEngine::new(bus, Timing::default(), completion)
	}

	fn take_events(engine: &mut CycleEngine<SimulatedChip>) -> Vec<Event> {
		engine.bus.gpio_mut().take_events()
	}

	fn strobe(line: ControlLine, active: bool) -> Event {
		Event::Strobe { line, active }
	}

	#[test]
	fn read_cycle_strobe_order() {
		let mut engine = engine(WriteCompletion::FixedDelay);
		engine.bus.gpio_mut().memory_mut()[0x2345] = 0xc3;
		take_events(&mut engine);

		assert_eq!(engine.read_cycle(0x2345), 0xc3);
		assert_eq!(take_events(&mut engine), vec![
			strobe(ControlLine::ChipEnable, true),
			strobe(ControlLine::OutputEnable, true),
			Event::Delay(Duration::from_micros(1)),
			strobe(ControlLine::OutputEnable, false),
			strobe(ControlLine::ChipEnable, false),
		]);
		assert_eq!(engine.data_direction(), Some(Direction::Input));
	}

	#[test]
	fn write_cycle_strobe_order() {
		let mut engine = engine(WriteCompletion::FixedDelay);
		take_events(&mut engine);

		engine.write_cycle(0x7fff, 0xa5);
		assert_eq!(take_events(&mut engine), vec![
			strobe(ControlLine::ChipEnable, true),
			strobe(ControlLine::WriteEnable, true),
			Event::Delay(Duration::from_micros(1)),
			strobe(ControlLine::WriteEnable, false),
			Event::Program { address: 0x7fff, data: 0xa5 },
			strobe(ControlLine::ChipEnable, false),
			Event::Delay(Duration::from_millis(10)),
		]);
		assert_eq!(engine.data_direction(), Some(Direction::Output));
	}

	#[test]
	fn round_trip() {
		let mut engine = engine(WriteCompletion::FixedDelay);
		for &(address, data) in [(0x0000, 0x01), (0x0001, 0xfe), (0x5555, 0x80), (0x7fff, 0x7f)].iter() {
			engine.write_cycle(address, data);
			assert_eq!(engine.read_cycle(address), data, "at 0x{:04X}", address);
		}
	}

	#[test]
	fn data_polling_skips_fixed_delay() {
		let mut engine = engine(WriteCompletion::DataPolling { timeout: Duration::from_millis(10) });
		take_events(&mut engine);

		engine.write_cycle(0x0100, 0x80);
		let events = take_events(&mut engine);
		assert!(!events.contains(&Event::Delay(Duration::from_millis(10))));
		// one polling read cycle, the simulated chip is done instantly
		assert_eq!(polls(&events), 1);
		assert_eq!(engine.read_cycle(0x0100), 0x80);
	}

	fn polls(events: &[Event]) -> usize {
		events.iter().filter(|&&e| e == strobe(ControlLine::OutputEnable, true)).count()
	}

	#[test]
	fn data_polling_waits_for_d7() {
		let mut engine = engine(WriteCompletion::DataPolling { timeout: Duration::from_secs(5) });
		engine.bus.gpio_mut().set_busy_reads(3);
		take_events(&mut engine);

		engine.write_cycle(0x0200, 0x81);
		// three busy reads, then the one showing the written D7
		assert_eq!(polls(&take_events(&mut engine)), 4);
		assert_eq!(engine.read_cycle(0x0200), 0x81);
	}

	#[test]
	fn data_polling_gives_up_after_timeout() {
		let timeout = Duration::from_millis(5);
		let mut engine = engine(WriteCompletion::DataPolling { timeout });
		engine.bus.gpio_mut().set_busy_reads(usize::MAX);
		take_events(&mut engine);

		let started = Instant::now();
		engine.write_cycle(0x0300, 0x80);
		assert!(started.elapsed() >= timeout);

		let events = take_events(&mut engine);
		assert!(polls(&events) >= 1);
		assert!(!events.contains(&Event::Delay(Duration::from_millis(10))));
		// still programming: D7 shows the complement
		assert_eq!(engine.read_cycle(0x0300), 0x00);
	}
}
