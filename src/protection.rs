//! Software Data Protection (SDP) of 28C EEPROMs.
//!
//! Command bytes are written to "magic" addresses in a fixed order; the chip
//! ignores sequences that are out of order or use other values. Once enabled,
//! every later write needs the enable sequence in front of it.

use crate::bus::Address;
use crate::cycle::Cycles;

pub const MAGIC_ADDRESS_1: Address = 0x5555;
pub const MAGIC_ADDRESS_2: Address = 0x2AAA;

pub const ENABLE_SEQUENCE: [(Address, u8); 3] = [
	(MAGIC_ADDRESS_1, 0xAA),
	(MAGIC_ADDRESS_2, 0x55),
	(MAGIC_ADDRESS_1, 0xA0),
];

pub const DISABLE_SEQUENCE: [(Address, u8); 6] = [
	(MAGIC_ADDRESS_1, 0xAA),
	(MAGIC_ADDRESS_2, 0x55),
	(MAGIC_ADDRESS_1, 0x80),
	(MAGIC_ADDRESS_1, 0xAA),
	(MAGIC_ADDRESS_2, 0x55),
	(MAGIC_ADDRESS_1, 0x20),
];

pub trait SoftwareDataProtection: Cycles {
	/// Sends the enable or disable sequence; there is no way to check the
	/// chip accepted it.
	fn set_protection(&mut self, enabled: bool) {
		let sequence: &[(Address, u8)] = if enabled {
			&ENABLE_SEQUENCE
		} else {
			&DISABLE_SEQUENCE
		};
		debug!("{} software data protection", if enabled { "enabling" } else { "disabling" });
		for &(address, command) in sequence {
			self.write_cycle(address, command);
		}
	}
}

impl<C: Cycles + ?Sized> SoftwareDataProtection for C {
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::bus::{
		BusLineMap,
		PinBus,
	};
	use crate::cycle::{
		CycleEngine,
		Timing,
		WriteCompletion,
	};
	use crate::gpio::SimulatedChip;

	// records cycles instead of driving a bus
	#[derive(Default)]
	struct Recorder {
		reads: usize,
		writes: Vec<(Address, u8)>,
	}

	impl Cycles for Recorder {
		fn read_cycle(&mut self, _address: Address) -> u8 {
			self.reads += 1;
			0xff
		}

		fn write_cycle(&mut self, address: Address, data: u8) {
			self.writes.push((address, data));
		}
	}

	#[test]
	fn enable_then_disable() {
		let mut recorder = Recorder::default();

		recorder.set_protection(true);
		assert_eq!(recorder.writes, vec![(0x5555, 0xAA), (0x2AAA, 0x55), (0x5555, 0xA0)]);

		recorder.writes.clear();
		recorder.set_protection(false);
		assert_eq!(recorder.writes, vec![
			(0x5555, 0xAA), (0x2AAA, 0x55), (0x5555, 0x80),
			(0x5555, 0xAA), (0x2AAA, 0x55), (0x5555, 0x20),
		]);
		assert_eq!(recorder.reads, 0);
	}

	#[test]
	fn full_write_cycles_on_bus() {
		let map = BusLineMap::default();
		let mut engine = CycleEngine::new(PinBus::new(map, SimulatedChip::new(map)), Timing::default(), WriteCompletion::FixedDelay);
		engine.set_protection(false);

		let chip = engine.bus().gpio();
		assert_eq!(chip.programmed(), DISABLE_SEQUENCE.to_vec());
		assert_eq!(chip.read_cycles(), 0);
		let program_waits = chip.events().iter()
			.filter(|&&e| e == crate::gpio::Event::Delay(Timing::default().write_cycle))
			.count();
		assert_eq!(program_waits, 6);
	}
}
