use std::ops::{
	Deref,
	DerefMut,
};

use crate::bus::{
	ControlLine,
	PinBus,
};
use crate::gpio::Gpio;

/// Asserted control line; released again when dropped.
///
/// Nesting strobes releases them in reverse order of assertion, which is the
/// order the chip timing requires (/CE outermost).
pub struct Strobe<'a, G: Gpio + 'a> {
	bus: &'a mut PinBus<G>,
	line: ControlLine,
}

impl<'a, G: Gpio> Strobe<'a, G> {
	pub fn assert(bus: &'a mut PinBus<G>, line: ControlLine) -> Self {
		bus.assert_line(line);
		Strobe { bus, line }
	}

	pub fn strobe(&mut self, line: ControlLine) -> Strobe<'_, G> {
		Strobe::assert(self.bus, line)
	}
}

impl<'a, G: Gpio> Drop for Strobe<'a, G> {
	fn drop(&mut self) {
		self.bus.release_line(self.line);
	}
}

impl<'a, G: Gpio> Deref for Strobe<'a, G> {
	type Target = PinBus<G>;

	fn deref(&self) -> &Self::Target {
		&self.bus
	}
}

impl<'a, G: Gpio> DerefMut for Strobe<'a, G> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.bus
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

	#[test]
	fn nested_release_order() {
		let map = BusLineMap::default();
		let mut bus = PinBus::new(map, SimulatedChip::new(map));
		bus.configure_outputs();
		bus.gpio_mut().take_events();

		{
			let mut ce = Strobe::assert(&mut bus, ControlLine::ChipEnable);
			let oe = ce.strobe(ControlLine::OutputEnable);
			assert!(!oe.gpio().level(map.output_enable));
		}
		assert_eq!(bus.gpio_mut().take_events(), vec![
			Event::Strobe { line: ControlLine::ChipEnable, active: true },
			Event::Strobe { line: ControlLine::OutputEnable, active: true },
			Event::Strobe { line: ControlLine::OutputEnable, active: false },
			Event::Strobe { line: ControlLine::ChipEnable, active: false },
		]);
	}
}
