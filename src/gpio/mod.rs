use std::fmt;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

mod bcm2835;
mod linux;
mod simulated;

pub use self::bcm2835::{
	Bcm2835,
	GpioRegisters,
};

pub use self::linux::{
	DEFAULT_GPIOMEM_PATH,
	open_gpiomem,
};

pub use self::simulated::{
	Event,
	SimulatedChip,
};

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// Physical pin identifier (BCM GPIO number on a Raspberry Pi)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pin(pub u8);

impl fmt::Debug for Pin {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "GPIO{}", self.0)
	}
}

impl fmt::Display for Pin {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "GPIO{}", self.0)
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Input,
	Output,
}

pub trait Gpio {
	fn set_direction(&mut self, pin: Pin, direction: Direction);
	fn write_pin(&mut self, pin: Pin, level: bool);
	fn read_pin(&mut self, pin: Pin) -> bool;

	// delay for (at least) `duration`
	fn delay(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}

impl<'a, G: ?Sized + Gpio> Gpio for &'a mut G {
	fn set_direction(&mut self, pin: Pin, direction: Direction) {
		G::set_direction(*self, pin, direction)
	}
	fn write_pin(&mut self, pin: Pin, level: bool) {
		G::write_pin(*self, pin, level)
	}
	fn read_pin(&mut self, pin: Pin) -> bool {
		G::read_pin(*self, pin)
	}
	fn delay(&mut self, duration: Duration) {
		G::delay(*self, duration)
	}
}

#[cfg(test)]
mod test {
	use super::reliable_sleep;
	use std::time::{
		Duration,
		Instant,
	};

	#[test]
	fn sleeps_at_least_requested_duration() {
		let duration = Duration::from_millis(2);
		let now = Instant::now();
		reliable_sleep(duration);
		assert!(now.elapsed() >= duration);
	}
}
