//! Programmer for parallel 28C-family EEPROMs (28C256 and friends), driving
//! the chip directly through GPIO pins.
//!
//! Layers, bottom up:
//! - [`gpio`]: raw pins (memory-mapped BCM2835 block or a simulated chip)
//! - [`bus`]: address/data/control lines mapped onto pins
//! - [`cycle`]: timed read and write cycles
//! - [`operations`] and [`protection`]: bulk algorithms and the SDP sequence
//!
//! There is no way to detect whether a chip is attached at all: without one,
//! reads return whatever the floating data lines happen to show and writes
//! are silently lost.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod bus;
pub mod codec;
pub mod cycle;
pub mod gpio;
pub mod operations;
pub mod protection;

pub use self::bus::{
	Address,
	AddressRange,
	BusLineMap,
	InvalidRange,
	PinBus,
};

pub use self::cycle::{
	CycleEngine,
	Cycles,
	Timing,
	WriteCompletion,
};

pub use self::operations::{
	BulkOperations,
	VerifyResult,
};

pub use self::protection::SoftwareDataProtection;
