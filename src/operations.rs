use crate::bus::{
	Address,
	AddressRange,
};
use crate::codec::{
	ByteSink,
	ByteSource,
};
use crate::cycle::Cycles;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum VerifyResult {
	/// all `verified` bytes matched
	Match { verified: u32 },
	/// first divergence; nothing after `address` was read
	Mismatch { address: Address, expected: u8, actual: u8 },
}

impl VerifyResult {
	pub fn is_match(&self) -> bool {
		match self {
			VerifyResult::Match { .. } => true,
			VerifyResult::Mismatch { .. } => false,
		}
	}
}

/// Algorithms over address ranges; every byte is one bus cycle, in ascending
/// address order, without retries.
pub trait BulkOperations: Cycles {
	/// number of bytes in `range` that are not `blank`
	fn test(&mut self, range: AddressRange, blank: u8) -> u32 {
		debug!("testing {} for 0x{:02X}", range, blank);
		range.addresses().filter(|&address| self.read_cycle(address) != blank).count() as u32
	}

	fn erase(&mut self, range: AddressRange, blank: u8) {
		debug!("erasing {} with 0x{:02X}", range, blank);
		for address in range.addresses() {
			self.write_cycle(address, blank);
		}
	}

	fn dump<S>(&mut self, range: AddressRange, sink: &mut S) -> crate::AResult<()>
	where
		S: ByteSink + ?Sized,
	{
		debug!("dumping {}", range);
		sink.start(range.start())?;
		for address in range.addresses() {
			let value = self.read_cycle(address);
			sink.put(address, value)?;
		}
		sink.finish(range.end())
	}

	/// Programs bytes from `source` starting at `range.start()`.
	///
	/// Stops after `range.len()` bytes; if the source runs dry first, the
	/// rest of the range gets erased to `blank`. An empty range takes the
	/// whole source and erases nothing; a source that doesn't fit between
	/// the start and the end of the address space fails with `InvalidRange`
	/// before anything is written.
	///
	/// Returns the number of bytes taken from `source`.
	fn write<S>(&mut self, range: AddressRange, source: &mut S, blank: u8) -> crate::AResult<u32>
	where
		S: ByteSource + ?Sized,
	{
		if range.is_empty() {
			let window = AddressRange::to_end(range.start() as u32)?;
			debug!("writing at most {}", window);
			// read everything first; an oversized source must not touch the chip
			let mut data = Vec::new();
			while let Some(value) = source.next_byte()? {
				if data.len() as u32 == window.len() {
					return Err(window.overrun().into());
				}
				data.push(value);
			}
			for (address, &value) in window.addresses().zip(data.iter()) {
				self.write_cycle(address, value);
			}
			return Ok(data.len() as u32);
		}

		debug!("writing {}", range);
		let mut written = 0u32;
		for address in range.addresses() {
			let value = match source.next_byte()? {
				None => break,
				Some(value) => value,
			};
			self.write_cycle(address, value);
			written += 1;
		}

		if written < range.len() {
			self.erase(range.skip(written), blank);
		}
		Ok(written)
	}

	/// Compares `source` with the chip, stopping at the first difference.
	///
	/// An empty range compares the whole source; if the source is longer
	/// than the rest of the address space, that fails with `InvalidRange`.
	fn verify<S>(&mut self, range: AddressRange, source: &mut S) -> crate::AResult<VerifyResult>
	where
		S: ByteSource + ?Sized,
	{
		let window = if range.is_empty() {
			AddressRange::to_end(range.start() as u32)?
		} else {
			range
		};
		debug!("verifying {}", window);

		let mut verified = 0u32;
		for address in window.addresses() {
			let expected = match source.next_byte()? {
				None => break,
				Some(value) => value,
			};
			let actual = self.read_cycle(address);
			if actual != expected {
				debug!("verify failed at 0x{:04X}: expected 0x{:02X}, found 0x{:02X}", address, expected, actual);
				return Ok(VerifyResult::Mismatch { address, expected, actual });
			}
			verified += 1;
		}
		if range.is_empty() && verified == window.len() && source.next_byte()?.is_some() {
			return Err(window.overrun().into());
		}
		Ok(VerifyResult::Match { verified })
	}
}

impl<C: Cycles + ?Sized> BulkOperations for C {
}
