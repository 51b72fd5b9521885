use std::fmt;

use failure::Fail;

use super::{
	ADDRESS_LIMIT,
	Address,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
#[fail(display = "range 0x{:05X}+0x{:05X} exceeds the 0x{:05X} byte address space", start, length, limit)]
pub struct InvalidRange {
	pub start: u32,
	pub length: u32,
	pub limit: u32,
}

/// Window `[start, start + length)` on the bus; never exceeds the address space.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
	start: Address,
	length: u32,
}

impl AddressRange {
	pub fn new(start: u32, length: u32) -> Result<Self, InvalidRange> {
		let invalid = InvalidRange { start, length, limit: ADDRESS_LIMIT };
		if start >= ADDRESS_LIMIT || length > ADDRESS_LIMIT - start {
			return Err(invalid);
		}
		Ok(AddressRange {
			start: start as Address,
			length,
		})
	}

	/// from `start` to the end of the address space
	pub fn to_end(start: u32) -> Result<Self, InvalidRange> {
		Self::new(start, ADDRESS_LIMIT.saturating_sub(start))
	}

	pub fn start(&self) -> Address {
		self.start
	}

	pub fn len(&self) -> u32 {
		self.length
	}

	pub fn is_empty(&self) -> bool {
		0 == self.length
	}

	// exclusive; may be ADDRESS_LIMIT
	pub fn end(&self) -> u32 {
		self.start as u32 + self.length
	}

	/// the part of the range after skipping `offset` addresses
	pub fn skip(&self, offset: u32) -> Self {
		let offset = offset.min(self.length);
		AddressRange {
			// may only reach ADDRESS_LIMIT for an empty tail, which is never addressed
			start: (self.start as u32 + offset).min(ADDRESS_LIMIT - 1) as Address,
			length: self.length - offset,
		}
	}

	/// error for data that didn't fit: at least one byte more than the range
	pub fn overrun(&self) -> InvalidRange {
		InvalidRange {
			start: self.start as u32,
			length: self.length + 1,
			limit: ADDRESS_LIMIT,
		}
	}

	pub fn addresses(&self) -> impl Iterator<Item = Address> {
		(self.start as u32..self.end()).map(|a| a as Address)
	}
}

impl fmt::Debug for AddressRange {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:05X}..0x{:05X}", self.start, self.end())
	}
}

impl fmt::Display for AddressRange {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:X} locations from 0x{:X}", self.length, self.start)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn bounds() {
		assert!(AddressRange::new(0, ADDRESS_LIMIT).is_ok());
		assert!(AddressRange::new(0x7fff, 1).is_ok());
		assert!(AddressRange::new(0x10, 0).unwrap().is_empty());

		let err = AddressRange::new(0x7fff, 2).unwrap_err();
		assert_eq!(err, InvalidRange { start: 0x7fff, length: 2, limit: ADDRESS_LIMIT });
		assert!(AddressRange::new(0x8000, 0).is_err());
		assert!(AddressRange::new(1, u32::max_value()).is_err());
	}

	#[test]
	fn to_end() {
		let range = AddressRange::to_end(0x7ff0).unwrap();
		assert_eq!(range.len(), 0x10);
		assert_eq!(range.end(), ADDRESS_LIMIT);
		assert!(AddressRange::to_end(0x8000).is_err());
	}

	#[test]
	fn skip_and_iterate() {
		let range = AddressRange::new(0x10, 5).unwrap();
		assert_eq!(range.addresses().collect::<Vec<_>>(), vec![0x10, 0x11, 0x12, 0x13, 0x14]);

		let tail = range.skip(3);
		assert_eq!(tail.start(), 0x13);
		assert_eq!(tail.addresses().collect::<Vec<_>>(), vec![0x13, 0x14]);
		assert!(range.skip(7).is_empty());

		let last = AddressRange::new(0x7ffe, 2).unwrap();
		assert_eq!(last.addresses().last(), Some(0x7fff));
		assert!(last.skip(2).addresses().next().is_none());
	}
}
