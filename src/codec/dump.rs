use std::io;

use crate::bus::Address;

use super::ByteSink;

const ROW: u32 = 16;

/// Human readable dump: 16 bytes per row, each row labelled with its address.
///
/// ```text
/// 00010:                 FF FF FF ...
/// ```
///
/// A start address in the middle of a row leaves blank columns before it.
pub struct HexDump<W: io::Write> {
	output: W,
	open_row: bool,
}

impl<W: io::Write> HexDump<W> {
	pub fn new(output: W) -> Self {
		HexDump {
			output,
			open_row: false,
		}
	}

	pub fn into_inner(self) -> W {
		self.output
	}
}

impl<W: io::Write> ByteSink for HexDump<W> {
	fn start(&mut self, start: Address) -> crate::AResult<()> {
		let column = start as u32 % ROW;
		if 0 != column {
			write!(self.output, "{:05X}:  ", start as u32 - column)?;
			for _ in 0..column {
				self.output.write_all(b"   ")?;
			}
			self.open_row = true;
		}
		Ok(())
	}

	fn put(&mut self, address: Address, value: u8) -> crate::AResult<()> {
		if 0 == address as u32 % ROW {
			write!(self.output, "{:05X}:  ", address)?;
		}
		write!(self.output, "{:02X} ", value)?;
		self.open_row = true;
		if ROW - 1 == address as u32 % ROW {
			self.output.write_all(b"\n")?;
			self.open_row = false;
		}
		Ok(())
	}

	fn finish(&mut self, _end: u32) -> crate::AResult<()> {
		if self.open_row {
			self.output.write_all(b"\n")?;
			self.open_row = false;
		}
		self.output.flush()?;
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn dump(start: Address, data: &[u8]) -> String {
		let mut sink = HexDump::new(Vec::<u8>::new());
		sink.start(start).unwrap();
		for (offset, &value) in data.iter().enumerate() {
			sink.put(start + offset as Address, value).unwrap();
		}
		sink.finish(start as u32 + data.len() as u32).unwrap();
		String::from_utf8(sink.into_inner()).unwrap()
	}

	#[test]
	fn aligned_rows() {
		let data: Vec<u8> = (0..20).collect();
		assert_eq!(dump(0x7fe0, &data),
			"07FE0:  00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F \n\
			 07FF0:  10 11 12 13 \n"
		);
	}

	#[test]
	fn unaligned_start() {
		assert_eq!(dump(0x12, &[0xaa, 0xbb]), "00010:        AA BB \n");
	}

	#[test]
	fn empty_range() {
		assert_eq!(dump(0x20, &[]), "");
	}
}
