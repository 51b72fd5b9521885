use std::io;

use crate::bus::Address;

use super::{
	ByteSink,
	ByteSource,
};

pub struct BinaryReader<R: io::BufRead> {
	input: R,
}

impl<R: io::BufRead> BinaryReader<R> {
	pub fn new(input: R) -> Self {
		BinaryReader { input }
	}
}

impl<R: io::BufRead> ByteSource for BinaryReader<R> {
	fn next_byte(&mut self) -> crate::AResult<Option<u8>> {
		let value = match self.input.fill_buf()?.first() {
			None => return Ok(None),
			Some(&value) => value,
		};
		self.input.consume(1);
		Ok(Some(value))
	}
}

pub struct BinaryWriter<W: io::Write> {
	output: W,
}

impl<W: io::Write> BinaryWriter<W> {
	pub fn new(output: W) -> Self {
		BinaryWriter { output }
	}

	pub fn into_inner(self) -> W {
		self.output
	}
}

impl<W: io::Write> ByteSink for BinaryWriter<W> {
	fn put(&mut self, _address: Address, value: u8) -> crate::AResult<()> {
		self.output.write_all(&[value])?;
		Ok(())
	}

	fn finish(&mut self, _end: u32) -> crate::AResult<()> {
		self.output.flush()?;
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn raw_bytes() {
		let mut reader = BinaryReader::new(&b"\r\n\x00"[..]);
		let mut writer = BinaryWriter::new(Vec::<u8>::new());
		let mut address = 0;
		while let Some(value) = reader.next_byte().unwrap() {
			writer.put(address, value).unwrap();
			address += 1;
		}
		writer.finish(address as u32).unwrap();
		assert_eq!(writer.into_inner(), b"\r\n\x00".to_vec());
	}
}
