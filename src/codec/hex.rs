use std::io;

use crate::bus::Address;

use super::{
	ByteSink,
	ByteSource,
};

/// Reads whitespace separated hex tokens of one or two digits.
///
/// Tokens don't need separators: "0A0B" reads as 0x0A, 0x0B. Data ends at EOF
/// or at the first character that isn't a hex digit.
pub struct HexReader<R: io::BufRead> {
	input: R,
	done: bool,
}

impl<R: io::BufRead> HexReader<R> {
	pub fn new(input: R) -> Self {
		HexReader {
			input,
			done: false,
		}
	}

	fn peek(&mut self) -> io::Result<Option<u8>> {
		Ok(self.input.fill_buf()?.first().cloned())
	}
}

impl<R: io::BufRead> ByteSource for HexReader<R> {
	fn next_byte(&mut self) -> crate::AResult<Option<u8>> {
		if self.done {
			return Ok(None);
		}

		while let Some(c) = self.peek()? {
			if !c.is_ascii_whitespace() { break; }
			self.input.consume(1);
		}

		let mut value = 0u8;
		let mut digits = 0;
		while digits < 2 {
			let digit = match self.peek()? {
				Some(c) => match (c as char).to_digit(16) {
					Some(d) => d as u8,
					None => break,
				},
				None => break,
			};
			self.input.consume(1);
			value = (value << 4) | digit;
			digits += 1;
		}

		if 0 == digits {
			if let Some(c) = self.peek()? {
				warn!("hex data ends at unexpected character {:?}", c as char);
			}
			self.done = true;
			return Ok(None);
		}

		Ok(Some(value))
	}
}

/// "XX" per byte, each 16-byte row terminated by "\r\n" (on every platform)
pub struct HexWriter<W: io::Write> {
	output: W,
	open_row: bool,
}

impl<W: io::Write> HexWriter<W> {
	pub fn new(output: W) -> Self {
		HexWriter {
			output,
			open_row: false,
		}
	}

	pub fn into_inner(self) -> W {
		self.output
	}
}

impl<W: io::Write> ByteSink for HexWriter<W> {
	fn put(&mut self, address: Address, value: u8) -> crate::AResult<()> {
		write!(self.output, "{:02X}", value)?;
		self.open_row = true;
		if 15 == address % 16 {
			self.output.write_all(b"\r\n")?;
			self.open_row = false;
		}
		Ok(())
	}

	fn finish(&mut self, _end: u32) -> crate::AResult<()> {
		if self.open_row {
			self.output.write_all(b"\r\n")?;
			self.open_row = false;
		}
		self.output.flush()?;
		Ok(())
	}
}
