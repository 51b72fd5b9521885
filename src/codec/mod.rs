//! Byte streams feeding `write`/`verify` and consuming `dump`.
//!
//! The bus operations only see `ByteSource`/`ByteSink`; how the bytes look in
//! a file or on the terminal is decided here.

use std::io;
use std::str;

use crate::bus::Address;

mod binary;
mod dump;
mod hex;

pub use self::binary::{
	BinaryReader,
	BinaryWriter,
};
pub use self::dump::HexDump;
pub use self::hex::{
	HexReader,
	HexWriter,
};

pub trait ByteSource {
	/// `None` when the source is exhausted
	fn next_byte(&mut self) -> crate::AResult<Option<u8>>;
}

pub trait ByteSink {
	/// called once before the first byte
	fn start(&mut self, _start: Address) -> crate::AResult<()> {
		Ok(())
	}

	fn put(&mut self, address: Address, value: u8) -> crate::AResult<()>;

	/// called once after the last byte; `end` is exclusive
	fn finish(&mut self, _end: u32) -> crate::AResult<()> {
		Ok(())
	}
}

impl<'a> ByteSource for &'a [u8] {
	fn next_byte(&mut self) -> crate::AResult<Option<u8>> {
		match self.split_first() {
			None => Ok(None),
			Some((&first, rest)) => {
				*self = rest;
				Ok(Some(first))
			},
		}
	}
}

impl<'a, S: ?Sized + ByteSource> ByteSource for &'a mut S {
	fn next_byte(&mut self) -> crate::AResult<Option<u8>> {
		S::next_byte(*self)
	}
}

impl<S: ?Sized + ByteSource> ByteSource for Box<S> {
	fn next_byte(&mut self) -> crate::AResult<Option<u8>> {
		S::next_byte(self)
	}
}

impl ByteSink for Vec<u8> {
	fn put(&mut self, _address: Address, value: u8) -> crate::AResult<()> {
		self.push(value);
		Ok(())
	}
}

impl<'a, S: ?Sized + ByteSink> ByteSink for &'a mut S {
	fn start(&mut self, start: Address) -> crate::AResult<()> {
		S::start(*self, start)
	}
	fn put(&mut self, address: Address, value: u8) -> crate::AResult<()> {
		S::put(*self, address, value)
	}
	fn finish(&mut self, end: u32) -> crate::AResult<()> {
		S::finish(*self, end)
	}
}

impl<S: ?Sized + ByteSink> ByteSink for Box<S> {
	fn start(&mut self, start: Address) -> crate::AResult<()> {
		S::start(self, start)
	}
	fn put(&mut self, address: Address, value: u8) -> crate::AResult<()> {
		S::put(self, address, value)
	}
	fn finish(&mut self, end: u32) -> crate::AResult<()> {
		S::finish(self, end)
	}
}

/// Encoding of a datafile
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Format {
	/// two uppercase hex digits per byte, 16 bytes per "\r\n" terminated line
	Hex,
	Binary,
}

impl Default for Format {
	fn default() -> Self {
		Format::Hex
	}
}

impl str::FromStr for Format {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"hex" => Ok(Format::Hex),
			"bin" | "binary" => Ok(Format::Binary),
			_ => bail!("unknown datafile format {:?} (expected hex or binary)", s),
		}
	}
}

impl Format {
	pub fn reader<'a, R: io::BufRead + 'a>(self, input: R) -> Box<dyn ByteSource + 'a> {
		match self {
			Format::Hex => Box::new(HexReader::new(input)),
			Format::Binary => Box::new(BinaryReader::new(input)),
		}
	}

	pub fn writer<'a, W: io::Write + 'a>(self, output: W) -> Box<dyn ByteSink + 'a> {
		match self {
			Format::Hex => Box::new(HexWriter::new(output)),
			Format::Binary => Box::new(BinaryWriter::new(output)),
		}
	}
}
