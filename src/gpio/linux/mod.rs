use std::path::Path;

mod mapped;

use super::{
	Bcm2835,
	Gpio,
};

pub const DEFAULT_GPIOMEM_PATH: &str = "/dev/gpiomem";

// /dev/gpiomem exposes exactly one page: the GPIO register block
const GPIO_BLOCK_SIZE: usize = 0x1000;

pub fn open_gpiomem(path: &Path) -> crate::AResult<impl Gpio> {
	with_context!(("couldn't map GPIO registers from {}", path.display()), {
		let registers = mapped::inner_open(path, GPIO_BLOCK_SIZE)?;
		Ok(Bcm2835::new(registers))
	})
}
