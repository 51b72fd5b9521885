#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate eeprog28;
use eeprog28::*;

use std::fs;
use std::io::{
	self,
	BufRead,
};
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

use eeprog28::codec::{
	ByteSink,
	Format,
	HexDump,
};
use eeprog28::gpio::{
	DEFAULT_GPIOMEM_PATH,
	Gpio,
	SimulatedChip,
	open_gpiomem,
};

const EXIT_VERIFY_MISMATCH: i32 = 2;
const EXIT_NOT_BLANK: i32 = 3;

// a 28C256 byte write takes at most 10ms; leave some room
const POLLING_TIMEOUT: Duration = Duration::from_millis(20);

fn get_hex_param(matches: &clap::ArgMatches, name: &str) -> AResult<Option<u32>> {
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(None),
	};
	let digits = param.trim_start_matches("0x").trim_start_matches("0X");
	u32::from_str_radix(digits, 16).map(Some).map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {} (expected hex): {}", name, e);
		e.context(msg).into()
	})
}

struct Params {
	start: u32,
	length: u32,
	blank: u8,
	file: Option<PathBuf>,
	format: Format,
}

impl Params {
	fn from_matches(matches: &clap::ArgMatches) -> AResult<Self> {
		let blank = get_hex_param(matches, "blank")?.unwrap_or(0xFF);
		ensure!(blank <= 0xFF, "blank value 0x{:X} doesn't fit into a byte", blank);
		let format = match matches.value_of("format") {
			Some(f) => f.parse()?,
			None => Format::default(),
		};
		Ok(Params {
			start: get_hex_param(matches, "start")?.unwrap_or(0),
			length: get_hex_param(matches, "LENGTH")?.unwrap_or(0),
			blank: blank as u8,
			file: matches.value_of_os("file").map(PathBuf::from),
			format,
		})
	}

	fn range(&self) -> AResult<AddressRange> {
		Ok(AddressRange::new(self.start, self.length)?)
	}

	fn open_input<'a>(&self, stdin: &'a io::Stdin) -> AResult<Box<dyn BufRead + 'a>> {
		Ok(match self.file {
			None => Box::new(stdin.lock()),
			Some(ref path) => {
				let f = fs::File::open(path).map_err(|e| {
					format_err!("couldn't open datafile {}: {}", path.display(), e)
				})?;
				Box::new(io::BufReader::new(f))
			},
		})
	}
}

fn run_command<G: Gpio>(engine: &mut CycleEngine<G>, command: &str, params: &Params, sub_m: &clap::ArgMatches) -> AResult<i32> {
	match command {
		"test" => {
			let range = params.range()?;
			info!("Testing {} for blank value 0x{:02X}...", range, params.blank);
			let count = engine.test(range, params.blank);
			if 0 != count {
				println!("ROM is not empty, found {} data bytes", count);
				return Ok(EXIT_NOT_BLANK);
			}
			println!("ROM is empty");
		},
		"dump" => {
			let range = params.range()?;
			info!("Dumping {}...", range);
			let stdout = io::stdout();
			let mut sink: Box<dyn ByteSink + '_> = match params.file {
				None => Box::new(HexDump::new(stdout.lock())),
				Some(ref path) => {
					let f = fs::File::create(path).map_err(|e| {
						format_err!("couldn't create datafile {}: {}", path.display(), e)
					})?;
					params.format.writer(io::BufWriter::new(f))
				},
			};
			engine.dump(range, &mut sink)?;
			info!("ROM dumped.");
		},
		"erase" => {
			let range = params.range()?;
			info!("Erasing {} with 0x{:02X}...", range, params.blank);
			engine.erase(range, params.blank);
			info!("ROM erased.");
		},
		"write" => {
			let range = params.range()?;
			let stdin = io::stdin();
			let mut source = params.format.reader(params.open_input(&stdin)?);
			info!("Writing ROM from 0x{:X}...", range.start());
			let written = engine.write(range, &mut source, params.blank)?;
			info!("0x{:X} locations of ROM written.", written);
		},
		"verify" => {
			let range = params.range()?;
			let stdin = io::stdin();
			let mut source = params.format.reader(params.open_input(&stdin)?);
			info!("Verifying ROM from 0x{:X}...", range.start());
			match engine.verify(range, &mut source)? {
				VerifyResult::Match { verified } => {
					info!("verify done, 0x{:X} locations match.", verified);
				},
				VerifyResult::Mismatch { address, expected, actual } => {
					println!("verify error, found 0x{:02X} (expected 0x{:02X}) at location 0x{:X}.", actual, expected, address);
					return Ok(EXIT_VERIFY_MISMATCH);
				},
			}
		},
		"protect" => {
			let enabled = match sub_m.value_of("MODE") {
				Some("1") | Some("on") | Some("enable") => true,
				Some("0") | Some("off") | Some("disable") => false,
				mode => bail!("invalid protection mode {:?} (expected on or off)", mode),
			};
			engine.set_protection(enabled);
			info!("ROM Software Data Protection {}.", if enabled { "Enabled" } else { "Disabled" });
		},
		cmd => bail!("not implemented subcommand {:?}", cmd),
	}
	Ok(0)
}

fn with_engine<G: Gpio>(gpio: G, completion: WriteCompletion, command: &str, sub_m: &clap::ArgMatches) -> AResult<i32> {
	let params = Params::from_matches(sub_m)?;
	if sub_m.is_present("params") {
		println!(
			"start-address={:05X}, data-length={:05X}, zero-byte={:02X}, data-file={:?}, format={:?}",
			params.start, params.length, params.blank, params.file, params.format,
		);
	}

	let bus = PinBus::new(BusLineMap::default(), gpio);
	let mut engine = CycleEngine::new(bus, Timing::default(), completion);
	run_command(&mut engine, command, &params, sub_m)
}

fn main_app() -> AResult<i32> {
	let matches = clap_app!(@app (app_from_crate!())
		(about: "EEPROM 28C programmer utility")
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg simulate: --simulate +global "use a simulated (erased) chip instead of the GPIO pins")
		(@arg polling: --polling +global "detect write completion by polling D7 instead of waiting 10ms")
		(@arg gpiomem: --gpiomem +takes_value +global "GPIO register device (default /dev/gpiomem)")
		(@arg params: -p --params +global "show the value of input params")
		(@subcommand test =>
			(about: "test if rom is filled with BLANK data values")
			(@arg LENGTH: +required "number of locations (hex)")
			(@arg start: -s --start +takes_value "start address (hex), default 0")
			(@arg blank: -z --blank +takes_value "blank value (hex), default FF")
		)
		(@subcommand dump =>
			(about: "dump LENGTH bytes of rom, starting from START address, into DATAFILE (default: stdout)")
			(@arg LENGTH: +required "number of locations (hex)")
			(@arg start: -s --start +takes_value "start address (hex), default 0")
			(@arg file: -f --file +takes_value "datafile to dump into")
			(@arg format: --format +takes_value "datafile format: hex (default) or binary")
		)
		(@subcommand erase =>
			(about: "erase LENGTH bytes (filled with BLANK values) of rom, starting from START address")
			(@arg LENGTH: +required "number of locations (hex)")
			(@arg start: -s --start +takes_value "start address (hex), default 0")
			(@arg blank: -z --blank +takes_value "blank value (hex), default FF")
		)
		(@subcommand write =>
			(about: "write rom from START address with the contents of DATAFILE (default: stdin); \
				a LENGTH greater than the DATAFILE gets filled with BLANK values")
			(@arg LENGTH: "number of locations (hex), default: DATAFILE length")
			(@arg start: -s --start +takes_value "start address (hex), default 0")
			(@arg blank: -z --blank +takes_value "blank value (hex), default FF")
			(@arg file: -f --file +takes_value "datafile to write")
			(@arg format: --format +takes_value "datafile format: hex (default) or binary")
		)
		(@subcommand verify =>
			(about: "verify rom from START address with the contents of DATAFILE (default: stdin)")
			(@arg LENGTH: "number of locations (hex), default: DATAFILE length")
			(@arg start: -s --start +takes_value "start address (hex), default 0")
			(@arg file: -f --file +takes_value "datafile to compare with")
			(@arg format: --format +takes_value "datafile format: hex (default) or binary")
		)
		(@subcommand protect =>
			(about: "enable (on) or disable (off) rom Software Data Protection")
			(@arg MODE: +required "on or off")
		)
	).get_matches();

	let (command, sub_m) = match matches.subcommand() {
		(command, Some(sub_m)) => (command, sub_m),
		_ => bail!("no subcommand"),
	};

	let completion = if sub_m.is_present("polling") {
		WriteCompletion::DataPolling { timeout: POLLING_TIMEOUT }
	} else {
		WriteCompletion::FixedDelay
	};

	if sub_m.is_present("simulate") {
		warn!("Simulating: no hardware is accessed, the chip starts erased");
		return with_engine(SimulatedChip::new(BusLineMap::default()), completion, command, sub_m);
	}

	let path = sub_m.value_of_os("gpiomem").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_GPIOMEM_PATH));
	let gpio = open_gpiomem(&path)?;
	with_engine(gpio, completion, command, sub_m)
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	match main_app() {
		Ok(code) => exit(code),
		Err(e) => {
			error!("Error: {}", e);
			exit(1);
		},
	}
}
