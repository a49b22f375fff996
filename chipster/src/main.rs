// `error_chain!` can recurse deeply
#![recursion_limit = "1024"]

extern crate clap;
#[macro_use]
extern crate error_chain;
extern crate chip8;
extern crate env_logger;
#[macro_use]
extern crate log;

mod beep;
mod looper;
mod render;

use std::path::Path;
use std::io::{self, Write};
use std::fs::File;

use chip8::{Chip8, Instruction, InstructionWord};
use looper::Step;
use render::RenderBuf;

error_chain! {
    foreign_links {
        Chip8(chip8::Error);
        Io(io::Error);
    }
}

/// Timers count down at 60Hz on real hardware; one frame of the looper.
const FRAMES_PER_SECOND: u32 = 60;

struct CommandArgs {
    rom_file_name: String,
    cycles_per_second: u32, // default: 500
    pixel_decay_time: f32,
    max_cycles: Option<u64>,
    seed: Option<u64>,
    disassemble: bool,
}

impl CommandArgs {
    fn parse() -> CommandArgs {
        use clap::{Arg, App};

        let matches = App::new("chipster")
            .about("Headless CHIP-8 interpreter that renders to the terminal")
            .arg(
                Arg::with_name("ROM_FILE")
                    .help("rom file to load")
                    .required(true),
            )
            .arg(
                Arg::with_name("cycles per second")
                    .short("c")
                    .long("cycles-per-sec")
                    .value_name("cycles_per_second")
                    .help(
                        "How many Chip8 cycles should be executed per second. Values between \
                       500-1000 should be fine.",
                    )
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("pixel decay time")
                    .short("d")
                    .long("pixel-decay-time")
                    .value_name("pixel_decay_time")
                    .help("How many seconds takes for pixel from lit to non-lit")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("max cycles")
                    .short("n")
                    .long("max-cycles")
                    .value_name("max_cycles")
                    .help("Stop after executing this many cycles")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("seed")
                    .short("s")
                    .long("seed")
                    .value_name("seed")
                    .help("Seed for the random number generator, for reproducible runs")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("disassemble")
                    .long("disassemble")
                    .help("Print the rom as instructions and exit"),
            )
            .get_matches();

        let cycles_per_second = matches
            .value_of("cycles per second")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(500);

        let pixel_decay_time = matches
            .value_of("pixel decay time")
            .and_then(|s| s.parse::<f32>().ok())
            .unwrap_or(0.3);

        let max_cycles = matches
            .value_of("max cycles")
            .and_then(|s| s.parse::<u64>().ok());

        let seed = matches
            .value_of("seed")
            .and_then(|s| s.parse::<u64>().ok());

        CommandArgs {
            rom_file_name: matches.value_of("ROM_FILE").unwrap_or_default().to_string(),
            cycles_per_second,
            pixel_decay_time,
            max_cycles,
            seed,
            disassemble: matches.is_present("disassemble"),
        }
    }
}

fn read_rom<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    use std::io::Read;

    let mut rom_file = File::open(path)?;
    let mut rom_buffer = Vec::new();
    rom_file.read_to_end(&mut rom_buffer)?;
    Ok(rom_buffer)
}

fn main() {
    use std::process::exit;

    env_logger::init();

    match do_run() {
        Ok(_) => exit(0),
        Err(e) => {
            // stdout belongs to the frame buffer.
            let _ = report_error(&e, &mut io::stderr());
            exit(1);
        }
    }
}

/// Writes the error followed by each of its causes.
fn report_error<W: Write>(e: &Error, out: &mut W) -> io::Result<()> {
    writeln!(out, "Error: {}", e)?;
    for cause in e.iter().skip(1) {
        writeln!(out, "caused by: {}", cause)?;
    }
    Ok(())
}

fn do_run() -> Result<()> {
    let args = CommandArgs::parse();
    let rom_data = read_rom(&args.rom_file_name)?;

    if args.disassemble {
        return disassemble(&rom_data, &mut io::stdout());
    }

    let app = App::new(&args, &rom_data)?;
    app.run()
}

/// Writes one line per instruction word, starting at the load address.
fn disassemble<W: Write>(rom_data: &[u8], out: &mut W) -> Result<()> {
    for (index, pair) in rom_data.chunks(2).enumerate() {
        let addr = chip8::memory::PROGRAM_START as usize + index * 2;
        let word = match *pair {
            [hi, lo] => (hi as u16) << 8 | lo as u16,
            [hi] => (hi as u16) << 8,
            _ => continue,
        };
        let instruction = Instruction::decode(InstructionWord(word));
        writeln!(out, "{:03x}: {:04x}  {}", addr, word, instruction)?;
    }
    Ok(())
}

struct App<'a> {
    command_args: &'a CommandArgs,
    render_buf: RenderBuf,
    vm: Chip8,
}

impl<'a> App<'a> {
    fn new(command_args: &'a CommandArgs, rom_data: &[u8]) -> Result<App<'a>> {
        let render_buf = RenderBuf::new(command_args.pixel_decay_time);

        let mut vm = match command_args.seed {
            Some(seed) => Chip8::with_seed(seed),
            None => Chip8::new(),
        };
        vm.load_program(rom_data)?;
        info!("loaded {} ({} bytes)", command_args.rom_file_name, rom_data.len());

        Ok(App {
            command_args,
            render_buf,
            vm,
        })
    }

    fn run(mut self) -> Result<()> {
        let mut beeper = beep::Beeper::new(io::stdout());

        let cycles_per_frame = (self.command_args.cycles_per_second / FRAMES_PER_SECOND).max(1);
        let frame_dt = 1.0 / FRAMES_PER_SECOND as f32;

        // Clear the terminal once, later frames only move the cursor home.
        print!("\x1b[2J");

        looper::start_loop(|| {
            let mut redraw = false;
            let mut tone = false;

            for _ in 0..cycles_per_frame {
                if let Some(max_cycles) = self.command_args.max_cycles {
                    if self.vm.cycles() >= max_cycles {
                        info!("stopping after {} cycles", max_cycles);
                        return Ok(Step::Done);
                    }
                }

                self.vm.cycle()?;
                redraw |= self.vm.redraw();
                tone |= self.vm.tone();
            }

            let fading = self.render_buf.is_fading();
            self.render_buf.update(self.vm.display(), frame_dt);
            if redraw || fading {
                print!("\x1b[H{}", self.render_buf.to_text());
                io::stdout().flush()?;
            }
            beeper.set_beeping(tone)?;

            Ok(Step::Cont)
        })?;

        if self.vm.unknown_opcodes() > 0 {
            warn!("{} unknown opcodes were skipped", self.vm.unknown_opcodes());
        }
        debug!("{:?}", self.vm);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disassembles_from_load_address() {
        let mut out = Vec::new();
        disassemble(&[0x00, 0xE0, 0x12, 0x00, 0xFF], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec!["200: 00e0  CLS", "202: 1200  JP 0x200", "204: ff00  DW 0xff00"]);
    }

    #[test]
    fn reports_error_with_causes() {
        let err = Error::with_chain(
            chip8::Error::from(chip8::ErrorKind::StackUnderflow),
            "rom halted",
        );
        let mut out = Vec::new();
        report_error(&err, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Error: rom halted");
        assert!(lines[1].starts_with("caused by: "));
    }
}
