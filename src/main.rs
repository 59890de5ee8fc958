use std::fs;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use clap_num::maybe_hex;
use log::{debug, trace};

use rv32sim::hart::{Hart, Status};

/// Run a flat RV32IM binary image until it halts, faults, or exceeds
/// the instruction budget, then dump the final register state
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
struct Args {
    /// Path to the raw little-endian program image, loaded at
    /// address 0
    #[arg(default_value = "tests/count.bin")]
    image: String,

    /// Maximum number of instructions to execute (use 0x prefix for
    /// hexadecimal)
    #[arg(short, long, value_parser = maybe_hex::<u64>, default_value_t = 10_000_000)]
    limit: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    println!("loading {}", args.image);
    let image = match fs::read(&args.image) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Failed to open file {}: {e}", args.image);
            return ExitCode::FAILURE;
        }
    };

    let mut hart = Hart::new();
    let loaded = hart.load_image(&image);
    debug!("loaded {loaded} of {} image bytes", image.len());

    println!("running");

    let time_start = Instant::now();
    let mut instruction_count: u64 = 0;

    while instruction_count < args.limit {
        hart.tick();
        instruction_count += 1;
        trace!("instruction {instruction_count}: pc=0x{:08x}", hart.pc() << 2);

        match hart.status() {
            Status::Running => {}
            Status::Ended => {
                println!("-----");
                println!("program ended");
                break;
            }
            Status::Faulted(fault) => {
                println!("-----");
                println!("program failed: {fault}");
                break;
            }
        }
    }
    if hart.status() == Status::Running {
        println!("-----");
        println!("program timed out");
    }

    let runtime = time_start.elapsed();
    let millis = runtime.as_secs_f64() * 1000.0;
    let megahertz = instruction_count as f64 / runtime.as_secs_f64() / 1e6;
    println!("ran {instruction_count} instructions in {millis:.0} ms");
    println!("execution speed: {megahertz:.0} MHz");

    println!("registers:");
    for n in 1..32 {
        let value = hart.x(n);
        println!("  x{n:<2} = 0x{value:08x} {}", value as i32);
    }

    ExitCode::SUCCESS
}
