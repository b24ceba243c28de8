use std::io::Write;

use pocketgb::{RunConfig, DEFAULT_FRAMES};

const USAGE: &str = "Usage: pocketgb <rom_path> [frames] [--trace]";

fn main() {
    env_logger::init();

    let mut trace = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--trace" => trace = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return;
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(rom_path) = positional.next() else {
        eprintln!("No ROM path provided.\n{USAGE}");
        std::process::exit(2);
    };

    let frames = match positional.next() {
        None => None,
        Some(raw) => match raw.parse::<u32>() {
            Ok(frames) => Some(frames),
            Err(_) => {
                eprintln!("Invalid frame count '{raw}'.\n{USAGE}");
                std::process::exit(2);
            }
        },
    };

    if let Some(extra) = positional.next() {
        eprintln!("Unexpected argument '{extra}'.\n{USAGE}");
        std::process::exit(2);
    }

    let config = RunConfig::builder()
        .rom_path(rom_path)
        .frames(frames.unwrap_or(DEFAULT_FRAMES))
        .trace(trace)
        .build();

    match pocketgb::run(&config) {
        Ok(summary) => {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(&summary.serial);
            let _ = stdout.flush();
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
