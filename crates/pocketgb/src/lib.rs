use std::path::PathBuf;

use anyhow::{Context, Result};
use pocketgb_core::{FrameOutcome, GameBoy, LogTracer, CYCLES_PER_FRAME};
use typed_builder::TypedBuilder;

/// Frames emulated when the caller does not ask for a specific count.
pub const DEFAULT_FRAMES: u32 = 60;

/// Options for a headless run.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RunConfig {
    #[builder(setter(into))]
    pub rom_path: PathBuf,
    /// Number of video frames to emulate before returning.
    #[builder(default = DEFAULT_FRAMES)]
    pub frames: u32,
    /// Install a [`LogTracer`]; its output only shows at `trace` log level.
    #[builder(default = false)]
    pub trace: bool,
    /// End the run as soon as the CPU halts. Without interrupts a halted CPU
    /// never resumes, so the remaining frames would only burn idle cycles.
    #[builder(default = true)]
    pub stop_on_halt: bool,
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames that were started, including one cut short by STOP or HALT.
    pub frames: u32,
    pub cycles: u64,
    pub serial: Vec<u8>,
    pub stopped: bool,
    pub halted: bool,
}

pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let rom = std::fs::read(&config.rom_path)
        .with_context(|| format!("failed to read ROM file '{}'", config.rom_path.display()))?;
    log::info!("Playing ROM path: '{}'", config.rom_path.display());

    let mut gb = GameBoy::new();
    gb.load_rom(&rom)
        .with_context(|| format!("failed to load '{}'", config.rom_path.display()))?;
    gb.set_power_on_defaults();

    if config.trace {
        gb.set_tracer(Box::new(LogTracer));
    }

    let mut frames = 0;
    while frames < config.frames {
        frames += 1;

        let outcome = if gb.is_halted() {
            idle_frame(&mut gb)?
        } else {
            gb.step_frame()?
        };

        match outcome {
            FrameOutcome::Completed => {}
            FrameOutcome::Stopped => {
                log::info!("CPU stopped during frame {frames}");
                break;
            }
            FrameOutcome::Halted if config.stop_on_halt => {
                log::info!("CPU halted during frame {frames}");
                break;
            }
            FrameOutcome::Halted => {}
        }
    }

    let summary = RunSummary {
        frames,
        cycles: gb.clock().total_cycles(),
        serial: gb.take_serial_output(),
        stopped: gb.is_stopped(),
        halted: gb.is_halted(),
    };
    log::info!(
        "Ran {} frame(s), {} cycles, {} serial byte(s)",
        summary.frames,
        summary.cycles,
        summary.serial.len()
    );
    Ok(summary)
}

/// Let a halted CPU idle through one frame so the frame still takes time.
fn idle_frame(gb: &mut GameBoy) -> Result<FrameOutcome> {
    let mut elapsed = 0;
    while elapsed < CYCLES_PER_FRAME {
        elapsed += gb.step()?;
    }
    gb.on_vblank();
    Ok(FrameOutcome::Completed)
}
