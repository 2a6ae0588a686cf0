//! Photon Sim entry point
//!
//! Headless front end for the engine. Stdin lines are JSON control messages
//! (`{"command":"FIRE","params":{"photonsPerBurst":50}}`); frames are either
//! summarised in the log or printed to stdout as JSON lines.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use photon_sim::channel::ControlSender;
use photon_sim::spectrum::band_name;
use photon_sim::{Command, ControlMessage, EngineConfig, Frame, ParamUpdate};

/// Command-line arguments for the headless simulator.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// JSON engine config file.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// RNG seed (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,
    /// Photons per burst.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    burst: Option<u32>,
    /// Energy decay per collision, in [0, 1).
    #[arg(long)]
    decay: Option<f64>,
    /// Time dilation; 1.0 is normal speed.
    #[arg(long)]
    time_scale: Option<f64>,
    /// Fire one burst as soon as the engine starts.
    #[arg(long)]
    fire: bool,
    /// Stop once the engine has run this many ticks (runs until stdin closes otherwise).
    #[arg(long, value_name = "TICKS")]
    ticks: Option<u64>,
    /// Print every received frame to stdout as a JSON line.
    #[arg(long)]
    json: bool,
    /// Run ticks back to back instead of at 60 Hz.
    #[arg(long)]
    no_realtime: bool,
    /// Renderer poll interval in milliseconds.
    #[arg(long, default_value_t = 50, value_name = "MILLISECONDS")]
    poll_ms: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.no_realtime {
        config.realtime = false;
    }

    log::info!("Photon Sim starting...");
    let handle = photon_sim::spawn(config).context("failed to spawn engine thread")?;

    let overrides = ParamUpdate {
        photons_per_burst: args.burst.map(f64::from),
        global_decay: args.decay,
        time_scale: args.time_scale,
    };
    if !overrides.is_empty() {
        handle.send(ControlMessage::params(overrides))?;
    }
    handle.send(Command::Start)?;
    if args.fire {
        handle.send(Command::Fire)?;
    }

    let control = handle.control();
    let reader = thread::Builder::new()
        .name("stdin-control".into())
        .spawn(move || forward_stdin(control))
        .context("failed to spawn stdin reader")?;

    let poll = Duration::from_millis(args.poll_ms);
    let stdout = io::stdout();
    let mut received = 0u64;
    loop {
        // Latest frame wins; anything older is discarded
        if let Some(frame) = handle.frames().latest() {
            received += 1;
            if args.json {
                let mut out = stdout.lock();
                writeln!(out, "{}", frame.to_json()?)?;
            } else if received % 20 == 0 {
                log::info!("{}", summarize(&frame));
            }
            if reached_tick_limit(args.ticks, &frame) {
                break;
            }
        }
        if args.ticks.is_none() && reader.is_finished() {
            break;
        }
        thread::sleep(poll);
    }

    let state = handle
        .join()
        .map_err(|_| anyhow::anyhow!("engine thread panicked"))?;
    log::info!(
        "Done: {} ticks, {} photons, {} collisions, total energy {:.1}",
        state.tick,
        state.particles.len(),
        state.collisions,
        state.total_energy()
    );
    Ok(())
}

/// Whether `frame` shows the engine has run `limit` ticks.
///
/// Frames can be dropped on the way, so this goes by tick index rather than
/// by how many frames arrived.
fn reached_tick_limit(limit: Option<u64>, frame: &Frame) -> bool {
    limit.is_some_and(|limit| frame.tick + 1 >= limit)
}

/// Forward stdin JSON lines to the engine until EOF
fn forward_stdin(control: ControlSender) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match ControlMessage::from_json(line) {
            Ok(msg) => {
                if let Err(e) = control.send(msg) {
                    log::warn!("Control message not delivered: {}", e);
                }
            }
            Err(e) => log::warn!("Ignoring malformed control line: {}", e),
        }
    }
}

/// One-line statistics for a frame
fn summarize(frame: &Frame) -> String {
    let mut bands: Vec<(&str, usize)> = Vec::new();
    for &w in &frame.wavelength {
        let name = band_name(w);
        match bands.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => bands.push((name, 1)),
        }
    }
    let bands = bands
        .iter()
        .map(|(name, count)| format!("{}={}", name, count))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "tick {} | photons {} | energy {:.1} | collisions {} | {}",
        frame.tick, frame.count, frame.total_energy, frame.collisions, bands
    )
}
