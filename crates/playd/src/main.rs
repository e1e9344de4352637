//! playd: a headless audio-file player driven by a line-oriented TCP
//! protocol.
//!
//! A controller connects over TCP and issues commands such as `load`,
//! `play`, `stop`, `pos`, `eject` and `quit`; playd streams one audio
//! file at a time to a local sound device and broadcasts position
//! ticks, state transitions and end-of-file notices to every connected
//! client.

use std::process::ExitCode;

use anyhow::Context;

use playd_audio::DeviceSink;
use playd_sources::PipeAudioSystem;

mod args;
mod io;
mod messages;
mod player;
mod position;

use args::CliArgs;
use io::{ChannelSink, IoCore};
use player::Player;

/// Period between position announcements, in microseconds.
const POSITION_PERIOD: u64 = 1_000_000;

fn main() -> ExitCode {
    env_logger::init();

    let args = CliArgs::parse(std::env::args().skip(1));
    if args.show_help {
        CliArgs::print_usage();
        return ExitCode::FAILURE;
    }

    let device_id = match select_device(args.device_id.as_deref()) {
        Some(id) => id,
        None => {
            // No usable device ID: show the user what they can pick.
            print_devices();
            return ExitCode::FAILURE;
        }
    };

    match serve(device_id, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("playd: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Validates the requested device ID against the device list.
fn select_device(requested: Option<&str>) -> Option<usize> {
    let id = requested?.parse::<usize>().ok()?;
    DeviceSink::is_output_device(id).then_some(id)
}

/// Lists the available output devices on stdout.
fn print_devices() {
    match DeviceSink::devices() {
        Ok(devices) => {
            for (id, name) in devices {
                println!("{id}: {name}");
            }
        }
        Err(e) => eprintln!("couldn't list devices: {e}"),
    }
}

/// Wires the player to the network and runs until quit.
fn serve(device_id: usize, args: &CliArgs) -> anyhow::Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    let mut core = IoCore::bind(&args.host, args.port, tx.clone(), rx)
        .with_context(|| format!("couldn't listen on {}:{}", args.host, args.port))?;

    let system = PipeAudioSystem::new(device_id);
    let sink = ChannelSink::new(tx);
    let mut player = Player::new(Box::new(system), Box::new(sink), POSITION_PERIOD);

    core.run(&mut player).context("fatal error in main loop")
}
