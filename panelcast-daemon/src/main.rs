//! Panelcast daemon
//!
//! Mirrors `/dev/fb0` onto an ST7789 panel over spidev until SIGINT or
//! SIGTERM. A second signal while shutting down exits immediately.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info, warn};
use panelcast_core::{Display, FrameLoop, ST7789_320X170};
use panelcast_hal_linux::{LinuxBoard, StdClock, StdDelay};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

#[derive(Parser, Debug)]
#[command(name = "panelcast")]
#[command(version)]
#[command(about = "Mirror a Linux framebuffer onto an ST7789 SPI panel")]
struct Cli {
    /// Cycle red, green and blue before mirroring
    #[arg(short, long)]
    test: bool,

    /// Only log warnings and errors, no FPS reports
    #[arg(short, long)]
    quiet: bool,

    /// Configuration file [default: /etc/panelcast.toml if present]
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = config::load(cli.config.as_deref()).context("loading configuration")?;
    let geometry = ST7789_320X170;

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        flag::register_conditional_shutdown(signal, 1, Arc::clone(&shutdown))
            .context("registering signal handler")?;
        flag::register(signal, Arc::clone(&shutdown)).context("registering signal handler")?;
    }

    let mut board = LinuxBoard::new(config.board_config(&geometry));
    let mut delay = StdDelay;
    let mut display: Display<LinuxBoard> = Display::new(geometry)
        .with_init_sequence(config.init_sequence())
        .with_spi_config(config.spi_config())
        .with_max_transfer(config.spi.max_transfer);

    if let Err(e) = display.bring_up(&mut board, &mut delay) {
        display.shutdown();
        return Err(anyhow!("display bring-up failed: {}", e));
    }
    if let Err(e) = display.attach_source(&mut board) {
        display.shutdown();
        return Err(anyhow!("framebuffer unavailable: {}", e));
    }

    if let Err(e) = display.clear(&mut delay) {
        warn!("Failed to clear display: {}", e);
    }
    if cli.test {
        if let Err(e) = display.self_test(&mut delay) {
            warn!("Color self-test failed: {}", e);
        }
    }

    info!("Mirroring framebuffer, Ctrl+C to stop");
    let fps_interval = (!cli.quiet).then_some(config.diagnostics.fps_interval);
    let summary = FrameLoop::new(&shutdown, StdClock::new())
        .with_fps_interval(fps_interval)
        .run(&mut display);

    if summary.failures > 0 {
        warn!("{} of {} frames failed", summary.failures, summary.frames);
    }
    info!("Shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["panelcast", "-t", "-q", "-c", "/tmp/panel.toml"]);
        assert!(cli.test);
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/panel.toml")));

        let cli = Cli::parse_from(["panelcast"]);
        assert!(!cli.test);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
    }
}
