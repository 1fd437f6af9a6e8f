use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ptp_offset_plot::{
    acquisition::Acquisition,
    app::{PlotApp, WINDOW_TITLE, plot_visuals},
    serial::{DEFAULT_BAUD_RATE, DEFAULT_PORT, SerialConfig, available_ports},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Live plot of PTP offsets read from a serial port")]
struct Args {
    /// Serial device to read from
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Delay between redraws in milliseconds, 0 redraws as fast as possible
    #[arg(long, default_value_t = 0)]
    tick_ms: u64,

    /// Print the available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.list_ports {
        for port in available_ports() {
            println!("{port}");
        }
        return Ok(());
    }

    let config = SerialConfig {
        port: args.port,
        baud_rate: args.baud,
    };
    let acquisition = Acquisition::start(&config)?;
    let app = PlotApp::new(acquisition, Duration::from_millis(args.tick_ms));

    info!("Starting UI");
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(plot_visuals());
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("UI failed: {e}"))
}
