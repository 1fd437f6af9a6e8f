use std::io::{ErrorKind, Read};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;

use anyhow::Result;
use bus::{Bus, BusReader};
use chrono::{DateTime, Local};
use tracing::{error, info};

use crate::serial::{self, LineReader, SerialConfig};

// Lines the UI may fall behind before the worker blocks.
const BUS_CAPACITY: usize = 4096;

#[derive(Clone, Debug)]
pub struct LineMsg {
    pub received: DateTime<Local>,
    pub text: String,
}

#[derive(Clone, Debug)]
pub enum AppMsg {
    Status(String),
    Line(LineMsg),
}

/// Reads lines on a worker thread and hands them to the UI over a bus.
pub struct Acquisition {
    source: String,
    stop: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    rx: BusReader<AppMsg>,
}

impl Acquisition {
    /// Opens the port on the calling thread so a missing device fails fast,
    /// then moves the blocking reads to a worker.
    pub fn start(config: &SerialConfig) -> Result<Self> {
        let reader = serial::open(config)?;
        Ok(Self::from_reader(&config.port, reader))
    }

    /// Runs the worker over any byte source, e.g. a replayed capture.
    pub fn from_reader<R>(source: &str, reader: LineReader<R>) -> Self
    where
        R: Read + Send + 'static,
    {
        let mut bus = Bus::new(BUS_CAPACITY);
        let rx = bus.add_rx();
        let stop = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));

        let worker_stop = stop.clone();
        let worker_finished = finished.clone();
        let name = source.to_string();
        thread::spawn(move || {
            read_loop(&name, reader, &mut bus, &worker_stop);
            worker_finished.store(true, Ordering::SeqCst);
        });

        Acquisition {
            source: source.to_string(),
            stop,
            finished,
            rx,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True until the worker thread has left its read loop.
    pub fn is_running(&self) -> bool {
        !self.finished.load(Ordering::SeqCst)
    }

    /// The worker notices after its current read returns or times out.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn try_recv(&mut self) -> Option<AppMsg> {
        self.rx.try_recv().ok()
    }
}

fn read_loop<R: Read>(
    source: &str,
    mut reader: LineReader<R>,
    bus: &mut Bus<AppMsg>,
    stop: &AtomicBool,
) {
    info!(%source, "acquisition started");
    bus.broadcast(AppMsg::Status(format!("Reading {source}")));

    while !stop.load(Ordering::SeqCst) {
        match reader.poll_line() {
            Ok(None) => {}
            Ok(Some(text)) => bus.broadcast(AppMsg::Line(LineMsg {
                received: Local::now(),
                text,
            })),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                info!(%source, "end of stream");
                bus.broadcast(AppMsg::Status(format!("{source} closed")));
                return;
            }
            Err(e) => {
                error!(%source, "Failed to read line: {e}");
                bus.broadcast(AppMsg::Status(format!("Read error on {source}: {e}")));
                return;
            }
        }
    }

    info!(%source, "acquisition stopped");
    bus.broadcast(AppMsg::Status(format!("Stopped reading {source}")));
}
