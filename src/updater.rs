use tracing::{trace, warn};

use crate::record::{RecordError, parse_line};
use crate::samples::SampleBuffer;

#[derive(Debug, PartialEq, Eq)]
pub enum Update {
    Appended(i64),
    Ignored,
    Malformed(RecordError),
}

/// State carried from one tick to the next: the samples and a few counters
/// for the status bar.
#[derive(Debug, Default)]
pub struct PlotUpdater {
    samples: SampleBuffer,
    ignored: u64,
    malformed: u64,
}

impl PlotUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_line(&mut self, line: &str) -> Update {
        match parse_line(line) {
            Ok(Some(record)) => {
                trace!(seq = %record.seq, sec = %record.sec, nanos = record.nanos, "record");
                self.samples.push(record.nanos);
                Update::Appended(record.nanos)
            }
            Ok(None) => {
                self.ignored += 1;
                Update::Ignored
            }
            Err(e) => {
                warn!("Skipping malformed record {:?}: {e}", line.trim_end());
                self.malformed += 1;
                Update::Malformed(e)
            }
        }
    }

    pub fn samples(&self) -> &SampleBuffer {
        &self.samples
    }

    pub fn ignored(&self) -> u64 {
        self.ignored
    }

    pub fn malformed(&self) -> u64 {
        self.malformed
    }
}
