use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::time::Duration;

use anyhow::{Context, Result};
use serialport::SerialPort;
use tracing::{debug, info};

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

// Bounds a single driver read, and so how long a stop request can wait.
const READ_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

pub fn available_ports() -> Vec<String> {
    let ports = serialport::available_ports().unwrap_or_default();
    ports.into_iter().map(|p| p.port_name).collect()
}

pub fn open(config: &SerialConfig) -> Result<LineReader<Box<dyn SerialPort>>> {
    let builder = serialport::new(&config.port, config.baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .timeout(READ_TIMEOUT);
    debug!("{:?}", &builder);

    let port = builder
        .open()
        .with_context(|| format!("Failed to open \"{}\"", config.port))?;

    info!(port = %config.port, baud = config.baud_rate, "serial port opened");

    Ok(LineReader::new(port))
}

/// Splits a byte stream into `\n`-terminated text lines.
pub struct LineReader<R> {
    inner: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        LineReader {
            inner: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    /// Blocks until a full line is available. The terminator is kept.
    ///
    /// Read timeouts are not errors here: bytes received so far stay
    /// buffered and the read resumes.
    pub fn read_line(&mut self) -> io::Result<String> {
        loop {
            if let Some(line) = self.poll_line()? {
                return Ok(line);
            }
        }
    }

    /// Like `read_line`, but returns `Ok(None)` when the driver read times
    /// out. A partial line stays buffered for the next call.
    pub fn poll_line(&mut self) -> io::Result<Option<String>> {
        match self.inner.read_until(b'\n', &mut self.pending) {
            Ok(0) if self.pending.is_empty() => Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                "serial stream closed",
            )),
            // Unterminated only when the stream ended mid-line.
            Ok(_) => {
                let line = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                Ok(Some(line))
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.read_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Replays scripted reads, the way a serial driver hands out chunks.
    struct Scripted(VecDeque<io::Result<Vec<u8>>>);

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Ok(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    #[test]
    fn read_lines() {
        let mut reader = LineReader::new(Cursor::new(b"#1\t0\t5\njunk\n".to_vec()));

        assert_eq!(reader.read_line().unwrap(), "#1\t0\t5\n");
        assert_eq!(reader.read_line().unwrap(), "junk\n");
        assert_eq!(
            reader.read_line().unwrap_err().kind(),
            ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn resume_after_timeout() {
        let script = VecDeque::from([
            Ok(b"#3\t10".to_vec()),
            Err(io::Error::new(ErrorKind::TimedOut, "idle")),
            Err(io::Error::new(ErrorKind::TimedOut, "idle")),
            Ok(b"\t-7\n".to_vec()),
        ]);
        let mut reader = LineReader::new(Scripted(script));

        assert_eq!(reader.read_line().unwrap(), "#3\t10\t-7\n");
    }

    #[test]
    fn poll_keeps_partial_line() {
        let script = VecDeque::from([
            Ok(b"#4\t11".to_vec()),
            Err(io::Error::new(ErrorKind::TimedOut, "idle")),
            Ok(b"\t9\n".to_vec()),
        ]);
        let mut reader = LineReader::new(Scripted(script));

        assert_eq!(reader.poll_line().unwrap(), None);
        assert_eq!(reader.poll_line().unwrap().as_deref(), Some("#4\t11\t9\n"));
    }

    #[test]
    fn propagate_io_fault() {
        let script = VecDeque::from([Err(io::Error::new(
            ErrorKind::BrokenPipe,
            "device unplugged",
        ))]);
        let mut reader = LineReader::new(Scripted(script));

        assert_eq!(reader.read_line().unwrap_err().kind(), ErrorKind::BrokenPipe);
    }

    #[test]
    fn iterate_lines() {
        let reader = LineReader::new(Cursor::new(b"a\nb\n".to_vec()));
        let lines: Vec<String> = reader.take(2).map(|l| l.unwrap()).collect();

        assert_eq!(lines, vec!["a\n", "b\n"]);
    }

    #[test]
    fn default_config() {
        let config = SerialConfig::default();
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 115_200);
    }
}
