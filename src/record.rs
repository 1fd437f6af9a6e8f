use std::num::ParseIntError;

use thiserror::Error;

/// Marker that starts every offset record. Lines without it are chatter.
pub const RECORD_MARKER: char = '#';

const FIELD_SEPARATOR: char = '\t';

/// One `#<seq>\t<sec>\t<nanosec>` line reported by the board.
///
/// Only `nanos` is interpreted, the other two fields are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRecord {
    pub seq: String,
    pub sec: String,
    pub nanos: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected 3 tab-separated fields, found {0}")]
    FieldCount(usize),

    #[error("nanosecond field {field:?} is not an integer: {source}")]
    Nanoseconds {
        field: String,
        #[source]
        source: ParseIntError,
    },
}

/// Parses one line read from the device.
///
/// Returns `Ok(None)` for lines that are not records.
pub fn parse_line(line: &str) -> Result<Option<LineRecord>, RecordError> {
    let Some(body) = line.strip_prefix(RECORD_MARKER) else {
        return Ok(None);
    };

    let fields: Vec<&str> = body.split(FIELD_SEPARATOR).collect();
    let [seq, sec, nanos] = fields[..] else {
        return Err(RecordError::FieldCount(fields.len()));
    };

    let nanos = nanos.trim();
    let value = nanos.parse::<i64>().map_err(|e| RecordError::Nanoseconds {
        field: nanos.to_string(),
        source: e,
    })?;

    Ok(Some(LineRecord {
        seq: seq.to_string(),
        sec: sec.to_string(),
        nanos: value,
    }))
}
