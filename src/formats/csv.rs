//! CSV sink: one record per socket with a known owning process
use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::error::NetstatError;
use crate::formats::traits::{ReportRow, ReportSink};

pub const CSV_HEADER: [&str; 7] = [
    "Protocol",
    "Loc Addr",
    "Foreign Addr",
    "State",
    "PID",
    "Exe",
    "Cmd",
];

#[derive(Serialize)]
struct CsvRecord<'a> {
    protocol: &'a str,
    local: &'a str,
    remote: &'a str,
    state: &'static str,
    pid: i32,
    exe: &'a str,
    cmd: &'a str,
}

pub struct CsvSink<W: Write> {
    wtr: Writer<W>,
}

impl CsvSink<File> {
    /// Create (or truncate) the CSV destination. The file is closed when the sink drops.
    pub fn create(path: &Path) -> Result<Self, NetstatError> {
        let file = File::create(path).map_err(|source| NetstatError::SinkOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(out: W) -> Self {
        // Header is written explicitly so it appears even with zero records.
        let wtr = WriterBuilder::new().has_headers(false).from_writer(out);
        Self { wtr }
    }

    pub fn into_inner(self) -> Result<W, NetstatError> {
        self.wtr
            .into_inner()
            .map_err(|e| NetstatError::IoError(e.into_error()))
    }
}

impl<W: Write> ReportSink for CsvSink<W> {
    fn write_header(&mut self) -> Result<(), NetstatError> {
        self.wtr.write_record(CSV_HEADER)?;
        Ok(())
    }

    fn write_row(&mut self, row: &ReportRow) -> Result<bool, NetstatError> {
        let Some(process) = row.process else {
            return Ok(false);
        };
        self.wtr.serialize(CsvRecord {
            protocol: row.proto,
            local: &row.local,
            remote: &row.remote,
            state: row.state.as_str(),
            pid: process.pid,
            exe: &process.exe,
            cmd: &process.cmd,
        })?;
        Ok(true)
    }

    fn finish(&mut self) -> Result<(), NetstatError> {
        self.wtr.flush()?;
        Ok(())
    }
}
