//! Fixed-width console table
use std::io::Write;

use crate::error::NetstatError;
use crate::formats::traits::{ReportRow, ReportSink};

pub const PRIVILEGE_WARNING: &str =
    "## Not all processes could be identified, you would have to be root to see it all. ##";

/// Console sink writing aligned columns to any writer (stdout in the binary).
pub struct ConsoleSink<W: Write> {
    out: W,
    privileged: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            privileged: true,
        }
    }

    /// Without privilege a warning precedes the table header.
    pub fn privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn write_header(&mut self) -> Result<(), NetstatError> {
        if !self.privileged {
            write!(self.out, "\n\n{}\n\n", PRIVILEGE_WARNING)?;
        }
        writeln!(
            self.out,
            "Proto {:<23} {:<23} {:<12} {:<16}",
            "Local Addr", "Foreign Addr", "State", "PID/Program name"
        )?;
        Ok(())
    }

    fn write_row(&mut self, row: &ReportRow) -> Result<bool, NetstatError> {
        let program = row.process.map(|p| p.to_string()).unwrap_or_default();
        writeln!(
            self.out,
            "{:<5} {:<23.23} {:<23.23} {:<12} {:<16}",
            row.proto, row.local, row.remote, row.state, program
        )?;
        Ok(true)
    }

    fn finish(&mut self) -> Result<(), NetstatError> {
        self.out.flush()?;
        Ok(())
    }
}
