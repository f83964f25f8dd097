//! Output sink traits for the socket report
use crate::error::NetstatError;
use crate::sockets::{Process, SkState};

/// One formatted socket, ready for a sink.
#[derive(Debug, Clone)]
pub struct ReportRow<'a> {
    pub proto: &'a str,
    pub local: String,
    pub remote: String,
    pub state: SkState,
    pub process: Option<&'a Process>,
}

/// Destination for report rows.
pub trait ReportSink {
    /// Written once, before any row.
    fn write_header(&mut self) -> Result<(), NetstatError>;

    /// Returns whether the row was emitted; sinks may skip rows they cannot represent.
    fn write_row(&mut self, row: &ReportRow) -> Result<bool, NetstatError>;

    fn finish(&mut self) -> Result<(), NetstatError>;
}
