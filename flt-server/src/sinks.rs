//! Output sink implementations
//!
//! Sinks persist one [`LogRecord`] per telemetry sample. The CSV sink writes
//! the header once when opened and flushes after every row, so a clean
//! shutdown never loses rows.

use flt_core::record::{LogRecord, LOG_HEADER};
use flt_core::WriteError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Trait for record sinks
pub trait RecordSink: Send {
    fn append(&mut self, record: &LogRecord) -> Result<(), WriteError>;

    fn flush(&mut self) -> Result<(), WriteError>;
}

/// CSV sink with the fixed telemetry column schema
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Wrap `inner` and write the header row
    pub fn new(inner: W) -> Result<Self, WriteError> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(LOG_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W, WriteError> {
        self.writer
            .into_inner()
            .map_err(|e| WriteError::Io(e.into_error()))
    }
}

impl<W: Write + Send> RecordSink for CsvSink<W> {
    fn append(&mut self, record: &LogRecord) -> Result<(), WriteError> {
        self.writer.write_record(record.to_row())?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), WriteError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Create the CSV log at `path`, replacing any previous file
pub fn create_sink(path: &Path) -> Result<CsvSink<File>, WriteError> {
    let file = File::create(path)?;
    CsvSink::new(file)
}
