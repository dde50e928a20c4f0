use crate::error::{LoggingError, Result};
use crate::log_record::LogRecord;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::thread;

/// Append-only log file drained by the writer thread.
pub(crate) struct FileSink {
    file: File,
}

impl FileSink {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    fn write(&mut self, record: &LogRecord) {
        let line = record.render();
        if let Err(e) = self
            .file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
        {
            eprintln!("log write failed: {}", e);
        }
    }

    /// Drains records until every `Logger` clone has been dropped.
    fn drain(mut self, records: Receiver<LogRecord>) {
        for record in records {
            self.write(&record);
        }
    }
}

/// Opens `path` and starts the thread that owns it.
pub(crate) fn spawn_file_sink(path: &Path, records: Receiver<LogRecord>) -> Result<()> {
    let sink = FileSink::open(path)?;
    thread::Builder::new()
        .name("log-writer".to_string())
        .spawn(move || sink.drain(records))
        .map_err(|e| LoggingError::Spawn(e.to_string()))?;
    Ok(())
}
