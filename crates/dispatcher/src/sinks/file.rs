//! FileSink - appends formatted lines to a file

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{Closable, ContractError, Flushable, Sink};
use tracing::{debug, error};

/// Sink that appends to a file, optionally through a write buffer
pub struct FileSink {
    name: String,
    path: PathBuf,
    buffered: bool,
    writer: Option<Box<dyn Write + Send>>,
}

impl FileSink {
    /// Open (or create) `path` for appending
    ///
    /// Missing parent directories are created.
    pub fn open(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        buffered: bool,
    ) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let writer: Box<dyn Write + Send> = if buffered {
            Box::new(BufWriter::new(file))
        } else {
            Box::new(file)
        };

        Ok(Self {
            name: name.into(),
            path,
            buffered,
            writer: Some(writer),
        })
    }

    /// Open an unbuffered file sink named after its path
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let name = format!("file:{}", path.as_ref().display());
        Self::open(name, path, false)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut Box<dyn Write + Send>, ContractError> {
        self.writer
            .as_mut()
            .ok_or_else(|| ContractError::sink_write(&self.name, "file is closed"))
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_str(&mut self, text: &str) -> Result<(), ContractError> {
        let name = self.name.clone();
        self.writer()?.write_all(text.as_bytes()).map_err(|e| {
            error!(sink = %name, error = %e, "Write failed");
            ContractError::sink_write(name, e.to_string())
        })
    }

    fn as_flushable(&mut self) -> Option<&mut dyn Flushable> {
        Some(self)
    }

    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        Some(self)
    }

    fn describe(&self) -> String {
        if self.buffered {
            format!("file {} (buffered)", self.path.display())
        } else {
            format!("file {}", self.path.display())
        }
    }
}

impl Flushable for FileSink {
    fn flush(&mut self) -> Result<(), ContractError> {
        match self.writer.as_mut() {
            Some(writer) => Ok(writer.flush()?),
            None => Ok(()),
        }
    }
}

impl Closable for FileSink {
    fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_close(&self.name, e.to_string()))?;
            debug!(sink = %self.name, path = %self.path.display(), "FileSink closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("app.log");

        let mut sink = FileSink::open("test_file", &path, false).unwrap();
        sink.write_str("one\n").unwrap();
        sink.write_str("two\n").unwrap();
        sink.close().unwrap();

        let mut again = FileSink::create(&path).unwrap();
        again.write_str("three\n").unwrap();
        again.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\nthree\n");
    }

    #[test]
    fn test_buffered_sink_visible_after_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("buffered.log");

        let mut sink = FileSink::open("buffered", &path, true).unwrap();
        sink.write_str("held\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        Flushable::flush(&mut sink).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "held\n");
    }

    #[test]
    fn test_write_after_close_fails() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::create(dir.path().join("closed.log")).unwrap();
        sink.close().unwrap();

        let err = sink.write_str("late\n").unwrap_err();
        assert!(matches!(err, ContractError::SinkWrite { .. }));
        assert!(sink.close().is_ok());
    }
}
