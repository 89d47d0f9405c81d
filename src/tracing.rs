use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

const DEFAULT_FILTER: &str = "warn";

type LogFile = Arc<RwLock<Option<File>>>;

/// Writes to stderr and, once a log file is configured, to that file too.
#[derive(Clone)]
struct SharedWriter {
    inner: LogFile,
}

struct MultiWriter {
    inner: LogFile,
}

impl SharedWriter {
    fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedWriter {
    type Writer = MultiWriter;

    fn make_writer(&'a self) -> Self::Writer {
        MultiWriter {
            inner: self.inner.clone(),
        }
    }
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = io::stderr().write(buf)?;
        if let Ok(mut guard) = self.inner.write() {
            if let Some(file) = guard.as_mut() {
                let _ = file.write_all(buf);
            }
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Ok(mut guard) = self.inner.write() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
        Ok(())
    }
}

static WRITER: OnceLock<SharedWriter> = OnceLock::new();

/// Routes `log` records through a `tracing-subscriber` fmt layer filtered by
/// `RUST_LOG` (default `warn`). Safe to call more than once.
pub fn init() {
    let _ = tracing_log::LogTracer::init();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    let writer = WRITER.get_or_init(SharedWriter::new).clone();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .try_init();
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            log::warn!("cannot create log directory {}: {err}", parent.display());
            return None;
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(err) => {
            log::warn!("cannot open log file {}: {err}", path.display());
            None
        }
    }
}

/// Mirrors log output into `log_file` (appending), or stops mirroring on `None`.
/// Returns whether a file is now attached.
pub fn set_log_file(log_file: Option<&Path>) -> bool {
    let Some(writer) = WRITER.get() else {
        return false;
    };
    // Opened before taking the lock: a warning logged here goes through the writer.
    let file = log_file.and_then(open_log_file);
    let attached = file.is_some();
    match writer.inner.write() {
        Ok(mut guard) => *guard = file,
        Err(_) => return false,
    }
    attached
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_receives_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("abtool.log");

        init();
        assert!(set_log_file(Some(&path)));
        let inner = WRITER.get().unwrap().inner.clone();
        MultiWriter {
            inner: inner.clone(),
        }
        .write_all(b"hello log\n")
        .unwrap();
        set_log_file(None);
        assert!(inner.read().unwrap().is_none());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("hello log"));
    }

    #[test]
    fn unwritable_log_file_is_reported_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        assert!(open_log_file(&blocker.join("abtool.log")).is_none());
        assert!(open_log_file(dir.path()).is_none());
        assert!(open_log_file(&dir.path().join("abtool.log")).is_some());
    }
}
