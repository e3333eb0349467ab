use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

use super::config::FileConfig;
use super::error::LoggerError;
use super::rotation::RotationManager;

/// Size-rotated log file shared by every event of the file layer.
///
/// After the first I/O failure the sink switches to stderr for the rest of
/// the process.
pub struct RotatingFileWriter {
    path: PathBuf,
    rotation: RotationManager,
    sink: Mutex<Sink>,
}

enum Sink {
    File { out: BufWriter<File>, len: u64 },
    Stderr,
}

impl RotatingFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(dir) = config.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let out = open(&config.path, config.append)?;
        let len = out.get_ref().metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            path: config.path.clone(),
            rotation: RotationManager::new(config.rotation.clone()),
            sink: Mutex::new(Sink::File { out, len }),
        })
    }

    pub fn is_in_fallback_mode(&self) -> bool {
        matches!(*self.lock(), Sink::Stderr)
    }

    fn lock(&self) -> MutexGuard<'_, Sink> {
        self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_event(&self, buf: &[u8]) -> io::Result<usize> {
        let mut sink = self.lock();
        let result = match &mut *sink {
            Sink::Stderr => return io::stderr().write(buf),
            Sink::File { out, len } => self.write_rotating(out, len, buf),
        };
        result.or_else(|error| {
            eprintln!("log file {} unusable, using stderr: {error}", self.path.display());
            *sink = Sink::Stderr;
            io::stderr().write(buf)
        })
    }

    fn write_rotating(
        &self,
        out: &mut BufWriter<File>,
        len: &mut u64,
        buf: &[u8],
    ) -> io::Result<usize> {
        if self.rotation.should_rotate(*len) {
            out.flush()?;
            self.rotation
                .rotate(&self.path)
                .map_err(|e| io::Error::other(e.to_string()))?;
            *out = open(&self.path, false)?;
            *len = 0;
        }
        let written = out.write(buf)?;
        *len += written as u64;
        Ok(written)
    }

    fn flush_sink(&self) -> io::Result<()> {
        match &mut *self.lock() {
            Sink::File { out, .. } => out.flush(),
            Sink::Stderr => io::stderr().flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = EventWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter(self)
    }
}

/// Handle for one formatted event; flushes when dropped.
pub struct EventWriter<'a>(&'a RotatingFileWriter);

impl Write for EventWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_event(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush_sink()
    }
}

impl Drop for EventWriter<'_> {
    fn drop(&mut self) {
        let _ = self.0.flush_sink();
    }
}

fn open(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    options.open(path).map(BufWriter::new)
}
