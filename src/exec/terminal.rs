// src/exec/terminal.rs

//! User-facing output streams.
//!
//! The runner never writes to `std::io::stdout()` directly. Announcements,
//! failure lines and live-streamed child output all go through a [`Terminal`],
//! which is the real process stdio in production and an in-memory buffer in
//! tests. Structured diagnostics go to `tracing` instead.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

pub const TICK: &str = "\u{2714}";
pub const CROSS: &str = "\u{2718}";

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// A pair of output streams shared by every clone.
#[derive(Clone)]
pub struct Terminal {
    out: SharedWriter,
    err: SharedWriter,
}

impl Terminal {
    /// The real stdout/stderr of this process.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        let out: Box<dyn Write + Send> = Box::new(out);
        let err: Box<dyn Write + Send> = Box::new(err);
        Self {
            out: Arc::new(Mutex::new(out)),
            err: Arc::new(Mutex::new(err)),
        }
    }

    /// A terminal that records everything in memory.
    pub fn memory() -> (Self, TerminalCapture) {
        let capture = TerminalCapture::default();
        let terminal = Self::new(
            BufferWriter(Arc::clone(&capture.out)),
            BufferWriter(Arc::clone(&capture.err)),
        );
        (terminal, capture)
    }

    /// Print one line on the output stream.
    pub fn println(&self, line: impl AsRef<str>) {
        let mut out = lock(&self.out);
        // Terminal write errors are ignored.
        let _ = writeln!(out, "{}", line.as_ref());
        let _ = out.flush();
    }

    pub(crate) fn write_out(&self, chunk: &[u8]) -> io::Result<()> {
        let mut out = lock(&self.out);
        out.write_all(chunk)?;
        out.flush()
    }

    pub(crate) fn write_err(&self, chunk: &[u8]) -> io::Result<()> {
        let mut err = lock(&self.err);
        err.write_all(chunk)?;
        err.flush()
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::stdio()
    }
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal").finish_non_exhaustive()
    }
}

/// Read side of [`Terminal::memory`].
#[derive(Debug, Clone, Default)]
pub struct TerminalCapture {
    out: Arc<Mutex<Vec<u8>>>,
    err: Arc<Mutex<Vec<u8>>>,
}

impl TerminalCapture {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&lock(&self.out)).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&lock(&self.err)).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.out).is_empty() && lock(&self.err).is_empty()
    }
}

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
