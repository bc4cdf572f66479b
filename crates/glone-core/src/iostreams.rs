//! Terminal output for the run summary.
//!
//! User-facing output goes through [`IOStreams`] so tests can capture it.
//! Diagnostics go through `tracing` on stderr instead.

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, PoisonError};

use console::Style;

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

fn sink(writer: impl Write + Send + 'static) -> Sink {
    let boxed: Box<dyn Write + Send> = Box::new(writer);
    Arc::new(Mutex::new(boxed))
}

/// Writer appending to a buffer shared with the test that owns it.
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stdout captured by [`IOStreams::test_with_output`].
#[derive(Debug, Clone)]
pub struct TestOutput {
    out_buf: Arc<Mutex<Vec<u8>>>,
}

impl TestOutput {
    /// Everything written to stdout so far.
    pub fn stdout(&self) -> String {
        let buf = self.out_buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Stdout handle plus the terminal facts that decide styling.
pub struct IOStreams {
    stdout_is_tty: bool,
    stderr_is_tty: bool,
    no_color: bool,
    out: Sink,
}

impl std::fmt::Debug for IOStreams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IOStreams")
            .field("stdout_is_tty", &self.stdout_is_tty)
            .field("stderr_is_tty", &self.stderr_is_tty)
            .field("no_color", &self.no_color)
            .finish_non_exhaustive()
    }
}

impl IOStreams {
    /// Streams for the real terminal. `NO_COLOR` disables styling.
    pub fn system() -> Self {
        Self {
            stdout_is_tty: io::stdout().is_terminal(),
            stderr_is_tty: io::stderr().is_terminal(),
            no_color: std::env::var_os("NO_COLOR").is_some(),
            out: sink(io::stdout()),
        }
    }

    /// Streams writing stdout into a buffer, never styled.
    pub fn test_with_output() -> (Self, TestOutput) {
        let out_buf = Arc::new(Mutex::new(Vec::new()));
        let ios = Self {
            stdout_is_tty: false,
            stderr_is_tty: false,
            no_color: true,
            out: sink(CaptureWriter(out_buf.clone())),
        };
        (ios, TestOutput { out_buf })
    }

    /// Write formatted output and a newline to stdout.
    ///
    /// Write errors such as a closed pipe are ignored.
    pub fn writeln_out(&self, args: std::fmt::Arguments<'_>) {
        let mut w = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = w.write_fmt(args).and_then(|()| w.write_all(b"\n"));
    }

    /// Whether stdout is connected to a terminal.
    pub fn is_stdout_tty(&self) -> bool {
        self.stdout_is_tty
    }

    /// Whether stderr is connected to a terminal.
    pub fn is_stderr_tty(&self) -> bool {
        self.stderr_is_tty
    }

    /// Styling applies only to a terminal stdout without `NO_COLOR`.
    pub fn color_enabled(&self) -> bool {
        self.stdout_is_tty && !self.no_color
    }

    /// Color scheme matching [`color_enabled`](Self::color_enabled).
    pub fn color_scheme(&self) -> ColorScheme {
        ColorScheme {
            enabled: self.color_enabled(),
        }
    }
}

/// Styles for the summary line. Plain text when disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    enabled: bool,
}

impl ColorScheme {
    fn paint(self, text: &str, style: &Style) -> String {
        if self.enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold.
    pub fn bold(self, text: &str) -> String {
        self.paint(text, &Style::new().bold())
    }

    /// Green, for successes.
    pub fn success(self, text: &str) -> String {
        self.paint(text, &Style::new().green())
    }

    /// Yellow, for skips.
    pub fn warning(self, text: &str) -> String {
        self.paint(text, &Style::new().yellow())
    }

    /// Red, for errors.
    pub fn error(self, text: &str) -> String {
        self.paint(text, &Style::new().red())
    }
}

/// Write a formatted line to an [`IOStreams`] stdout, like `println!()`.
#[macro_export]
macro_rules! ios_println {
    ($ios:expr, $($arg:tt)*) => {
        $ios.writeln_out(format_args!($($arg)*))
    };
}
