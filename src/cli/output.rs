//! Colored terminal output for publish operations
//!
//! Progress goes to stdout, failures to stderr.

use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
    stderr: BufferWriter,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new() -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
            stderr: BufferWriter::stderr(ColorChoice::Auto),
        }
    }

    fn emit(
        writer: &BufferWriter,
        marker: &str,
        marker_spec: &ColorSpec,
        text_color: Option<Color>,
        message: &str,
    ) -> std::io::Result<()> {
        let mut buffer = writer.buffer();
        let _ = buffer.set_color(marker_spec);
        let _ = write!(&mut buffer, "{marker}");
        let _ = buffer.reset();
        if text_color.is_some() {
            let _ = buffer.set_color(ColorSpec::new().set_fg(text_color));
        }
        let _ = writeln!(&mut buffer, " {message}");
        let _ = buffer.reset();
        writer.print(&buffer)
    }

    /// Print a progress step
    pub fn step(&self, message: &str) -> std::io::Result<()> {
        Self::emit(
            &self.stdout,
            "⋯",
            ColorSpec::new().set_fg(Some(Color::Magenta)),
            None,
            message,
        )
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        Self::emit(
            &self.stdout,
            "✓",
            ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true),
            None,
            message,
        )
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        Self::emit(
            &self.stderr,
            "⚠",
            ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true),
            Some(Color::Yellow),
            message,
        )
    }

    /// Print an error message to stderr
    pub fn error(&self, message: &str) {
        if Self::emit(
            &self.stderr,
            "✗",
            ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true),
            Some(Color::Red),
            message,
        )
        .is_err()
        {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {}", message);
        }
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        let mut buffer = self.stdout.buffer();
        let _ = writeln!(&mut buffer, "    {}", message);
        self.stdout.print(&buffer)
    }

    /// Print a plain message to stderr (usage text, hints)
    pub fn eprintln(&self, message: &str) -> std::io::Result<()> {
        let mut buffer = self.stderr.buffer();
        let _ = writeln!(&mut buffer, "{}", message);
        self.stderr.print(&buffer)
    }
}
