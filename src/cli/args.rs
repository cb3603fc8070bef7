//! Command line argument parsing and validation.
//!
//! The flags use single-dash long spellings (`-key`, `-packageName`, ...).
//! Those are rewritten to clap long flags before parsing.

use crate::publish::ProgressReporter;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Long flag names that may be spelled with a single dash
const LEGACY_FLAGS: &[&str] = &["key", "file", "track", "name", "packageName", "notes", "notesFile"];

/// Upload an APK or AAB to a Google Play release track
#[derive(Parser, Debug, Clone)]
#[command(
    name = "kodegen_bundler_playstore",
    version,
    about = "Upload an APK or AAB to a Google Play release track",
    long_about = "Upload an Android package to Google Play and promote it to a release track.

Usage:
  kodegen_bundler_playstore -key key.json -file app.apk -track internal -notes \"fix bug\"
  kodegen_bundler_playstore -key key.json -file app.aab -packageName com.example.app -track beta -notesFile notes.txt"
)]
pub struct Args {
    /// JSON key file of an authorized service account
    #[arg(long = "key", value_name = "JSON", required = true)]
    pub key: PathBuf,

    /// APK or AAB file to be released
    #[arg(long = "file", value_name = "FILE", required = true)]
    pub file: PathBuf,

    /// Release track to use, e.g. internal, alpha, beta or production
    #[arg(long = "track", value_name = "TRACK", required = true)]
    pub track: String,

    /// Application name (optional; defaults to the manifest label or package name)
    #[arg(long = "name", value_name = "NAME", allow_hyphen_values = true)]
    pub name: Option<String>,

    /// Application package name (required with an AAB file)
    #[arg(long = "packageName", alias = "package-name", value_name = "PACKAGE")]
    pub package_name: Option<String>,

    /// Release notes text
    #[arg(long = "notes", value_name = "TEXT", conflicts_with = "notes_file", allow_hyphen_values = true)]
    pub notes: Option<String>,

    /// File containing release notes
    #[arg(long = "notesFile", alias = "notes-file", value_name = "FILE", conflicts_with = "notes")]
    pub notes_file: Option<PathBuf>,
}

impl Args {
    /// Parse an argument vector, accepting single-dash long flags
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_legacy_flags(args))
    }
}

/// Console context shared by command execution
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new() -> Self {
        Self {
            output: super::OutputManager::new(),
        }
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print indented text to stderr
    pub fn hint(&self, message: &str) {
        let _ = self.output.eprintln(&format!("  • {message}"));
    }
}

impl ProgressReporter for RuntimeConfig {
    fn step(&self, message: &str) {
        log::debug!("{message}");
        let _ = self.output.step(message);
    }

    fn detail(&self, message: &str) {
        log::debug!("{message}");
        let _ = self.output.indent(message);
    }

    fn success(&self, message: &str) {
        log::debug!("{message}");
        let _ = self.output.success(message);
    }

    fn warn(&self, message: &str) {
        log::warn!("{message}");
        let _ = self.output.warn(message);
    }
}

/// Rewrite `-key value` / `-key=value` into clap's `--key value` form.
///
/// Only the known long flags are rewritten; values (even ones that look like flags
/// after a flag expecting a value) and short flags such as `-h` pass through untouched.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut expecting_value = false;

    for (index, arg) in args.into_iter().map(Into::into).enumerate() {
        // argv[0]
        if index == 0 || expecting_value {
            expecting_value = false;
            out.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            out.push(arg);
            continue;
        };

        let rewritten = text
            .strip_prefix('-')
            .filter(|rest| !rest.starts_with('-'))
            .and_then(|rest| {
                let (flag, inline_value) = match rest.split_once('=') {
                    Some((flag, value)) => (flag, Some(value)),
                    None => (rest, None),
                };
                LEGACY_FLAGS.contains(&flag).then(|| {
                    expecting_value = inline_value.is_none();
                    format!("-{text}")
                })
            });

        if rewritten.is_none() {
            expecting_value = text.starts_with("--")
                && !text.contains('=')
                && LEGACY_FLAGS
                    .iter()
                    .chain(["package-name", "notes-file"].iter())
                    .any(|flag| text[2..] == **flag);
        }

        out.push(rewritten.map(OsString::from).unwrap_or(arg));
    }

    out
}
