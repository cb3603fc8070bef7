//! # Kodegen Play Store Bundler
//!
//! Publishes an Android binary (APK or AAB) to a Google Play release track.
//!
//! A publish is a single Play Developer API edit: insert the edit, upload the
//! binary, write a release on the track, commit. If anything fails after the edit
//! exists, the edit is deleted so no half-finished change is left behind.
//!
//! ## Usage
//!
//! ```bash
//! kodegen_bundler_playstore -key key.json -file app.apk -track internal -notes "fix bug"
//! kodegen_bundler_playstore -key key.json -file app.aab -packageName com.example.app -track beta
//! ```
//!
//! The workflow is also usable as a library through [`Publisher`] and any
//! implementation of [`EditsApi`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod apk;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod play;
pub mod publish;

// Re-export main types for public API
pub use apk::{ApkMetadata, read_apk_metadata};
pub use cli::Args;
pub use config::{ApiSettings, ArtifactKind, NotesSource, PublishConfig};
pub use credentials::ServiceAccountCredentials;
pub use error::{ReleaseError, Result};
pub use play::{AndroidPublisherClient, EditsApi};
pub use publish::{AppIdentity, PublishOutcome, Publisher, ReleaseRequest};
