//! Google Play Developer API integration

mod api;
mod client;
mod models;

pub use api::EditsApi;
pub use client::{AndroidPublisherClient, endpoint_url};
pub use models::{
    AUTOMATED_RELEASE_NAME, AppEdit, Apk, BinaryDigest, Bundle, LocalizedText,
    RELEASE_NOTES_LANGUAGE, RELEASE_STATUS_COMPLETED, Track, TrackRelease, UploadedArtifact,
};
