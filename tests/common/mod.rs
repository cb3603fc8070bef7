//! Shared helpers for integration tests: a scripted Edits API and a tiny APK writer.

#![allow(dead_code)]

use async_trait::async_trait;
use kodegen_bundler_playstore::ArtifactKind;
use kodegen_bundler_playstore::error::ApiError;
use kodegen_bundler_playstore::play::{AppEdit, EditsApi, Track, UploadedArtifact};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One recorded API call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Insert { package: String },
    Upload { package: String, edit: String, kind: ArtifactKind, path: PathBuf },
    UpdateTrack { package: String, edit: String, track: Track },
    Commit { package: String, edit: String },
    Delete { package: String, edit: String },
}

/// Which calls should fail
#[derive(Debug, Clone, Copy, Default)]
pub struct Failures {
    pub insert: bool,
    pub upload: bool,
    pub update_track: bool,
    pub commit: bool,
    pub delete: bool,
}

/// In-memory Edits API that records every call
pub struct FakeEditsApi {
    edit_id: String,
    version_code: i64,
    failures: Failures,
    calls: Mutex<Vec<Call>>,
}

impl FakeEditsApi {
    pub fn new(edit_id: &str, version_code: i64) -> Self {
        Self::failing(edit_id, version_code, Failures::default())
    }

    pub fn failing(edit_id: &str, version_code: i64, failures: Failures) -> Self {
        Self {
            edit_id: edit_id.to_string(),
            version_code,
            failures,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("call log").clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("call log").push(call);
    }
}

pub fn backend_error(operation: &'static str, message: &str) -> ApiError {
    ApiError::Status {
        operation,
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl EditsApi for FakeEditsApi {
    async fn insert_edit(&self, package_name: &str) -> Result<AppEdit, ApiError> {
        self.record(Call::Insert {
            package: package_name.to_string(),
        });
        if self.failures.insert {
            return Err(backend_error("Insert edit", "insert rejected"));
        }
        Ok(AppEdit {
            id: self.edit_id.clone(),
            expiry_time_seconds: None,
        })
    }

    async fn upload_artifact(
        &self,
        package_name: &str,
        edit_id: &str,
        kind: ArtifactKind,
        path: &Path,
    ) -> Result<UploadedArtifact, ApiError> {
        self.record(Call::Upload {
            package: package_name.to_string(),
            edit: edit_id.to_string(),
            kind,
            path: path.to_path_buf(),
        });
        if self.failures.upload {
            return Err(backend_error("Upload artifact", "upload rejected"));
        }
        Ok(UploadedArtifact {
            version_code: self.version_code,
            sha256: None,
        })
    }

    async fn update_track(
        &self,
        package_name: &str,
        edit_id: &str,
        track: &Track,
    ) -> Result<Track, ApiError> {
        self.record(Call::UpdateTrack {
            package: package_name.to_string(),
            edit: edit_id.to_string(),
            track: track.clone(),
        });
        if self.failures.update_track {
            return Err(backend_error("Update track", "track rejected"));
        }
        Ok(track.clone())
    }

    async fn commit_edit(&self, package_name: &str, edit_id: &str) -> Result<AppEdit, ApiError> {
        self.record(Call::Commit {
            package: package_name.to_string(),
            edit: edit_id.to_string(),
        });
        if self.failures.commit {
            return Err(backend_error("Commit edit", "commit rejected"));
        }
        Ok(AppEdit {
            id: edit_id.to_string(),
            expiry_time_seconds: None,
        })
    }

    async fn delete_edit(&self, package_name: &str, edit_id: &str) -> Result<(), ApiError> {
        self.record(Call::Delete {
            package: package_name.to_string(),
            edit: edit_id.to_string(),
        });
        if self.failures.delete {
            return Err(backend_error("Delete edit", "delete rejected"));
        }
        Ok(())
    }
}

const RES_STRING_POOL_TYPE: u16 = 0x0001;
const RES_XML_TYPE: u16 = 0x0003;
const RES_XML_START_ELEMENT_TYPE: u16 = 0x0102;
const RES_XML_END_ELEMENT_TYPE: u16 = 0x0103;
const RES_XML_RESOURCE_MAP_TYPE: u16 = 0x0180;

const TYPE_STRING: u8 = 0x03;
const TYPE_INT_DEC: u8 = 0x10;

/// Compiled manifest for `<manifest package versionCode versionName><application label/>`
pub fn compiled_manifest(package: &str, version_code: u32, version_name: &str, label: &str) -> Vec<u8> {
    // Attribute names first so they line up with the resource map
    let strings = [
        "versionCode",
        "versionName",
        "label",
        "package",
        "manifest",
        "application",
        package,
        version_name,
        label,
    ];
    let resource_ids = [0x0101_021b_u32, 0x0101_021c, 0x0101_0001];

    let mut body = Vec::new();
    start_element(
        &mut body,
        4,
        &[
            (0, TYPE_INT_DEC, version_code),
            (1, TYPE_STRING, 7),
            (3, TYPE_STRING, 6),
        ],
    );
    start_element(&mut body, 5, &[(2, TYPE_STRING, 8)]);
    end_element(&mut body);
    end_element(&mut body);

    let pool = string_pool(&strings);
    let mut map = Vec::new();
    push16(&mut map, RES_XML_RESOURCE_MAP_TYPE);
    push16(&mut map, 8);
    push32(&mut map, (8 + resource_ids.len() * 4) as u32);
    for id in resource_ids {
        push32(&mut map, id);
    }

    let mut out = Vec::new();
    push16(&mut out, RES_XML_TYPE);
    push16(&mut out, 8);
    push32(&mut out, (8 + pool.len() + map.len() + body.len()) as u32);
    out.extend(pool);
    out.extend(map);
    out.extend(body);
    out
}

/// Write a minimal APK (zip with a compiled manifest) into `dir`
pub fn write_apk(dir: &Path, file_name: &str, manifest: &[u8]) -> PathBuf {
    let path = dir.join(file_name);
    let file = std::fs::File::create(&path).expect("create apk");
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(
        "AndroidManifest.xml",
        zip::write::SimpleFileOptions::default(),
    )
    .expect("start manifest");
    zip.write_all(manifest).expect("write manifest");
    zip.start_file("classes.dex", zip::write::SimpleFileOptions::default())
        .expect("start dex");
    zip.write_all(b"dex\n035\0").expect("write dex");
    zip.finish().expect("finish apk");
    path
}

fn start_element(out: &mut Vec<u8>, name: u32, attrs: &[(u32, u8, u32)]) {
    push16(out, RES_XML_START_ELEMENT_TYPE);
    push16(out, 16);
    push32(out, (16 + 20 + attrs.len() * 20) as u32);
    push32(out, 1);
    push32(out, u32::MAX);
    push32(out, u32::MAX);
    push32(out, name);
    push16(out, 20);
    push16(out, 20);
    push16(out, attrs.len() as u16);
    push16(out, 0);
    push16(out, 0);
    push16(out, 0);
    for (attr, data_type, data) in attrs {
        push32(out, u32::MAX);
        push32(out, *attr);
        push32(out, u32::MAX);
        push16(out, 8);
        out.push(0);
        out.push(*data_type);
        push32(out, *data);
    }
}

fn end_element(out: &mut Vec<u8>) {
    push16(out, RES_XML_END_ELEMENT_TYPE);
    push16(out, 16);
    push32(out, 24);
    out.extend([0u8; 16]);
}

fn string_pool(strings: &[&str]) -> Vec<u8> {
    let mut data = Vec::new();
    let mut offsets = Vec::new();
    for s in strings {
        offsets.push(data.len() as u32);
        let units: Vec<u16> = s.encode_utf16().collect();
        push16(&mut data, units.len() as u16);
        for unit in units {
            push16(&mut data, unit);
        }
        push16(&mut data, 0);
    }
    while data.len() % 4 != 0 {
        data.push(0);
    }

    let header = 28;
    let strings_start = header + offsets.len() * 4;
    let mut out = Vec::new();
    push16(&mut out, RES_STRING_POOL_TYPE);
    push16(&mut out, header as u16);
    push32(&mut out, (strings_start + data.len()) as u32);
    push32(&mut out, strings.len() as u32);
    push32(&mut out, 0);
    push32(&mut out, 0);
    push32(&mut out, strings_start as u32);
    push32(&mut out, 0);
    for offset in offsets {
        push32(&mut out, offset);
    }
    out.extend(data);
    out
}

fn push16(out: &mut Vec<u8>, v: u16) {
    out.extend(v.to_le_bytes());
}

fn push32(out: &mut Vec<u8>, v: u32) {
    out.extend(v.to_le_bytes());
}
