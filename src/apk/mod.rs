//! APK metadata discovery.
//!
//! Reads the compiled `AndroidManifest.xml` out of the package and resolves the
//! application label through `resources.arsc` when it is a resource reference.

mod arsc;
mod axml;
mod chunk;

pub use arsc::ResourceTable;
pub use axml::{XmlAttribute, XmlDocument, XmlElement};
pub use chunk::ResValue;

use crate::error::MetadataError;
use std::io::Read;
use std::path::Path;

const MANIFEST_ENTRY: &str = "AndroidManifest.xml";
const RESOURCES_ENTRY: &str = "resources.arsc";

/// Framework attribute ids (`android.R.attr`)
const ATTR_LABEL: u32 = 0x0101_0001;
const ATTR_VERSION_CODE: u32 = 0x0101_021b;
const ATTR_VERSION_NAME: u32 = 0x0101_021c;

/// Identity of an Android package as declared in its manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApkMetadata {
    /// Application label, or the package name when no label resolves
    pub name: String,
    /// Application id
    pub package_name: String,
    /// Integer version code
    pub version_code: u32,
    /// Display version, if declared
    pub version_name: Option<String>,
}

/// Read package metadata from an APK on disk
pub fn read_apk_metadata(path: &Path) -> Result<ApkMetadata, MetadataError> {
    let archive_error = |reason: String| MetadataError::Archive {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|e| archive_error(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_error(e.to_string()))?;

    let manifest = read_entry(&mut archive, MANIFEST_ENTRY)?.ok_or_else(|| {
        MetadataError::MissingEntry {
            entry: MANIFEST_ENTRY.to_string(),
        }
    })?;
    let resources = read_entry(&mut archive, RESOURCES_ENTRY)?;

    let document = XmlDocument::parse(&manifest)?;
    let table = match resources {
        Some(data) => Some(ResourceTable::parse(&data)?),
        None => None,
    };

    metadata_from_manifest(&document, table.as_ref())
}

fn read_entry<R: std::io::Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, MetadataError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(MetadataError::Malformed {
                what: "APK archive",
                reason: format!("{name}: {e}"),
            });
        }
    };

    let mut data = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut data)
        .map_err(|e| MetadataError::Malformed {
            what: "APK archive",
            reason: format!("{name}: {e}"),
        })?;
    Ok(Some(data))
}

/// Extract the identity from a parsed manifest
pub fn metadata_from_manifest(
    document: &XmlDocument,
    resources: Option<&ResourceTable>,
) -> Result<ApkMetadata, MetadataError> {
    let manifest = document
        .root()
        .filter(|e| e.name == "manifest")
        .ok_or_else(|| MetadataError::Malformed {
            what: "binary XML",
            reason: "root element is not <manifest>".to_string(),
        })?;

    let package_name = match manifest.attribute("package", None) {
        Some(ResValue::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(MetadataError::MissingAttribute { attribute: "package" }),
    };

    let version_code = match manifest.attribute("versionCode", Some(ATTR_VERSION_CODE)) {
        Some(ResValue::Int(v)) => *v,
        Some(ResValue::String(s)) => s.trim().parse().map_err(|_| MetadataError::Malformed {
            what: "binary XML",
            reason: format!("versionCode '{s}' is not an integer"),
        })?,
        _ => {
            return Err(MetadataError::MissingAttribute {
                attribute: "versionCode",
            });
        }
    };

    let version_name = manifest
        .attribute("versionName", Some(ATTR_VERSION_NAME))
        .map(|value| resolve_text(value, resources))
        .filter(|s| !s.is_empty());

    let name = document
        .find("application", 1)
        .and_then(|app| app.attribute("label", Some(ATTR_LABEL)))
        .and_then(|value| match value {
            ResValue::Reference(id) => resources.and_then(|r| r.resolve_string(*id)),
            ResValue::String(s) => Some(s.clone()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            log::debug!("No resolvable application label, using package name");
            package_name.clone()
        });

    Ok(ApkMetadata {
        name,
        package_name,
        version_code,
        version_name,
    })
}

fn resolve_text(value: &ResValue, resources: Option<&ResourceTable>) -> String {
    match value {
        ResValue::Reference(id) => resources
            .and_then(|r| r.resolve_string(*id))
            .unwrap_or_else(|| value.as_text()),
        other => other.as_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::axml::tests::ManifestWriter;
    use super::*;
    use std::io::Write;

    fn manifest(label: Option<(u8, u32)>, with_code: bool) -> Vec<u8> {
        let mut w = ManifestWriter::new(&[
            ("versionCode", ATTR_VERSION_CODE),
            ("versionName", ATTR_VERSION_NAME),
            ("label", ATTR_LABEL),
        ]);
        let pkg = w.string("com.example.demo");
        let version = w.string("1.4.2");

        let mut attrs = vec![("versionName", 0x03, version), ("package", 0x03, pkg)];
        if with_code {
            attrs.insert(0, ("versionCode", 0x10, 1042));
        }
        w.start("manifest", &attrs);
        w.start("uses-sdk", &[]);
        w.end();
        match label {
            Some((data_type, data)) => w.start("application", &[("label", data_type, data)]),
            None => w.start("application", &[]),
        }
        w.end();
        w.end();
        w.finish()
    }

    fn write_apk(entries: &[(&str, Vec<u8>)]) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new()
            .suffix(".apk")
            .tempfile()
            .expect("temp apk");
        let mut zip = zip::ZipWriter::new(file.reopen().expect("reopen"));
        for (name, data) in entries {
            zip.start_file(*name, zip::write::SimpleFileOptions::default())
                .expect("start entry");
            zip.write_all(data).expect("write entry");
        }
        zip.finish().expect("finish zip");
        file
    }

    #[test]
    fn reads_identity_with_resource_label() {
        let resources = arsc::tests::table(&["Demo"], &[([0, 0], vec![(0, 0)])]);
        let apk = write_apk(&[
            (MANIFEST_ENTRY, manifest(Some((0x01, 0x7f02_0000)), true)),
            (RESOURCES_ENTRY, resources),
        ]);

        let meta = read_apk_metadata(apk.path()).expect("reads apk");
        assert_eq!(
            meta,
            ApkMetadata {
                name: "Demo".to_string(),
                package_name: "com.example.demo".to_string(),
                version_code: 1042,
                version_name: Some("1.4.2".to_string()),
            }
        );
    }

    #[test]
    fn unresolvable_label_falls_back_to_package() {
        let apk = write_apk(&[(MANIFEST_ENTRY, manifest(Some((0x01, 0x7f02_0009)), true))]);
        let meta = read_apk_metadata(apk.path()).expect("reads apk");
        assert_eq!(meta.name, "com.example.demo");
    }

    #[test]
    fn missing_version_code_is_reported() {
        let apk = write_apk(&[(MANIFEST_ENTRY, manifest(None, false))]);
        let err = read_apk_metadata(apk.path()).expect_err("no version code");
        assert!(matches!(
            err,
            MetadataError::MissingAttribute {
                attribute: "versionCode"
            }
        ));
    }

    #[test]
    fn missing_manifest_is_reported() {
        let apk = write_apk(&[("classes.dex", vec![0u8; 8])]);
        let err = read_apk_metadata(apk.path()).expect_err("no manifest");
        assert!(matches!(err, MetadataError::MissingEntry { .. }));
    }

    #[test]
    fn non_zip_file_is_archive_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"definitely not a zip").expect("write");
        let err = read_apk_metadata(file.path()).expect_err("not a zip");
        assert!(matches!(err, MetadataError::Archive { .. }));
    }
}
