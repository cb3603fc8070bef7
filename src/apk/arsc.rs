//! Compiled resource table (`resources.arsc`), read just far enough to
//! resolve string resources such as the application label.

use super::chunk::{
    Bytes, ChunkHeader, RES_STRING_POOL_TYPE, RES_TABLE_PACKAGE_TYPE, RES_TABLE_TYPE,
    RES_TABLE_TYPE_TYPE, ResValue, StringPool, value_type,
};
use crate::error::MetadataError;
use std::collections::HashMap;

const TYPE_FLAG_SPARSE: u8 = 0x01;
const TYPE_FLAG_OFFSET16: u8 = 0x02;
const ENTRY_FLAG_COMPLEX: u16 = 0x0001;
const ENTRY_FLAG_COMPACT: u16 = 0x0008;
const NO_ENTRY: u32 = 0xFFFF_FFFF;
const MAX_REFERENCE_DEPTH: usize = 4;

/// One configuration-specific value of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigValue {
    /// ISO-639 language packed as two bytes; zero for the default configuration
    language: [u8; 2],
    value: ResValue,
}

/// Simple (non-bag) values keyed by resource id
#[derive(Debug, Default)]
pub struct ResourceTable {
    values: HashMap<u32, Vec<ConfigValue>>,
}

impl ResourceTable {
    /// Parse a resource table
    pub fn parse(data: &[u8]) -> Result<Self, MetadataError> {
        let bytes = Bytes::new(data, "resource table");
        let root = bytes.chunk(0)?;
        if root.kind != RES_TABLE_TYPE {
            return Err(bytes.malformed(format!("unexpected root chunk 0x{:04x}", root.kind)));
        }

        let mut table = Self::default();
        let mut global = StringPool::default();

        for chunk in bytes.chunks(root.body(), root.end()) {
            let chunk = chunk?;
            match chunk.kind {
                RES_STRING_POOL_TYPE => global = StringPool::parse(&bytes, &chunk)?,
                RES_TABLE_PACKAGE_TYPE => table.parse_package(&bytes, &chunk, &global)?,
                _ => {}
            }
        }

        Ok(table)
    }

    fn parse_package(
        &mut self,
        bytes: &Bytes<'_>,
        package: &ChunkHeader,
        global: &StringPool,
    ) -> Result<(), MetadataError> {
        let package_id = bytes.u32(package.offset + 8)?;
        if package_id > 0xff {
            return Err(bytes.malformed(format!("package id 0x{package_id:x}")));
        }

        for chunk in bytes.chunks(package.body(), package.end()) {
            let chunk = chunk?;
            if chunk.kind == RES_TABLE_TYPE_TYPE {
                self.parse_type(bytes, &chunk, package_id, global)?;
            }
        }
        Ok(())
    }

    fn parse_type(
        &mut self,
        bytes: &Bytes<'_>,
        chunk: &ChunkHeader,
        package_id: u32,
        global: &StringPool,
    ) -> Result<(), MetadataError> {
        let base = chunk.offset;
        let type_id = bytes.u8(base + 8)? as u32;
        let flags = bytes.u8(base + 9)?;
        let entry_count = bytes.u32(base + 12)? as usize;
        let entries_start = bytes.u32(base + 16)? as usize;
        // ResTable_config: size, mcc, mnc, then language
        let language = [bytes.u8(base + 28)?, bytes.u8(base + 29)?];

        if entry_count > chunk.size {
            return Err(bytes.malformed(format!("type chunk claims {entry_count} entries")));
        }

        for i in 0..entry_count {
            let (entry_index, offset) = if flags & TYPE_FLAG_SPARSE != 0 {
                let at = chunk.body() + i * 4;
                (bytes.u16(at)? as u32, bytes.u16(at + 2)? as u32 * 4)
            } else if flags & TYPE_FLAG_OFFSET16 != 0 {
                match bytes.u16(chunk.body() + i * 2)? {
                    0xFFFF => continue,
                    raw => (i as u32, raw as u32 * 4),
                }
            } else {
                match bytes.u32(chunk.body() + i * 4)? {
                    NO_ENTRY => continue,
                    raw => (i as u32, raw),
                }
            };

            let entry = base + entries_start + offset as usize;
            if entry >= chunk.end() {
                return Err(bytes.malformed(format!("entry {entry_index} outside its type chunk")));
            }

            let Some(value) = read_entry(bytes, entry, global)? else {
                continue;
            };

            let id = (package_id << 24) | (type_id << 16) | entry_index;
            self.values
                .entry(id)
                .or_default()
                .push(ConfigValue { language, value });
        }
        Ok(())
    }

    /// Resolve a resource id to a string, following references.
    ///
    /// The default-language value is preferred over localized ones.
    pub fn resolve_string(&self, id: u32) -> Option<String> {
        let mut current = id;
        for _ in 0..MAX_REFERENCE_DEPTH {
            let candidates = self.values.get(&current)?;
            let chosen = candidates
                .iter()
                .find(|c| c.language == [0, 0])
                .or_else(|| candidates.first())?;
            match &chosen.value {
                ResValue::String(s) => return Some(s.clone()),
                ResValue::Reference(next) => current = *next,
                _ => return None,
            }
        }
        None
    }
}

fn read_entry(
    bytes: &Bytes<'_>,
    entry: usize,
    global: &StringPool,
) -> Result<Option<ResValue>, MetadataError> {
    let size = bytes.u16(entry)? as usize;
    let flags = bytes.u16(entry + 2)?;

    if flags & ENTRY_FLAG_COMPACT != 0 {
        let data_type = (flags >> 8) as u8;
        let data = bytes.u32(entry + 4)?;
        return Ok(Some(match data_type {
            value_type::STRING => match global.get(data) {
                Some(s) => ResValue::String(s.to_string()),
                None => return Ok(None),
            },
            value_type::REFERENCE => ResValue::Reference(data),
            _ => ResValue::Other { data_type, data },
        }));
    }

    if flags & ENTRY_FLAG_COMPLEX != 0 {
        return Ok(None);
    }

    ResValue::parse(bytes, entry + size, global).map(Some)
}
