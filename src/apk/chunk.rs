//! Little-endian chunk primitives shared by the binary XML and resource table parsers.

use crate::error::MetadataError;

pub(crate) const RES_STRING_POOL_TYPE: u16 = 0x0001;
pub(crate) const RES_TABLE_TYPE: u16 = 0x0002;
pub(crate) const RES_XML_TYPE: u16 = 0x0003;
pub(crate) const RES_XML_START_NAMESPACE_TYPE: u16 = 0x0100;
pub(crate) const RES_XML_END_NAMESPACE_TYPE: u16 = 0x0101;
pub(crate) const RES_XML_START_ELEMENT_TYPE: u16 = 0x0102;
pub(crate) const RES_XML_END_ELEMENT_TYPE: u16 = 0x0103;
pub(crate) const RES_XML_RESOURCE_MAP_TYPE: u16 = 0x0180;
pub(crate) const RES_TABLE_PACKAGE_TYPE: u16 = 0x0200;
pub(crate) const RES_TABLE_TYPE_TYPE: u16 = 0x0201;

const UTF8_FLAG: u32 = 1 << 8;
const NO_INDEX: u32 = 0xFFFF_FFFF;

/// Bounds-checked reader over a byte slice
#[derive(Clone, Copy)]
pub(crate) struct Bytes<'a> {
    data: &'a [u8],
    what: &'static str,
}

impl<'a> Bytes<'a> {
    pub(crate) fn new(data: &'a [u8], what: &'static str) -> Self {
        Self { data, what }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn malformed(&self, reason: impl Into<String>) -> MetadataError {
        MetadataError::Malformed {
            what: self.what,
            reason: reason.into(),
        }
    }

    pub(crate) fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], MetadataError> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| self.malformed(format!("{len} bytes at offset {offset} out of range")))
    }

    pub(crate) fn u8(&self, offset: usize) -> Result<u8, MetadataError> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub(crate) fn u16(&self, offset: usize) -> Result<u16, MetadataError> {
        let b = self.slice(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&self, offset: usize) -> Result<u32, MetadataError> {
        let b = self.slice(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read the 8-byte chunk header at `offset`
    pub(crate) fn chunk(&self, offset: usize) -> Result<ChunkHeader, MetadataError> {
        let header = ChunkHeader {
            offset,
            kind: self.u16(offset)?,
            header_size: self.u16(offset + 2)? as usize,
            size: self.u32(offset + 4)? as usize,
        };
        if header.header_size < 8 || header.size < header.header_size {
            return Err(self.malformed(format!(
                "chunk 0x{:04x} at {offset} has header {} and size {}",
                header.kind, header.header_size, header.size
            )));
        }
        self.slice(offset, header.size)?;
        Ok(header)
    }

    /// Iterate the chunks laid out back to back in `[start, end)`
    pub(crate) fn chunks(&self, start: usize, end: usize) -> ChunkIter<'a> {
        ChunkIter {
            bytes: *self,
            next: start,
            end: end.min(self.len()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ChunkHeader {
    pub(crate) offset: usize,
    pub(crate) kind: u16,
    pub(crate) header_size: usize,
    pub(crate) size: usize,
}

impl ChunkHeader {
    pub(crate) fn body(&self) -> usize {
        self.offset + self.header_size
    }

    pub(crate) fn end(&self) -> usize {
        self.offset + self.size
    }
}

pub(crate) struct ChunkIter<'a> {
    bytes: Bytes<'a>,
    next: usize,
    end: usize,
}

impl Iterator for ChunkIter<'_> {
    type Item = Result<ChunkHeader, MetadataError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next + 8 > self.end {
            return None;
        }
        match self.bytes.chunk(self.next) {
            Ok(header) => {
                self.next = header.end();
                Some(Ok(header))
            }
            Err(e) => {
                self.next = self.end;
                Some(Err(e))
            }
        }
    }
}

/// Decoded `ResStringPool`
#[derive(Debug, Default, Clone)]
pub(crate) struct StringPool {
    strings: Vec<String>,
}

impl StringPool {
    pub(crate) fn parse(bytes: &Bytes<'_>, header: &ChunkHeader) -> Result<Self, MetadataError> {
        let base = header.offset;
        let count = bytes.u32(base + 8)? as usize;
        let flags = bytes.u32(base + 16)?;
        let strings_start = bytes.u32(base + 20)? as usize;
        let utf8 = flags & UTF8_FLAG != 0;

        // A count beyond what the chunk could hold is corrupt, not a reason to allocate
        if count > header.size / 4 {
            return Err(bytes.malformed(format!("string pool claims {count} strings")));
        }

        let mut strings = Vec::with_capacity(count);
        for i in 0..count {
            let offset = bytes.u32(header.body() + i * 4)? as usize;
            let at = base + strings_start + offset;
            if at >= header.end() {
                return Err(bytes.malformed(format!("string {i} starts past the pool")));
            }
            strings.push(if utf8 {
                read_utf8(bytes, at)?
            } else {
                read_utf16(bytes, at)?
            });
        }

        Ok(Self { strings })
    }

    pub(crate) fn get(&self, index: u32) -> Option<&str> {
        if index == NO_INDEX {
            return None;
        }
        self.strings.get(index as usize).map(String::as_str)
    }
}

fn read_utf8(bytes: &Bytes<'_>, at: usize) -> Result<String, MetadataError> {
    // UTF-16 length first (unused), then the UTF-8 byte length
    let (_, skip) = utf8_length(bytes, at)?;
    let (len, skip2) = utf8_length(bytes, at + skip)?;
    let raw = bytes.slice(at + skip + skip2, len)?;
    Ok(String::from_utf8_lossy(raw).into_owned())
}

fn utf8_length(bytes: &Bytes<'_>, at: usize) -> Result<(usize, usize), MetadataError> {
    let first = bytes.u8(at)? as usize;
    if first & 0x80 != 0 {
        let second = bytes.u8(at + 1)? as usize;
        Ok((((first & 0x7f) << 8) | second, 2))
    } else {
        Ok((first, 1))
    }
}

fn read_utf16(bytes: &Bytes<'_>, at: usize) -> Result<String, MetadataError> {
    let first = bytes.u16(at)? as usize;
    let (len, skip) = if first & 0x8000 != 0 {
        let second = bytes.u16(at + 2)? as usize;
        (((first & 0x7fff) << 16) | second, 4)
    } else {
        (first, 2)
    };
    let raw = bytes.slice(at + skip, len * 2)?;
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}

/// `Res_value` data types used by manifests and resource tables
pub(crate) mod value_type {
    pub(crate) const REFERENCE: u8 = 0x01;
    pub(crate) const STRING: u8 = 0x03;
    pub(crate) const INT_DEC: u8 = 0x10;
    pub(crate) const INT_HEX: u8 = 0x11;
    pub(crate) const INT_BOOLEAN: u8 = 0x12;
}

/// Typed value of a manifest attribute or resource entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResValue {
    /// Literal string
    String(String),
    /// Resource reference (`@0x7f...`)
    Reference(u32),
    /// Integer (decimal or hex)
    Int(u32),
    /// Boolean
    Bool(bool),
    /// Any other encoding, kept raw
    Other {
        /// `Res_value::dataType`
        data_type: u8,
        /// `Res_value::data`
        data: u32,
    },
}

impl ResValue {
    /// Decode a `Res_value` at `offset`, resolving string data through `pool`
    pub(crate) fn parse(
        bytes: &Bytes<'_>,
        offset: usize,
        pool: &StringPool,
    ) -> Result<Self, MetadataError> {
        let data_type = bytes.u8(offset + 3)?;
        let data = bytes.u32(offset + 4)?;
        Ok(match data_type {
            value_type::STRING => ResValue::String(
                pool.get(data)
                    .ok_or_else(|| bytes.malformed(format!("string index {data} out of range")))?
                    .to_string(),
            ),
            value_type::REFERENCE => ResValue::Reference(data),
            value_type::INT_DEC | value_type::INT_HEX => ResValue::Int(data),
            value_type::INT_BOOLEAN => ResValue::Bool(data != 0),
            _ => ResValue::Other { data_type, data },
        })
    }

    /// Render the value the way a manifest dump shows it
    pub fn as_text(&self) -> String {
        match self {
            ResValue::String(s) => s.clone(),
            ResValue::Reference(id) => format!("@0x{id:08x}"),
            ResValue::Int(v) => v.to_string(),
            ResValue::Bool(b) => b.to_string(),
            ResValue::Other { data, .. } => data.to_string(),
        }
    }
}
