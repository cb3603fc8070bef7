//! Android binary XML (the compiled `AndroidManifest.xml`).

use super::chunk::{
    Bytes, RES_STRING_POOL_TYPE, RES_XML_END_ELEMENT_TYPE, RES_XML_END_NAMESPACE_TYPE,
    RES_XML_RESOURCE_MAP_TYPE, RES_XML_START_ELEMENT_TYPE, RES_XML_START_NAMESPACE_TYPE,
    RES_XML_TYPE, ResValue, StringPool,
};
use crate::error::MetadataError;

/// Attribute of a start element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Namespace URI, if any
    pub namespace: Option<String>,
    /// Local name
    pub name: String,
    /// Framework resource id from the resource map (`android:` attributes)
    pub resource_id: Option<u32>,
    /// Typed value
    pub value: ResValue,
}

/// Start element with its nesting depth (root = 0)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Depth below the document root
    pub depth: usize,
    /// Local name
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<XmlAttribute>,
}

impl XmlElement {
    /// Find an attribute by framework resource id, falling back to its name.
    ///
    /// Shrinkers may strip attribute names, so the id is authoritative when present.
    pub fn attribute(&self, name: &str, resource_id: Option<u32>) -> Option<&ResValue> {
        resource_id
            .and_then(|id| self.attributes.iter().find(|a| a.resource_id == Some(id)))
            .or_else(|| self.attributes.iter().find(|a| a.name == name))
            .map(|a| &a.value)
    }
}

/// Flattened start elements of a binary XML document
#[derive(Debug, Clone, Default)]
pub struct XmlDocument {
    /// Start elements in document order
    pub elements: Vec<XmlElement>,
}

impl XmlDocument {
    /// Parse a compiled XML document
    pub fn parse(data: &[u8]) -> Result<Self, MetadataError> {
        let bytes = Bytes::new(data, "binary XML");
        let root = bytes.chunk(0)?;
        if root.kind != RES_XML_TYPE {
            return Err(bytes.malformed(format!("unexpected root chunk 0x{:04x}", root.kind)));
        }

        let mut pool = StringPool::default();
        let mut resource_map: Vec<u32> = Vec::new();
        let mut elements = Vec::new();
        let mut depth = 0usize;

        for chunk in bytes.chunks(root.body(), root.end()) {
            let chunk = chunk?;
            match chunk.kind {
                RES_STRING_POOL_TYPE => pool = StringPool::parse(&bytes, &chunk)?,
                RES_XML_RESOURCE_MAP_TYPE => {
                    let count = (chunk.size - chunk.header_size) / 4;
                    resource_map = (0..count)
                        .map(|i| bytes.u32(chunk.body() + i * 4))
                        .collect::<Result<_, _>>()?;
                }
                RES_XML_START_ELEMENT_TYPE => {
                    elements.push(parse_element(&bytes, chunk.body(), depth, &pool, &resource_map)?);
                    depth += 1;
                }
                RES_XML_END_ELEMENT_TYPE => depth = depth.saturating_sub(1),
                RES_XML_START_NAMESPACE_TYPE | RES_XML_END_NAMESPACE_TYPE => {}
                _ => {}
            }
        }

        Ok(Self { elements })
    }

    /// Document root element
    pub fn root(&self) -> Option<&XmlElement> {
        self.elements.first().filter(|e| e.depth == 0)
    }

    /// First element with the given name at the given depth
    pub fn find(&self, name: &str, depth: usize) -> Option<&XmlElement> {
        self.elements
            .iter()
            .find(|e| e.depth == depth && e.name == name)
    }
}

fn parse_element(
    bytes: &Bytes<'_>,
    ext: usize,
    depth: usize,
    pool: &StringPool,
    resource_map: &[u32],
) -> Result<XmlElement, MetadataError> {
    let name_index = bytes.u32(ext + 4)?;
    let attribute_start = bytes.u16(ext + 8)? as usize;
    let attribute_size = bytes.u16(ext + 10)? as usize;
    let attribute_count = bytes.u16(ext + 12)? as usize;

    if attribute_count > 0 && attribute_size < 20 {
        return Err(bytes.malformed(format!("attribute size {attribute_size} too small")));
    }

    let name = pool
        .get(name_index)
        .ok_or_else(|| bytes.malformed(format!("element name index {name_index} out of range")))?
        .to_string();

    let mut attributes = Vec::with_capacity(attribute_count);
    for i in 0..attribute_count {
        let at = ext + attribute_start + i * attribute_size;
        let ns_index = bytes.u32(at)?;
        let attr_name_index = bytes.u32(at + 4)?;
        let raw_index = bytes.u32(at + 8)?;

        let value = match ResValue::parse(bytes, at + 12, pool)? {
            // Some encoders only fill the raw value
            ResValue::Other { .. } if pool.get(raw_index).is_some() => {
                ResValue::String(pool.get(raw_index).unwrap_or_default().to_string())
            }
            value => value,
        };

        attributes.push(XmlAttribute {
            namespace: pool.get(ns_index).map(String::from),
            name: pool.get(attr_name_index).unwrap_or_default().to_string(),
            resource_id: resource_map.get(attr_name_index as usize).copied(),
            value,
        });
    }

    Ok(XmlElement {
        depth,
        name,
        attributes,
    })
}
