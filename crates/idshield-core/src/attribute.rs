//! Attribute tree node model
//!
//! A snapshot is a list of top-level [`Attribute`]s. Each attribute carries a
//! name, a (possibly spatial) value, a free-form type and an ordered list of
//! sub-attributes. Metadata such as identities, exemption codes and session
//! records is stored as ordinary sub-attributes with reserved names.

use serde::{Deserialize, Serialize};

/// One node of the attribute tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: SpatialString,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub attribute_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_attributes: Vec<Attribute>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<SpatialString>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attribute_type: String::new(),
            sub_attributes: Vec::new(),
        }
    }

    pub fn with_type(mut self, attribute_type: impl Into<String>) -> Self {
        self.attribute_type = attribute_type.into();
        self
    }

    pub fn with_child(mut self, child: Attribute) -> Self {
        self.sub_attributes.push(child);
        self
    }

    pub fn text(&self) -> &str {
        &self.value.text
    }

    pub fn is_spatial(&self) -> bool {
        self.value.spatial.is_some()
    }

    /// First direct child with the given name (case-insensitive)
    pub fn child(&self, name: &str) -> Option<&Attribute> {
        self.sub_attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.sub_attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// All direct children with the given name
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.sub_attributes
            .iter()
            .filter(move |a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn push(&mut self, child: Attribute) {
        self.sub_attributes.push(child);
    }

    /// Remove every direct child with the given name, returning how many were removed
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.sub_attributes.len();
        self.sub_attributes.retain(|a| !a.name.eq_ignore_ascii_case(name));
        before - self.sub_attributes.len()
    }

    /// Replace (or insert) the single child with `child.name`
    pub fn set_child(&mut self, child: Attribute) {
        match self.child_mut(&child.name) {
            Some(existing) => *existing = child,
            None => self.sub_attributes.push(child),
        }
    }
}

/// Text value with optional location information
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpatialString {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial: Option<SpatialInfo>,
}

impl SpatialString {
    pub fn text_span(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            spatial: Some(SpatialInfo::Text { start, end }),
        }
    }

    pub fn raster(text: impl Into<String>, page: u32, zones: Vec<RasterZone>) -> Self {
        Self {
            text: text.into(),
            spatial: Some(SpatialInfo::Raster { page, zones }),
        }
    }
}

impl From<&str> for SpatialString {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            spatial: None,
        }
    }
}

impl From<String> for SpatialString {
    fn from(text: String) -> Self {
        Self {
            text,
            spatial: None,
        }
    }
}

/// Where a value was found in the source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpatialInfo {
    /// Inclusive character span in the source text
    Text { start: usize, end: usize },
    /// Image zones on one page
    Raster { page: u32, zones: Vec<RasterZone> },
}

/// Rectangle on a page image, described by its center line and height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterZone {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub height: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_lookup_is_case_insensitive() {
        let attr = Attribute::new("HCData", "123-45-6789")
            .with_child(Attribute::new("_IDAndRevision", "4"));

        assert!(attr.child("_idandrevision").is_some());
        assert!(attr.child("_Missing").is_none());
    }

    #[test]
    fn test_set_child_replaces_existing() {
        let mut attr =
            Attribute::new("HCData", "x").with_child(Attribute::new("_IDAndRevision", "1"));
        attr.set_child(Attribute::new("_IDAndRevision", "2"));

        assert_eq!(attr.sub_attributes.len(), 1);
        assert_eq!(attr.child("_IDAndRevision").unwrap().text(), "2");
    }

    #[test]
    fn test_remove_children() {
        let mut attr = Attribute::new("_OldRevisions", "")
            .with_child(Attribute::new("HCData", "a"))
            .with_child(Attribute::new("LCData", "b"))
            .with_child(Attribute::new("HCData", "c"));

        assert_eq!(attr.remove_children("hcdata"), 2);
        assert_eq!(attr.sub_attributes.len(), 1);
    }

    #[test]
    fn test_spatial_serialization() {
        let value = SpatialString::text_span("Jones", 10, 14);
        let json = serde_json::to_value(&value).unwrap();

        assert_eq!(json["spatial"]["kind"], "text");
        let parsed: SpatialString = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, value);
    }
}
