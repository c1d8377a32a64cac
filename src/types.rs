//! Type description and binding definitions
//!
//! A `TypeDescriptor` is the developer-facing shape of a record type. A
//! `BindingDescriptor` maps it onto storage-safe table and column names.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Content Types
// ============================================================================

/// Kind of content held by a type property
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContentType {
    ContentString,
    ContentNumber,
    ContentDateTime,
    ContentBoolean,
    ContentPassword,
    ContentContent,
    ContentObject,
    ContentList,
    ContentEncrypted,
}

impl ContentType {
    /// Wire name of the content type, also used as the database content type
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::ContentString => "ContentString",
            ContentType::ContentNumber => "ContentNumber",
            ContentType::ContentDateTime => "ContentDateTime",
            ContentType::ContentBoolean => "ContentBoolean",
            ContentType::ContentPassword => "ContentPassword",
            ContentType::ContentContent => "ContentContent",
            ContentType::ContentObject => "ContentObject",
            ContentType::ContentList => "ContentList",
            ContentType::ContentEncrypted => "ContentEncrypted",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Type Descriptors
// ============================================================================

/// A property of a type, as authored by the developer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub id: String,
    pub developer_name: String,
    pub content_type: ContentType,
}

impl PropertyDescriptor {
    pub fn new(
        id: impl Into<String>,
        developer_name: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        Self {
            id: id.into(),
            developer_name: developer_name.into(),
            content_type,
        }
    }
}

/// A record type, as authored by the developer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub developer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_summary: Option<String>,
    /// Owning service definition. Required to bind, cleared once bound.
    pub service_element_id: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub bindings: Vec<BindingDescriptor>,
}

impl TypeDescriptor {
    pub fn new(developer_name: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Self {
        Self {
            developer_name: developer_name.into(),
            properties,
            ..Default::default()
        }
    }

    pub fn with_service_element_id(mut self, service_element_id: impl Into<String>) -> Self {
        self.service_element_id = Some(service_element_id.into());
        self
    }
}

// ============================================================================
// Binding Descriptors
// ============================================================================

/// Storage mapping for one type property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyBinding {
    pub type_element_property_id: String,
    pub database_field_name: String,
    pub database_content_type: String,
}

/// Storage mapping generated for a type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BindingDescriptor {
    pub developer_name: String,
    pub developer_summary: String,
    pub database_table_name: String,
    pub service_element_id: String,
    pub property_bindings: Vec<PropertyBinding>,
}
