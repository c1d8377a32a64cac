//! Runtime record types
//!
//! Includes Record, Property, QuerySpec and the tenant identity every load
//! and save is scoped by.

use serde::{Deserialize, Serialize};

// ============================================================================
// Tenant
// ============================================================================

/// Authenticated identity for one request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TenantContext {
    pub tenant_id: String,
}

impl TenantContext {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// Value held by a record property
///
/// `Children` is a one-to-many relationship. Child records are stored as
/// their own rows and never embedded in the parent's payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PropertyValue {
    #[serde(rename = "contentValue")]
    Scalar(String),
    #[serde(rename = "objectData")]
    Children(Vec<Record>),
}

/// A named property of a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "PropertyWire")]
pub struct Property {
    pub developer_name: String,
    #[serde(flatten)]
    pub value: PropertyValue,
}

/// Incoming property shape; either value field may be null or absent
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyWire {
    #[serde(default)]
    developer_name: String,
    #[serde(default)]
    content_value: Option<String>,
    #[serde(default)]
    object_data: Option<Vec<Record>>,
}

impl From<PropertyWire> for Property {
    fn from(wire: PropertyWire) -> Self {
        let value = match wire.object_data {
            Some(records) => PropertyValue::Children(records),
            None => PropertyValue::Scalar(wire.content_value.unwrap_or_default()),
        };
        Self {
            developer_name: wire.developer_name,
            value,
        }
    }
}

impl Property {
    /// Create a scalar property
    pub fn new(developer_name: impl Into<String>, content_value: impl Into<String>) -> Self {
        Self {
            developer_name: developer_name.into(),
            value: PropertyValue::Scalar(content_value.into()),
        }
    }

    /// Create a property holding child records
    pub fn children(developer_name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            developer_name: developer_name.into(),
            value: PropertyValue::Children(records),
        }
    }

    /// The scalar value, if this is not a child collection
    pub fn content_value(&self) -> Option<&str> {
        match &self.value {
            PropertyValue::Scalar(value) => Some(value),
            PropertyValue::Children(_) => None,
        }
    }
}

/// A stored object of any type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Type name of the record
    pub developer_name: String,
    /// Row identity (UUID). Assigned on first save when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Record {
    pub fn new(developer_name: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            developer_name: developer_name.into(),
            external_id: None,
            properties,
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Look up a property by developer name
    pub fn property(&self, developer_name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.developer_name == developer_name)
    }

    /// Look up a scalar property value by developer name
    pub fn value(&self, developer_name: &str) -> Option<&str> {
        self.property(developer_name).and_then(Property::content_value)
    }
}

// ============================================================================
// Query Types
// ============================================================================

/// How where clauses are combined
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComparisonType {
    #[default]
    And,
    Or,
}

impl ComparisonType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ComparisonType::And => "AND",
            ComparisonType::Or => "OR",
        }
    }
}

/// Comparison applied by a where clause
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CriteriaType {
    #[default]
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    IsEmpty,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    /// Parse a direction, ignoring case. Anything but ASC or DESC is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("ASC") {
            Some(OrderDirection::Asc)
        } else if value.eq_ignore_ascii_case("DESC") {
            Some(OrderDirection::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// A single filter predicate on a payload key
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WhereClause {
    pub column_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria_type: Option<CriteriaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_value: Option<String>,
}

impl WhereClause {
    pub fn new(
        column_name: impl Into<String>,
        criteria_type: CriteriaType,
        content_value: impl Into<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            criteria_type: Some(criteria_type),
            content_value: Some(content_value.into()),
        }
    }

    /// Equality predicate with the default criteria
    pub fn equal(column_name: impl Into<String>, content_value: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            criteria_type: None,
            content_value: Some(content_value.into()),
        }
    }
}

/// Load request for records of one type
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    pub type_developer_name: String,
    /// Exact match on the row id. When set every other filter is ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_type: Option<ComparisonType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by_direction: Option<String>,
    /// Free-text search. Not supported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default)]
    pub where_clauses: Vec<WhereClause>,
}

impl QuerySpec {
    pub fn new(type_developer_name: impl Into<String>) -> Self {
        Self {
            type_developer_name: type_developer_name.into(),
            ..Default::default()
        }
    }

    /// Query for a single row by id
    pub fn by_id(type_developer_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(type_developer_name).id(id)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id_filter = Some(id.into());
        self
    }

    pub fn comparison(mut self, comparison_type: ComparisonType) -> Self {
        self.comparison_type = Some(comparison_type);
        self
    }

    pub fn filter(mut self, clause: WhereClause) -> Self {
        self.where_clauses.push(clause);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        self.order_by_field = Some(field.into());
        self.order_by_direction = Some(direction.into());
        self
    }

    pub fn paginate(mut self, offset: i64, limit: i64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}
