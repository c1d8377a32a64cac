//! # typetable-store
//!
//! A multi-tenant object store that keeps records of any shape in a single
//! PostgreSQL table, one JSON payload per row.
//!
//! ## Features
//!
//! - **Schema Bindings**: Map a type's developer-facing names to safe table and column names
//! - **Hierarchical Saves**: Child record collections are stored as separate rows linked by parent id
//! - **Partial Updates**: Saving a subset of properties never drops the ones already stored
//! - **Tenant Isolation**: Every read and write is scoped by the caller's tenant id
//! - **SQL Injection Prevention**: Identifiers are validated and every literal value is bound
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use typetable_store::{ConnectionConfig, ObjectEngine, Property, QuerySpec, Record, TenantContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::builder("postgres://localhost/mydb", "app", "secret").build();
//!     let engine = ObjectEngine::new(config)?;
//!     let tenant = TenantContext::new("acme");
//!
//!     // Create a record with a child collection
//!     let saved = engine
//!         .save(
//!             &tenant,
//!             None,
//!             vec![Record::new(
//!                 "order",
//!                 vec![
//!                     Property::new("color", "red"),
//!                     Property::children(
//!                         "lines",
//!                         vec![Record::new("line", vec![Property::new("sku", "A-1")])],
//!                     ),
//!                 ],
//!             )],
//!         )
//!         .await?;
//!
//!     // Load it back by id
//!     let id = saved[0].external_id.clone().unwrap_or_default();
//!     let loaded = engine.load(&tenant, &QuerySpec::by_id("order", id)).await?;
//!     assert_eq!(loaded[0].value("color"), Some("red"));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Storage
//!
//! All types share one table (default `typetables`) with the columns
//! `id, parentid, tenantid, name, data`. `ObjectEngine::ensure_table` creates
//! it when missing.

pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod record;
pub mod service;
pub mod sql;
pub mod types;

// Re-export main types for convenience
pub use binding::generate_binding;
pub use config::{ConnectionConfig, ConnectionConfigBuilder, DEFAULT_TABLE_NAME};
pub use engine::ObjectEngine;
pub use error::{Result, StoreError};
pub use mapper::to_record;
pub use record::{
    ComparisonType, CriteriaType, OrderDirection, Property, PropertyValue, QuerySpec, Record,
    TenantContext, WhereClause,
};
pub use service::{DataResponse, DataService, LoadRequest, ObjectDataType, SaveRequest};
pub use types::{
    BindingDescriptor, ContentType, PropertyBinding, PropertyDescriptor, TypeDescriptor,
};

// Re-export SQL utilities for advanced users
pub use sql::sanitize::{quote_identifier, sanitize, validate_name, validate_uuid};
