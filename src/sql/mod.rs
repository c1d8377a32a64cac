//! SQL utilities for the typetable store
//!
//! Provides identifier sanitization, statement building and DDL generation.

pub mod ddl;
pub mod query;
pub mod sanitize;

pub use query::{QueryParam, Statement, build_select};
pub use sanitize::{quote_identifier, sanitize, validate_name, validate_uuid};
