//! DDL Generation for the typetables row store
//!
//! All record types share one physical table. These statements create it
//! when missing and never alter an existing table.

use crate::sql::sanitize::quote_identifier;

/// Generate CREATE TABLE for the shared row shape
///
/// Columns: id, parentid, tenantid, name and data (JSON object as text).
pub fn generate_create_table(table_name: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         id UUID PRIMARY KEY, \
         parentid UUID, \
         tenantid VARCHAR(255) NOT NULL, \
         name VARCHAR(255) NOT NULL, \
         data TEXT NOT NULL)",
        quote_identifier(table_name)
    )
}

/// Generate the lookup index every load uses (tenant, then type name)
pub fn generate_tenant_index(table_name: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} (tenantid, name)",
        quote_identifier(&format!("{}_tenantid_name_idx", table_name)),
        quote_identifier(table_name)
    )
}

/// Generate the index used to find the children of a row
pub fn generate_parent_index(table_name: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} (parentid)",
        quote_identifier(&format!("{}_parentid_idx", table_name)),
        quote_identifier(table_name)
    )
}
