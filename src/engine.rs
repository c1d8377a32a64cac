//! ObjectEngine - hierarchical record persistence over one PostgreSQL table
//!
//! Every record type is multiplexed into the same row shape
//! `(id, parentid, tenantid, name, data)`. Each public call opens its own
//! connection, threads it through every recursive step and closes it before
//! returning.

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};
use sqlx::postgres::PgConnection;
use sqlx::{Connection, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ConnectionConfig;
use crate::error::{Result, StoreError};
use crate::mapper::to_record;
use crate::record::{PropertyValue, QuerySpec, Record, TenantContext};
use crate::sql::ddl;
use crate::sql::query::{
    QueryParam, Statement, build_select, existing_sql, insert_sql, update_sql,
};
use crate::sql::sanitize::{validate_name, validate_uuid};

type SaveFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Record>>> + Send + 'a>>;

/// Multi-tenant record store
///
/// Holds only its configuration. Connections are never pooled or cached:
/// one is opened per call and closed on every exit path.
#[derive(Debug, Clone)]
pub struct ObjectEngine {
    config: ConnectionConfig,
}

impl ObjectEngine {
    /// Create an engine, failing with `InvalidInput` if any credential is missing
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Create the row table and its indexes if they do not exist
    ///
    /// Never called implicitly; deployments that manage their own schema can
    /// skip it.
    pub async fn ensure_table(&self) -> Result<()> {
        let mut conn = self.connect().await?;
        let result = Self::create_table(&mut conn, &self.config.table_name).await;
        Self::release(conn, result).await
    }

    /// Load records of one type for a tenant
    ///
    /// Returns at most one record: the first row matching the query.
    pub async fn load(&self, tenant: &TenantContext, query: &QuerySpec) -> Result<Vec<Record>> {
        let statement = build_select(&self.config.table_name, &tenant.tenant_id, query)?;

        let mut conn = self.connect().await?;
        let result = Self::fetch_first(&mut conn, &statement, &query.type_developer_name).await;
        Self::release(conn, result).await
    }

    /// Save a sequence of records, descending into child collections
    ///
    /// Records are written in input order. Children are written before their
    /// parent row with `parentid` set to the parent's id. A failure aborts the
    /// rest of the sequence; rows already written stay written.
    pub async fn save(
        &self,
        tenant: &TenantContext,
        parent_id: Option<&str>,
        records: Vec<Record>,
    ) -> Result<Vec<Record>> {
        if tenant.tenant_id.is_empty() {
            return Err(StoreError::invalid_input(
                "TenantContext.tenant_id cannot be blank",
            ));
        }

        let parent_id = match parent_id.filter(|id| !id.is_empty()) {
            Some(id) => Some(validate_uuid(id)?),
            None => None,
        };

        if records.is_empty() {
            return Ok(Vec::new());
        }

        validate_records(&records)?;

        let mut conn = self.connect().await?;
        let result = self.save_with(&mut conn, tenant, parent_id, records).await;
        Self::release(conn, result).await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    async fn connect(&self) -> Result<PgConnection> {
        let options = self.config.connect_options()?;
        let conn = PgConnection::connect_with(&options).await.map_err(|e| {
            StoreError::connection(format!("Database connection failed: {}", e))
        })?;

        debug!(table = %self.config.table_name, "Opened connection");
        Ok(conn)
    }

    /// Close the connection, keeping the operation's own error if it failed
    async fn release<T>(conn: PgConnection, result: Result<T>) -> Result<T> {
        match conn.close().await {
            Ok(()) => {
                debug!("Closed connection");
                result
            }
            Err(close_err) => match result {
                Ok(_) => Err(StoreError::Sql(close_err)),
                Err(err) => {
                    warn!(error = %close_err, "Failed to close connection after error");
                    Err(err)
                }
            },
        }
    }

    async fn create_table(conn: &mut PgConnection, table_name: &str) -> Result<()> {
        for sql in [
            ddl::generate_create_table(table_name),
            ddl::generate_tenant_index(table_name),
            ddl::generate_parent_index(table_name),
        ] {
            sqlx::query(&sql).execute(&mut *conn).await?;
        }

        debug!(table = %table_name, "Ensured row table");
        Ok(())
    }

    async fn fetch_first(
        conn: &mut PgConnection,
        statement: &Statement,
        type_name: &str,
    ) -> Result<Vec<Record>> {
        debug!(sql = %statement.sql, params = statement.params.len(), "Executing load");

        let mut query = sqlx::query(&statement.sql);
        for param in &statement.params {
            query = match param {
                QueryParam::Text(value) => query.bind(value.as_str()),
                QueryParam::Uuid(value) => query.bind(*value),
                QueryParam::Int(value) => query.bind(*value),
            };
        }

        let Some(row) = query.fetch_optional(&mut *conn).await? else {
            return Ok(Vec::new());
        };

        let id: Uuid = row.try_get("id")?;
        let data: String = row.try_get("data")?;
        let payload: Map<String, Value> = serde_json::from_str(&data)?;

        Ok(to_record(type_name, &id.to_string(), Some(&payload))?
            .into_iter()
            .collect())
    }

    /// Fetch the raw payload of the row a save would overwrite
    ///
    /// A row whose payload is `{}` still exists and is returned as an empty
    /// map. More than one row under the same id is a conflict.
    async fn fetch_existing(
        conn: &mut PgConnection,
        table: &str,
        tenant_id: &str,
        type_name: &str,
        id: Uuid,
    ) -> Result<Option<Map<String, Value>>> {
        let rows = sqlx::query(&existing_sql(table))
            .bind(type_name)
            .bind(tenant_id)
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;

        if rows.len() > 1 {
            return Err(StoreError::conflict(format!(
                "The provided external identifier returns more than one result. The identifier is: '{}'",
                id
            )));
        }

        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let data: String = row.try_get("data")?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn save_with<'a>(
        &'a self,
        conn: &'a mut PgConnection,
        tenant: &'a TenantContext,
        parent_id: Option<Uuid>,
        records: Vec<Record>,
    ) -> SaveFuture<'a> {
        Box::pin(async move {
            let table = &self.config.table_name;
            let mut saved = Vec::with_capacity(records.len());

            for record in records {
                validate_name(&record.developer_name)?;

                let (id, existing) = match record.external_id.as_deref().filter(|id| !id.is_empty())
                {
                    Some(external_id) => {
                        let id = validate_uuid(external_id)?;
                        let existing = Self::fetch_existing(
                            &mut *conn,
                            table,
                            &tenant.tenant_id,
                            &record.developer_name,
                            id,
                        )
                        .await?;
                        (id, existing)
                    }
                    None => (Uuid::new_v4(), None),
                };

                let mut payload = Map::new();
                for property in record.properties {
                    validate_name(&property.developer_name)?;

                    match property.value {
                        PropertyValue::Children(children) => {
                            if !children.is_empty() {
                                self.save_with(&mut *conn, tenant, Some(id), children)
                                    .await?;
                            }
                        }
                        PropertyValue::Scalar(value) => {
                            payload.insert(property.developer_name, Value::String(value));
                        }
                    }
                }

                // Partial saves only carry changed properties; keep the rest.
                if let Some(existing) = &existing {
                    merge_existing(&mut payload, existing);
                }

                let data = serde_json::to_string(&payload)?;
                let sql = if existing.is_some() {
                    update_sql(table)
                } else {
                    insert_sql(table)
                };

                sqlx::query(&sql)
                    .bind(parent_id)
                    .bind(&record.developer_name)
                    .bind(&data)
                    .bind(id)
                    .bind(&tenant.tenant_id)
                    .execute(&mut *conn)
                    .await?;

                debug!(
                    id = %id,
                    name = %record.developer_name,
                    update = existing.is_some(),
                    "Saved record"
                );

                let id = id.to_string();
                let record = to_record(&record.developer_name, &id, Some(&payload))?
                    .unwrap_or_else(|| {
                        Record::new(&record.developer_name, Vec::new()).with_external_id(&id)
                    });
                saved.push(record);
            }

            Ok(saved)
        })
    }
}

/// Copy stored keys the incoming payload does not set
///
/// Stored nulls are dropped since they never map to a property.
fn merge_existing(payload: &mut Map<String, Value>, existing: &Map<String, Value>) {
    for (key, value) in existing {
        if key.is_empty() || value.is_null() || payload.contains_key(key) {
            continue;
        }
        payload.insert(key.clone(), value.clone());
    }
}

/// Check names and identifiers across the whole graph before any I/O
fn validate_records(records: &[Record]) -> Result<()> {
    for record in records {
        if record.developer_name.is_empty() {
            return Err(StoreError::invalid_input(
                "Record.developer_name cannot be blank",
            ));
        }
        validate_name(&record.developer_name)?;

        if let Some(id) = record.external_id.as_deref().filter(|id| !id.is_empty()) {
            validate_uuid(id)?;
        }

        for property in &record.properties {
            validate_name(&property.developer_name)?;
            if let PropertyValue::Children(children) = &property.value {
                validate_records(children)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Property;

    /// Nothing listens here, so any attempt to connect fails with a connection error
    fn unreachable_engine() -> ObjectEngine {
        ObjectEngine::new(
            ConnectionConfig::builder("postgres://127.0.0.1:1/none", "app", "secret").build(),
        )
        .unwrap()
    }

    fn tenant() -> TenantContext {
        TenantContext::new("tenant-a")
    }

    // =========================================================================
    // Construction Tests
    // =========================================================================

    #[test]
    fn test_new_rejects_missing_credentials() {
        let config = ConnectionConfig::builder("postgres://localhost/db", "", "secret").build();
        assert!(ObjectEngine::new(config).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_new_keeps_config() {
        let engine = unreachable_engine();
        assert_eq!(engine.config().table_name, "typetables");
    }

    // =========================================================================
    // Load Validation Tests (fail before any I/O)
    // =========================================================================

    #[tokio::test]
    async fn test_load_blank_tenant_fails_before_connecting() {
        let err = unreachable_engine()
            .load(&TenantContext::new(""), &QuerySpec::new("order"))
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_load_unsafe_type_fails_before_connecting() {
        let err = unreachable_engine()
            .load(&tenant(), &QuerySpec::new("Order"))
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_load_reports_connection_failure_as_storage_error() {
        let err = unreachable_engine()
            .load(&tenant(), &QuerySpec::new("order"))
            .await
            .unwrap_err();
        assert!(err.is_storage());
    }

    // =========================================================================
    // Save Validation Tests (fail before any I/O)
    // =========================================================================

    #[tokio::test]
    async fn test_save_blank_tenant_fails() {
        let records = vec![Record::new("order", vec![Property::new("color", "red")])];
        let err = unreachable_engine()
            .save(&TenantContext::new(""), None, records)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_save_malformed_parent_id_fails() {
        let records = vec![Record::new("order", vec![Property::new("color", "red")])];
        let err = unreachable_engine()
            .save(&tenant(), Some("not-a-uuid"), records)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_save_empty_sequence_does_not_connect() {
        let saved = unreachable_engine()
            .save(&tenant(), None, Vec::new())
            .await
            .unwrap();
        assert!(saved.is_empty());
    }

    #[tokio::test]
    async fn test_save_malformed_external_id_fails_without_writing() {
        let records = vec![
            Record::new("order", vec![Property::new("color", "red")]).with_external_id("12345"),
        ];
        let err = unreachable_engine()
            .save(&tenant(), None, records)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_save_unsafe_child_property_fails_without_writing() {
        let child = Record::new("line", vec![Property::new("Bad Name", "x")]);
        let records = vec![Record::new(
            "order",
            vec![
                Property::new("color", "red"),
                Property::children("lines", vec![child]),
            ],
        )];
        let err = unreachable_engine()
            .save(&tenant(), None, records)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    // =========================================================================
    // validate_records Tests
    // =========================================================================

    #[test]
    fn test_validate_records_blank_type_name() {
        let records = vec![Record::new("", vec![])];
        assert!(validate_records(&records).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_validate_records_accepts_nested_graph() {
        let id = Uuid::new_v4().to_string();
        let records = vec![
            Record::new(
                "order",
                vec![
                    Property::new("color", "red"),
                    Property::children("lines", vec![Record::new("line", vec![])]),
                ],
            )
            .with_external_id(id),
        ];
        assert!(validate_records(&records).is_ok());
    }

    // =========================================================================
    // merge_existing Tests
    // =========================================================================

    #[test]
    fn test_merge_keeps_incoming_values() {
        let mut payload = Map::new();
        payload.insert("size".to_string(), Value::String("L".to_string()));

        let existing = serde_json::json!({"color": "red", "size": "M"});
        merge_existing(&mut payload, existing.as_object().unwrap());

        assert_eq!(payload["size"], "L");
        assert_eq!(payload["color"], "red");
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_merge_from_empty_stored_payload() {
        let mut payload = Map::new();
        payload.insert("color".to_string(), Value::String("red".to_string()));

        merge_existing(&mut payload, &Map::new());

        assert_eq!(payload.len(), 1);
        assert_eq!(payload["color"], "red");
    }

    #[test]
    fn test_merge_skips_nulls_and_blank_keys() {
        let mut payload = Map::new();
        let existing = serde_json::json!({"": "x", "note": null, "qty": 3});
        merge_existing(&mut payload, existing.as_object().unwrap());

        assert_eq!(payload.len(), 1);
        assert_eq!(payload["qty"], 3);
    }
}
