//! Statement building for the typetables row store
//!
//! Identifiers are validated structurally; every literal value, including
//! payload keys, is passed as a bound parameter.

use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::record::{CriteriaType, OrderDirection, QuerySpec, WhereClause};
use crate::sql::sanitize::{quote_identifier, validate_name, validate_uuid};

/// Expression extracting the payload key bound at placeholder `n` as text
fn payload_key(n: usize) -> String {
    format!("(CAST(data AS jsonb) ->> ${})", n)
}

/// A value bound to a statement placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Uuid(Uuid),
    Int(i64),
}

/// SQL text with its positional parameters (`$1`, `$2`, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl Statement {
    fn new(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    /// Add a parameter and return its placeholder number
    fn push(&mut self, param: QueryParam) -> usize {
        self.params.push(param);
        self.params.len()
    }
}

/// Build the SELECT for a load request
///
/// Always scoped by type name and tenant. An id filter is exclusive: every
/// other filter field is ignored and left unvalidated.
pub fn build_select(table: &str, tenant_id: &str, query: &QuerySpec) -> Result<Statement> {
    if tenant_id.is_empty() {
        return Err(StoreError::invalid_input(
            "TenantContext.tenant_id cannot be blank",
        ));
    }

    if query.type_developer_name.is_empty() {
        return Err(StoreError::invalid_input(
            "QuerySpec.type_developer_name must be provided. It determines the type of data to be loaded",
        ));
    }
    validate_name(&query.type_developer_name)?;

    if query.search.as_deref().is_some_and(|s| !s.is_empty()) {
        return Err(StoreError::invalid_input(
            "QuerySpec.search is not supported",
        ));
    }

    let mut statement = Statement::new(format!(
        "SELECT id, data FROM {} WHERE name = $1 AND tenantid = $2",
        quote_identifier(table)
    ));
    statement.push(QueryParam::Text(query.type_developer_name.clone()));
    statement.push(QueryParam::Text(tenant_id.to_string()));

    if let Some(id) = query.id_filter.as_deref().filter(|id| !id.is_empty()) {
        let id = validate_uuid(id)?;
        let n = statement.push(QueryParam::Uuid(id));
        statement.sql.push_str(&format!(" AND id = ${}", n));
        return Ok(statement);
    }

    if query.limit.is_some_and(|limit| limit < 1) {
        return Err(StoreError::invalid_input(
            "QuerySpec.limit cannot be less than 1. A limit of less than 1 will not return any data",
        ));
    }

    if query.offset.is_some_and(|offset| offset < 0) {
        return Err(StoreError::invalid_input(
            "QuerySpec.offset cannot be less than 0",
        ));
    }

    let direction = match query.order_by_direction.as_deref() {
        None | Some("") => OrderDirection::Asc,
        Some(value) => OrderDirection::parse(value).ok_or_else(|| {
            StoreError::invalid_input(format!(
                "QuerySpec.order_by_direction '{}' isn't valid. Please provide ASC, DESC or nothing",
                value
            ))
        })?,
    };

    let comparison = query.comparison_type.unwrap_or_default();
    let mut predicates = Vec::new();
    for clause in &query.where_clauses {
        if let Some(predicate) = build_predicate(&mut statement, clause)? {
            predicates.push(predicate);
        }
    }
    if !predicates.is_empty() {
        statement.sql.push_str(&format!(
            " AND ({})",
            predicates.join(&format!(" {} ", comparison.as_sql()))
        ));
    }

    if let Some(field) = query.order_by_field.as_deref().filter(|f| !f.is_empty()) {
        validate_name(field)?;
        let n = statement.push(QueryParam::Text(field.to_string()));
        statement.sql.push_str(&format!(
            " ORDER BY {} {}",
            payload_key(n),
            direction.as_sql()
        ));
    }

    if let Some(limit) = query.limit {
        let n = statement.push(QueryParam::Int(limit));
        statement.sql.push_str(&format!(" LIMIT ${}", n));
    }

    if let Some(offset) = query.offset {
        let n = statement.push(QueryParam::Int(offset));
        statement.sql.push_str(&format!(" OFFSET ${}", n));
    }

    Ok(statement)
}

/// Build one where-clause predicate
///
/// Returns `None` when a value-taking criteria has no value, meaning the
/// clause places no constraint on the result.
fn build_predicate(statement: &mut Statement, clause: &WhereClause) -> Result<Option<String>> {
    if clause.column_name.is_empty() {
        return Err(StoreError::invalid_input(
            "QuerySpec.where_clauses[].column_name must be provided for every where clause",
        ));
    }
    validate_name(&clause.column_name)?;

    let criteria = clause.criteria_type.unwrap_or_default();
    let value = clause.content_value.as_deref().filter(|v| !v.is_empty());

    if criteria != CriteriaType::IsEmpty && value.is_none() {
        return Ok(None);
    }

    let key_n = statement.push(QueryParam::Text(clause.column_name.clone()));
    let key = payload_key(key_n);

    let Some(value) = value else {
        return Ok(Some(format!("({} IS NULL OR {} = '')", key, key)));
    };

    let (operator, bound) = match criteria {
        CriteriaType::Equal => ("=", value.to_string()),
        CriteriaType::NotEqual => ("IS DISTINCT FROM", value.to_string()),
        CriteriaType::GreaterThan => (">", value.to_string()),
        CriteriaType::GreaterThanOrEqual => (">=", value.to_string()),
        CriteriaType::LessThan => ("<", value.to_string()),
        CriteriaType::LessThanOrEqual => ("<=", value.to_string()),
        CriteriaType::Contains => ("LIKE", format!("%{}%", escape_like(value))),
        CriteriaType::StartsWith => ("LIKE", format!("{}%", escape_like(value))),
        CriteriaType::EndsWith => ("LIKE", format!("%{}", escape_like(value))),
        CriteriaType::IsEmpty => {
            return Ok(Some(format!("({} IS NULL OR {} = '')", key, key)));
        }
    };

    let value_n = statement.push(QueryParam::Text(bound));
    Ok(Some(format!("{} {} ${}", key, operator, value_n)))
}

/// Escape LIKE wildcards so the value matches literally
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Existing-row lookup for a save; parameters are name, tenantid, id
///
/// Fetches up to two rows so a duplicated id can be detected.
pub fn existing_sql(table: &str) -> String {
    format!(
        "SELECT id, data FROM {} WHERE name = $1 AND tenantid = $2 AND id = $3 LIMIT 2",
        quote_identifier(table)
    )
}

/// UPDATE for an existing row; parameters are parentid, name, data, id, tenantid
pub fn update_sql(table: &str) -> String {
    format!(
        "UPDATE {} SET parentid = $1, name = $2, data = $3 WHERE id = $4 AND tenantid = $5",
        quote_identifier(table)
    )
}

/// INSERT for a new row; parameters are parentid, name, data, id, tenantid
pub fn insert_sql(table: &str) -> String {
    format!(
        "INSERT INTO {} (parentid, name, data, id, tenantid) VALUES ($1, $2, $3, $4, $5)",
        quote_identifier(table)
    )
}
