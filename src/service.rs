//! Service facade over the engine and binding generator
//!
//! Request and response shapes exchanged with the transport layer. Each
//! call receives the tenant and connection credentials for that request.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binding::generate_binding;
use crate::config::ConnectionConfig;
use crate::engine::ObjectEngine;
use crate::error::{Result, StoreError};
use crate::record::{QuerySpec, Record, TenantContext};
use crate::types::TypeDescriptor;

/// Request to load records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
    pub query: QuerySpec,
}

impl LoadRequest {
    pub fn new(query: QuerySpec) -> Self {
        Self {
            culture: None,
            query,
        }
    }
}

/// Type being saved, with the names of the properties it carries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDataType {
    pub developer_name: String,
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Request to save records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
    pub object_data_type: ObjectDataType,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl SaveRequest {
    pub fn new(object_data_type: ObjectDataType, records: Vec<Record>) -> Self {
        Self {
            culture: None,
            object_data_type,
            records,
        }
    }
}

/// Records returned to the transport layer, echoing the request culture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
    pub records: Vec<Record>,
}

/// Entry point used by the transport layer
#[derive(Debug, Clone, Default)]
pub struct DataService;

impl DataService {
    pub fn new() -> Self {
        Self
    }

    pub async fn load(
        &self,
        tenant: &TenantContext,
        config: ConnectionConfig,
        request: LoadRequest,
    ) -> Result<DataResponse> {
        let engine = ObjectEngine::new(config)?;
        let records = engine.load(tenant, &request.query).await?;

        Ok(DataResponse {
            culture: request.culture,
            records,
        })
    }

    /// Save every record in the request as a top-level record
    ///
    /// An empty record list returns an empty response without touching the
    /// database or validating the credentials.
    pub async fn save(
        &self,
        tenant: &TenantContext,
        config: ConnectionConfig,
        request: SaveRequest,
    ) -> Result<DataResponse> {
        if request.object_data_type.developer_name.is_empty() {
            return Err(StoreError::invalid_input(
                "SaveRequest.object_data_type.developer_name must be provided",
            ));
        }

        if request.object_data_type.properties.is_empty() {
            return Err(StoreError::invalid_input(
                "SaveRequest.object_data_type.properties must be provided. They list the fields included in the data",
            ));
        }

        if request.records.is_empty() {
            return Ok(DataResponse {
                culture: request.culture,
                records: Vec::new(),
            });
        }

        let engine = ObjectEngine::new(config)?;
        let records = engine.save(tenant, None, request.records).await?;

        debug!(
            type_name = %request.object_data_type.developer_name,
            count = records.len(),
            "Saved records"
        );

        Ok(DataResponse {
            culture: request.culture,
            records,
        })
    }

    /// Generate the binding for a type and return the bound type
    pub fn describe_binding(&self, mut type_descriptor: TypeDescriptor) -> Result<TypeDescriptor> {
        generate_binding(&mut type_descriptor)?;
        Ok(type_descriptor)
    }
}
