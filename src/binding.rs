//! Binding generation
//!
//! Derives the storage mapping for a developer-authored type.

use crate::error::{Result, StoreError};
use crate::sql::sanitize::sanitize;
use crate::types::{BindingDescriptor, PropertyBinding, TypeDescriptor};

/// Generate the binding for a type
///
/// On success the type's bindings are replaced by the single generated
/// binding and its `service_element_id` is cleared, so the bound type is no
/// longer managed as service metadata. The type is left untouched on error.
pub fn generate_binding(type_descriptor: &mut TypeDescriptor) -> Result<BindingDescriptor> {
    if type_descriptor.developer_name.is_empty() {
        return Err(StoreError::invalid_input(
            "TypeDescriptor.developer_name cannot be blank when generating a binding",
        ));
    }

    if type_descriptor.properties.is_empty() {
        return Err(StoreError::invalid_input(
            "TypeDescriptor.properties cannot be empty. A binding needs at least one property",
        ));
    }

    let service_element_id = match type_descriptor.service_element_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(StoreError::invalid_input(
                "TypeDescriptor.service_element_id cannot be blank. It is needed to bind the type to its service",
            ));
        }
    };

    let property_bindings = type_descriptor
        .properties
        .iter()
        .map(|property| {
            Ok(PropertyBinding {
                type_element_property_id: property.id.clone(),
                database_field_name: sanitize(&property.developer_name)?,
                database_content_type: property.content_type.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let binding = BindingDescriptor {
        developer_name: format!("{} Binding", type_descriptor.developer_name),
        developer_summary: format!(
            "The automatic binding created for {}",
            type_descriptor.developer_name
        ),
        database_table_name: sanitize(&type_descriptor.developer_name)?,
        service_element_id,
        property_bindings,
    };

    type_descriptor.bindings = vec![binding.clone()];
    type_descriptor.service_element_id = None;

    Ok(binding)
}
