//! API model extraction: walks requested classes into an [`ApiSnapshot`].

pub mod members;

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::classfile::{parse_field_descriptor, parse_method_descriptor, ClassFile, MemberInfo};
use crate::error::ToolError;
use crate::loader::{ClassLoader, LoadError};
use crate::model::{
    ApiSnapshot, ClassDescriptor, FieldDescriptor, MethodDescriptor, ParameterDescriptor,
};

/// Builds an [`ApiSnapshot`] with one root descriptor per requested name.
///
/// Each root is walked depth first with its own visited set, so a class
/// reachable from two roots appears under both, but never twice under one.
///
/// # Errors
///
/// Returns [`ToolError::Configuration`] when `names` is empty,
/// [`ToolError::Resolution`] when a requested name is not found, and the
/// stale-build or malformed-class errors from loading the hierarchy.
pub fn extract(loader: &ClassLoader<'_>, names: &[String]) -> Result<ApiSnapshot, ToolError> {
    if names.is_empty() {
        return Err(ToolError::Configuration("at least one class name is required".to_string()));
    }

    let mut classes = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        let class = loader
            .load_class(name)?
            .ok_or_else(|| LoadError::ClassNotFound { name: name.to_string() })?;
        let mut visited = HashSet::new();
        if let Some(descriptor) = walk(loader, &class, &mut visited)? {
            classes.push(descriptor);
        }
    }
    Ok(ApiSnapshot { classes })
}

fn walk(
    loader: &ClassLoader<'_>,
    class: &Rc<ClassFile>,
    visited: &mut HashSet<String>,
) -> Result<Option<ClassDescriptor>, LoadError> {
    if !visited.insert(class.name.clone()) {
        debug!(name = %class.name, "already visited in this walk");
        return Ok(None);
    }
    debug!(name = %class.name, "walking class");
    for ancestor in members::undescribed_ancestors(loader, class)? {
        warn!(
            class = %class.name,
            ancestor,
            "members inherited from this platform type are not listed; \
             set --platform-root or JAVA_HOME to include them"
        );
    }

    let fields = members::public_fields(loader, class)?
        .iter()
        .map(|field| describe_field(&class.name, field))
        .collect::<Result<Vec<_>, _>>()?;
    let methods = members::public_methods(loader, class)?
        .iter()
        .map(|method| describe_method(&class.name, method))
        .collect::<Result<Vec<_>, _>>()?;

    let mut nested_classes = Vec::new();
    for entry in members::public_member_classes(loader, class)? {
        let nested = loader.require_class(&entry.inner, &class.name)?;
        if let Some(descriptor) = walk(loader, &nested, visited)? {
            nested_classes.push(descriptor);
        }
    }

    Ok(Some(ClassDescriptor { name: class.name.clone(), fields, methods, nested_classes }))
}

fn describe_field(owner: &str, field: &MemberInfo) -> Result<FieldDescriptor, LoadError> {
    let type_ref = parse_field_descriptor(&field.descriptor)
        .map_err(|source| LoadError::Malformed { name: owner.to_string(), source })?;
    Ok(FieldDescriptor { name: field.name.clone(), type_ref })
}

fn describe_method(owner: &str, method: &MemberInfo) -> Result<MethodDescriptor, LoadError> {
    let (params, return_type) = parse_method_descriptor(&method.descriptor)
        .map_err(|source| LoadError::Malformed { name: owner.to_string(), source })?;
    let parameters = params
        .into_iter()
        .enumerate()
        .map(|(position, type_ref)| ParameterDescriptor { position, type_ref })
        .collect();
    Ok(MethodDescriptor { name: method.name.clone(), return_type, parameters })
}
