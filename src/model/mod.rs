//! API snapshot model: structural description of requested public types.

use serde::{Deserialize, Serialize};

/// A possibly-array type reference.
///
/// For arrays, `basename` names the innermost component type and `dimension`
/// is the nesting depth; scalars have dimension 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Binary name or primitive keyword of the (innermost component) type.
    pub basename: String,
    /// Array nesting depth.
    pub dimension: u32,
}

impl TypeRef {
    /// A non-array reference.
    #[must_use]
    pub fn scalar(basename: &str) -> Self {
        Self { basename: basename.to_string(), dimension: 0 }
    }
}

/// A publicly visible field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Declared field type.
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

/// A method parameter, identified by position only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Zero-based position in the parameter list.
    pub position: usize,
    /// Declared parameter type.
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

impl ParameterDescriptor {
    /// Synthesized parameter name, `arg<position>`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("arg{}", self.position)
    }
}

/// A publicly visible method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name.
    pub name: String,
    /// Declared return type (`void` for none).
    pub return_type: TypeRef,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterDescriptor>,
}

/// Structural description of one class and its public member classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Binary name of the class.
    pub name: String,
    /// Publicly visible fields, declared first, then inherited.
    pub fields: Vec<FieldDescriptor>,
    /// Publicly visible methods, declared first, then inherited.
    pub methods: Vec<MethodDescriptor>,
    /// Public member classes not already visited in this root walk.
    pub nested_classes: Vec<ClassDescriptor>,
}

/// Ordered root class descriptors, one per requested name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSnapshot {
    /// Root descriptors in request order.
    pub classes: Vec<ClassDescriptor>,
}
