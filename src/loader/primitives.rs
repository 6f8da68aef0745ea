//! Fixed primitive and `void` pseudo-type table.

use std::fmt;

/// A JVM primitive type or `void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `void`
    Void,
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `double`
    Double,
    /// `float`
    Float,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `short`
    Short,
}

impl Primitive {
    /// Every pseudo-type, in the order the names are usually listed.
    pub const ALL: [Primitive; 9] = [
        Primitive::Void,
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Char,
        Primitive::Double,
        Primitive::Float,
        Primitive::Int,
        Primitive::Long,
        Primitive::Short,
    ];

    /// Looks up a primitive by its Java keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Looks up a primitive by its descriptor character (`I`, `J`, `V`, ...).
    #[must_use]
    pub fn from_descriptor(code: char) -> Option<Self> {
        crate::classfile::descriptor::primitive_keyword(code).and_then(Self::from_name)
    }

    /// The Java keyword.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Short => "short",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
