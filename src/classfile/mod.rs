//! JVM class-file model and reader.
//!
//! Only the structural parts needed for API extraction are kept: names,
//! access flags, the supertype references, field and method signatures, and
//! the `InnerClasses` attribute. Code and all other attributes are skipped.

pub mod builder;
pub mod descriptor;
pub mod parser;

pub use descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use parser::parse_class;

use thiserror::Error;

/// Access and property flags of a class, field, method, or nested class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    /// `ACC_PUBLIC`.
    pub const PUBLIC: u16 = 0x0001;
    /// `ACC_PRIVATE`.
    pub const PRIVATE: u16 = 0x0002;
    /// `ACC_PROTECTED`.
    pub const PROTECTED: u16 = 0x0004;
    /// `ACC_STATIC`.
    pub const STATIC: u16 = 0x0008;
    /// `ACC_FINAL`.
    pub const FINAL: u16 = 0x0010;
    /// `ACC_SUPER` on classes.
    pub const SUPER: u16 = 0x0020;
    /// `ACC_INTERFACE`.
    pub const INTERFACE: u16 = 0x0200;
    /// `ACC_ABSTRACT`.
    pub const ABSTRACT: u16 = 0x0400;

    /// Returns `true` if every bit of `flag` is set.
    #[must_use]
    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    /// Returns `true` for `ACC_PUBLIC`.
    #[must_use]
    pub fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    /// Returns `true` for `ACC_STATIC`.
    #[must_use]
    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    /// Returns `true` for `ACC_INTERFACE`.
    #[must_use]
    pub fn is_interface(self) -> bool {
        self.contains(Self::INTERFACE)
    }
}

/// A field or method as declared in a class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Member access flags.
    pub access: AccessFlags,
    /// Simple member name (`<init>` for constructors).
    pub name: String,
    /// Raw JVM descriptor, e.g. `(ILjava/lang/String;)V`.
    pub descriptor: String,
}

/// One row of the `InnerClasses` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassEntry {
    /// Binary name of the nested class.
    pub inner: String,
    /// Binary name of the enclosing class, absent for local and anonymous classes.
    pub outer: Option<String>,
    /// Access flags as declared in source.
    pub access: AccessFlags,
}

/// Structural view of a parsed class file.
///
/// All class names are binary names with `.` separators
/// (`java.lang.String`, `com.example.Outer$Inner`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
    /// Binary name of this class.
    pub name: String,
    /// Class access flags.
    pub access: AccessFlags,
    /// Direct superclass; `None` only for `java.lang.Object`.
    pub super_name: Option<String>,
    /// Directly implemented (or, for interfaces, extended) interfaces.
    pub interfaces: Vec<String>,
    /// Declared fields in declaration order.
    pub fields: Vec<MemberInfo>,
    /// Declared methods in declaration order.
    pub methods: Vec<MemberInfo>,
    /// Entries of the `InnerClasses` attribute.
    pub inner_classes: Vec<InnerClassEntry>,
}

impl ClassFile {
    /// Returns `true` if this class file declares an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }

    /// Member classes whose enclosing class is this class, in attribute order.
    pub fn member_classes(&self) -> impl Iterator<Item = &InnerClassEntry> {
        self.inner_classes
            .iter()
            .filter(move |entry| entry.outer.as_deref() == Some(self.name.as_str()))
    }
}

/// Errors raised while decoding a class file or a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassFormatError {
    /// The input ended before a complete structure was read.
    #[error("unexpected end of class data at offset {offset}")]
    Truncated {
        /// Byte offset where more data was needed.
        offset: usize,
    },
    /// The leading magic number was not `0xCAFEBABE`.
    #[error("bad magic number {found:#010x}")]
    BadMagic {
        /// The value actually read.
        found: u32,
    },
    /// A constant pool entry carried an unknown tag.
    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag {
        /// The tag byte.
        tag: u8,
        /// Constant pool index of the entry.
        index: u16,
    },
    /// A constant pool reference pointed at a missing or mistyped entry.
    #[error("constant pool index {index} is not a valid {expected} entry")]
    BadConstantIndex {
        /// The index that was referenced.
        index: u16,
        /// The entry kind that was expected.
        expected: &'static str,
    },
    /// A `CONSTANT_Utf8` entry held invalid modified UTF-8.
    #[error("invalid modified UTF-8 in constant pool entry {index}")]
    BadUtf8 {
        /// Constant pool index of the entry.
        index: u16,
    },
    /// A field or method descriptor did not follow the JVM grammar.
    #[error("malformed descriptor `{descriptor}`")]
    BadDescriptor {
        /// The descriptor text.
        descriptor: String,
    },
}
