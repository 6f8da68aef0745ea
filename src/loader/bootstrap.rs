//! Built-in definitions of core platform types.
//!
//! Artifact roots rarely contain `java.lang.Object` or the other types every
//! class hierarchy ends in, so a small table stands in for the platform class
//! loader. Only `java.lang.Object` carries members; the rest provide the
//! hierarchy needed for assignability.

use crate::classfile::{AccessFlags, ClassFile, MemberInfo};

const OBJECT: &str = "java.lang.Object";

const CLASS: u16 = AccessFlags::PUBLIC | AccessFlags::SUPER;
const FINAL_CLASS: u16 = CLASS | AccessFlags::FINAL;
const ABSTRACT_CLASS: u16 = CLASS | AccessFlags::ABSTRACT;
const INTERFACE: u16 = AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT;

/// `(name, access, superclass, interfaces)`; interfaces report `Object` as
/// their superclass, as class files do.
const HIERARCHY: &[(&str, u16, &str, &[&str])] = &[
    ("java.io.Serializable", INTERFACE, OBJECT, &[]),
    ("java.lang.Cloneable", INTERFACE, OBJECT, &[]),
    ("java.lang.Comparable", INTERFACE, OBJECT, &[]),
    ("java.lang.CharSequence", INTERFACE, OBJECT, &[]),
    ("java.lang.Iterable", INTERFACE, OBJECT, &[]),
    ("java.lang.Runnable", INTERFACE, OBJECT, &[]),
    ("java.lang.AutoCloseable", INTERFACE, OBJECT, &[]),
    ("java.io.Closeable", INTERFACE, OBJECT, &["java.lang.AutoCloseable"]),
    ("java.lang.annotation.Annotation", INTERFACE, OBJECT, &[]),
    ("java.util.Collection", INTERFACE, OBJECT, &["java.lang.Iterable"]),
    ("java.util.List", INTERFACE, OBJECT, &["java.util.Collection"]),
    ("java.util.Set", INTERFACE, OBJECT, &["java.util.Collection"]),
    ("java.util.Map", INTERFACE, OBJECT, &[]),
    (
        "java.lang.String",
        FINAL_CLASS,
        OBJECT,
        &["java.io.Serializable", "java.lang.Comparable", "java.lang.CharSequence"],
    ),
    ("java.lang.Class", FINAL_CLASS, OBJECT, &["java.io.Serializable"]),
    ("java.lang.Number", ABSTRACT_CLASS, OBJECT, &["java.io.Serializable"]),
    ("java.lang.Byte", FINAL_CLASS, "java.lang.Number", &["java.lang.Comparable"]),
    ("java.lang.Short", FINAL_CLASS, "java.lang.Number", &["java.lang.Comparable"]),
    ("java.lang.Integer", FINAL_CLASS, "java.lang.Number", &["java.lang.Comparable"]),
    ("java.lang.Long", FINAL_CLASS, "java.lang.Number", &["java.lang.Comparable"]),
    ("java.lang.Float", FINAL_CLASS, "java.lang.Number", &["java.lang.Comparable"]),
    ("java.lang.Double", FINAL_CLASS, "java.lang.Number", &["java.lang.Comparable"]),
    (
        "java.lang.Boolean",
        FINAL_CLASS,
        OBJECT,
        &["java.io.Serializable", "java.lang.Comparable"],
    ),
    (
        "java.lang.Character",
        FINAL_CLASS,
        OBJECT,
        &["java.io.Serializable", "java.lang.Comparable"],
    ),
    ("java.lang.Void", FINAL_CLASS, OBJECT, &[]),
    (
        "java.lang.Enum",
        ABSTRACT_CLASS,
        OBJECT,
        &["java.lang.Comparable", "java.io.Serializable"],
    ),
    ("java.lang.Record", ABSTRACT_CLASS, OBJECT, &[]),
    ("java.lang.Throwable", CLASS, OBJECT, &["java.io.Serializable"]),
    ("java.lang.Exception", CLASS, "java.lang.Throwable", &[]),
    ("java.lang.RuntimeException", CLASS, "java.lang.Exception", &[]),
    ("java.lang.Error", CLASS, "java.lang.Throwable", &[]),
];

/// Public methods of `java.lang.Object` in declaration order.
const OBJECT_METHODS: &[(u16, &str, &str)] = &[
    (AccessFlags::PUBLIC | AccessFlags::FINAL, "getClass", "()Ljava/lang/Class;"),
    (AccessFlags::PUBLIC, "hashCode", "()I"),
    (AccessFlags::PUBLIC, "equals", "(Ljava/lang/Object;)Z"),
    (AccessFlags::PUBLIC, "toString", "()Ljava/lang/String;"),
    (AccessFlags::PUBLIC | AccessFlags::FINAL, "notify", "()V"),
    (AccessFlags::PUBLIC | AccessFlags::FINAL, "notifyAll", "()V"),
    (AccessFlags::PUBLIC | AccessFlags::FINAL, "wait", "()V"),
    (AccessFlags::PUBLIC | AccessFlags::FINAL, "wait", "(J)V"),
    (AccessFlags::PUBLIC | AccessFlags::FINAL, "wait", "(JI)V"),
];

/// Returns the built-in definition of `name`, if it is one of the core types.
#[must_use]
pub fn bootstrap_class(name: &str) -> Option<ClassFile> {
    if name == OBJECT {
        let methods = OBJECT_METHODS
            .iter()
            .map(|(access, name, descriptor)| MemberInfo {
                access: AccessFlags(*access),
                name: (*name).to_string(),
                descriptor: (*descriptor).to_string(),
            })
            .collect();
        return Some(ClassFile {
            name: OBJECT.to_string(),
            access: AccessFlags(CLASS),
            super_name: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods,
            inner_classes: Vec::new(),
        });
    }

    let (name, access, super_name, interfaces) =
        HIERARCHY.iter().find(|(candidate, ..)| *candidate == name)?;
    Some(ClassFile {
        name: (*name).to_string(),
        access: AccessFlags(*access),
        super_name: Some((*super_name).to_string()),
        interfaces: interfaces.iter().map(|i| (*i).to_string()).collect(),
        fields: Vec::new(),
        methods: Vec::new(),
        inner_classes: Vec::new(),
    })
}

/// Package prefixes of types the platform class loader supplies.
const PLATFORM_PACKAGES: [&str; 3] = ["java.", "javax.", "jdk."];

/// Returns `true` if `name` belongs to a platform package.
#[must_use]
pub fn is_platform_name(name: &str) -> bool {
    PLATFORM_PACKAGES.iter().any(|prefix| name.starts_with(prefix))
}

/// A memberless public class extending `java.lang.Object`, used for platform
/// ancestors that no layer defines.
#[must_use]
pub fn opaque_class(name: &str) -> ClassFile {
    ClassFile {
        name: name.to_string(),
        access: AccessFlags(CLASS),
        super_name: Some(OBJECT.to_string()),
        interfaces: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
        inner_classes: Vec::new(),
    }
}
