//! Type substitutability: may a value of one type stand in for another?
//!
//! Follows JVM assignment compatibility without boxing or generics:
//! identity, primitive widening, reference subtyping, and array covariance.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use crate::classfile::ClassFile;
use crate::error::ToolError;
use crate::loader::{ClassLoader, LoadError, Primitive, TypeHandle};

const OBJECT: &str = "java.lang.Object";

/// Types every array is assignable to.
const ARRAY_SUPERTYPES: [&str; 3] =
    [OBJECT, "java.lang.Cloneable", "java.io.Serializable"];

/// Primitive widening conversions, `(from, to)`.
const WIDENING: &[(Primitive, Primitive)] = &[
    (Primitive::Byte, Primitive::Short),
    (Primitive::Byte, Primitive::Int),
    (Primitive::Byte, Primitive::Long),
    (Primitive::Byte, Primitive::Float),
    (Primitive::Byte, Primitive::Double),
    (Primitive::Short, Primitive::Int),
    (Primitive::Short, Primitive::Long),
    (Primitive::Short, Primitive::Float),
    (Primitive::Short, Primitive::Double),
    (Primitive::Char, Primitive::Int),
    (Primitive::Char, Primitive::Long),
    (Primitive::Char, Primitive::Float),
    (Primitive::Char, Primitive::Double),
    (Primitive::Int, Primitive::Long),
    (Primitive::Int, Primitive::Float),
    (Primitive::Int, Primitive::Double),
    (Primitive::Long, Primitive::Float),
    (Primitive::Long, Primitive::Double),
    (Primitive::Float, Primitive::Double),
];

/// Returns `true` if `from` widens to `to`.
#[must_use]
pub fn widens(from: Primitive, to: Primitive) -> bool {
    WIDENING.contains(&(from, to))
}

/// Decides whether `to_name` may replace `from_name`.
///
/// A name that resolves to nothing is never substitutable, on either side.
///
/// # Errors
///
/// Returns [`ToolError::StaleBuild`] if a hierarchy the decision needs has a
/// missing ancestor, or [`ToolError::MalformedClass`] for undecodable classes.
pub fn is_substitutable(
    loader: &ClassLoader<'_>,
    from_name: &str,
    to_name: &str,
) -> Result<bool, ToolError> {
    let Some(expected) = loader.resolve(from_name)? else {
        debug!(from_name, "expected type does not resolve");
        return Ok(false);
    };
    let Some(candidate) = loader.resolve(to_name)? else {
        debug!(to_name, "candidate type does not resolve");
        return Ok(false);
    };
    let result = is_assignable(loader, &expected, &candidate)?;
    debug!(from = %expected.name(), to = %candidate.name(), result, "substitutability decided");
    Ok(result)
}

/// Returns `true` if a value of `source` can be assigned to `target`.
///
/// # Errors
///
/// Returns [`LoadError::ClassDefinitionMissing`] if an ancestor of `source` is gone.
pub fn is_assignable(
    loader: &ClassLoader<'_>,
    target: &TypeHandle,
    source: &TypeHandle,
) -> Result<bool, LoadError> {
    match (target, source) {
        (TypeHandle::Class(t), TypeHandle::Class(_) | TypeHandle::Array(_))
            if t.name == OBJECT =>
        {
            Ok(true)
        }
        (TypeHandle::Primitive(t), TypeHandle::Primitive(s)) => Ok(t == s || widens(*s, *t)),
        (TypeHandle::Class(t), TypeHandle::Class(s)) => is_subtype(loader, s, &t.name),
        (TypeHandle::Class(t), TypeHandle::Array(_)) => {
            Ok(ARRAY_SUPERTYPES.contains(&t.name.as_str()))
        }
        (TypeHandle::Array(t), TypeHandle::Array(s)) => match (t.as_ref(), s.as_ref()) {
            (TypeHandle::Primitive(t), TypeHandle::Primitive(s)) => Ok(t == s),
            (TypeHandle::Primitive(_), _) | (_, TypeHandle::Primitive(_)) => Ok(false),
            (t, s) => is_assignable(loader, t, s),
        },
        _ => Ok(false),
    }
}

/// Walks `class`'s superclasses and superinterfaces looking for `target`.
fn is_subtype(
    loader: &ClassLoader<'_>,
    class: &Rc<ClassFile>,
    target: &str,
) -> Result<bool, LoadError> {
    let mut seen = HashSet::new();
    let mut pending = vec![Rc::clone(class)];
    while let Some(current) = pending.pop() {
        if current.name == target {
            return Ok(true);
        }
        if !seen.insert(current.name.clone()) {
            continue;
        }
        let parents = current.super_name.iter().chain(current.interfaces.iter());
        for parent in parents {
            if parent == target {
                return Ok(true);
            }
            if !seen.contains(parent) {
                pending.push(loader.require_class(parent, &current.name)?);
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;
    use crate::classfile::builder::ClassFileBuilder;
    use std::path::Path;

    const ROOT: &str = "/classes";

    fn zoo() -> MemoryFileSystem {
        let root = Path::new(ROOT);
        let mut fs = MemoryFileSystem::new();
        fs.insert_class(root, &ClassFileBuilder::interface("zoo.Feeds"));
        fs.insert_class(root, &ClassFileBuilder::interface("zoo.Pet").implements("zoo.Feeds"));
        fs.insert_class(root, &ClassFileBuilder::class("zoo.Animal"));
        fs.insert_class(
            root,
            &ClassFileBuilder::class("zoo.Dog").extends("zoo.Animal").implements("zoo.Pet"),
        );
        fs.insert_class(root, &ClassFileBuilder::class("zoo.Puppy").extends("zoo.Dog"));
        fs.insert_class(root, &ClassFileBuilder::class("zoo.Rock"));
        fs.insert_class(
            root,
            &ClassFileBuilder::class("zoo.Failure").extends("java.lang.RuntimeException"),
        );
        fs
    }

    fn check(fs: &MemoryFileSystem, from: &str, to: &str) -> bool {
        let loader = ClassLoader::open(fs, Path::new(ROOT), None).unwrap();
        is_substitutable(&loader, from, to).unwrap()
    }

    #[test]
    fn reflexive_for_every_resolvable_type() {
        let fs = zoo();
        for name in [
            "int",
            "void",
            "boolean",
            "zoo.Dog",
            "zoo.Pet",
            "java.lang.String",
            "int[]",
            "zoo.Dog[][]",
        ] {
            assert!(check(&fs, name, name), "{name}");
        }
    }

    #[test]
    fn subclass_and_interface_subtyping() {
        let fs = zoo();
        assert!(check(&fs, "zoo.Animal", "zoo.Puppy"));
        assert!(check(&fs, "zoo.Pet", "zoo.Puppy"));
        assert!(check(&fs, "zoo.Feeds", "zoo.Dog"));
        assert!(!check(&fs, "zoo.Puppy", "zoo.Animal"));
        assert!(!check(&fs, "zoo.Pet", "zoo.Rock"));
        assert!(check(&fs, "java.lang.Exception", "zoo.Failure"));
        assert!(check(&fs, "java.io.Serializable", "zoo.Failure"));
    }

    #[test]
    fn object_accepts_every_reference_type() {
        let fs = zoo();
        for name in ["zoo.Dog", "zoo.Feeds", "zoo.Rock", "java.lang.Integer", "int[]", "zoo.Pet[]"]
        {
            assert!(check(&fs, "java.lang.Object", name), "{name}");
        }
        assert!(!check(&fs, "java.lang.Object", "int"));
    }

    #[test]
    fn primitive_widening_table() {
        let fs = zoo();
        for (from, to) in WIDENING {
            assert!(check(&fs, to.name(), from.name()), "{from} -> {to}");
            assert!(!check(&fs, from.name(), to.name()), "{to} -/-> {from}");
        }
        assert!(!check(&fs, "int", "boolean"));
        assert!(!check(&fs, "char", "short"));
        assert!(!check(&fs, "short", "char"));
        assert!(!check(&fs, "void", "int"));
    }

    #[test]
    fn no_boxing_either_way() {
        let fs = zoo();
        assert!(!check(&fs, "java.lang.Integer", "int"));
        assert!(!check(&fs, "int", "java.lang.Integer"));
        assert!(!check(&fs, "long", "java.lang.Integer"));
        assert!(check(&fs, "java.lang.Number", "java.lang.Integer"));
    }

    #[test]
    fn array_rules() {
        let fs = zoo();
        assert!(check(&fs, "zoo.Animal[]", "zoo.Dog[]"));
        assert!(check(&fs, "java.lang.Object[]", "zoo.Dog[][]"));
        assert!(check(&fs, "java.lang.Cloneable", "int[]"));
        assert!(check(&fs, "java.io.Serializable", "[Lzoo.Dog;"));
        assert!(!check(&fs, "zoo.Dog[]", "zoo.Animal[]"));
        assert!(!check(&fs, "long[]", "int[]"));
        assert!(!check(&fs, "java.lang.Object[]", "int[]"));
        assert!(!check(&fs, "int[]", "int[][]"));
        assert!(!check(&fs, "zoo.Pet", "zoo.Dog[]"));
    }

    #[test]
    fn unresolvable_names_are_not_substitutable() {
        let fs = zoo();
        assert!(!check(&fs, "zoo.Dog", "Nonexistent.Type"));
        assert!(!check(&fs, "Nonexistent.Type", "zoo.Dog"));
        assert!(!check(&fs, "java.lang.Object", "Nonexistent.Type[]"));
    }

    #[test]
    fn undefined_platform_ancestors_are_opaque() {
        let mut fs = zoo();
        let root = Path::new(ROOT);
        fs.insert_class(
            root,
            &ClassFileBuilder::class("app.MyList").extends("java.util.ArrayList"),
        );
        fs.insert_class(
            root,
            &ClassFileBuilder::class("app.Task").implements("java.util.function.Supplier"),
        );
        assert!(check(&fs, "java.lang.Object", "app.MyList"));
        assert!(check(&fs, "app.MyList", "app.MyList"));
        assert!(check(&fs, "java.lang.Object", "app.Task"));
        assert!(!check(&fs, "java.lang.Runnable", "app.Task"));
        assert!(!check(&fs, "java.util.List", "app.MyList"));
        assert!(!check(&fs, "zoo.Animal", "app.MyList"));
    }

    #[test]
    fn missing_ancestor_is_a_stale_build() {
        let mut fs = zoo();
        let ghost = ClassFileBuilder::class("zoo.Ghost").extends("zoo.Gone");
        fs.insert_class(Path::new(ROOT), &ghost);
        let loader = ClassLoader::open(&fs, Path::new(ROOT), None).unwrap();
        let err = is_substitutable(&loader, "zoo.Animal", "zoo.Ghost").unwrap_err();
        assert!(matches!(err, ToolError::StaleBuild(_)));
    }
}
