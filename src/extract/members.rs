//! Public member views of a class, including inherited members.

use std::collections::HashSet;
use std::rc::Rc;

use crate::classfile::{ClassFile, InnerClassEntry, MemberInfo};
use crate::loader::{ClassLoader, ClassSource, LoadError};

fn is_initializer(member: &MemberInfo) -> bool {
    member.name == "<init>" || member.name == "<clinit>"
}

/// Superclass chain starting at `class` itself, ending at the hierarchy root.
fn superclass_chain(
    loader: &ClassLoader<'_>,
    class: &Rc<ClassFile>,
) -> Result<Vec<Rc<ClassFile>>, LoadError> {
    let mut chain = vec![Rc::clone(class)];
    let mut seen: HashSet<String> = HashSet::from([class.name.clone()]);
    while let Some(super_name) = chain.last().and_then(|c| c.super_name.clone()) {
        if !seen.insert(super_name.clone()) {
            break;
        }
        let owner = chain.last().map(|c| c.name.clone()).unwrap_or_default();
        chain.push(loader.require_class(&super_name, &owner)?);
    }
    Ok(chain)
}

/// All superinterfaces reachable from `classes`, breadth first, each once.
fn superinterfaces(
    loader: &ClassLoader<'_>,
    classes: &[Rc<ClassFile>],
) -> Result<Vec<Rc<ClassFile>>, LoadError> {
    let mut seen = HashSet::new();
    let mut queue: Vec<(String, String)> = classes
        .iter()
        .flat_map(|c| c.interfaces.iter().map(|i| (i.clone(), c.name.clone())))
        .collect();
    let mut found = Vec::new();
    let mut cursor = 0;
    while cursor < queue.len() {
        let (name, owner) = queue[cursor].clone();
        cursor += 1;
        if !seen.insert(name.clone()) {
            continue;
        }
        let interface = loader.require_class(&name, &owner)?;
        queue.extend(interface.interfaces.iter().map(|i| (i.clone(), name.clone())));
        found.push(interface);
    }
    Ok(found)
}

/// Types whose members `class` inherits: the class, its superclasses
/// (none for interfaces), then its superinterfaces.
fn ancestry(
    loader: &ClassLoader<'_>,
    class: &Rc<ClassFile>,
) -> Result<(Vec<Rc<ClassFile>>, Vec<Rc<ClassFile>>), LoadError> {
    let classes = if class.is_interface() {
        vec![Rc::clone(class)]
    } else {
        superclass_chain(loader, class)?
    };
    let interfaces = superinterfaces(loader, &classes)?;
    Ok((classes, interfaces))
}

/// Publicly visible fields: declared, then from superinterfaces, then from
/// superclasses. Each declaring type contributes once.
///
/// # Errors
///
/// Returns [`LoadError::ClassDefinitionMissing`] if an ancestor is gone.
pub fn public_fields(
    loader: &ClassLoader<'_>,
    class: &Rc<ClassFile>,
) -> Result<Vec<MemberInfo>, LoadError> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();
    collect_fields(loader, class, &mut seen, &mut fields)?;
    Ok(fields)
}

fn collect_fields(
    loader: &ClassLoader<'_>,
    class: &Rc<ClassFile>,
    seen: &mut HashSet<String>,
    out: &mut Vec<MemberInfo>,
) -> Result<(), LoadError> {
    if !seen.insert(class.name.clone()) {
        return Ok(());
    }
    out.extend(class.fields.iter().filter(|f| f.access.is_public()).cloned());
    for interface in &class.interfaces {
        let interface = loader.require_class(interface, &class.name)?;
        collect_fields(loader, &interface, seen, out)?;
    }
    if let Some(super_name) = &class.super_name {
        if !class.is_interface() {
            let superclass = loader.require_class(super_name, &class.name)?;
            collect_fields(loader, &superclass, seen, out)?;
        }
    }
    Ok(())
}

/// Publicly visible methods: declared, then superclass chain, then non-static
/// superinterface methods. Initializers are excluded and a method already
/// contributed by a more derived type is not repeated.
///
/// # Errors
///
/// Returns [`LoadError::ClassDefinitionMissing`] if an ancestor is gone.
pub fn public_methods(
    loader: &ClassLoader<'_>,
    class: &Rc<ClassFile>,
) -> Result<Vec<MemberInfo>, LoadError> {
    let (classes, interfaces) = ancestry(loader, class)?;
    let mut signatures = HashSet::new();
    let mut methods = Vec::new();

    let inherited_from_interfaces = interfaces
        .iter()
        .flat_map(|i| i.methods.iter().filter(|m| !m.access.is_static()));
    let candidates = classes
        .iter()
        .flat_map(|c| c.methods.iter())
        .chain(inherited_from_interfaces);

    for method in candidates {
        if !method.access.is_public() || is_initializer(method) {
            continue;
        }
        if signatures.insert((method.name.clone(), method.descriptor.clone())) {
            methods.push(method.clone());
        }
    }
    Ok(methods)
}

/// Ancestors of `class` whose members are not known: built-in core types
/// other than `java.lang.Object`, and opaque platform stand-ins.
///
/// # Errors
///
/// Returns [`LoadError::ClassDefinitionMissing`] if an ancestor is gone.
pub fn undescribed_ancestors(
    loader: &ClassLoader<'_>,
    class: &Rc<ClassFile>,
) -> Result<Vec<String>, LoadError> {
    let (classes, interfaces) = ancestry(loader, class)?;
    Ok(classes
        .iter()
        .skip(1)
        .chain(&interfaces)
        .filter(|ancestor| match loader.source_of(&ancestor.name) {
            Some(ClassSource::Opaque) => true,
            Some(ClassSource::Bootstrap) => ancestor.super_name.is_some(),
            _ => false,
        })
        .map(|ancestor| ancestor.name.clone())
        .collect())
}

/// Public member classes: declared, then those inherited from superclasses.
///
/// # Errors
///
/// Returns [`LoadError::ClassDefinitionMissing`] if a superclass is gone.
pub fn public_member_classes(
    loader: &ClassLoader<'_>,
    class: &Rc<ClassFile>,
) -> Result<Vec<InnerClassEntry>, LoadError> {
    let (classes, _) = ancestry(loader, class)?;
    let mut seen = HashSet::new();
    let mut nested = Vec::new();
    for owner in &classes {
        for entry in owner.member_classes() {
            if entry.access.is_public() && seen.insert(entry.inner.clone()) {
                nested.push(entry.clone());
            }
        }
    }
    Ok(nested)
}
