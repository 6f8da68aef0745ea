//! Minimal class-file encoder.
//!
//! Produces structurally valid class files without method bodies, which is
//! all the reader looks at. Used to materialize artifact roots in tests.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::AccessFlags;
use crate::loader::archive::JMOD_MAGIC;

#[derive(Default)]
struct PoolWriter {
    bytes: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl PoolWriter {
    fn new() -> Self {
        Self { next_index: 1, ..Self::default() }
    }

    fn utf8(&mut self, text: &str) -> u16 {
        if let Some(index) = self.utf8.get(text) {
            return *index;
        }
        let index = self.next_index;
        self.bytes.push(1);
        let encoded = encode_modified_utf8(text);
        push_u16(&mut self.bytes, u16::try_from(encoded.len()).unwrap_or(u16::MAX));
        self.bytes.extend_from_slice(&encoded);
        self.next_index += 1;
        self.utf8.insert(text.to_string(), index);
        index
    }

    /// Interns a class reference from a dotted binary name.
    fn class(&mut self, binary_name: &str) -> u16 {
        if let Some(index) = self.classes.get(binary_name) {
            return *index;
        }
        let name_index = self.utf8(&binary_name.replace('.', "/"));
        let index = self.next_index;
        self.bytes.push(7);
        push_u16(&mut self.bytes, name_index);
        self.next_index += 1;
        self.classes.insert(binary_name.to_string(), index);
        index
    }

    fn long(&mut self, value: i64) {
        self.bytes.push(5);
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self.next_index += 2;
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn encode_modified_utf8(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for unit in text.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) as u8 & 0x1F));
                out.push(0x80 | (unit as u8 & 0x3F));
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) as u8 & 0x0F));
                out.push(0x80 | ((unit >> 6) as u8 & 0x3F));
                out.push(0x80 | (unit as u8 & 0x3F));
            }
        }
    }
    out
}

struct Member {
    access: u16,
    name: String,
    descriptor: String,
}

struct Nested {
    inner: String,
    access: u16,
}

/// Fluent builder for a single class file.
pub struct ClassFileBuilder {
    name: String,
    access: u16,
    super_name: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    nested: Vec<Nested>,
    long_constants: Vec<i64>,
}

impl ClassFileBuilder {
    /// Starts a public class extending `java.lang.Object`.
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self {
            name: name.to_string(),
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            super_name: Some("java.lang.Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
            long_constants: Vec::new(),
        }
    }

    /// Binary name of the class being built.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts a public interface.
    #[must_use]
    pub fn interface(name: &str) -> Self {
        let mut builder = Self::class(name);
        builder.access = AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT;
        builder
    }

    /// Sets the direct superclass.
    #[must_use]
    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_name = Some(super_name.to_string());
        self
    }

    /// Removes the superclass, as only `java.lang.Object` has.
    #[must_use]
    pub fn no_superclass(mut self) -> Self {
        self.super_name = None;
        self
    }

    /// Adds a direct superinterface.
    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    /// Adds a field with explicit access flags.
    #[must_use]
    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.fields.push(Member {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    /// Adds a public field.
    #[must_use]
    pub fn public_field(self, name: &str, descriptor: &str) -> Self {
        self.field(AccessFlags::PUBLIC, name, descriptor)
    }

    /// Adds a method with explicit access flags.
    #[must_use]
    pub fn method(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.methods.push(Member {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    /// Adds a public method.
    #[must_use]
    pub fn public_method(self, name: &str, descriptor: &str) -> Self {
        self.method(AccessFlags::PUBLIC, name, descriptor)
    }

    /// Records a member class of this class in the `InnerClasses` attribute.
    #[must_use]
    pub fn member_class(mut self, inner: &str, access: u16) -> Self {
        self.nested.push(Nested { inner: inner.to_string(), access });
        self
    }

    /// Records a public static member class.
    #[must_use]
    pub fn public_member_class(self, inner: &str) -> Self {
        self.member_class(inner, AccessFlags::PUBLIC | AccessFlags::STATIC)
    }

    /// Adds an otherwise unused `CONSTANT_Long` to the pool.
    #[must_use]
    pub fn long_constant(mut self, value: i64) -> Self {
        self.long_constants.push(value);
        self
    }

    /// Encodes the class file.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolWriter::new();
        for value in &self.long_constants {
            pool.long(*value);
        }

        let this_index = pool.class(&self.name);
        let super_index = self.super_name.as_deref().map_or(0, |name| pool.class(name));
        let interface_indices: Vec<u16> =
            self.interfaces.iter().map(|name| pool.class(name)).collect();
        let fields = encode_members(&mut pool, &self.fields);
        let methods = encode_members(&mut pool, &self.methods);

        let mut attributes = Vec::new();
        let mut attribute_count = 0u16;
        if !self.nested.is_empty() {
            let attr_name = pool.utf8("InnerClasses");
            let mut data = Vec::new();
            push_u16(&mut data, u16::try_from(self.nested.len()).unwrap_or(u16::MAX));
            for nested in &self.nested {
                let simple = nested.inner.rsplit('$').next().unwrap_or(&nested.inner);
                push_u16(&mut data, pool.class(&nested.inner));
                push_u16(&mut data, this_index);
                push_u16(&mut data, pool.utf8(simple));
                push_u16(&mut data, nested.access);
            }
            push_u16(&mut attributes, attr_name);
            let len = u32::try_from(data.len()).unwrap_or(u32::MAX);
            attributes.extend_from_slice(&len.to_be_bytes());
            attributes.extend_from_slice(&data);
            attribute_count += 1;
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        push_u16(&mut out, 0);
        push_u16(&mut out, 52);
        push_u16(&mut out, pool.next_index);
        out.extend_from_slice(&pool.bytes);
        push_u16(&mut out, self.access);
        push_u16(&mut out, this_index);
        push_u16(&mut out, super_index);
        push_u16(&mut out, u16::try_from(interface_indices.len()).unwrap_or(u16::MAX));
        for index in interface_indices {
            push_u16(&mut out, index);
        }
        out.extend_from_slice(&fields);
        out.extend_from_slice(&methods);
        push_u16(&mut out, attribute_count);
        out.extend_from_slice(&attributes);
        out
    }

    /// Packs classes into a jar image, each at its package path.
    ///
    /// # Errors
    ///
    /// Returns the zip writer's error if an entry cannot be written.
    pub fn jar(classes: &[ClassFileBuilder]) -> Result<Vec<u8>, ZipError> {
        pack(classes, "")
    }

    /// Packs classes into a `.jmod` image under its `classes/` directory.
    ///
    /// # Errors
    ///
    /// Returns the zip writer's error if an entry cannot be written.
    pub fn jmod(classes: &[ClassFileBuilder]) -> Result<Vec<u8>, ZipError> {
        let mut image = JMOD_MAGIC.to_vec();
        image.extend(pack(classes, "classes/")?);
        Ok(image)
    }
}

fn pack(classes: &[ClassFileBuilder], prefix: &str) -> Result<Vec<u8>, ZipError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for class in classes {
        writer.start_file(format!("{prefix}{}.class", class.name.replace('.', "/")), options)?;
        writer.write_all(&class.build())?;
    }
    Ok(writer.finish()?.into_inner())
}

fn encode_members(pool: &mut PoolWriter, members: &[Member]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, u16::try_from(members.len()).unwrap_or(u16::MAX));
    for member in members {
        push_u16(&mut out, member.access);
        push_u16(&mut out, pool.utf8(&member.name));
        push_u16(&mut out, pool.utf8(&member.descriptor));
        push_u16(&mut out, 0);
    }
    out
}
