//! Class-file decoding (JVMS chapter 4).

use super::{AccessFlags, ClassFile, ClassFormatError, InnerClassEntry, MemberInfo};

const MAGIC: u32 = 0xCAFE_BABE;

/// Constant pool entries the reader keeps; everything else is `Other`.
#[derive(Debug, Clone)]
enum Constant {
    /// Placeholder for index 0 and the second slot of `Long`/`Double`.
    Unusable,
    Utf8(String),
    Class { name_index: u16 },
    Other,
}

/// Big-endian cursor over class-file bytes.
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ClassFormatError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFormatError::Truncated { offset: self.pos })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ClassFormatError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ClassFormatError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ClassFormatError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn read(reader: &mut ByteReader<'_>) -> Result<Self, ClassFormatError> {
        let count = reader.u16()?;
        let mut entries = Vec::with_capacity(usize::from(count));
        entries.push(Constant::Unusable);

        let mut index: u16 = 1;
        while index < count {
            let tag = reader.u8()?;
            let (constant, slots) = match tag {
                1 => {
                    let len = reader.u16()?;
                    let raw = reader.take(usize::from(len))?;
                    let text =
                        decode_modified_utf8(raw).ok_or(ClassFormatError::BadUtf8 { index })?;
                    (Constant::Utf8(text), 1)
                }
                7 => (Constant::Class { name_index: reader.u16()? }, 1),
                // Integer, Float
                3 | 4 => {
                    reader.take(4)?;
                    (Constant::Other, 1)
                }
                // Long, Double occupy two slots
                5 | 6 => {
                    reader.take(8)?;
                    (Constant::Other, 2)
                }
                // String, MethodType, Module, Package
                8 | 16 | 19 | 20 => {
                    reader.take(2)?;
                    (Constant::Other, 1)
                }
                // Fieldref, Methodref, InterfaceMethodref, NameAndType, Dynamic, InvokeDynamic
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.take(4)?;
                    (Constant::Other, 1)
                }
                // MethodHandle
                15 => {
                    reader.take(3)?;
                    (Constant::Other, 1)
                }
                _ => return Err(ClassFormatError::UnknownConstantTag { tag, index }),
            };
            entries.push(constant);
            if slots == 2 {
                entries.push(Constant::Unusable);
            }
            index = index.saturating_add(slots);
        }

        Ok(Self { entries })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassFormatError> {
        match self.entries.get(usize::from(index)) {
            Some(Constant::Utf8(text)) => Ok(text),
            _ => Err(ClassFormatError::BadConstantIndex { index, expected: "Utf8" }),
        }
    }

    /// Resolves a `CONSTANT_Class` entry to a dotted binary name.
    fn class_name(&self, index: u16) -> Result<String, ClassFormatError> {
        match self.entries.get(usize::from(index)) {
            Some(Constant::Class { name_index }) => {
                Ok(internal_to_binary(self.utf8(*name_index)?))
            }
            _ => Err(ClassFormatError::BadConstantIndex { index, expected: "Class" }),
        }
    }

    fn optional_class_name(&self, index: u16) -> Result<Option<String>, ClassFormatError> {
        if index == 0 {
            Ok(None)
        } else {
            self.class_name(index).map(Some)
        }
    }

    fn optional_utf8(&self, index: u16) -> Result<Option<String>, ClassFormatError> {
        if index == 0 {
            Ok(None)
        } else {
            self.utf8(index).map(|s| Some(s.to_string()))
        }
    }
}

/// Converts an internal name (`java/lang/String`) to a binary name (`java.lang.String`).
#[must_use]
pub fn internal_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Decodes the JVM's modified UTF-8 (JVMS §4.4.7).
///
/// Supplementary characters arrive as encoded surrogate pairs, so the bytes
/// are decoded to UTF-16 code units first.
fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 && b != 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = *bytes.get(i + 1)?;
            if b2 & 0xC0 != 0x80 {
                return None;
            }
            units.push((u16::from(b & 0x1F) << 6) | u16::from(b2 & 0x3F));
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = *bytes.get(i + 1)?;
            let b3 = *bytes.get(i + 2)?;
            if b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                return None;
            }
            units.push(
                (u16::from(b & 0x0F) << 12) | (u16::from(b2 & 0x3F) << 6) | u16::from(b3 & 0x3F),
            );
            i += 3;
        } else {
            return None;
        }
    }
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

fn read_members(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<MemberInfo>, ClassFormatError> {
    let count = reader.u16()?;
    let mut members = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let access = AccessFlags(reader.u16()?);
        let name = pool.utf8(reader.u16()?)?.to_string();
        let descriptor = pool.utf8(reader.u16()?)?.to_string();
        skip_attributes(reader)?;
        members.push(MemberInfo { access, name, descriptor });
    }
    Ok(members)
}

fn skip_attributes(reader: &mut ByteReader<'_>) -> Result<(), ClassFormatError> {
    let count = reader.u16()?;
    for _ in 0..count {
        reader.u16()?;
        let len = reader.u32()?;
        reader.take(len as usize)?;
    }
    Ok(())
}

fn read_inner_classes(
    data: &[u8],
    pool: &ConstantPool,
) -> Result<Vec<InnerClassEntry>, ClassFormatError> {
    let mut reader = ByteReader::new(data);
    let count = reader.u16()?;
    let mut entries = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let inner = pool.class_name(reader.u16()?)?;
        let outer = pool.optional_class_name(reader.u16()?)?;
        // Simple name is validated but not kept.
        pool.optional_utf8(reader.u16()?)?;
        let access = AccessFlags(reader.u16()?);
        entries.push(InnerClassEntry { inner, outer, access });
    }
    Ok(entries)
}

/// Parses a complete class file.
///
/// # Errors
///
/// Returns a [`ClassFormatError`] if the bytes are not a well-formed class file.
pub fn parse_class(bytes: &[u8]) -> Result<ClassFile, ClassFormatError> {
    let mut reader = ByteReader::new(bytes);

    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(ClassFormatError::BadMagic { found: magic });
    }
    // minor_version, major_version
    reader.u16()?;
    reader.u16()?;

    let pool = ConstantPool::read(&mut reader)?;

    let access = AccessFlags(reader.u16()?);
    let name = pool.class_name(reader.u16()?)?;
    let super_name = pool.optional_class_name(reader.u16()?)?;

    let interface_count = reader.u16()?;
    let mut interfaces = Vec::with_capacity(usize::from(interface_count));
    for _ in 0..interface_count {
        interfaces.push(pool.class_name(reader.u16()?)?);
    }

    let fields = read_members(&mut reader, &pool)?;
    let methods = read_members(&mut reader, &pool)?;

    let mut inner_classes = Vec::new();
    let attribute_count = reader.u16()?;
    for _ in 0..attribute_count {
        let attr_name = pool.utf8(reader.u16()?)?;
        let len = reader.u32()?;
        let data = reader.take(len as usize)?;
        if attr_name == "InnerClasses" {
            inner_classes = read_inner_classes(data, &pool)?;
        }
    }

    Ok(ClassFile { name, access, super_name, interfaces, fields, methods, inner_classes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::builder::ClassFileBuilder;

    #[test]
    fn parses_builder_output() {
        let bytes = ClassFileBuilder::class("com.example.Widget")
            .implements("java.io.Serializable")
            .public_field("size", "I")
            .field(AccessFlags::PRIVATE, "secret", "Ljava/lang/String;")
            .public_method("resize", "(IJ)V")
            .public_member_class("com.example.Widget$Part")
            .build();

        let class = parse_class(&bytes).unwrap();
        assert_eq!(class.name, "com.example.Widget");
        assert_eq!(class.super_name.as_deref(), Some("java.lang.Object"));
        assert_eq!(class.interfaces, vec!["java.io.Serializable"]);
        assert_eq!(class.fields.len(), 2);
        assert!(class.fields[0].access.is_public());
        assert!(!class.fields[1].access.is_public());
        assert_eq!(class.methods[0].name, "resize");
        assert_eq!(class.methods[0].descriptor, "(IJ)V");

        let nested: Vec<_> = class.member_classes().map(|e| e.inner.as_str()).collect();
        assert_eq!(nested, vec!["com.example.Widget$Part"]);
    }

    #[test]
    fn rejects_bad_magic() {
        let err = parse_class(&[0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 52]).unwrap_err();
        assert_eq!(err, ClassFormatError::BadMagic { found: 0xDEAD_BEEF });
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = ClassFileBuilder::class("a.B").build();
        let err = parse_class(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, ClassFormatError::Truncated { .. }));
    }

    #[test]
    fn long_and_double_constants_take_two_slots() {
        let bytes = ClassFileBuilder::class("a.Constants")
            .long_constant(42)
            .public_field("after", "J")
            .build();
        let class = parse_class(&bytes).unwrap();
        assert_eq!(class.fields[0].name, "after");
    }

    #[test]
    fn object_has_no_superclass() {
        let bytes = ClassFileBuilder::class("java.lang.Object").no_superclass().build();
        assert_eq!(parse_class(&bytes).unwrap().super_name, None);
    }

    #[test]
    fn decodes_modified_utf8() {
        // NUL is encoded as C0 80 and U+1F600 as an encoded surrogate pair.
        let bytes = [0x61, 0xC0, 0x80, 0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        assert_eq!(decode_modified_utf8(&bytes).as_deref(), Some("a\0\u{1F600}"));
        assert_eq!(decode_modified_utf8(&[0xFF]), None);
        assert_eq!(decode_modified_utf8(&[0x00]), None);
    }
}
