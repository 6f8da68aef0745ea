//! Field and method descriptor parsing (JVMS §4.3).

use super::ClassFormatError;
use crate::model::TypeRef;

/// Maps a base-type descriptor character to its Java keyword.
#[must_use]
pub fn primitive_keyword(code: char) -> Option<&'static str> {
    let keyword = match code {
        'B' => "byte",
        'C' => "char",
        'D' => "double",
        'F' => "float",
        'I' => "int",
        'J' => "long",
        'S' => "short",
        'Z' => "boolean",
        'V' => "void",
        _ => return None,
    };
    Some(keyword)
}

/// Reads one field type starting at the front of `input`, returning it and the rest.
fn split_field_type(input: &str) -> Option<(TypeRef, &str)> {
    let dimension = input.bytes().take_while(|b| *b == b'[').count();
    let element = &input[dimension..];
    let mut chars = element.chars();
    let code = chars.next()?;

    let (basename, rest) = if code == 'L' {
        let end = element.find(';')?;
        let internal = &element[1..end];
        if internal.is_empty() {
            return None;
        }
        (internal.replace('/', "."), &element[end + 1..])
    } else {
        let keyword = primitive_keyword(code)?;
        if keyword == "void" {
            return None;
        }
        (keyword.to_string(), chars.as_str())
    };

    let dimension = u32::try_from(dimension).ok()?;
    Some((TypeRef { basename, dimension }, rest))
}

/// Parses a field descriptor such as `[[Ljava/lang/String;` into a [`TypeRef`].
///
/// # Errors
///
/// Returns [`ClassFormatError::BadDescriptor`] if the text is not exactly one field type.
pub fn parse_field_descriptor(descriptor: &str) -> Result<TypeRef, ClassFormatError> {
    match split_field_type(descriptor) {
        Some((type_ref, "")) => Ok(type_ref),
        _ => Err(bad(descriptor)),
    }
}

/// Parses a method descriptor such as `(IJ)Ljava/lang/String;`.
///
/// Returns the parameter types in declaration order and the return type.
///
/// # Errors
///
/// Returns [`ClassFormatError::BadDescriptor`] if the text is malformed.
pub fn parse_method_descriptor(
    descriptor: &str,
) -> Result<(Vec<TypeRef>, TypeRef), ClassFormatError> {
    let mut rest = descriptor.strip_prefix('(').ok_or_else(|| bad(descriptor))?;
    let mut params = Vec::new();
    while !rest.starts_with(')') {
        let (param, tail) = split_field_type(rest).ok_or_else(|| bad(descriptor))?;
        params.push(param);
        rest = tail;
    }
    let ret = &rest[1..];
    let return_type = if ret == "V" {
        TypeRef::scalar("void")
    } else {
        parse_field_descriptor(ret).map_err(|_| bad(descriptor))?
    };
    Ok((params, return_type))
}

fn bad(descriptor: &str) -> ClassFormatError {
    ClassFormatError::BadDescriptor { descriptor: descriptor.to_string() }
}
