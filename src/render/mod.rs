//! Snapshot rendering.
//!
//! The XML document is the compatibility contract with the diff engine:
//!
//! ```text
//! <api>
//!   <class name=..>
//!     <fields>  <field name=.. basename=.. dimension=../> ...
//!     <methods> <method name=..> <return ../> <parameters> <parameter ../> ...
//!     <classes> <class ..> ...
//! ```
//!
//! Container elements are always emitted so the shape never depends on
//! which members happen to exist. YAML and JSON renderings are debugging aids.

use std::fmt;
use std::io::Write;

use clap::ValueEnum;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::ToolError;
use crate::model::{ApiSnapshot, ClassDescriptor, MethodDescriptor, TypeRef};

/// Output format for a rendered snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// The stable XML document.
    #[default]
    Xml,
    /// YAML via serde.
    Yaml,
    /// Pretty-printed JSON via serde.
    Json,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Xml => "xml",
            Format::Yaml => "yaml",
            Format::Json => "json",
        };
        f.write_str(name)
    }
}

/// Renders a snapshot completely in memory.
///
/// # Errors
///
/// Returns [`ToolError::Serialization`] if the encoder fails.
pub fn render(snapshot: &ApiSnapshot, format: Format) -> Result<String, ToolError> {
    match format {
        Format::Xml => render_xml(snapshot),
        Format::Yaml => serde_yaml::to_string(snapshot)
            .map_err(|e| ToolError::Serialization(format!("failed to encode YAML: {e}"))),
        Format::Json => serde_json::to_string_pretty(snapshot)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| ToolError::Serialization(format!("failed to encode JSON: {e}"))),
    }
}

/// Renders the XML document.
///
/// # Errors
///
/// Returns [`ToolError::Serialization`] if the XML writer fails.
pub fn render_xml(snapshot: &ApiSnapshot) -> Result<String, ToolError> {
    let mut xml = XmlOut { writer: Writer::new_with_indent(Vec::new(), b' ', 2) };
    xml.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.start("api", &[])?;
    for class in &snapshot.classes {
        xml.class(class)?;
    }
    xml.end("api")?;

    let mut bytes = xml.writer.into_inner();
    bytes.write_all(b"\n").map_err(|e| ToolError::Serialization(e.to_string()))?;
    String::from_utf8(bytes)
        .map_err(|e| ToolError::Serialization(format!("rendered document is not UTF-8: {e}")))
}

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn event(&mut self, event: Event<'_>) -> Result<(), ToolError> {
        self.writer
            .write_event(event)
            .map_err(|e| ToolError::Serialization(format!("failed to write XML: {e}")))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ToolError> {
        self.event(Event::Start(element(name, attrs)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ToolError> {
        self.event(Event::Empty(element(name, attrs)))
    }

    fn end(&mut self, name: &str) -> Result<(), ToolError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Opens a container, or self-closes it when there is nothing to put inside.
    fn container<T>(
        &mut self,
        name: &str,
        items: &[T],
        mut each: impl FnMut(&mut Self, &T) -> Result<(), ToolError>,
    ) -> Result<(), ToolError> {
        if items.is_empty() {
            return self.empty(name, &[]);
        }
        self.start(name, &[])?;
        for item in items {
            each(self, item)?;
        }
        self.end(name)
    }

    fn typed(
        &mut self,
        tag: &str,
        name: Option<&str>,
        type_ref: &TypeRef,
    ) -> Result<(), ToolError> {
        let dimension = type_ref.dimension.to_string();
        let mut attrs = Vec::with_capacity(3);
        if let Some(name) = name {
            attrs.push(("name", name));
        }
        attrs.push(("basename", type_ref.basename.as_str()));
        attrs.push(("dimension", dimension.as_str()));
        self.empty(tag, &attrs)
    }

    fn class(&mut self, class: &ClassDescriptor) -> Result<(), ToolError> {
        self.start("class", &[("name", class.name.as_str())])?;
        self.container("fields", &class.fields, |out, field| {
            out.typed("field", Some(field.name.as_str()), &field.type_ref)
        })?;
        self.container("methods", &class.methods, Self::method)?;
        self.container("classes", &class.nested_classes, Self::class)?;
        self.end("class")
    }

    fn method(&mut self, method: &MethodDescriptor) -> Result<(), ToolError> {
        self.start("method", &[("name", method.name.as_str())])?;
        self.typed("return", None, &method.return_type)?;
        self.container("parameters", &method.parameters, |out, param| {
            out.typed("parameter", Some(param.name().as_str()), &param.type_ref)
        })?;
        self.end("method")
    }
}

fn element<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for attr in attrs {
        start.push_attribute(*attr);
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDescriptor, ParameterDescriptor};
    use pretty_assertions::assert_eq;

    fn widget() -> ClassDescriptor {
        ClassDescriptor {
            name: "com.example.Widget".into(),
            fields: vec![
                FieldDescriptor { name: "size".into(), type_ref: TypeRef::scalar("int") },
                FieldDescriptor {
                    name: "tags".into(),
                    type_ref: TypeRef { basename: "java.lang.String".into(), dimension: 1 },
                },
            ],
            methods: vec![
                MethodDescriptor {
                    name: "resize".into(),
                    return_type: TypeRef::scalar("void"),
                    parameters: vec![
                        ParameterDescriptor { position: 0, type_ref: TypeRef::scalar("int") },
                        ParameterDescriptor { position: 1, type_ref: TypeRef::scalar("long") },
                    ],
                },
                MethodDescriptor {
                    name: "hashCode".into(),
                    return_type: TypeRef::scalar("int"),
                    parameters: vec![],
                },
            ],
            nested_classes: vec![ClassDescriptor {
                name: "com.example.Widget$Part".into(),
                fields: vec![],
                methods: vec![],
                nested_classes: vec![],
            }],
        }
    }

    #[test]
    fn renders_expected_document() {
        let snapshot = ApiSnapshot { classes: vec![widget()] };
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<api>
  <class name="com.example.Widget">
    <fields>
      <field name="size" basename="int" dimension="0"/>
      <field name="tags" basename="java.lang.String" dimension="1"/>
    </fields>
    <methods>
      <method name="resize">
        <return basename="void" dimension="0"/>
        <parameters>
          <parameter name="arg0" basename="int" dimension="0"/>
          <parameter name="arg1" basename="long" dimension="0"/>
        </parameters>
      </method>
      <method name="hashCode">
        <return basename="int" dimension="0"/>
        <parameters/>
      </method>
    </methods>
    <classes>
      <class name="com.example.Widget$Part">
        <fields/>
        <methods/>
        <classes/>
      </class>
    </classes>
  </class>
</api>
"#;
        assert_eq!(render_xml(&snapshot).unwrap(), expected);
    }

    #[test]
    fn empty_snapshot_still_has_container() {
        let rendered = render_xml(&ApiSnapshot { classes: vec![] }).unwrap();
        assert_eq!(rendered, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<api>\n</api>\n");
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut class = widget();
        class.name = "odd.<Name>&\"".into();
        let rendered = render_xml(&ApiSnapshot { classes: vec![class] }).unwrap();
        assert!(rendered.contains(r#"<class name="odd.&lt;Name&gt;&amp;&quot;">"#));
    }

    #[test]
    fn rendering_is_deterministic() {
        let snapshot = ApiSnapshot { classes: vec![widget(), widget()] };
        assert_eq!(render_xml(&snapshot).unwrap(), render_xml(&snapshot).unwrap());
    }

    #[test]
    fn debug_formats_carry_the_same_model() {
        let snapshot = ApiSnapshot { classes: vec![widget()] };
        let yaml = render(&snapshot, Format::Yaml).unwrap();
        let from_yaml: ApiSnapshot = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(from_yaml, snapshot);

        let json = render(&snapshot, Format::Json).unwrap();
        assert!(json.ends_with("}\n"));
        let from_json: ApiSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(from_json, snapshot);
    }
}
