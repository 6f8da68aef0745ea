//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

use crate::render::Format;

/// Arguments for the `extract` tool.
#[derive(Debug, Parser)]
#[command(
    name = "extract",
    version,
    about = "Write a structural snapshot of public JVM types under an artifact root"
)]
pub struct ExtractCli {
    /// Output format; XML is the stable snapshot document.
    #[arg(long, value_enum, default_value_t = Format::Xml)]
    pub format: Format,
    /// Directory or archive of platform classes consulted after the artifact
    /// root. Defaults to the JDK at `JAVA_HOME`.
    #[arg(long, value_name = "PATH")]
    pub platform_root: Option<PathBuf>,
    /// Directory of compiled `.class` files laid out by package, or a jar.
    #[arg(value_name = "ARTIFACT_ROOT")]
    pub root: PathBuf,
    /// Binary names of the types to describe, e.g. `com.example.Widget$Part`.
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

/// Arguments for the `check-substitutable` tool.
#[derive(Debug, Parser)]
#[command(
    name = "check-substitutable",
    version,
    about = "Print whether a candidate type can replace a previously expected type"
)]
pub struct CheckCli {
    /// Directory or archive of platform classes consulted after the artifact
    /// root. Defaults to the JDK at `JAVA_HOME`.
    #[arg(long, value_name = "PATH")]
    pub platform_root: Option<PathBuf>,
    /// Directory of compiled `.class` files laid out by package, or a jar.
    #[arg(value_name = "ARTIFACT_ROOT")]
    pub root: PathBuf,
    /// The previously expected type.
    #[arg(value_name = "FROM")]
    pub from: String,
    /// The candidate type.
    #[arg(value_name = "TO")]
    pub to: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_extract_with_defaults() {
        let cli = ExtractCli::parse_from(["extract", "/classes", "a.B", "a.C"]);
        assert_eq!(cli.format, Format::Xml);
        assert_eq!(cli.root, PathBuf::from("/classes"));
        assert_eq!(cli.names, vec!["a.B", "a.C"]);
        assert!(cli.platform_root.is_none());
    }

    #[test]
    fn extract_accepts_no_names() {
        let cli = ExtractCli::parse_from(["extract", "--format", "json", "/classes"]);
        assert_eq!(cli.format, Format::Json);
        assert!(cli.names.is_empty());
    }

    #[test]
    fn check_requires_both_types() {
        let cli = CheckCli::parse_from([
            "check-substitutable",
            "--platform-root",
            "/jdk",
            "/c",
            "int",
            "long",
        ]);
        assert_eq!(cli.platform_root, Some(PathBuf::from("/jdk")));
        assert_eq!((cli.from.as_str(), cli.to.as_str()), ("int", "long"));

        let err = CheckCli::try_parse_from(["check-substitutable", "/c", "int"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
