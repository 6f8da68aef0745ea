//! Integration tests for the `extract` and `check-substitutable` binaries.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use apisurface::classfile::builder::ClassFileBuilder;
use pretty_assertions::assert_eq;

/// Writes `classes` under a fresh directory in the system temp dir.
fn fixture_root(test_name: &str, classes: &[ClassFileBuilder]) -> PathBuf {
    let root = std::env::temp_dir().join(format!("apisurface_cli_{test_name}"));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();
    for class in classes {
        let mut path = root.clone();
        for segment in class.name().split('.') {
            path.push(segment);
        }
        path.set_extension("class");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, class.build()).unwrap();
    }
    root
}

fn shop_classes() -> Vec<ClassFileBuilder> {
    vec![
        ClassFileBuilder::interface("shop.Cart")
            .public_field("count", "I")
            .public_field("owner", "Ljava/lang/String;")
            .public_method("add", "(Ljava/lang/String;[J)Z")
            .public_member_class("shop.Cart$Line"),
        ClassFileBuilder::interface("shop.Cart$Line").public_method("sku", "()Ljava/lang/String;"),
        ClassFileBuilder::class("shop.Basket").implements("shop.Cart"),
        ClassFileBuilder::class("shop.Orphan").extends("shop.Removed"),
    ]
}

fn run(bin: &str, root: &Path, args: &[&str]) -> Output {
    let workdir = if root.is_dir() { root } else { root.parent().unwrap() };
    Command::new(bin)
        .arg(root)
        .args(args)
        .current_dir(workdir)
        .env_remove("APISURFACE_PLATFORM_ROOT")
        .env_remove("JAVA_HOME")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run binary")
}

fn extract(root: &Path, args: &[&str]) -> Output {
    run(env!("CARGO_BIN_EXE_extract"), root, args)
}

fn check(root: &Path, from: &str, to: &str) -> Output {
    run(env!("CARGO_BIN_EXE_check-substitutable"), root, &[from, to])
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn extract_writes_structural_snapshot() {
    let root = fixture_root("structure", &shop_classes());
    let output = extract(&root, &["shop.Cart"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).is_empty());

    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<api>
  <class name="shop.Cart">
    <fields>
      <field name="count" basename="int" dimension="0"/>
      <field name="owner" basename="java.lang.String" dimension="0"/>
    </fields>
    <methods>
      <method name="add">
        <return basename="boolean" dimension="0"/>
        <parameters>
          <parameter name="arg0" basename="java.lang.String" dimension="0"/>
          <parameter name="arg1" basename="long" dimension="1"/>
        </parameters>
      </method>
    </methods>
    <classes>
      <class name="shop.Cart$Line">
        <fields/>
        <methods>
          <method name="sku">
            <return basename="java.lang.String" dimension="0"/>
            <parameters/>
          </method>
        </methods>
        <classes/>
      </class>
    </classes>
  </class>
</api>
"#;
    assert_eq!(stdout(&output), expected);
}

#[test]
fn extract_is_deterministic() {
    let root = fixture_root("determinism", &shop_classes());
    let first = extract(&root, &["shop.Basket", "shop.Cart"]);
    let second = extract(&root, &["shop.Basket", "shop.Cart"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn extract_without_names_fails_cleanly() {
    let root = fixture_root("no_names", &shop_classes());
    let output = extract(&root, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = stderr(&output);
    assert!(stderr.starts_with("extract: configuration error"), "{stderr}");
    assert_eq!(stderr.lines().count(), 1);
}

#[test]
fn extract_unknown_name_writes_nothing() {
    let root = fixture_root("unknown", &shop_classes());
    let output = extract(&root, &["shop.Cart", "shop.Nope"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("shop.Nope"));
}

#[test]
fn extract_reports_stale_build() {
    let root = fixture_root("stale", &shop_classes());
    let output = extract(&root, &["shop.Orphan"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = stderr(&output);
    assert!(stderr.starts_with("extract: stale build"), "{stderr}");
    assert!(stderr.contains("shop.Removed"));
}

#[test]
fn extract_rejects_invalid_root() {
    let root = std::env::temp_dir().join("apisurface_cli_missing_root");
    let _ = std::fs::remove_dir_all(&root);
    let output = Command::new(env!("CARGO_BIN_EXE_extract"))
        .arg(&root)
        .arg("a.B")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run binary");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = stderr(&output);
    assert!(stderr.starts_with("extract: configuration error"), "{stderr}");
    assert!(stderr.contains("not a directory or class archive"), "{stderr}");
    assert_eq!(stderr.lines().count(), 1, "{stderr}");
}

#[test]
fn extract_reads_a_jar_root() {
    let dir = fixture_root("jar_root", &[]);
    let jar = dir.join("shop.jar");
    std::fs::write(&jar, ClassFileBuilder::jar(&shop_classes()).unwrap()).unwrap();
    let from_dir = fixture_root("jar_root_dir", &shop_classes());

    let output = extract(&jar, &["shop.Cart"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), stdout(&extract(&from_dir, &["shop.Cart"])));

    let output = check(&jar, "shop.Cart", "shop.Basket");
    assert_eq!(stdout(&output), "true\n");
}

#[test]
fn extract_tolerates_undefined_platform_ancestors() {
    let root = fixture_root(
        "opaque_ancestor",
        &[ClassFileBuilder::class("app.Names")
            .extends("java.util.ArrayList")
            .public_method("first", "()Ljava/lang/String;")],
    );
    let output = extract(&root, &["app.Names"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains(r#"<method name="first""#));

    let output = check(&root, "java.lang.Object", "app.Names");
    assert_eq!(stdout(&output), "true\n");
}

#[cfg(unix)]
#[test]
fn extract_survives_directory_link_cycles() {
    let root = fixture_root("link_cycle", &shop_classes());
    std::os::unix::fs::symlink(&root, root.join("shop").join("again")).unwrap();
    let output = extract(&root, &["shop.Cart"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains(r#"<class name="shop.Cart">"#));
}

#[test]
fn extract_yaml_format() {
    let root = fixture_root("yaml", &shop_classes());
    let output = extract(&root, &["--format", "yaml", "shop.Cart$Line"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("name: shop.Cart$Line"));
}

#[test]
fn check_prints_true_and_false() {
    let root = fixture_root("check_tokens", &shop_classes());

    let output = check(&root, "shop.Cart", "shop.Basket");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "true\n");

    let output = check(&root, "shop.Basket", "shop.Cart");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "false\n");

    assert_eq!(stdout(&check(&root, "java.lang.Object", "shop.Cart$Line[]")), "true\n");
    assert_eq!(stdout(&check(&root, "long", "int")), "true\n");
    assert_eq!(stdout(&check(&root, "int", "java.lang.Integer")), "false\n");
}

#[test]
fn check_unknown_candidate_is_false_not_an_error() {
    let root = fixture_root("check_unknown", &shop_classes());
    let output = check(&root, "shop.Cart", "Nonexistent.Type");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "false\n");
    assert!(stderr(&output).is_empty());
}

#[test]
fn check_stale_hierarchy_is_fatal() {
    let root = fixture_root("check_stale", &shop_classes());
    let output = check(&root, "shop.Cart", "shop.Orphan");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).starts_with("check-substitutable: stale build"));
}

#[test]
fn check_usage_errors_exit_two() {
    let root = fixture_root("check_usage", &[]);
    let output = run(env!("CARGO_BIN_EXE_check-substitutable"), &root, &["int"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn help_goes_to_stdout() {
    let output = Command::new(env!("CARGO_BIN_EXE_extract"))
        .arg("--help")
        .output()
        .expect("failed to run binary");
    assert!(output.status.success());
    assert!(stdout(&output).contains("--platform-root"));
}
