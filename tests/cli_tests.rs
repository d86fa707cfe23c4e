//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const ORDER_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="order">
        <xs:annotation><xs:documentation>A purchase order.</xs:documentation></xs:annotation>
        <xs:complexType>
            <xs:sequence>
                <xs:element name="customer" type="xs:string"/>
                <xs:element name="item" maxOccurs="unbounded">
                    <xs:complexType>
                        <xs:attribute name="sku" type="xs:string" use="required"/>
                    </xs:complexType>
                </xs:element>
                <xs:element name="note" type="xs:string" minOccurs="0"/>
            </xs:sequence>
            <xs:attribute name="status">
                <xs:simpleType>
                    <xs:restriction base="xs:string">
                        <xs:enumeration value="open"/>
                        <xs:enumeration value="shipped"/>
                    </xs:restriction>
                </xs:simpleType>
            </xs:attribute>
        </xs:complexType>
    </xs:element>
</xs:schema>"#;

fn xsd_complete_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_xsd-complete"))
}

fn fixture() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("order.xsd");
    fs::write(&schema, ORDER_XSD).unwrap();
    (dir, schema)
}

fn run(args: &[&str]) -> Output {
    Command::new(xsd_complete_bin())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// Children Command Tests
// ============================================================================

#[test]
fn test_cli_children() {
    let (_dir, schema) = fixture();
    let output = run(&["children", "--schema", path_str(&schema), "--element", "order"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "children should succeed");
    assert_eq!(stdout.trim(), "customer");
}

#[test]
fn test_cli_children_after() {
    let (_dir, schema) = fixture();
    let output = run(&[
        "children",
        "--schema",
        path_str(&schema),
        "--element",
        "order",
        "--after",
        "customer,item",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["item", "note"]);
}

#[test]
fn test_cli_children_json_output() {
    let (_dir, schema) = fixture();
    let output = run(&[
        "children",
        "--json",
        "--schema",
        path_str(&schema),
        "--element",
        "order",
        "--after",
        "customer,item,note",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("should be valid JSON");
    assert_eq!(json["elements"].as_array().map(Vec::len), Some(0));
    assert_eq!(json["anyElement"], false);
}

#[test]
fn test_cli_children_unknown_element() {
    let (_dir, schema) = fixture();
    let output = run(&["children", "--schema", path_str(&schema), "--element", "invoice"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("not found"));
}

// ============================================================================
// At Command Tests
// ============================================================================

#[test]
fn test_cli_at_offset() {
    let (dir, schema) = fixture();
    let text = "<order><customer>C</customer><item sku=\"1\"/>";
    let file = dir.path().join("order.xml");
    fs::write(&file, text).unwrap();

    let offset = text.len().to_string();
    let output = run(&[
        "at",
        "--schema",
        path_str(&schema),
        "--file",
        path_str(&file),
        "--offset",
        &offset,
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["item", "note"]);
}

#[test]
fn test_cli_at_uses_schema_location_hint() {
    let (dir, _schema) = fixture();
    let text = r#"<order xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="order.xsd">"#;
    let file = dir.path().join("order.xml");
    fs::write(&file, text).unwrap();

    let offset = text.len().to_string();
    let output = run(&["at", "--file", path_str(&file), "--offset", &offset]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert_eq!(stdout.trim(), "customer");
}

// ============================================================================
// Inspect Command Tests
// ============================================================================

#[test]
fn test_cli_inspect() {
    let (_dir, schema) = fixture();
    let output = run(&["inspect", "--schema", path_str(&schema), "--element", "order"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Element: order"));
    assert!(stdout.contains("A purchase order."));
    assert!(stdout.contains("status (optional)"));
    assert!(stdout.contains("values: open, shipped"));
}

#[test]
fn test_cli_inspect_json_output() {
    let (_dir, schema) = fixture();
    let output = run(&["inspect", "--json", "--schema", path_str(&schema), "--element", "order"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("should be valid JSON");
    assert_eq!(json["name"], "order");
    assert_eq!(json["attributes"][0]["name"], "status");
    assert_eq!(json["attributes"][0]["enumeration"][1], "shipped");
    assert_eq!(json["children"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_cli_invalid_xsd_version() {
    let (_dir, schema) = fixture();
    let output = run(&[
        "children",
        "--xsd-version",
        "2.0",
        "--schema",
        path_str(&schema),
        "--element",
        "order",
    ]);
    assert!(!output.status.success());
}
