/// Drives the `joi-codegen` binary and the document loader against files in
/// a temporary directory.
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_joi-codegen"))
        .args(args)
        .output()
        .expect("spawn joi-codegen")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "joi-codegen failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_single_schema_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "flag.json", &json!({"type": "boolean", "title": "flag"}));
    let out = stdout(&run(&[input.to_str().unwrap()]));
    assert_eq!(out, "const flagJoiSchema = Joi.boolean();\n");
}

#[test]
fn test_flags_shape_output() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "s.json", &json!({"type": "number"}));
    let out = stdout(&run(&[
        input.to_str().unwrap(),
        "--types",
        "--export",
        "--label",
        "amount",
        "--joi-name",
        "J",
    ]));
    assert_eq!(out, "export const amountJoiSchema: J.NumberSchema = J.number();\n");
}

#[test]
fn test_bundle_to_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_json(
        dir.path(),
        "bundle.json",
        &json!({"definitions": {
            "list": {"type": "array", "items": {"$ref": "#/definitions/list"}}
        }}),
    );
    let output = dir.path().join("out.ts");
    let result = run(&[
        "--bundle",
        "--legacy",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(stdout(&result).is_empty());
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "const listJoiSchema = Joi.array().items(\n  Joi.lazy(() => listJoiSchema),\n);\n"
    );
}

#[test]
fn test_config_file_with_flag_override() {
    let dir = TempDir::new().unwrap();
    let config = write_json(
        dir.path(),
        "config.json",
        &json!({
            "dialect": {"useExtension": false},
            "format": {"joiName": "Validator", "style": {"semi": false}},
            "label": "fromConfig"
        }),
    );
    let input = write_json(dir.path(), "s.json", &json!({"oneOf": [{"type": "boolean"}]}));
    let out = stdout(&run(&[
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--extension",
    ]));
    assert_eq!(
        out,
        "const fromConfigJoiSchema = Validator.extendedJoi.oneOf().items([\n  Validator.boolean(),\n])\n"
    );
}

#[test]
fn test_sub_schema_flag_resolves_external_reference() {
    let dir = TempDir::new().unwrap();
    let common = write_json(
        dir.path(),
        "common.json",
        &json!({"definitions": {"id": {"type": "integer"}}}),
    );
    let input = write_json(
        dir.path(),
        "s.json",
        &json!({"$ref": "common.json#/definitions/id"}),
    );
    let sub_schema = format!("common.json={}", common.to_str().unwrap());
    let out = stdout(&run(&[input.to_str().unwrap(), "--sub-schema", &sub_schema]));
    assert_eq!(out, "const schemaJoiSchema = Joi.number().integer();\n");

    let result = run(&[input.to_str().unwrap(), "--sub-schema", "common.json"]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("ID=FILE"));
}

#[test]
fn test_failure_writes_no_output() {
    let dir = TempDir::new().unwrap();
    let input = write_json(
        dir.path(),
        "cycle.json",
        &json!({"definitions": {
            "a": {"items": {"$ref": "#/definitions/b"}},
            "b": {"items": {"$ref": "#/definitions/a"}}
        }}),
    );
    let output = dir.path().join("out.ts");
    let result = run(&["--bundle", input.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert!(!result.status.success());
    assert!(!output.exists());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("unresolved dependencies remain for: a, b"), "{stderr}");
}

#[test]
fn test_missing_section_is_reported() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "plain.json", &json!({"type": "string"}));
    let result = run(&["--bundle", input.to_str().unwrap()]);
    assert!(!result.status.success());
    assert!(result.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("'definitions' or 'components.schemas'"), "{stderr}");
}

#[test]
fn test_load_document_reports_bad_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"type\": ").unwrap();
    let err = joi_codegen::load_document(&path).unwrap_err();
    assert!(matches!(err, joi_codegen::Error::Json(_)));

    let good = write_json(dir.path(), "good.json", &json!({"type": "string"}));
    assert_eq!(joi_codegen::load_document(&good).unwrap(), json!({"type": "string"}));
}
