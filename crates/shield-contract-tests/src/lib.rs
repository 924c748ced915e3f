#![warn(missing_docs)]
//! # shield-contract-tests
//!
//! Loads the frozen JSON schemas and fixtures under the workspace
//! `contracts/` directory for contract validation tests.

use std::path::PathBuf;

use jsonschema::JSONSchema;
use serde_json::Value;

/// Returns the path of a file under `contracts/`.
pub fn contract_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../contracts")
        .join(relative)
}

/// Reads and parses a JSON file under `contracts/`.
///
/// # Errors
/// Returns a message naming the file when it cannot be read or parsed.
pub fn load_contract_json(relative: &str) -> Result<Value, String> {
    let path = contract_path(relative);
    let raw = std::fs::read_to_string(&path)
        .map_err(|error| format!("cannot read {}: {error}", path.display()))?;
    serde_json::from_str(&raw).map_err(|error| format!("invalid json in {}: {error}", path.display()))
}

/// Compiles the schema stored at `contracts/<name>.schema.json`.
///
/// # Errors
/// Returns a message when the schema is missing or does not compile.
pub fn compile_contract(name: &str) -> Result<JSONSchema, String> {
    let schema = load_contract_json(&format!("{name}.schema.json"))?;
    JSONSchema::compile(&schema).map_err(|error| format!("schema {name} does not compile: {error}"))
}

/// Collects validation errors of `instance` as display strings.
pub fn validation_errors(validator: &JSONSchema, instance: &Value) -> Vec<String> {
    match validator.validate(instance) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.map(|error| error.to_string()).collect(),
    }
}
