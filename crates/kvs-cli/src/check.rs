//! # Check-Schema Subcommand
//!
//! Loads a schema document and prints the keys it maps with their accepted
//! types. Exits 1 if the document is not a valid schema.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use kvs_schema::{load_schema, Schema};

/// Arguments for the `kvs check-schema` subcommand.
#[derive(Args, Debug)]
pub struct CheckSchemaArgs {
    /// Schema document (JSON or YAML).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// One line per mapped key: `Key: [types]`, or `Key: any`.
fn describe(schema: &Schema) -> Vec<String> {
    schema
        .properties
        .iter()
        .flatten()
        .map(|(key, node)| match &node.types {
            Some(types) => format!("{key}: {types}"),
            None => format!("{key}: any"),
        })
        .collect()
}

/// Execute the check-schema subcommand.
pub fn run_check_schema(args: &CheckSchemaArgs) -> Result<u8> {
    let schema = match load_schema(&args.path) {
        Ok(schema) => schema,
        Err(e) => {
            println!("FAIL: {}: {e}", args.path.display());
            return Ok(1);
        }
    };

    let lines = describe(&schema);
    println!(
        "OK: {} ({} mapped key(s), depth {})",
        args.path.display(),
        lines.len(),
        schema.depth()
    );
    for line in &lines {
        println!("  {line}");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_lists_mapped_keys_in_order() {
        let schema = Schema::from_json_value(json!({
            "properties": {
                "ListPrice": { "type": ["integer", "number"] },
                "Appliances": { "type": "array", "items": { "type": "string" } },
                "Anything": {}
            }
        }))
        .unwrap();
        assert_eq!(
            describe(&schema),
            vec![
                "Anything: any".to_string(),
                "Appliances: [array]".to_string(),
                "ListPrice: [integer, number]".to_string(),
            ]
        );
    }

    #[test]
    fn test_wildcard_root_has_no_keys() {
        assert!(describe(&Schema::any()).is_empty());
    }

    #[test]
    fn test_check_valid_and_invalid_documents() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.yaml");
        std::fs::write(&good, "properties:\n  DisplayYN:\n    type: boolean\n").unwrap();
        assert_eq!(run_check_schema(&CheckSchemaArgs { path: good }).unwrap(), 0);

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"properties": {"A": {"type": []}}}"#).unwrap();
        assert_eq!(run_check_schema(&CheckSchemaArgs { path: bad }).unwrap(), 1);

        let missing = dir.path().join("missing.json");
        assert_eq!(run_check_schema(&CheckSchemaArgs { path: missing }).unwrap(), 1);
    }
}
