use serde_json::{json, Value};

/// Builds one change-payload line as the realtime transport emits it.
pub fn payload_line(
    op: &str,
    columns: &[(&str, &str)],
    record: Value,
    old_record: Value,
) -> String {
    let columns: Vec<Value> = columns
        .iter()
        .map(|(name, type_tag)| json!({ "name": name, "type": type_tag }))
        .collect();

    json!({
        "schema": "public",
        "table": "test_table",
        "type": op,
        "commit_timestamp": "2023-10-15T10:30:00Z",
        "columns": columns,
        "record": record,
        "old_record": old_record,
    })
    .to_string()
}

/// Parses every non-empty output line as JSON.
pub fn output_lines(output: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(output)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
