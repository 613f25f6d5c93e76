use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::errors::{RosterIssue, RosterReport};
use crate::types::Candidate;

/// Load candidates from a JSON file.
///
/// Accepts either a bare array or an object with a `candidates` array.
pub fn load_roster(path: &str) -> Result<Vec<Candidate>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read roster {path}"))?;
    let data: Value =
        serde_json::from_str(&content).with_context(|| format!("{path}: invalid JSON"))?;
    parse_roster(data).with_context(|| format!("{path}: invalid roster"))
}

pub fn parse_roster(data: Value) -> Result<Vec<Candidate>> {
    let list = match data {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut obj) => match obj.remove("candidates") {
            Some(list @ Value::Array(_)) => list,
            Some(_) => bail!("\"candidates\" must be an array"),
            None => bail!("missing \"candidates\" array"),
        },
        _ => bail!("roster must be an array or an object with \"candidates\""),
    };
    Ok(serde_json::from_value(list)?)
}

/// Check a roster for duplicate ids and blank fields.
pub fn check_roster(file: &str, candidates: &[Candidate]) -> RosterReport {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for c in candidates {
        if c.id.as_str().trim().is_empty() {
            errors.push(RosterIssue {
                code: "R001".into(),
                message: format!("candidate \"{}\" has an empty id", c.name),
                candidate: None,
            });
        }
        if !seen.insert(&c.id) {
            errors.push(RosterIssue {
                code: "R002".into(),
                message: format!("duplicate candidate id \"{}\"", c.id),
                candidate: Some(c.id.clone()),
            });
        }
        if c.name.trim().is_empty() {
            errors.push(RosterIssue {
                code: "R003".into(),
                message: "candidate has an empty name".into(),
                candidate: Some(c.id.clone()),
            });
        }
    }

    RosterReport {
        file: file.to_string(),
        candidates: candidates.len(),
        pass: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_array() {
        let roster = parse_roster(json!([
            {"id": "p1", "name": "Emma"},
            {"id": "p2", "name": "Alex"}
        ]))
        .unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[1].name, "Alex");
    }

    #[test]
    fn parses_wrapped_object() {
        let roster = parse_roster(json!({"candidates": [{"id": "p1", "name": "Emma"}]})).unwrap();
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn rejects_scalar() {
        assert!(parse_roster(json!(42)).is_err());
        assert!(parse_roster(json!({"people": []})).is_err());
    }

    #[test]
    fn check_flags_duplicates_and_blank_names() {
        let roster = vec![
            Candidate::new("p1", "Emma"),
            Candidate::new("p1", "Alex"),
            Candidate::new("p3", " "),
        ];
        let report = check_roster("r.json", &roster);
        assert!(!report.pass);
        let codes: Vec<_> = report.errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, ["R002", "R003"]);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(&path, r#"[{"id": "p1", "name": "Emma", "age": 25}]"#).unwrap();
        let roster = load_roster(path.to_str().unwrap()).unwrap();
        assert_eq!(roster[0].age, Some(25));
    }

    #[test]
    fn load_missing_file_mentions_path() {
        let err = load_roster("/nonexistent/roster.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/roster.json"));
    }
}
