//! Template content parsing and placeholder substitution.
//!
//! Templates store a loosely structured task-tree as JSON text. The shape is
//! validated at instantiation time, not at storage time, so authoring stays
//! flexible while the instantiation path only ever produces well-formed
//! creation payloads. Date placeholder tokens are substituted textually in
//! the raw content before any parsing.

use crate::error::{Result, StrideError};
use crate::model::Priority;
use crate::storage::sqlite::local_day_start;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Deserialize;

/// One node of a template task-tree. `children` become subtasks of the task
/// created for this node, recursively.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateNode {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// RFC3339 date-time or `YYYY-MM-DD`, usually produced by a placeholder.
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub label_ids: Vec<i64>,
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

/// Parse template content into validated nodes. Accepts either a single node
/// object or an array of nodes.
///
/// # Errors
///
/// Returns [`StrideError::InvalidTemplate`] for malformed JSON, empty trees
/// or blank titles anywhere in the tree.
pub fn parse_content(raw: &str, now: DateTime<Utc>) -> Result<Vec<TemplateNode>> {
    let substituted = substitute_placeholders(raw, now);

    let nodes: Vec<TemplateNode> = match serde_json::from_str::<Vec<TemplateNode>>(&substituted) {
        Ok(nodes) => nodes,
        Err(_) => {
            let node: TemplateNode =
                serde_json::from_str(&substituted).map_err(|err| StrideError::InvalidTemplate {
                    reason: err.to_string(),
                })?;
            vec![node]
        }
    };

    if nodes.is_empty() {
        return Err(StrideError::InvalidTemplate {
            reason: "template has no tasks".to_string(),
        });
    }

    for node in &nodes {
        validate_node(node)?;
    }

    Ok(nodes)
}

fn validate_node(node: &TemplateNode) -> Result<()> {
    if node.title.trim().is_empty() {
        return Err(StrideError::InvalidTemplate {
            reason: "task title is empty".to_string(),
        });
    }
    if let Some(due) = &node.due {
        if parse_due(due).is_none() {
            return Err(StrideError::InvalidTemplate {
                reason: format!("unparseable due value: {due}"),
            });
        }
    }
    for child in &node.children {
        validate_node(child)?;
    }
    Ok(())
}

/// Replace the supported date tokens with concrete dates. Textual, before
/// JSON parsing, so tokens work anywhere a date string is expected.
#[must_use]
pub fn substitute_placeholders(raw: &str, now: DateTime<Utc>) -> String {
    let today = local_day_start(now);
    let fmt = |d: DateTime<Utc>| d.to_rfc3339();

    raw.replace("{{today}}", &fmt(today))
        .replace("{{tomorrow}}", &fmt(today + Duration::days(1)))
        .replace("{{next-week}}", &fmt(today + Duration::days(7)))
}

/// Parse a due value: RFC3339 first, bare date (midnight UTC) second.
#[must_use]
pub fn parse_due(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("valid midnight")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_node_and_array() {
        let now = Utc::now();
        let nodes = parse_content(r#"{"title": "Pack bags"}"#, now).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].title, "Pack bags");

        let nodes = parse_content(r#"[{"title": "A"}, {"title": "B"}]"#, now).unwrap();
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn parses_nested_children() {
        let raw = r#"{
            "title": "Trip prep",
            "priority": "high",
            "children": [
                {"title": "Book flights"},
                {"title": "Pack", "children": [{"title": "Chargers"}]}
            ]
        }"#;
        let nodes = parse_content(raw, Utc::now()).unwrap();
        assert_eq!(nodes[0].children.len(), 2);
        assert_eq!(nodes[0].children[1].children[0].title, "Chargers");
        assert_eq!(nodes[0].priority, Some(Priority::High));
    }

    #[test]
    fn rejects_malformed_content() {
        let now = Utc::now();
        assert!(parse_content("not json", now).is_err());
        assert!(parse_content("[]", now).is_err());
        assert!(parse_content(r#"{"title": "  "}"#, now).is_err());
        assert!(parse_content(r#"{"title": "x", "bogus": 1}"#, now).is_err());
        assert!(
            parse_content(r#"{"title": "x", "children": [{"title": ""}]}"#, now).is_err(),
            "blank titles are rejected recursively"
        );
    }

    #[test]
    fn substitutes_tokens_before_parsing() {
        let now = Utc::now();
        let nodes = parse_content(r#"{"title": "Daily review", "due": "{{today}}"}"#, now).unwrap();
        let due = parse_due(nodes[0].due.as_deref().unwrap()).unwrap();
        assert_eq!(due, local_day_start(now));

        let nodes =
            parse_content(r#"{"title": "Plan week", "due": "{{next-week}}"}"#, now).unwrap();
        let due = parse_due(nodes[0].due.as_deref().unwrap()).unwrap();
        assert_eq!(due, local_day_start(now) + Duration::days(7));
    }

    #[test]
    fn bare_dates_parse_at_midnight() {
        let due = parse_due("2026-09-15").unwrap();
        assert_eq!(due.to_rfc3339(), "2026-09-15T00:00:00+00:00");
        assert!(parse_due("someday").is_none());
    }
}
