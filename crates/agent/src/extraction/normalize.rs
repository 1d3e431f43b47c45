//! Post-validation normalization
//!
//! Turns a schema-valid JSON object into a complete `Blueprint`: absent or
//! null optional fields become empty, strings are trimmed, numbers and
//! booleans take their string form, objects are dropped, a comma-separated
//! string for a list field is split, and blank list entries are dropped.

use serde_json::{Map, Value};

use upop_core::Blueprint;

/// String form of a scalar; null and objects have none
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Trimmed text; lists are joined with `", "`; null and objects are empty
fn text(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::Array(items)) => string_items(items).join(", "),
        Some(value) => scalar(value).unwrap_or_default(),
        None => String::new(),
    }
}

/// List of trimmed, non-blank entries
fn list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    match object.get(key) {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => string_items(items),
        Some(value) => scalar(value).into_iter().collect(),
        None => Vec::new(),
    }
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(scalar)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Build a complete blueprint from a validated object
pub fn normalize(object: &Map<String, Value>) -> Blueprint {
    Blueprint {
        core_emotion: text(object, "core_emotion"),
        singing_to: text(object, "singing_to"),
        narrative_summary: text(object, "narrative_summary"),
        key_metaphor_or_image: text(object, "key_metaphor_or_image"),
        sonic_vibe: text(object, "sonic_vibe"),
        tempo_and_energy: text(object, "tempo_and_energy"),
        instrumentation_ideas: list(object, "instrumentation_ideas"),
        vocal_style: text(object, "vocal_style"),
        artist_purpose: text(object, "artist_purpose"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_absent_and_null_become_empty() {
        let blueprint = normalize(&object(json!({
            "core_emotion": "relief",
            "singing_to": null,
        })));
        assert_eq!(blueprint.core_emotion, "relief");
        assert_eq!(blueprint.singing_to, "");
        assert_eq!(blueprint.vocal_style, "");
        assert!(blueprint.instrumentation_ideas.is_empty());
    }

    #[test]
    fn test_strings_trimmed() {
        let blueprint = normalize(&object(json!({
            "sonic_vibe": "  driving alone at 2 AM \n",
        })));
        assert_eq!(blueprint.sonic_vibe, "driving alone at 2 AM");
    }

    #[test]
    fn test_comma_string_split_into_list() {
        let blueprint = normalize(&object(json!({
            "instrumentation_ideas": "dreamy synth pads, , gated drums ,808s",
        })));
        assert_eq!(
            blueprint.instrumentation_ideas,
            vec!["dreamy synth pads", "gated drums", "808s"]
        );
    }

    #[test]
    fn test_blank_and_null_list_entries_dropped() {
        let blueprint = normalize(&object(json!({
            "instrumentation_ideas": ["piano", "  ", null, " strings "],
        })));
        assert_eq!(blueprint.instrumentation_ideas, vec!["piano", "strings"]);
    }

    #[test]
    fn test_list_given_for_text_field_joined() {
        let blueprint = normalize(&object(json!({
            "vocal_style": ["raw", "vulnerable"],
        })));
        assert_eq!(blueprint.vocal_style, "raw, vulnerable");
    }

    #[test]
    fn test_scalars_coerced_and_objects_dropped() {
        let blueprint = normalize(&object(json!({
            "tempo_and_energy": 110,
            "vocal_style": true,
            "singing_to": {"name": "my ex"},
            "instrumentation_ideas": ["piano", 808, {"kind": "drums"}],
        })));
        assert_eq!(blueprint.tempo_and_energy, "110");
        assert_eq!(blueprint.vocal_style, "true");
        assert_eq!(blueprint.singing_to, "");
        assert_eq!(blueprint.instrumentation_ideas, vec!["piano", "808"]);
    }
}
