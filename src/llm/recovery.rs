//! Best-effort JSON recovery for model responses
//!
//! Model backends frequently wrap JSON in markdown fences or surround it
//! with prose. The repair chain below applies narrow textual fixes in
//! order, stopping at the first successful parse. Anything it recovers is
//! best-effort data, never validated data.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").unwrap());

/// Recovers a JSON value from possibly-malformed response text.
///
/// Steps, first success wins: strip code fences and parse; extract the
/// first-`{`-to-last-`}` substring and parse; strip trailing commas before
/// closing brackets and parse. Returns `None` when all steps fail.
pub fn recover_json(text: &str) -> Option<Value> {
    let cleaned = strip_code_fences(text);
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Some(value);
    }

    let extracted = extract_object(&cleaned);
    if let Some(candidate) = &extracted {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Some(value);
        }
    }

    let base = extracted.as_deref().unwrap_or(&cleaned);
    serde_json::from_str::<Value>(&strip_trailing_commas(base)).ok()
}

fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn extract_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(text[start..=end].to_string())
}

fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const VALID: &str = r#"{"projectInfo": {"name": "demo"}, "routes": []}"#;

    #[test]
    fn test_valid_json_passes_through() {
        assert_eq!(
            recover_json(VALID).unwrap(),
            json!({"projectInfo": {"name": "demo"}, "routes": []})
        );
    }

    #[test]
    fn test_fenced_json_equals_plain_json() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert_eq!(recover_json(&fenced).unwrap(), recover_json(VALID).unwrap());
    }

    #[test]
    fn test_surrounding_prose_is_dropped() {
        let noisy = format!("Here is the explanation you asked for:\n{}\nLet me know!", VALID);
        assert_eq!(recover_json(&noisy).unwrap(), recover_json(VALID).unwrap());
    }

    #[test]
    fn test_trailing_commas_are_stripped() {
        let sloppy = r#"{"routes": ["a", "b",], "projectInfo": {"name": "demo",},}"#;
        assert_eq!(
            recover_json(sloppy).unwrap(),
            json!({"routes": ["a", "b"], "projectInfo": {"name": "demo"}})
        );
    }

    #[test]
    fn test_prose_and_trailing_comma_combined() {
        let text = "Sure!\n```json\n{\"routes\": [],\n}\n```\nHope that helps.";
        assert_eq!(recover_json(text).unwrap(), json!({"routes": []}));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(recover_json("I could not analyze this repository."), None);
        assert_eq!(recover_json(""), None);
        assert_eq!(recover_json("} backwards {"), None);
    }
}
