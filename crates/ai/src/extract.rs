use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

use crate::AiError;

fn re_json_fence() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n\s*```").expect("invalid regex"))
}

/// Lift the JSON payload out of a model reply. Models frequently wrap the
/// requested JSON in a markdown fence despite being told not to.
pub fn json_payload(response: &str) -> &str {
    if let Some(caps) = re_json_fence().captures(response) {
        caps.get(1).map(|m| m.as_str()).unwrap_or(response)
    } else {
        response.trim()
    }
}

/// Deserialize the (possibly fenced) JSON body of a model reply.
pub fn parse_json<T: DeserializeOwned>(response: &str) -> Result<T, AiError> {
    let payload = json_payload(response);
    serde_json::from_str(payload).map_err(|e| {
        tracing::debug!(raw = response, "unparseable model output");
        AiError::Unparseable(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn bare_json_passes_through() {
        let v: Value = parse_json(r#"{"ok": true}"#).unwrap();
        assert_eq!(v["ok"], true);
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let reply = "```json\n{\"amount\": 50000}\n```";
        let v: Value = parse_json(reply).unwrap();
        assert_eq!(v["amount"], 50000);
    }

    #[test]
    fn fence_without_language_tag() {
        let reply = "```\n{\"amount\": 1}\n```";
        let v: Value = parse_json(reply).unwrap();
        assert_eq!(v["amount"], 1);
    }

    #[test]
    fn surrounding_prose_with_fence() {
        let reply = "Here you go:\n```json\n{\"x\": 1}\n```\nanything else?";
        let v: Value = parse_json(reply).unwrap();
        assert_eq!(v["x"], 1);
    }

    #[test]
    fn whitespace_trimmed() {
        let v: Value = parse_json("  \n {\"x\": 2} \n ").unwrap();
        assert_eq!(v["x"], 2);
    }

    #[test]
    fn prose_is_an_error() {
        let err = parse_json::<Value>("maaf, gw nggak ngerti").unwrap_err();
        assert!(matches!(err, AiError::Unparseable(_)));
    }
}
