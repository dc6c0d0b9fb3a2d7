use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
pub struct RuleCreatePlan {
    pub action: &'static str,
    pub alias: String,
    pub destination: String,
    pub body: Value,
}

#[derive(Serialize)]
pub struct RuleChangePlan {
    pub action: &'static str,
    pub id: String,
}

/// Forwarding rule `alias -> destination`, enabled on creation.
pub fn forward_rule_body(alias: &str, destination: &str, name: Option<&str>) -> Value {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{alias} -> {destination}"));
    json!({
        "enabled": true,
        "name": name,
        "matchers": [{ "type": "literal", "field": "to", "value": alias }],
        "actions": [{ "type": "forward", "value": [destination] }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_name_describes_the_forward() {
        let body = forward_rule_body("news@example.com", "me@example.org", None);
        assert_eq!(body["name"], "news@example.com -> me@example.org");
        assert_eq!(body["enabled"], true);
        assert_eq!(body["matchers"][0]["value"], "news@example.com");
        assert_eq!(body["actions"][0], json!({"type": "forward", "value": ["me@example.org"]}));
    }

    #[test]
    fn blank_name_falls_back_to_default() {
        let body = forward_rule_body("a@example.com", "b@example.org", Some("  "));
        assert_eq!(body["name"], "a@example.com -> b@example.org");
        let body = forward_rule_body("a@example.com", "b@example.org", Some("Newsletter"));
        assert_eq!(body["name"], "Newsletter");
    }
}
