//! Single-field updates against a replace-only rule endpoint.
//!
//! The upstream API has no PATCH for rules: flipping `enabled` means sending
//! the whole rule back. The reconciler reads the current rule, checks it still
//! has its `matchers` and `actions`, merges the one change and issues a PUT.
//! Concurrent updates of the same rule race; the last write wins.

use serde_json::Value;
use tracing::{debug, warn};

use super::envelope;
use super::error::CfError;
use super::fetcher::{self, FetchOpts};
use super::payload::RulePayload;
use super::transport::Transport;

/// Outcome of one lookup strategy.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    Usable(RulePayload),
    Unusable,
}

impl Lookup {
    fn from_record(record: Option<&Value>) -> Self {
        match record.and_then(RulePayload::normalize) {
            Some(payload) if payload.is_update_safe() => Lookup::Usable(payload),
            _ => Lookup::Unusable,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// `GET <collection>/<id>`; a 404 is unusable, any other failure is fatal.
    Direct,
    /// Walk the whole collection and match on identity.
    ListScan,
}

pub const DEFAULT_STRATEGIES: &[Strategy] = &[Strategy::Direct, Strategy::ListScan];

pub struct Reconciler<'a, T: Transport + ?Sized> {
    transport: &'a T,
    collection_path: String,
    fetch_opts: FetchOpts,
    strategies: &'a [Strategy],
}

impl<'a, T: Transport + ?Sized> Reconciler<'a, T> {
    pub fn new(transport: &'a T, collection_path: impl Into<String>, fetch_opts: FetchOpts) -> Self {
        Self {
            transport,
            collection_path: collection_path.into(),
            fetch_opts,
            strategies: DEFAULT_STRATEGIES,
        }
    }

    #[cfg(test)]
    pub fn with_strategies(mut self, strategies: &'a [Strategy]) -> Self {
        self.strategies = strategies;
        self
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<Value, CfError> {
        self.apply(id, "enabled", Value::Bool(enabled)).await
    }

    /// Replace the rule `id` with its current self plus `field = value`.
    /// Returns the upstream write response untouched.
    pub async fn apply(&self, id: &str, field: &str, value: Value) -> Result<Value, CfError> {
        let payload = self.resolve(id).await?;
        let target = payload.id.as_deref().unwrap_or(id);
        let body = payload.write_body(field, value)?;
        let path = item_path(&self.collection_path, target);
        debug!(path = %path, field, "replacing rule");
        self.transport.put(&path, Value::Object(body)).await
    }

    /// First update-safe payload produced by the strategy list.
    pub async fn resolve(&self, id: &str) -> Result<RulePayload, CfError> {
        for strategy in self.strategies {
            match self.lookup(*strategy, id).await? {
                Lookup::Usable(payload) => {
                    debug!(id, strategy = ?strategy, "update-safe rule found");
                    return Ok(payload);
                }
                Lookup::Unusable => debug!(id, strategy = ?strategy, "no usable rule"),
            }
        }
        Err(CfError::NotFoundOrIncomplete { id: id.to_string() })
    }

    async fn lookup(&self, strategy: Strategy, id: &str) -> Result<Lookup, CfError> {
        match strategy {
            Strategy::Direct => self.direct(id).await,
            Strategy::ListScan => self.list_scan(id).await,
        }
    }

    async fn direct(&self, id: &str) -> Result<Lookup, CfError> {
        let path = item_path(&self.collection_path, id);
        match self.transport.get(&path, &[]).await {
            Ok(body) => Ok(Lookup::from_record(Some(envelope::single_item(&body)))),
            Err(err) if err.is_not_found() => Ok(Lookup::Unusable),
            Err(err) => Err(err),
        }
    }

    async fn list_scan(&self, id: &str) -> Result<Lookup, CfError> {
        let collection =
            fetcher::fetch_all(self.transport, &self.collection_path, &self.fetch_opts).await?;
        Ok(Lookup::from_record(find_by_identity(&collection.items, id)))
    }
}

/// `id` is authoritative; the legacy `tag` only identifies records without an `id`.
pub fn find_by_identity<'v>(items: &'v [Value], wanted: &str) -> Option<&'v Value> {
    if let Some(hit) = items.iter().find(|item| item_id(item) == Some(wanted)) {
        return Some(hit);
    }
    let mut fallback = None;
    for item in items {
        if item.get("tag").and_then(Value::as_str) != Some(wanted) {
            continue;
        }
        match item_id(item) {
            None => {
                fallback = fallback.or(Some(item));
            }
            Some(other) => warn!(
                wanted,
                id = other,
                "tag matches but id differs; record skipped"
            ),
        }
    }
    fallback
}

fn item_id(item: &Value) -> Option<&str> {
    item.get("id").and_then(Value::as_str).filter(|s| !s.is_empty())
}

pub fn item_path(collection_path: &str, id: &str) -> String {
    format!(
        "{}/{}",
        collection_path.trim_end_matches('/'),
        urlencoding::encode(id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudflare::transport::MockTransport;
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    const RULES: &str = "/zones/z1/email/routing/rules";

    fn not_found() -> CfError {
        CfError::Api { status: StatusCode::NOT_FOUND, errors: Vec::new() }
    }

    fn reconciler(mock: &MockTransport) -> Reconciler<'_, MockTransport> {
        Reconciler::new(mock, RULES, FetchOpts::default())
    }

    #[tokio::test]
    async fn direct_hit_issues_one_get_and_one_put() {
        let mock = MockTransport::new();
        mock.push_response(Ok(json!({
            "result": {"id": "r1", "matchers": ["m"], "actions": ["a"], "enabled": false}
        })));
        mock.push_response(Ok(json!({"success": true, "result": {"id": "r1"}})));

        let out = reconciler(&mock).set_enabled("r1", true).await.unwrap();

        assert_eq!(out, json!({"success": true, "result": {"id": "r1"}}));
        let gets = mock.calls_with(Method::GET);
        let puts = mock.calls_with(Method::PUT);
        assert_eq!(gets.len(), 1);
        assert_eq!(gets[0].path, format!("{RULES}/r1"));
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].path, format!("{RULES}/r1"));
        assert_eq!(
            puts[0].body,
            Some(json!({"matchers": ["m"], "actions": ["a"], "enabled": true}))
        );
    }

    #[tokio::test]
    async fn enabled_override_ignores_previous_value() {
        let mock = MockTransport::new();
        mock.push_response(Ok(json!({
            "result": {"id": "r1", "matchers": [], "actions": [], "enabled": true, "name": "n", "priority": 5}
        })));
        mock.push_response(Ok(json!({"success": true})));

        reconciler(&mock).set_enabled("r1", false).await.unwrap();

        let put = &mock.calls_with(Method::PUT)[0];
        assert_eq!(
            put.body,
            Some(json!({"matchers": [], "actions": [], "name": "n", "priority": 5, "enabled": false}))
        );
    }

    #[tokio::test]
    async fn bare_object_response_is_accepted() {
        let mock = MockTransport::new();
        mock.push_response(Ok(json!({"id": "r1", "matchers": ["m"], "actions": ["a"]})));
        mock.push_response(Ok(json!({"success": true})));

        reconciler(&mock).set_enabled("r1", true).await.unwrap();

        assert_eq!(mock.calls_with(Method::PUT).len(), 1);
    }

    #[tokio::test]
    async fn not_found_falls_back_to_listing() {
        let mock = MockTransport::new();
        mock.push_response(Err(not_found()));
        mock.push_response(Ok(json!({
            "result": [{"id": "other", "matchers": [], "actions": []}],
            "result_info": {"total_pages": 2}
        })));
        mock.push_response(Ok(json!({
            "result": [{"id": "r1", "matchers": ["m"], "actions": ["a"], "enabled": false}],
            "result_info": {"total_pages": 2}
        })));
        mock.push_response(Ok(json!({"success": true})));

        reconciler(&mock).set_enabled("r1", true).await.unwrap();

        let gets = mock.calls_with(Method::GET);
        assert_eq!(gets.len(), 3);
        assert_eq!(gets[1].path, RULES);
        let puts = mock.calls_with(Method::PUT);
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].path, format!("{RULES}/r1"));
        assert_eq!(puts[0].body.as_ref().unwrap()["enabled"], json!(true));
    }

    #[tokio::test]
    async fn incomplete_everywhere_fails_without_writing() {
        let mock = MockTransport::new();
        mock.push_response(Ok(json!({"result": {"id": "r1", "matchers": ["m"]}})));
        mock.push_response(Ok(json!({
            "result": [{"id": "r2", "matchers": ["m"], "actions": ["a"]}],
            "result_info": {"total_pages": 1}
        })));

        let err = reconciler(&mock).set_enabled("r1", true).await.unwrap_err();

        assert!(matches!(err, CfError::NotFoundOrIncomplete { ref id } if id == "r1"));
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(mock.calls_with(Method::GET).len(), 2);
        assert!(mock.calls_with(Method::PUT).is_empty());
    }

    #[tokio::test]
    async fn incomplete_direct_hit_falls_back_to_listing() {
        let mock = MockTransport::new();
        mock.push_response(Ok(json!({"result": {"id": "r1", "matchers": ["m"]}})));
        mock.push_response(Ok(json!({
            "result": [{"id": "r1", "matchers": ["m"], "actions": ["a"], "enabled": false}],
            "result_info": {"total_pages": 1}
        })));
        mock.push_response(Ok(json!({"success": true})));

        reconciler(&mock).set_enabled("r1", true).await.unwrap();

        let gets = mock.calls_with(Method::GET);
        assert_eq!(gets.len(), 2);
        assert_eq!(gets[0].path, format!("{RULES}/r1"));
        assert_eq!(gets[1].path, RULES);
        let puts = mock.calls_with(Method::PUT);
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].path, format!("{RULES}/r1"));
        let body = puts[0].body.as_ref().unwrap();
        assert_eq!(body["matchers"], json!(["m"]));
        assert_eq!(body["actions"], json!(["a"]));
        assert_eq!(body["enabled"], true);
    }

    #[tokio::test]
    async fn incomplete_listing_record_is_not_used() {
        let mock = MockTransport::new();
        mock.push_response(Err(not_found()));
        mock.push_response(Ok(json!({
            "result": [{"id": "r1", "actions": ["a"]}],
            "result_info": {"total_pages": 1}
        })));

        let err = reconciler(&mock).set_enabled("r1", false).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(mock.calls_with(Method::PUT).is_empty());
    }

    #[tokio::test]
    async fn other_direct_errors_are_fatal() {
        let mock = MockTransport::new();
        mock.push_response(Err(CfError::Api {
            status: StatusCode::FORBIDDEN,
            errors: Vec::new(),
        }));

        let err = reconciler(&mock).set_enabled("r1", true).await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn tag_match_addresses_put_by_requested_identifier() {
        let mock = MockTransport::new();
        mock.push_response(Err(not_found()));
        mock.push_response(Ok(json!({
            "result": [{"tag": "legacy/1", "matchers": ["m"], "actions": ["a"]}],
            "result_info": {"total_pages": 1}
        })));
        mock.push_response(Ok(json!({"success": true})));

        reconciler(&mock).set_enabled("legacy/1", true).await.unwrap();

        let puts = mock.calls_with(Method::PUT);
        assert_eq!(puts[0].path, format!("{RULES}/legacy%2F1"));
    }

    #[tokio::test]
    async fn list_only_strategy_skips_direct_get() {
        let mock = MockTransport::new();
        mock.push_response(Ok(json!({
            "result": [{"id": "r1", "matchers": ["m"], "actions": ["a"]}],
            "result_info": {"total_pages": 1}
        })));
        mock.push_response(Ok(json!({"success": true})));

        reconciler(&mock)
            .with_strategies(&[Strategy::ListScan])
            .apply("r1", "priority", json!(10))
            .await
            .unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].path, RULES);
        assert_eq!(calls[1].body.as_ref().unwrap()["priority"], json!(10));
    }

    #[test]
    fn id_wins_over_tag() {
        let items = vec![
            json!({"tag": "x", "name": "by-tag"}),
            json!({"id": "x", "name": "by-id"}),
        ];
        assert_eq!(find_by_identity(&items, "x").unwrap()["name"], "by-id");
    }

    #[test]
    fn tag_with_divergent_id_is_skipped() {
        let items = vec![json!({"id": "y", "tag": "x"})];
        assert!(find_by_identity(&items, "x").is_none());
    }

    #[test]
    fn item_path_encodes_identifier() {
        assert_eq!(item_path("/rules/", "a b"), "/rules/a%20b");
    }
}
