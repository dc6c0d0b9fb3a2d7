use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::{info, debug, error, Span};

use super::emit;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span {
        debug!(op = %self.op_name(), phase = ph.name(), "phase");
        ph.span()
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }

    pub fn error_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { error!(op = %self.op_name(), details = %details, "{}", msg); }
        else { error!("❌ {} ({})", msg, details); }
    }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> { emit::print_plan(self.op_name(), plan, None) }
    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> { emit::print_result(self.op_name(), result, None) }
}

// Listing helpers shared by the collection commands
impl LogCtx<crate::telemetry::ops::rules::Rules> {
    pub fn rule_line(&self, rule: &Value) {
        let id = rule.get("id").or_else(|| rule.get("tag")).and_then(Value::as_str).unwrap_or("?");
        let enabled = rule.get("enabled").and_then(Value::as_bool).unwrap_or(false);
        let name = rule.get("name").and_then(Value::as_str).unwrap_or("");
        if self.json { info!(op = %self.op_name(), id, enabled, rule_name = name, "rule"); }
        else { info!("{} [{}] {}", if enabled { "✅" } else { "⏸️" }, id, name); }
    }

    pub fn totals(&self, rules: usize, enabled: usize) {
        if self.json { info!(op = %self.op_name(), rules, enabled, "rules_totals"); }
        else { info!("📊 Rules — total={} enabled={}", rules, enabled); }
    }
}

impl LogCtx<crate::telemetry::ops::addresses::Addresses> {
    pub fn address_line(&self, address: &Value) {
        let id = address.get("id").or_else(|| address.get("tag")).and_then(Value::as_str).unwrap_or("?");
        let email = address.get("email").and_then(Value::as_str).unwrap_or("");
        let verified = address.get("verified").map(|v| !v.is_null()).unwrap_or(false);
        if self.json { info!(op = %self.op_name(), id, email, verified, "address"); }
        else { info!("{} [{}] {}", if verified { "✅" } else { "⏳" }, id, email); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}
