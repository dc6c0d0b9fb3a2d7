use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Rules;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, List, Create, Delete, Toggle }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::List => "list",
        Phase::Create => "create",
        Phase::Delete => "delete",
        Phase::Toggle => "toggle",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::List => info_span!("list"),
        Phase::Create => info_span!("create"),
        Phase::Delete => info_span!("delete"),
        Phase::Toggle => info_span!("toggle"),
    }}
}

impl OpMarker for Rules {
    const NAME: &'static str = "rules";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("rules") }
}
