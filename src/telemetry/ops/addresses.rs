use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Addresses;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, List, Create, Delete }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Plan => "plan", Phase::List => "list", Phase::Create => "create", Phase::Delete => "delete" } }
    fn span(&self) -> Span { match self { Phase::Plan => info_span!("plan"), Phase::List => info_span!("list"), Phase::Create => info_span!("create"), Phase::Delete => info_span!("delete") } }
}

impl OpMarker for Addresses {
    const NAME: &'static str = "addresses";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("addresses") }
}
