use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Routing;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, EnableDns }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Plan => "plan", Phase::EnableDns => "enable_dns" } }
    fn span(&self) -> Span { match self { Phase::Plan => info_span!("plan"), Phase::EnableDns => info_span!("enable_dns") } }
}

impl OpMarker for Routing {
    const NAME: &'static str = "routing";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("routing") }
}
