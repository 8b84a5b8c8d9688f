use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Enrich;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ReadInput, Fetch, Extract, Merge, WriteOutput }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::ReadInput => "read_input",
        Phase::Fetch => "fetch",
        Phase::Extract => "extract",
        Phase::Merge => "merge",
        Phase::WriteOutput => "write_output",
    }}
    fn span(&self) -> Span { match self {
        Phase::ReadInput => info_span!("read_input"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Extract => info_span!("extract"),
        Phase::Merge => info_span!("merge"),
        Phase::WriteOutput => info_span!("write_output"),
    }}
}

impl OpMarker for Enrich {
    const NAME: &'static str = "enrich";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("enrich") }
}
