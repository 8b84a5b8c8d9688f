use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Clean;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ReadInput, Filter, WriteOutput }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::ReadInput => "read_input",
        Phase::Filter => "filter",
        Phase::WriteOutput => "write_output",
    }}
    fn span(&self) -> Span { match self {
        Phase::ReadInput => info_span!("read_input"),
        Phase::Filter => info_span!("filter"),
        Phase::WriteOutput => info_span!("write_output"),
    }}
}

impl OpMarker for Clean {
    const NAME: &'static str = "clean";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("clean") }
}
