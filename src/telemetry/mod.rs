pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

pub fn enrich() -> LogCtx<ops::enrich::Enrich> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn clean() -> LogCtx<ops::clean::Clean> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn inspect() -> LogCtx<ops::inspect::Inspect> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
