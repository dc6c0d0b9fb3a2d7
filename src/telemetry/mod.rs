pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

pub fn rules() -> LogCtx<ops::rules::Rules> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn addresses() -> LogCtx<ops::addresses::Addresses> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn routing() -> LogCtx<ops::routing::Routing> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
