use anyhow::Result;
use serde::Serialize;

use crate::output::types::{Envelope, Meta};
use crate::output::{config::OutputConfig, Emitter};

pub fn print_plan<T: Serialize>(op: &'static str, plan: &T, meta: Option<Meta>) -> Result<()> {
    let env = Envelope::plan(op, plan, meta)?;
    emit(&env)
}

pub fn print_result<T: Serialize>(op: &'static str, result: &T, meta: Option<Meta>) -> Result<()> {
    let env = Envelope::result(op, result, meta)?;
    emit(&env)
}

fn emit(env: &Envelope) -> Result<()> {
    let mut cfg = OutputConfig::from_env();
    if super::config::json_mode() {
        cfg = cfg.force_json();
    }
    Emitter::from_config(cfg).emit(env)?;
    Ok(())
}
