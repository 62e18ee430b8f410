//! Reference actors.
//!
//! Small, generic behaviors for demo scenarios and tests. Real deployments
//! supply their own [`Actor`] implementations.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::act::{ActContext, Actor, Parms, ResolveContext};
use crate::store::is_valid_path;

fn number(parms: &Parms, key: &str) -> Result<f64> {
    parms
        .get(key)
        .and_then(Value::as_f64)
        .with_context(|| format!("missing numeric parm '{key}'"))
}

fn path<'a>(parms: &'a Parms, key: &str) -> Result<&'a str> {
    let path = parms
        .get(key)
        .and_then(Value::as_str)
        .with_context(|| format!("missing string parm '{key}'"))?;
    if !is_valid_path(path) {
        bail!("invalid store path '{path}' in parm '{key}'");
    }
    Ok(path)
}

fn state_number(ctx: &ActContext<'_>, field: &str) -> f64 {
    ctx.state(field).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Always holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl Actor for Always {
    fn name(&self) -> &str {
        "always"
    }

    fn act(&self, _parms: &mut Parms, _ctx: &mut ActContext<'_>) -> Result<Option<bool>> {
        Ok(Some(true))
    }
}

/// Holds once the owning framer has spent `secs` in its active frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElapsedAtLeast;

impl Actor for ElapsedAtLeast {
    fn name(&self) -> &str {
        "elapsed"
    }

    fn act(&self, parms: &mut Parms, ctx: &mut ActContext<'_>) -> Result<Option<bool>> {
        let secs = number(parms, "secs")?;
        Ok(Some(state_number(ctx, "elapsed") >= secs))
    }

    fn resolve(&self, parms: &mut Parms, _ctx: &ResolveContext<'_>) -> Result<()> {
        let secs = number(parms, "secs")?;
        if secs < 0.0 {
            bail!("parm 'secs' must be >= 0, got {secs}");
        }
        Ok(())
    }
}

/// Holds once the owning framer has recurred `count` times in its active frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecurredAtLeast;

impl Actor for RecurredAtLeast {
    fn name(&self) -> &str {
        "recurred"
    }

    fn act(&self, parms: &mut Parms, ctx: &mut ActContext<'_>) -> Result<Option<bool>> {
        let count = number(parms, "count")?;
        Ok(Some(state_number(ctx, "recurred") >= count))
    }

    fn resolve(&self, parms: &mut Parms, _ctx: &ResolveContext<'_>) -> Result<()> {
        number(parms, "count")?;
        Ok(())
    }
}

/// Holds when the share at `path` equals `value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShareEquals;

impl Actor for ShareEquals {
    fn name(&self) -> &str {
        "share_equals"
    }

    fn act(&self, parms: &mut Parms, ctx: &mut ActContext<'_>) -> Result<Option<bool>> {
        let path = path(parms, "path")?;
        let expected = parms.get("value").unwrap_or(&Value::Null);
        Ok(Some(ctx.store.get(path) == Some(expected)))
    }

    fn resolve(&self, parms: &mut Parms, _ctx: &ResolveContext<'_>) -> Result<()> {
        path(parms, "path")?;
        Ok(())
    }
}

/// Writes `value` to the share at `path`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Poke;

impl Actor for Poke {
    fn name(&self) -> &str {
        "poke"
    }

    fn act(&self, parms: &mut Parms, ctx: &mut ActContext<'_>) -> Result<Option<bool>> {
        let path = path(parms, "path")?;
        let value = parms.get("value").cloned().unwrap_or(Value::Null);
        ctx.store.set(path, value)?;
        Ok(None)
    }

    fn resolve(&self, parms: &mut Parms, _ctx: &ResolveContext<'_>) -> Result<()> {
        path(parms, "path")?;
        Ok(())
    }
}

/// Marks the owning framer done.
#[derive(Debug, Clone, Copy, Default)]
pub struct Complete;

impl Actor for Complete {
    fn name(&self) -> &str {
        "complete"
    }

    fn act(&self, _parms: &mut Parms, ctx: &mut ActContext<'_>) -> Result<Option<bool>> {
        ctx.complete();
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::act::Act;
    use crate::core::types::{ActionContext, Schedule};
    use crate::error::FramingError;
    use crate::house::House;
    use crate::store::Store;
    use serde_json::json;

    fn call(act: &mut Act, store: &mut Store) -> Option<bool> {
        let mut done = false;
        let mut ctx = ActContext::new(store, "F", "A", ActionContext::Preact, &mut done);
        act.call(&mut ctx).expect("call")
    }

    #[test]
    fn elapsed_reads_framer_mirror() {
        let mut store = Store::new();
        let mut act = Act::new(ElapsedAtLeast).with_parm("secs", 1.0);
        assert_eq!(call(&mut act, &mut store), Some(false));
        store.set("framer.F.state.elapsed", 1.5).expect("set");
        assert_eq!(call(&mut act, &mut store), Some(true));
    }

    #[test]
    fn poke_then_share_equals() {
        let mut store = Store::new();
        let mut poke = Act::new(Poke).with_parm("path", "door.open").with_parm("value", true);
        let mut check = Act::new(ShareEquals)
            .with_parm("path", "door.open")
            .with_parm("value", true);
        assert_eq!(call(&mut check, &mut store), Some(false));
        assert_eq!(call(&mut poke, &mut store), None);
        assert_eq!(store.get("door.open"), Some(&json!(true)));
        assert_eq!(call(&mut check, &mut store), Some(true));
    }

    #[test]
    fn bad_parms_fail_at_resolve() {
        let mut house = House::new("test");
        let f = house.add_framer("F", Schedule::Active, 0.0).expect("F");
        let a = house.add_frame(f, "A").expect("A");
        house
            .add_act(a, ActionContext::Enact, Act::new(Poke).with_parm("path", "no..path"))
            .expect("act");
        let err = house.resolve().expect_err("bad path");
        assert!(matches!(err, FramingError::Act { .. }));
        assert!(format!("{:#}", anyhow::Error::from(err)).contains("invalid store path"));
    }
}
