//! Dictionaries used as plain data. Mutating words copy the dictionary
//! and push the copy; the original is never touched.

use super::inputs;
use crate::{DictRef, Dictionary, ExecutionResult, PrimitiveContext, Value, dictionary::lookup};

fn map_arg(ctx: &PrimitiveContext, value: Value) -> ExecutionResult<DictRef> {
    match value {
        Value::Dict(dict) => Ok(dict),
        other => Err(ctx.type_error(format!("expected map, got {}", other.type_name()))),
    }
}

/// ( map key -- dict key )
fn map_and_key(ctx: &mut PrimitiveContext) -> ExecutionResult<(DictRef, String)> {
    let [map, key] = inputs(ctx)?;
    Ok((map_arg(ctx, map)?, ctx.string(key)?))
}

pub fn new_map(ctx: &mut PrimitiveContext) -> ExecutionResult {
    ctx.push(Value::dict(Dictionary::new(None)))
}

/// ( map key -- value ), nil for missing keys and code slots
pub fn get(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let (map, key) = map_and_key(ctx)?;
    let value = lookup(&map, &key).and_then(|slot| slot.cached);
    ctx.push(value.unwrap_or_default())
}

/// ( value map key -- map )
pub fn set(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [value, map, key] = inputs(ctx)?;
    let (map, key) = (map_arg(ctx, map)?, ctx.string(key)?);
    let mut copy = map.borrow().copy();
    copy.set_value(&key, value);
    ctx.push(Value::dict(copy))
}

pub fn keys(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [map] = inputs(ctx)?;
    let map = map_arg(ctx, map)?;
    let keys: Vec<Value> = map
        .borrow()
        .slots()
        .iter()
        .map(|slot| Value::string(&*slot.name))
        .collect();
    ctx.push(keys)
}

pub fn values(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [map] = inputs(ctx)?;
    let map = map_arg(ctx, map)?;
    let values: Vec<Value> = map
        .borrow()
        .slots()
        .iter()
        .map(|slot| slot.cached.clone().unwrap_or_default())
        .collect();
    ctx.push(values)
}

pub fn has(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let (map, key) = map_and_key(ctx)?;
    ctx.push(lookup(&map, &key).is_some())
}

pub fn remove(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let (map, key) = map_and_key(ctx)?;
    let mut copy = map.borrow().copy();
    copy.remove_slot(&key);
    ctx.push(Value::dict(copy))
}

/// ( a b -- merged ), cached slots of `b` win
pub fn merge(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    let (a, b) = (map_arg(ctx, a)?, map_arg(ctx, b)?);
    let mut merged = a.borrow().copy();
    for slot in b.borrow().slots() {
        if let Some(value) = &slot.cached {
            merged.set_value(&slot.name, value.clone());
        }
    }
    ctx.push(Value::dict(merged))
}

pub fn sanitize(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [value] = inputs(ctx)?;
    ctx.push(value.sanitize())
}
