use std::cmp::Ordering;

use super::{inputs, string::clamp_index};
use crate::{ExecutionResult, PrimitiveContext, Value};

pub fn first(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items] = inputs(ctx)?;
    let items = ctx.array(items)?;
    ctx.push(items.into_iter().next().unwrap_or_default())
}

pub fn last(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items] = inputs(ctx)?;
    let mut items = ctx.array(items)?;
    ctx.push(items.pop().unwrap_or_default())
}

/// ( array index -- item|nil )
pub fn nth(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items, index] = inputs(ctx)?;
    let (mut items, index) = (ctx.array(items)?, ctx.number(&index)?);
    let item = if index < 0.0 || index as usize >= items.len() {
        Value::Nil
    } else {
        items.swap_remove(index as usize)
    };
    ctx.push(item)
}

/// ( array item -- array )
pub fn append(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items, item] = inputs(ctx)?;
    let mut items = ctx.array(items)?;
    items.push(item);
    ctx.push(items)
}

/// ( item array -- array )
pub fn prepend(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [item, items] = inputs(ctx)?;
    let mut items = ctx.array(items)?;
    items.insert(0, item);
    ctx.push(items)
}

/// ( array start end -- array ), clamped
pub fn slice(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items, start, end] = inputs(ctx)?;
    let mut items = ctx.array(items)?;
    let end = clamp_index(ctx.number(&end)?, items.len());
    let start = clamp_index(ctx.number(&start)?, items.len()).min(end);
    items.truncate(end);
    ctx.push(items.split_off(start))
}

pub fn reverse(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items] = inputs(ctx)?;
    let mut items = ctx.array(items)?;
    items.reverse();
    ctx.push(items)
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Numbers numerically, strings lexicographically; mixed pairs are equal.
pub fn sort(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items] = inputs(ctx)?;
    let mut items = ctx.array(items)?;
    items.sort_by(compare);
    ctx.push(items)
}

/// ( array item -- index ), -1 when absent
pub fn index_of(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items, item] = inputs(ctx)?;
    let items = ctx.array(items)?;
    let index = items
        .iter()
        .position(|candidate| candidate.equals(&item))
        .map_or(-1.0, |i| i as f64);
    ctx.push(index)
}

pub fn is_empty(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items] = inputs(ctx)?;
    let items = ctx.array(items)?;
    ctx.push(items.is_empty())
}
