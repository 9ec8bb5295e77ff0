use super::inputs;
use crate::{ExecutionResult, PrimitiveContext, Value};

pub fn and(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    ctx.push(a.is_truthy() && b.is_truthy())
}

pub fn or(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    ctx.push(a.is_truthy() || b.is_truthy())
}

pub fn not(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a] = inputs(ctx)?;
    ctx.push(!a.is_truthy())
}

/// ( value -- )
pub fn print(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [value] = inputs(ctx)?;
    println!("{value}");
    Ok(())
}

/// ( value -- signal )
pub fn signal(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [value] = inputs(ctx)?;
    let signal = ctx.runtime.signals.create(value);
    ctx.push(Value::Signal(signal))
}

// ───────────────────────────────────────────────────────────────────
// Types
// ───────────────────────────────────────────────────────────────────

pub fn type_of(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [value] = inputs(ctx)?;
    ctx.push(value.type_name())
}

fn type_check(ctx: &mut PrimitiveContext, check: fn(&Value) -> bool) -> ExecutionResult {
    let [value] = inputs(ctx)?;
    ctx.push(check(&value))
}

pub fn is_string(ctx: &mut PrimitiveContext) -> ExecutionResult {
    type_check(ctx, |v| matches!(v, Value::String(_)))
}

pub fn is_number(ctx: &mut PrimitiveContext) -> ExecutionResult {
    type_check(ctx, |v| matches!(v, Value::Number(_)))
}

pub fn is_array(ctx: &mut PrimitiveContext) -> ExecutionResult {
    type_check(ctx, |v| matches!(v, Value::Array(_)))
}

pub fn is_map(ctx: &mut PrimitiveContext) -> ExecutionResult {
    type_check(ctx, |v| matches!(v, Value::Dict(_)))
}

pub fn is_bool(ctx: &mut PrimitiveContext) -> ExecutionResult {
    type_check(ctx, |v| matches!(v, Value::Bool(_)))
}

pub fn is_nil(ctx: &mut PrimitiveContext) -> ExecutionResult {
    type_check(ctx, |v| matches!(v, Value::Nil))
}

// ───────────────────────────────────────────────────────────────────
// Conversion
// ───────────────────────────────────────────────────────────────────

pub fn to_string(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [value] = inputs(ctx)?;
    ctx.push(value.to_string())
}

/// Strings must parse as a whole; anything unparseable becomes nil.
pub fn to_number(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [value] = inputs(ctx)?;
    let number = match value {
        Value::Number(n) => Value::Number(n),
        Value::Bool(b) => Value::Number(if b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim_start()
            .parse::<f64>()
            .map_or(Value::Nil, Value::Number),
        _ => Value::Nil,
    };
    ctx.push(number)
}
