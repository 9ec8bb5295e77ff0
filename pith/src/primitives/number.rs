use super::inputs;
use crate::{ExecutionResult, PrimitiveContext, Value};

type NumberOp = fn(f64, f64) -> f64;
type CompareOp = fn(f64, f64) -> bool;

fn number_binop(ctx: &mut PrimitiveContext, op: NumberOp) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    let (a, b) = (ctx.number(&a)?, ctx.number(&b)?);
    ctx.push(op(a, b))
}

fn compare_binop(ctx: &mut PrimitiveContext, op: CompareOp) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    let (a, b) = (ctx.number(&a)?, ctx.number(&b)?);
    ctx.push(op(a, b))
}

/// ( a b -- a+b ), also concatenating two strings
pub fn add(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => ctx.push(a + b),
        (Value::String(mut a), Value::String(b)) => {
            a.push_str(&b);
            ctx.push(a)
        }
        (a, b) => Err(ctx.type_error(format!(
            "cannot add {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

pub fn subtract(ctx: &mut PrimitiveContext) -> ExecutionResult {
    number_binop(ctx, |a, b| a - b)
}

pub fn multiply(ctx: &mut PrimitiveContext) -> ExecutionResult {
    number_binop(ctx, |a, b| a * b)
}

pub fn divide(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    let (a, b) = (ctx.number(&a)?, ctx.number(&b)?);
    if b == 0.0 {
        return Err(ctx.type_error("division by zero"));
    }
    ctx.push(a / b)
}

/// Float remainder, sign follows the dividend.
pub fn modulo(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    let (a, b) = (ctx.number(&a)?, ctx.number(&b)?);
    if b == 0.0 {
        return Err(ctx.type_error("modulo by zero"));
    }
    ctx.push(a % b)
}

pub fn abs(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a] = inputs(ctx)?;
    let a = ctx.number(&a)?;
    ctx.push(a.abs())
}

pub fn min(ctx: &mut PrimitiveContext) -> ExecutionResult {
    number_binop(ctx, f64::min)
}

pub fn max(ctx: &mut PrimitiveContext) -> ExecutionResult {
    number_binop(ctx, f64::max)
}

// ───────────────────────────────────────────────────────────────────
// Comparison
// ───────────────────────────────────────────────────────────────────

/// ( a b -- bool ), any two values
pub fn eq(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    ctx.push(a.equals(&b))
}

pub fn neq(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    ctx.push(!a.equals(&b))
}

pub fn lt(ctx: &mut PrimitiveContext) -> ExecutionResult {
    compare_binop(ctx, |a, b| a < b)
}

pub fn gt(ctx: &mut PrimitiveContext) -> ExecutionResult {
    compare_binop(ctx, |a, b| a > b)
}

pub fn leq(ctx: &mut PrimitiveContext) -> ExecutionResult {
    compare_binop(ctx, |a, b| a <= b)
}

pub fn geq(ctx: &mut PrimitiveContext) -> ExecutionResult {
    compare_binop(ctx, |a, b| a >= b)
}
