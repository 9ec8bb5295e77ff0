use super::inputs;
use crate::{ExecutionResult, PrimitiveContext, Value};

/// Clamps a numeric index into `0..=len`.
pub(super) fn clamp_index(n: f64, len: usize) -> usize {
    if n.is_nan() || n <= 0.0 {
        0
    } else {
        (n as usize).min(len)
    }
}

fn strings(items: impl IntoIterator<Item = impl Into<String>>) -> Value {
    Value::Array(items.into_iter().map(|s| Value::String(s.into())).collect())
}

/// ( string|array -- n ), bytes for strings
pub fn length(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [value] = inputs(ctx)?;
    let len = match &value {
        Value::String(s) => s.len(),
        Value::Array(items) => items.len(),
        other => {
            return Err(ctx.type_error(format!(
                "expected string or array, got {}",
                other.type_name()
            )));
        }
    };
    ctx.push(len as f64)
}

pub fn concat(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [a, b] = inputs(ctx)?;
    let mut a = ctx.string(a)?;
    a.push_str(&ctx.string(b)?);
    ctx.push(a)
}

/// ( string delimiter -- array ); an empty delimiter splits into characters
pub fn split(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [s, delimiter] = inputs(ctx)?;
    let (s, delimiter) = (ctx.string(s)?, ctx.string(delimiter)?);
    let parts = if delimiter.is_empty() {
        strings(s.chars().map(String::from))
    } else {
        strings(s.split(delimiter.as_str()))
    };
    ctx.push(parts)
}

/// ( array delimiter -- string )
pub fn join(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items, delimiter] = inputs(ctx)?;
    let (items, delimiter) = (ctx.array(items)?, ctx.string(delimiter)?);
    let joined = items
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(&delimiter);
    ctx.push(joined)
}

pub fn trim(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [s] = inputs(ctx)?;
    let s = ctx.string(s)?;
    ctx.push(s.trim())
}

/// ( string start end -- string ), byte offsets clamped to the string
pub fn substring(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [s, start, end] = inputs(ctx)?;
    let s = ctx.string(s)?;
    let end = clamp_index(ctx.number(&end)?, s.len());
    let start = clamp_index(ctx.number(&start)?, s.len()).min(end);
    let sub = String::from_utf8_lossy(&s.as_bytes()[start..end]).into_owned();
    ctx.push(sub)
}

/// ( container needle -- bool ) for substrings or array membership
pub fn contains(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [container, needle] = inputs(ctx)?;
    let found = match (&container, &needle) {
        (Value::String(s), Value::String(n)) => s.contains(n.as_str()),
        (Value::Array(items), needle) => items.iter().any(|item| item.equals(needle)),
        _ => {
            return Err(ctx.type_error(format!(
                "expected string or array, got {}",
                container.type_name()
            )));
        }
    };
    ctx.push(found)
}

/// ( string from to -- string ), every occurrence
pub fn replace(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [s, from, to] = inputs(ctx)?;
    let (s, from, to) = (ctx.string(s)?, ctx.string(from)?, ctx.string(to)?);
    if from.is_empty() {
        return ctx.push(s);
    }
    ctx.push(s.replace(&from, &to))
}

pub fn uppercase(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [s] = inputs(ctx)?;
    let s = ctx.string(s)?;
    ctx.push(s.to_uppercase())
}

pub fn lowercase(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [s] = inputs(ctx)?;
    let s = ctx.string(s)?;
    ctx.push(s.to_lowercase())
}

pub fn lines(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [s] = inputs(ctx)?;
    let s = ctx.string(s)?;
    ctx.push(strings(s.lines()))
}

pub fn words(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [s] = inputs(ctx)?;
    let s = ctx.string(s)?;
    ctx.push(strings(s.split_whitespace()))
}
