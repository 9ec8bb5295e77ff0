use super::inputs;
use crate::{ExecutionResult, PithError, PrimitiveContext, dictionary::lookup};

/// Splits `"a.b.c"` into its non-empty segments; at least two are required.
fn segments<'s>(ctx: &PrimitiveContext, path: &'s str) -> ExecutionResult<Vec<&'s str>> {
    let parts: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    if parts.len() < 2 {
        return Err(ctx.type_error(format!("path '{path}' needs a dictionary and a slot")));
    }
    Ok(parts)
}

/// ( "a.b.c" -- value ), running the final slot if it is code
pub fn get_path(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [path] = inputs(ctx)?;
    let path = ctx.string(path)?;
    let parts = segments(ctx, &path)?;
    let Some((last, hops)) = parts.split_last() else {
        return Ok(());
    };

    let dict = ctx.runtime.resolve_path(hops)?;
    let slot = lookup(&dict, last).ok_or_else(|| PithError::UnknownSlot(last.to_string()))?;
    ctx.runtime.with_dict(dict, |rt| rt.execute_slot(&slot))
}

/// ( value "a.b.c" -- ), storing the value as a cached slot in place
pub fn set_path(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [value, path] = inputs(ctx)?;
    let path = ctx.string(path)?;
    let parts = segments(ctx, &path)?;
    let Some((last, hops)) = parts.split_last() else {
        return Ok(());
    };

    let dict = ctx.runtime.resolve_path(hops)?;
    dict.borrow_mut().set_value(last, value);
    Ok(())
}
