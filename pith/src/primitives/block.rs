//! Higher-order words over arrays.
//!
//! Every element is pushed before the block runs in the current
//! dictionary; the block's result is taken back only if it left one.

use super::inputs;
use crate::{ExecutionResult, PrimitiveContext, Value};

/// ( array block -- items block )
fn array_and_block(ctx: &mut PrimitiveContext) -> ExecutionResult<(Vec<Value>, crate::Block)> {
    let [items, block] = inputs(ctx)?;
    let block = ctx.block(&block)?;
    Ok((ctx.array(items)?, block))
}

fn accepts(result: Option<Value>) -> bool {
    result.is_some_and(|v| v.is_truthy())
}

pub fn map(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let (items, block) = array_and_block(ctx)?;
    let mut mapped = Vec::with_capacity(items.len());
    for item in items {
        if let Some(result) = ctx.call_with(block, item)? {
            mapped.push(result);
        }
    }
    ctx.push(mapped)
}

pub fn filter(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let (items, block) = array_and_block(ctx)?;
    let mut kept = Vec::new();
    for item in items {
        if accepts(ctx.call_with(block, item.clone())?) {
            kept.push(item);
        }
    }
    ctx.push(kept)
}

/// ( array block -- ), whatever the block leaves stays on the stack
pub fn each(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let (items, block) = array_and_block(ctx)?;
    for item in items {
        ctx.push(item)?;
        ctx.runtime.run_block(block)?;
    }
    Ok(())
}

/// ( array initial block -- result ), the block sees ( acc item )
pub fn reduce(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [items, initial, block] = inputs(ctx)?;
    let block = ctx.block(&block)?;
    let items = ctx.array(items)?;

    let mut acc = initial;
    for item in items {
        let entry = ctx.depth();
        ctx.push(acc)?;
        ctx.push(item)?;
        ctx.runtime.run_block(block)?;
        acc = if ctx.depth() > entry {
            ctx.pop()?
        } else {
            Value::Nil
        };
    }
    ctx.push(acc)
}

pub fn find(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let (items, block) = array_and_block(ctx)?;
    for item in items {
        if accepts(ctx.call_with(block, item.clone())?) {
            return ctx.push(item);
        }
    }
    ctx.push(Value::Nil)
}

pub fn any(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let (items, block) = array_and_block(ctx)?;
    for item in items {
        if accepts(ctx.call_with(block, item)?) {
            return ctx.push(true);
        }
    }
    ctx.push(false)
}

/// A block that leaves nothing does not veto.
pub fn all(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let (items, block) = array_and_block(ctx)?;
    for item in items {
        if let Some(result) = ctx.call_with(block, item)? {
            if !result.is_truthy() {
                return ctx.push(false);
            }
        }
    }
    ctx.push(true)
}

#[cfg(test)]
mod tests {
    use crate::{
        ErrorKind, MemoryFileSystem, Runtime, Value,
        primitives::tests::{eval, eval_err},
    };

    fn nums(values: &[f64]) -> Value {
        Value::Array(values.iter().copied().map(Value::Number).collect())
    }

    #[test]
    fn map_and_filter() {
        assert_eq!(eval("[ 1 2 3 ] do 10 * end map"), vec![nums(&[10.0, 20.0, 30.0])]);
        assert_eq!(eval("[ 1 2 3 4 ] do 2 mod 0 = end filter"), vec![nums(&[2.0, 4.0])]);
    }

    #[test]
    fn each_leaves_results() {
        assert_eq!(eval("[ 1 2 ] do 1 + end each"), vec![2.0.into(), 3.0.into()]);
    }

    #[test]
    fn reduce_folds() {
        assert_eq!(eval("[ 1 2 3 ] 0 do + end reduce"), vec![6.0.into()]);
        assert_eq!(eval("[ 1 ] 5 do drop drop end reduce"), vec![Value::Nil]);
    }

    #[test]
    fn searching_blocks() {
        assert_eq!(
            eval("[ 1 5 9 ] do 4 > end find [ 1 ] do 4 > end find"),
            vec![5.0.into(), Value::Nil]
        );
        assert_eq!(
            eval("[ 1 2 ] do 2 = end any [ 1 2 ] do 0 > end all [ 1 2 ] do 1 = end all"),
            vec![true.into(), true.into(), false.into()]
        );
    }

    #[test]
    fn blocks_see_the_calling_dictionary() {
        let mut rt = Runtime::new(MemoryFileSystem::new());
        rt.load("calc:\n  k: 3\n  go: [ 1 2 ] do k * end map\nend\nmain: calc.go end")
            .unwrap();
        rt.run_named_slot("main").unwrap();
        assert_eq!(rt.stack(), &[nums(&[3.0, 6.0])]);
    }

    #[test]
    fn block_errors_propagate() {
        assert_eq!(eval_err("[ 1 ] do 0 / end map").kind(), ErrorKind::Type);
        assert_eq!(eval_err("[ 1 ] 2 map").kind(), ErrorKind::Type);
    }
}
