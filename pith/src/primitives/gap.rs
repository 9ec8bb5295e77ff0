use super::inputs;
use crate::{ExecutionResult, GapBuffer, PrimitiveContext, Value};

fn buffer_arg(ctx: &PrimitiveContext, value: Value) -> ExecutionResult<GapBuffer> {
    match value {
        Value::GapBuffer(buffer) => Ok(buffer),
        other => Err(ctx.type_error(format!("expected gapbuf, got {}", other.type_name()))),
    }
}

/// ( arg buf -- buf' ): the popped buffer is already a private copy, so
/// it is edited and pushed back.
fn edit(
    ctx: &mut PrimitiveContext,
    op: fn(&mut GapBuffer, &Value, &PrimitiveContext) -> ExecutionResult,
) -> ExecutionResult {
    let [arg, buffer] = inputs(ctx)?;
    let mut buffer = buffer_arg(ctx, buffer)?;
    op(&mut buffer, &arg, ctx)?;
    ctx.push(Value::GapBuffer(buffer))
}

fn offset(ctx: &PrimitiveContext, value: &Value) -> ExecutionResult<isize> {
    Ok(ctx.number(value)? as isize)
}

fn position(ctx: &PrimitiveContext, value: &Value) -> ExecutionResult<usize> {
    Ok(ctx.number(value)?.max(0.0) as usize)
}

pub fn new_gap(ctx: &mut PrimitiveContext) -> ExecutionResult {
    ctx.push(Value::GapBuffer(GapBuffer::new()))
}

pub fn string_to_gap(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [s] = inputs(ctx)?;
    let s = ctx.string(s)?;
    ctx.push(Value::GapBuffer(GapBuffer::from_text(&s)))
}

pub fn gap_to_string(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [buffer] = inputs(ctx)?;
    let buffer = buffer_arg(ctx, buffer)?;
    ctx.push(buffer.text())
}

pub fn insert(ctx: &mut PrimitiveContext) -> ExecutionResult {
    edit(ctx, |buffer, text, ctx| {
        match text {
            Value::String(text) => buffer.insert(text),
            other => {
                return Err(ctx.type_error(format!("expected string, got {}", other.type_name())));
            }
        }
        Ok(())
    })
}

pub fn delete(ctx: &mut PrimitiveContext) -> ExecutionResult {
    edit(ctx, |buffer, n, ctx| {
        buffer.delete(offset(ctx, n)?);
        Ok(())
    })
}

pub fn move_cursor(ctx: &mut PrimitiveContext) -> ExecutionResult {
    edit(ctx, |buffer, n, ctx| {
        buffer.move_by(offset(ctx, n)?);
        Ok(())
    })
}

pub fn goto(ctx: &mut PrimitiveContext) -> ExecutionResult {
    edit(ctx, |buffer, pos, ctx| {
        buffer.goto(position(ctx, pos)?);
        Ok(())
    })
}

pub fn cursor(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [buffer] = inputs(ctx)?;
    let buffer = buffer_arg(ctx, buffer)?;
    ctx.push(buffer.cursor() as f64)
}

pub fn length(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [buffer] = inputs(ctx)?;
    let buffer = buffer_arg(ctx, buffer)?;
    ctx.push(buffer.len() as f64)
}

/// ( pos buf -- char|nil )
pub fn char_at(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [pos, buffer] = inputs(ctx)?;
    let buffer = buffer_arg(ctx, buffer)?;
    let pos = ctx.number(&pos)?;
    let ch = if pos < 0.0 {
        None
    } else {
        buffer.byte_at(pos as usize)
    };
    let value = ch.map_or(Value::Nil, |b| {
        Value::String(String::from_utf8_lossy(&[b]).into_owned())
    });
    ctx.push(value)
}

#[cfg(test)]
mod tests {
    use crate::{Value, primitives::tests::eval};
    use pretty_assertions::assert_eq;

    #[test]
    fn editing_round_trip() {
        assert_eq!(
            eval("\"world\" string-to-gap \"hello \" swap gap-insert gap-to-string"),
            vec!["hello world".into()]
        );
    }

    #[test]
    fn cursor_moves_and_deletes() {
        let src = "\"abcdef\" string-to-gap 3 swap gap-goto dup gap-cursor swap \
                   -1 swap gap-delete 1 swap gap-delete dup gap-to-string swap gap-length";
        assert_eq!(eval(src), vec![3.0.into(), "abef".into(), 4.0.into()]);
    }

    #[test]
    fn move_is_clamped() {
        assert_eq!(
            eval("\"ab\" string-to-gap 10 swap gap-move gap-cursor"),
            vec![2.0.into()]
        );
    }

    #[test]
    fn char_at_positions() {
        assert_eq!(
            eval("\"xy\" string-to-gap dup 1 swap gap-char swap 5 swap gap-char"),
            vec!["y".into(), Value::Nil]
        );
    }

    #[test]
    fn edits_leave_the_original_alone() {
        assert_eq!(
            eval("\"a\" string-to-gap dup \"b\" swap gap-insert drop gap-to-string"),
            vec!["a".into()]
        );
    }
}
