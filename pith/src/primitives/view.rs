use super::inputs;
use crate::{ExecutionResult, GapBuffer, PrimitiveContext, Value, View, ViewRef, view::ViewKind};

fn push_view(ctx: &mut PrimitiveContext, view: View) -> ExecutionResult {
    ctx.push(Value::view(view))
}

pub fn text(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [s] = inputs(ctx)?;
    let s = ctx.string(s)?;
    push_view(ctx, View::new(ViewKind::Text(s)))
}

/// ( string|gapbuf -- view )
pub fn textfield(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [content] = inputs(ctx)?;
    let buffer = match content {
        Value::String(s) => GapBuffer::from_text(&s),
        Value::GapBuffer(buffer) => buffer,
        other => {
            return Err(ctx.type_error(format!(
                "expected string or gapbuf, got {}",
                other.type_name()
            )));
        }
    };
    push_view(
        ctx,
        View::new(ViewKind::TextField {
            buffer,
            on_change: None,
        }),
    )
}

/// ( label -- view ) or ( label block -- view )
pub fn button(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let on_click = match ctx.peek() {
        Some(Value::Block(block)) => Some(*block),
        _ => None,
    };
    if on_click.is_some() {
        ctx.pop()?;
    }
    let label = ctx.pop()?;
    let label = ctx.string(label)?;
    push_view(ctx, View::new(ViewKind::Button { label, on_click }))
}

/// Keeps only the views of an array.
fn children(ctx: &mut PrimitiveContext) -> ExecutionResult<Vec<ViewRef>> {
    let [items] = inputs(ctx)?;
    let items = ctx.array(items)?;
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::View(view) => Some(view),
            _ => None,
        })
        .collect())
}

pub fn vstack(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let children = children(ctx)?;
    push_view(ctx, View::new(ViewKind::VStack(children)))
}

pub fn hstack(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let children = children(ctx)?;
    push_view(ctx, View::new(ViewKind::HStack(children)))
}

pub fn spacer(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let mut view = View::new(ViewKind::Spacer);
    view.style.fill = true;
    push_view(ctx, view)
}
