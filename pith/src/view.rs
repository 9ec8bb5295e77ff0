use std::fmt::Write as _;

use crate::{Block, DictRef, GapBuffer, Value, ViewRef, dictionary::lookup};

/// Declarative style set by a component dictionary's style slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub color: Option<String>,
    pub background: Option<String>,
    pub border: Option<String>,
    pub padding: Option<i32>,
    pub gap: Option<i32>,
    pub bold: Option<bool>,
    pub fill: bool,
}

#[derive(Debug)]
pub enum ViewKind {
    Text(String),
    TextField {
        buffer: GapBuffer,
        on_change: Option<Block>,
    },
    Button {
        label: String,
        on_click: Option<Block>,
    },
    VStack(Vec<ViewRef>),
    HStack(Vec<ViewRef>),
    Spacer,
}

/// A node of the UI tree handed to the host renderer.
#[derive(Debug)]
pub struct View {
    pub kind: ViewKind,
    pub style: Style,
}

impl View {
    pub fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            style: Style::default(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ViewKind::Text(_) => "TEXT",
            ViewKind::TextField { .. } => "TEXTFIELD",
            ViewKind::Button { .. } => "BUTTON",
            ViewKind::VStack(_) => "VSTACK",
            ViewKind::HStack(_) => "HSTACK",
            ViewKind::Spacer => "SPACER",
        }
    }

    pub fn children(&self) -> &[ViewRef] {
        match &self.kind {
            ViewKind::VStack(children) | ViewKind::HStack(children) => children,
            _ => &[],
        }
    }

    /// Copies the style slots visible from `dict` onto this view.
    ///
    /// Only cached values of the expected type count; a `background` of
    /// `none` or `transparent` clears it.
    pub fn apply_dict_styles(&mut self, dict: &DictRef) {
        let cached = |name: &str| lookup(dict, name).and_then(|slot| slot.cached);
        let style = &mut self.style;

        if let Some(Value::String(color)) = cached("color") {
            style.color = Some(color);
        }
        if let Some(Value::String(background)) = cached("background") {
            style.background = match background.as_str() {
                "none" | "transparent" => None,
                _ => Some(background),
            };
        }
        if let Some(Value::Number(padding)) = cached("padding") {
            style.padding = Some(padding as i32);
        }
        if let Some(Value::Number(gap)) = cached("gap") {
            style.gap = Some(gap as i32);
        }
        if let Some(Value::String(border)) = cached("border") {
            style.border = Some(border);
        }
        if let Some(Value::Bool(bold)) = cached("bold") {
            style.bold = Some(bold);
        }
        if let Some(Value::Bool(fill)) = cached("fill") {
            style.fill = fill;
        }
    }

    /// Indented one-line-per-node dump of the tree.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out, 0);
        out
    }

    fn describe_into(&self, out: &mut String, indent: usize) {
        let _ = write!(out, "{:width$}{}", "", self.kind_name(), width = indent * 2);
        match &self.kind {
            ViewKind::Text(text) => {
                let _ = write!(out, ": {text:?}");
            }
            ViewKind::Button { label, .. } => {
                let _ = write!(out, ": {label:?}");
            }
            ViewKind::TextField { buffer, .. } => {
                let _ = write!(out, ": {:?}", buffer.text());
            }
            ViewKind::VStack(children) | ViewKind::HStack(children) => {
                let _ = write!(out, " ({} children)", children.len());
            }
            ViewKind::Spacer => {}
        }
        out.push('\n');
        for child in self.children() {
            child.borrow().describe_into(out, indent + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dictionary;
    use std::{cell::RefCell, rc::Rc};

    fn text(s: &str) -> ViewRef {
        Rc::new(RefCell::new(View::new(ViewKind::Text(s.into()))))
    }

    #[test]
    fn styles_come_from_cached_slots_and_parents() {
        let base = Dictionary::new_ref(Some("base"));
        base.borrow_mut().set_value("padding", Value::Number(4.0));
        base.borrow_mut().set_value("bold", Value::Bool(true));

        let card = Dictionary::new_ref(Some("card"));
        card.borrow_mut().set_parent(Some(&base));
        card.borrow_mut().set_value("color", "red".into());
        card.borrow_mut().set_value("gap", "wide".into());

        let mut view = View::new(ViewKind::Spacer);
        view.apply_dict_styles(&card);

        assert_eq!(view.style.color.as_deref(), Some("red"));
        assert_eq!(view.style.padding, Some(4));
        assert_eq!(view.style.bold, Some(true));
        assert_eq!(view.style.gap, None);
    }

    #[test]
    fn transparent_background_clears() {
        let d = Dictionary::new_ref(None);
        d.borrow_mut().set_value("background", "transparent".into());
        let mut view = View::new(ViewKind::Spacer);
        view.style.background = Some("blue".into());
        view.apply_dict_styles(&d);
        assert_eq!(view.style.background, None);
    }

    #[test]
    fn describe_nests_children() {
        let stack = View::new(ViewKind::VStack(vec![text("a"), text("b")]));
        assert_eq!(
            stack.describe(),
            "VSTACK (2 children)\n  TEXT: \"a\"\n  TEXT: \"b\"\n"
        );
    }
}
