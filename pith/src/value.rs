use std::{cell::RefCell, rc::Rc};

use crate::{Dictionary, GapBuffer, Signal, View};

pub type DictRef = Rc<RefCell<Dictionary>>;
pub type SignalRef = Rc<RefCell<Signal>>;
pub type ViewRef = Rc<RefCell<View>>;

/// A `[start, end)` range of token indices in the runtime's token arena.
///
/// Used both for slot bodies and for `do ... end` block values. A block
/// captures no environment; free words resolve against whatever dictionary
/// is current when it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Block {
    pub start: usize,
    pub end: usize,
}

impl Block {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// A runtime value.
///
/// `Clone` is the language's copy: strings, arrays and gap buffers are
/// duplicated, dictionaries, signals and views are shared.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Dict(DictRef),
    Block(Block),
    View(ViewRef),
    GapBuffer(GapBuffer),
    Signal(SignalRef),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub fn dict(dict: Dictionary) -> Self {
        Self::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn view(view: View) -> Self {
        Self::View(Rc::new(RefCell::new(view)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Block(_) => "block",
            Self::View(_) => "view",
            Self::GapBuffer(_) => "gapbuf",
            Self::Signal(_) => "signal",
        }
    }

    /// Nil is false, numbers are true unless zero, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            _ => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictRef> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Language-level equality: scalars and arrays compare structurally,
    /// shared objects by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
            }
            (Self::Block(a), Self::Block(b)) => a == b,
            (Self::GapBuffer(a), Self::GapBuffer(b)) => a.to_bytes() == b.to_bytes(),
            (Self::Dict(a), Self::Dict(b)) => Rc::ptr_eq(a, b),
            (Self::View(a), Self::View(b)) => Rc::ptr_eq(a, b),
            (Self::Signal(a), Self::Signal(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Detached data-only copy: dictionaries lose their parent and code
    /// slots, blocks and views become nil.
    pub fn sanitize(&self) -> Value {
        match self {
            Self::Dict(d) => Value::dict(d.borrow().sanitize()),
            Self::Array(items) => Self::Array(items.iter().map(Value::sanitize).collect()),
            Self::Block(_) | Self::View(_) => Self::Nil,
            other => other.clone(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => write!(f, "[array:{}]", items.len()),
            Self::Dict(d) => match d.borrow().name() {
                Some(name) => f.write_str(name),
                None => f.write_str("[dict]"),
            },
            Self::Block(_) => f.write_str("[block]"),
            Self::View(_) => f.write_str("[view]"),
            Self::GapBuffer(gb) => f.write_str(&gb.text()),
            Self::Signal(s) => write!(f, "{}", s.borrow().get()),
        }
    }
}

/// Formats a number the way C's `%g` does: six significant digits,
/// trailing zeros removed, exponent form outside `1e-4 ..= 1e6`.
pub fn format_number(n: f64) -> String {
    const PRECISION: i32 = 6;

    if n.is_nan() {
        return "nan".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0".into() } else { "0".into() };
    }

    let sci = format!("{:.*e}", (PRECISION - 1) as usize, n);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{n:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
