use crate::{Block, ExecutionResult, PithError, Runtime, Value};

mod array;
mod block;
mod file;
mod gap;
mod general;
mod map;
mod number;
mod path;
mod stack;
mod string;
mod view;

pub type PrimitiveFunction = fn(&mut PrimitiveContext) -> ExecutionResult;

// inputs is the minimum stack depth checked before the call;
// words with an optional argument check the rest themselves
#[derive(Debug, Copy, Clone)]
pub struct Primitive {
    pub name: &'static str,
    pub inputs: usize,
    pub outputs: usize,
    pub ptr: PrimitiveFunction,
}

impl Primitive {
    pub const fn new(
        name: &'static str,
        inputs: usize,
        outputs: usize,
        ptr: PrimitiveFunction,
    ) -> Self {
        Self {
            name,
            inputs,
            outputs,
            ptr,
        }
    }

    pub fn stack_effect(&self) -> String {
        format!("( {} -- {} )", self.inputs, self.outputs)
    }
}

pub struct PrimitiveContext<'ex> {
    pub runtime: &'ex mut Runtime,
    /// Name the primitive was invoked under, for error messages.
    pub name: &'static str,
}

impl<'ex> PrimitiveContext<'ex> {
    pub fn new(runtime: &'ex mut Runtime, name: &'static str) -> Self {
        Self { runtime, name }
    }

    pub fn push(&mut self, value: impl Into<Value>) -> ExecutionResult {
        self.runtime.state.push(value.into())
    }

    pub fn pop(&mut self) -> ExecutionResult<Value> {
        self.runtime.pop_for(self.name)
    }

    pub fn peek(&self) -> Option<&Value> {
        self.runtime.state.peek()
    }

    pub fn depth(&self) -> usize {
        self.runtime.state.depth()
    }

    pub fn type_error(&self, message: impl Into<String>) -> PithError {
        PithError::type_error(self.name, message)
    }

    pub fn number(&self, value: &Value) -> ExecutionResult<f64> {
        value
            .as_number()
            .ok_or_else(|| self.type_error(format!("expected number, got {}", value.type_name())))
    }

    pub fn string(&self, value: Value) -> ExecutionResult<String> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(self.type_error(format!("expected string, got {}", other.type_name()))),
        }
    }

    pub fn array(&self, value: Value) -> ExecutionResult<Vec<Value>> {
        match value {
            Value::Array(items) => Ok(items),
            other => Err(self.type_error(format!("expected array, got {}", other.type_name()))),
        }
    }

    pub fn block(&self, value: &Value) -> ExecutionResult<Block> {
        match value {
            Value::Block(block) => Ok(*block),
            other => Err(self.type_error(format!("expected block, got {}", other.type_name()))),
        }
    }

    /// Pushes `item`, runs `block`, and takes back the value it left, if any.
    pub fn call_with(&mut self, block: Block, item: Value) -> ExecutionResult<Option<Value>> {
        let entry = self.depth();
        self.push(item)?;
        self.runtime.run_block(block)?;
        if self.depth() > entry {
            return self.pop().map(Some);
        }
        Ok(None)
    }
}

/// Pops `N` values, returned in push order.
pub fn inputs<const N: usize>(ctx: &mut PrimitiveContext) -> ExecutionResult<[Value; N]> {
    let name = ctx.name;
    let underflow = || PithError::StackUnderflow {
        word: name.to_string(),
    };
    let values = ctx.runtime.state.stack_pop_slice(N).ok_or_else(underflow)?;
    values.try_into().map_err(|_| underflow())
}

pub fn outputs<const N: usize>(ctx: &mut PrimitiveContext, values: [Value; N]) -> ExecutionResult {
    for value in values {
        ctx.push(value)?;
    }
    Ok(())
}

pub const PRIMITIVES: &[Primitive] = &[
    // stack
    Primitive::new("dup", 1, 2, stack::dup),
    Primitive::new("drop", 1, 0, stack::drop),
    Primitive::new("swap", 2, 2, stack::swap),
    Primitive::new("over", 2, 3, stack::over),
    Primitive::new("rot", 3, 3, stack::rot),
    // arithmetic
    Primitive::new("add", 2, 1, number::add),
    Primitive::new("+", 2, 1, number::add),
    Primitive::new("subtract", 2, 1, number::subtract),
    Primitive::new("-", 2, 1, number::subtract),
    Primitive::new("multiply", 2, 1, number::multiply),
    Primitive::new("*", 2, 1, number::multiply),
    Primitive::new("divide", 2, 1, number::divide),
    Primitive::new("/", 2, 1, number::divide),
    Primitive::new("mod", 2, 1, number::modulo),
    Primitive::new("abs", 1, 1, number::abs),
    Primitive::new("min", 2, 1, number::min),
    Primitive::new("max", 2, 1, number::max),
    // comparison
    Primitive::new("=", 2, 1, number::eq),
    Primitive::new("!=", 2, 1, number::neq),
    Primitive::new("<", 2, 1, number::lt),
    Primitive::new(">", 2, 1, number::gt),
    Primitive::new("<=", 2, 1, number::leq),
    Primitive::new(">=", 2, 1, number::geq),
    // logic
    Primitive::new("and", 2, 1, general::and),
    Primitive::new("or", 2, 1, general::or),
    Primitive::new("not", 1, 1, general::not),
    // strings
    Primitive::new("length", 1, 1, string::length),
    Primitive::new("concat", 2, 1, string::concat),
    Primitive::new("split", 2, 1, string::split),
    Primitive::new("join", 2, 1, string::join),
    Primitive::new("trim", 1, 1, string::trim),
    Primitive::new("substring", 3, 1, string::substring),
    Primitive::new("contains", 2, 1, string::contains),
    Primitive::new("replace", 3, 1, string::replace),
    Primitive::new("uppercase", 1, 1, string::uppercase),
    Primitive::new("lowercase", 1, 1, string::lowercase),
    Primitive::new("lines", 1, 1, string::lines),
    Primitive::new("words", 1, 1, string::words),
    // output
    Primitive::new("print", 1, 0, general::print),
    // views
    Primitive::new("text", 1, 1, view::text),
    Primitive::new("textfield", 1, 1, view::textfield),
    Primitive::new("button", 1, 1, view::button),
    Primitive::new("vstack", 1, 1, view::vstack),
    Primitive::new("hstack", 1, 1, view::hstack),
    Primitive::new("spacer", 0, 1, view::spacer),
    // signals
    Primitive::new("signal", 1, 1, general::signal),
    // arrays
    Primitive::new("first", 1, 1, array::first),
    Primitive::new("last", 1, 1, array::last),
    Primitive::new("nth", 2, 1, array::nth),
    Primitive::new("append", 2, 1, array::append),
    Primitive::new("prepend", 2, 1, array::prepend),
    Primitive::new("slice", 3, 1, array::slice),
    Primitive::new("reverse", 1, 1, array::reverse),
    Primitive::new("sort", 1, 1, array::sort),
    Primitive::new("index-of", 2, 1, array::index_of),
    Primitive::new("empty?", 1, 1, array::is_empty),
    // functional
    Primitive::new("map", 2, 1, block::map),
    Primitive::new("filter", 2, 1, block::filter),
    Primitive::new("each", 2, 0, block::each),
    Primitive::new("reduce", 3, 1, block::reduce),
    Primitive::new("find", 2, 1, block::find),
    Primitive::new("any", 2, 1, block::any),
    Primitive::new("all", 2, 1, block::all),
    // types
    Primitive::new("type", 1, 1, general::type_of),
    Primitive::new("string?", 1, 1, general::is_string),
    Primitive::new("number?", 1, 1, general::is_number),
    Primitive::new("array?", 1, 1, general::is_array),
    Primitive::new("map?", 1, 1, general::is_map),
    Primitive::new("bool?", 1, 1, general::is_bool),
    Primitive::new("nil?", 1, 1, general::is_nil),
    // conversion
    Primitive::new("to-string", 1, 1, general::to_string),
    Primitive::new("to-number", 1, 1, general::to_number),
    // maps
    Primitive::new("new-map", 0, 1, map::new_map),
    Primitive::new("get", 2, 1, map::get),
    Primitive::new("set", 3, 1, map::set),
    Primitive::new("keys", 1, 1, map::keys),
    Primitive::new("values", 1, 1, map::values),
    Primitive::new("has", 2, 1, map::has),
    Primitive::new("remove", 2, 1, map::remove),
    Primitive::new("merge", 2, 1, map::merge),
    Primitive::new("sanitize", 1, 1, map::sanitize),
    // gap buffers
    Primitive::new("new-gap", 0, 1, gap::new_gap),
    Primitive::new("string-to-gap", 1, 1, gap::string_to_gap),
    Primitive::new("gap-to-string", 1, 1, gap::gap_to_string),
    Primitive::new("gap-insert", 2, 1, gap::insert),
    Primitive::new("gap-delete", 2, 1, gap::delete),
    Primitive::new("gap-move", 2, 1, gap::move_cursor),
    Primitive::new("gap-goto", 2, 1, gap::goto),
    Primitive::new("gap-cursor", 1, 1, gap::cursor),
    Primitive::new("gap-length", 1, 1, gap::length),
    Primitive::new("gap-char", 2, 1, gap::char_at),
    // files
    Primitive::new("file-read", 1, 1, file::read),
    Primitive::new("file-write", 2, 0, file::write),
    Primitive::new("file-exists", 1, 1, file::exists),
    Primitive::new("dir-list", 1, 1, file::dir_list),
    Primitive::new("file-append", 2, 0, file::append),
    // paths
    Primitive::new("get-path", 1, 1, path::get_path),
    Primitive::new("set-path", 2, 0, path::set_path),
];

#[cfg(test)]
pub(crate) mod tests {
    use crate::{MemoryFileSystem, Runtime, Value};

    /// Loads `main: <body> end`, runs it and returns the stack.
    pub(crate) fn eval(body: &str) -> Vec<Value> {
        eval_runtime(body).stack().to_vec()
    }

    pub(crate) fn eval_runtime(body: &str) -> Runtime {
        let mut rt = Runtime::new(MemoryFileSystem::new());
        rt.load(&format!("main: {body} end")).unwrap();
        rt.run_named_slot("main").unwrap();
        rt
    }

    pub(crate) fn eval_err(body: &str) -> crate::PithError {
        let mut rt = Runtime::new(MemoryFileSystem::new());
        rt.load(&format!("main: {body} end")).unwrap();
        rt.run_named_slot("main").unwrap_err()
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = super::PRIMITIVES.iter().map(|p| p.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn underflow_is_checked_before_the_call() {
        let err = eval_err("1 +");
        assert_eq!(
            err,
            crate::PithError::StackUnderflow { word: "+".into() }
        );
    }
}
