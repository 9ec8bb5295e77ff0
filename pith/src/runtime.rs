use std::{
    collections::HashMap,
    fmt::Write as _,
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{debug, error, info};

use crate::{
    Block, DictRef, Dictionary, ExecutionResult, ExecutionState, ExecutionStateInfo, FileSystem,
    LexError, Lexer, Loader, PithError, Primitive, SignalRegistry, Token, Value, ViewRef,
    dictionary::lookup, primitives::PRIMITIVES, stack::DEFAULT_STACK_SIZE,
};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

/// Scaffold written when a project directory has no `pith/runtime.pith`.
pub const DEFAULT_RUNTIME: &str = "# Default Pith runtime

app:
    ui:
        [\"Welcome to Pith\" text] vstack
    end
end

# Mount the UI
ui:
    app
end
";

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub stack_size: usize,
    /// Nested slot and block invocations allowed before failing.
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Input delivered by the host, one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key { code: i32 },
    Click { x: i32, y: i32 },
    TextInput(String),
    FileChange { path: String },
    Tick,
}

/// A loaded Pith program and everything needed to run it.
pub struct Runtime {
    pub(crate) state: ExecutionState,
    /// Every token ever loaded; slot and block bodies index into it.
    pub(crate) tokens: Rc<Vec<Token>>,
    pub(crate) root: DictRef,
    pub(crate) current_dict: DictRef,
    pub(crate) signals: SignalRegistry,
    pub(crate) fs: Box<dyn FileSystem>,
    pub(crate) primitives: HashMap<&'static str, &'static Primitive>,
    pub(crate) call_depth: usize,
    config: RuntimeConfig,
    project_path: Option<PathBuf>,
    current_view: Option<ViewRef>,
    error: Option<PithError>,
    lex_errors: Vec<LexError>,
}

impl Runtime {
    pub fn new(fs: impl FileSystem + 'static) -> Self {
        Self::with_config(fs, RuntimeConfig::default())
    }

    pub fn with_config(fs: impl FileSystem + 'static, config: RuntimeConfig) -> Self {
        let root = Dictionary::new_ref(Some("root"));
        let primitives = PRIMITIVES.iter().map(|p| (p.name, p)).collect();
        Self {
            state: ExecutionState::new(&ExecutionStateInfo {
                stack_size: config.stack_size,
            }),
            tokens: Rc::new(Vec::new()),
            current_dict: root.clone(),
            root,
            signals: SignalRegistry::new(),
            fs: Box::new(fs),
            primitives,
            call_depth: 0,
            config,
            project_path: None,
            current_view: None,
            error: None,
            lex_errors: Vec::new(),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════
    // Error state
    // ═══════════════════════════════════════════════════════════════

    /// The sticky error left by the last failed call, if any.
    pub fn error(&self) -> Option<&PithError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Lexical errors recorded by every load so far.
    pub fn lex_errors(&self) -> &[LexError] {
        &self.lex_errors
    }

    fn ensure_ready(&self) -> ExecutionResult {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Records a failure as the sticky error and hands it back.
    fn record<T>(&mut self, result: ExecutionResult<T>) -> ExecutionResult<T> {
        if let Err(err) = &result {
            error!("{err}");
            self.error = Some(err.clone());
            self.call_depth = 0;
            self.current_dict = self.root.clone();
        }
        result
    }

    // ═══════════════════════════════════════════════════════════════
    // Loading
    // ═══════════════════════════════════════════════════════════════

    /// Lexes and loads `source`. A parse error leaves the runtime unchanged
    /// apart from the sticky error.
    pub fn load(&mut self, source: &str) -> ExecutionResult {
        self.ensure_ready()?;
        let result = self.load_source(source);
        self.record(result)
    }

    fn load_source(&mut self, source: &str) -> ExecutionResult {
        let (new_tokens, lex_errors) = Lexer::tokenize(source);
        self.lex_errors.extend(lex_errors);

        let base = self.tokens.len();
        let tokens = Rc::make_mut(&mut self.tokens);
        tokens.extend(new_tokens);

        let parsed = Loader::new(tokens).parse_blocks(base);
        let slots = match parsed {
            Ok(slots) => slots,
            Err(err) => {
                tokens.truncate(base);
                return Err(err);
            }
        };

        debug!("loaded {} top-level definitions", slots.len());
        {
            let mut root = self.root.borrow_mut();
            for slot in slots {
                root.define(slot);
            }
        }

        let loader = Loader::new(&self.tokens);
        loader.resolve_parents(&self.root);
        loader.cache_literals(&self.root, &mut self.signals);

        self.current_dict = self.root.clone();
        Ok(())
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ExecutionResult {
        self.ensure_ready()?;
        let path = path.as_ref();
        let source = self.fs.read_file(path).map_err(|err| PithError::io(path.display(), &err));
        let result = source.and_then(|source| self.load_source(&source));
        self.record(result)
    }

    /// Loads a `.pith` file directly, or `<dir>/pith/runtime.pith`,
    /// writing the default scaffold there first when it is missing.
    pub fn load_project(&mut self, path: impl AsRef<Path>) -> ExecutionResult {
        self.ensure_ready()?;
        let path = path.as_ref();
        let is_pith_file = path.extension().is_some_and(|ext| ext == "pith");

        if is_pith_file && self.fs.exists(path) {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            self.project_path = Some(dir.to_path_buf());
            info!("loading {}", path.display());
            return self.load_file(path);
        }

        self.project_path = Some(path.to_path_buf());
        let runtime_path = path.join("pith").join("runtime.pith");
        if self.fs.exists(&runtime_path) {
            info!("loading project {}", runtime_path.display());
            return self.load_file(&runtime_path);
        }

        info!("writing default runtime to {}", runtime_path.display());
        if let Err(err) = self.fs.write_file(&runtime_path, DEFAULT_RUNTIME) {
            let err = PithError::io(runtime_path.display(), &err);
            return self.record(Err(err));
        }
        self.load(DEFAULT_RUNTIME)
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    // ═══════════════════════════════════════════════════════════════
    // Host entry points
    // ═══════════════════════════════════════════════════════════════

    /// Runs the root slot `name`. `Ok(false)` when there is no such slot.
    pub fn run_named_slot(&mut self, name: &str) -> ExecutionResult<bool> {
        self.ensure_ready()?;
        let Some(slot) = lookup(&self.root, name) else {
            return Ok(false);
        };
        debug!("running '{name}' [{}, {})", slot.body.start, slot.body.end);
        let result = self.execute_slot(&slot).map(|()| true);
        self.record(result)
    }

    /// Runs the root `ui` slot and adopts a View left on top of the stack.
    pub fn mount_ui(&mut self) -> ExecutionResult<Option<ViewRef>> {
        if !self.run_named_slot("ui")? {
            return Ok(None);
        }
        if !matches!(self.state.peek(), Some(Value::View(_))) {
            debug!("ui left no view on the stack");
            return Ok(None);
        }
        let Some(Value::View(view)) = self.state.pop() else {
            return Ok(None);
        };
        self.current_view = Some(view.clone());
        Ok(Some(view))
    }

    pub fn current_view(&self) -> Option<&ViewRef> {
        self.current_view.as_ref()
    }

    /// Dispatches an event to its handler slot in the current dictionary.
    ///
    /// Key codes and file paths are pushed for the handler; events without
    /// a handler are ignored.
    pub fn handle_event(&mut self, event: Event) -> ExecutionResult {
        self.ensure_ready()?;
        let (handler, argument) = match event {
            Event::Key { code } => ("on-key", Some(Value::Number(f64::from(code)))),
            Event::Click { .. } => ("on-click", None),
            Event::FileChange { path } => ("on-file-change", Some(Value::String(path))),
            Event::TextInput(_) | Event::Tick => return Ok(()),
        };

        let Some(slot) = lookup(&self.current_dict, handler) else {
            return Ok(());
        };
        debug!("event handler '{handler}'");
        let result = argument
            .map_or(Ok(()), |value| self.state.push(value))
            .and_then(|()| self.execute_slot(&slot));
        self.record(result)
    }

    /// Runs a block value, such as a button's click handler.
    pub fn execute_block(&mut self, block: Block) -> ExecutionResult {
        self.ensure_ready()?;
        let result = self.run_block(block);
        self.record(result)
    }

    pub fn has_dirty_signals(&self) -> bool {
        self.signals.has_dirty()
    }

    pub fn clear_dirty(&self) {
        self.signals.clear_dirty();
    }

    /// Re-mounts the UI if any signal changed, then clears the dirty flags.
    pub fn rerender_if_dirty(&mut self) -> ExecutionResult<Option<ViewRef>> {
        if !self.has_dirty_signals() {
            return Ok(None);
        }
        let view = self.mount_ui()?;
        self.clear_dirty();
        Ok(view)
    }

    // ═══════════════════════════════════════════════════════════════
    // Stack access
    // ═══════════════════════════════════════════════════════════════

    pub fn stack(&self) -> &[Value] {
        self.state.stack()
    }

    pub fn push(&mut self, value: Value) -> ExecutionResult {
        self.state.push(value)
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.state.pop()
    }

    pub fn root(&self) -> &DictRef {
        &self.root
    }

    /// Human-readable dump of the root dictionary and its slots.
    pub fn debug_state(&self) -> String {
        const PREVIEW: usize = 5;

        let preview = |block: Block| {
            let mut out = String::new();
            for token in self.tokens.iter().skip(block.start).take(block.len().min(PREVIEW)) {
                match &token.kind {
                    crate::TokenKind::Word(w) => out.push_str(w),
                    crate::TokenKind::String(s) => {
                        let _ = write!(out, "{s:?}");
                    }
                    crate::TokenKind::Number(n) => out.push_str(&crate::format_number(*n)),
                    other => out.push_str(other.name()),
                }
                out.push(' ');
            }
            if block.len() > PREVIEW {
                out.push_str("...");
            }
            out
        };

        let mut out = String::new();
        let root = self.root.borrow();
        let _ = writeln!(out, "tokens: {}", self.tokens.len());
        let _ = writeln!(out, "root slots: {}", root.slots().len());
        let _ = writeln!(out, "signals: {}", self.signals.len());
        let _ = writeln!(out, "stack depth: {}", self.state.depth());

        for (i, slot) in root.slots().iter().enumerate() {
            let Some(dict) = slot.cached_dict() else {
                let _ = writeln!(out, "[{i}] {} = {}", slot.name, preview(slot.body));
                continue;
            };
            let dict = dict.borrow();
            let _ = write!(out, "[{i}] {} (dictionary)", slot.name);
            if let Some(parent) = dict.parent() {
                let _ = write!(out, " : {}", parent.borrow().name().unwrap_or("?"));
            }
            out.push('\n');
            for inner in dict.slots() {
                match &inner.cached {
                    Some(value) => {
                        let _ = writeln!(out, "    {} = {value}", inner.name);
                    }
                    None => {
                        let _ = writeln!(out, "    {}: {}", inner.name, preview(inner.body));
                    }
                }
            }
        }
        out
    }
}
