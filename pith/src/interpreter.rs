//! Token-range execution.
//!
//! Slot bodies and block values are `[start, end)` windows into the
//! runtime's token arena. Control constructs (`if`, `do`, `[`) are found by
//! scanning forward inside the current window, and the index after the
//! construct is handed back so the caller keeps walking.

use log::trace;

use crate::{
    Block, DictRef, ExecutionResult, PithError, Primitive, PrimitiveContext, Runtime, Slot, Token,
    TokenKind, Value,
    dictionary::{find_dict, lookup},
    loader::literal_value,
};

impl Runtime {
    // ═══════════════════════════════════════════════════════════════
    // Entry points used by the facade and by primitives
    // ═══════════════════════════════════════════════════════════════

    /// Pushes a cached slot's value or runs its body.
    ///
    /// A cached signal pushes its payload; every other cached value,
    /// dictionaries included, is pushed as is.
    pub(crate) fn execute_slot(&mut self, slot: &Slot) -> ExecutionResult {
        match &slot.cached {
            Some(Value::Signal(signal)) => {
                let value = signal.borrow().get().clone();
                self.state.push(value)
            }
            Some(value) => self.state.push(value.clone()),
            None => self.execute_range(slot.body),
        }
    }

    /// Runs a block in whatever dictionary is current.
    pub(crate) fn run_block(&mut self, block: Block) -> ExecutionResult {
        self.execute_range(block)
    }

    /// Runs `f` with `dict` as the current dictionary, restoring the
    /// previous one afterwards even on error.
    pub(crate) fn with_dict<T>(
        &mut self,
        dict: DictRef,
        f: impl FnOnce(&mut Self) -> ExecutionResult<T>,
    ) -> ExecutionResult<T> {
        let saved = std::mem::replace(&mut self.current_dict, dict);
        let result = f(self);
        self.current_dict = saved;
        result
    }

    pub(crate) fn pop_for(&mut self, word: &str) -> ExecutionResult<Value> {
        self.state.pop().ok_or_else(|| PithError::StackUnderflow {
            word: word.to_string(),
        })
    }

    fn execute_range(&mut self, body: Block) -> ExecutionResult {
        // the arena is only appended to by loads, never while running
        let tokens = self.tokens.clone();
        let end = body.end.min(tokens.len());
        self.nested(|rt| rt.run_tokens(&tokens, body.start, end))
    }

    /// Counts one level of slot, block, `if` or `[` nesting against
    /// `max_call_depth`.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ExecutionResult<T>,
    ) -> ExecutionResult<T> {
        let limit = self.config().max_call_depth;
        if self.call_depth >= limit {
            return Err(PithError::DepthExceeded { limit });
        }
        self.call_depth += 1;
        let result = f(self);
        self.call_depth -= 1;
        result
    }

    // ═══════════════════════════════════════════════════════════════
    // The token loop
    // ═══════════════════════════════════════════════════════════════

    fn run_tokens(&mut self, tokens: &[Token], start: usize, end: usize) -> ExecutionResult {
        let mut i = start;
        while i < end {
            let token = &tokens[i];
            trace!("{:>4} {:?}", i, token.kind);

            match &token.kind {
                TokenKind::Word(word) => {
                    if let Some((path, next)) = dot_path(tokens, i, end) {
                        self.execute_path(&path)?;
                        i = next;
                        continue;
                    }
                    self.execute_word(word)?;
                }
                TokenKind::If => {
                    i = self.execute_if(tokens, i, end)?;
                    continue;
                }
                TokenKind::Do => {
                    let close = matching_end(tokens, i, end)?;
                    self.state.push(Value::Block(Block::new(i + 1, close)))?;
                    i = close + 1;
                    continue;
                }
                TokenKind::LBracket => {
                    i = self.execute_array(tokens, i, end)?;
                    continue;
                }
                kind => {
                    if let Some(value) = literal_value(kind) {
                        self.state.push(value)?;
                    }
                    // other punctuation outside its construct is inert
                }
            }
            i += 1;
        }
        Ok(())
    }

    /// `cond if ... [else ...] end`; returns the index after `end`.
    fn execute_if(&mut self, tokens: &[Token], at: usize, end: usize) -> ExecutionResult<usize> {
        let condition = self.pop_for("if")?;

        let mut depth = 0usize;
        let mut else_at = None;
        let mut close = None;
        for (k, token) in tokens.iter().enumerate().take(end).skip(at + 1) {
            match token.kind {
                TokenKind::If | TokenKind::Do => depth += 1,
                TokenKind::Else if depth == 0 => else_at = Some(k),
                TokenKind::End if depth == 0 => {
                    close = Some(k);
                    break;
                }
                TokenKind::End => depth -= 1,
                _ => {}
            }
        }
        let Some(close) = close else {
            return Err(PithError::parse("`if` without matching `end`", tokens[at].line()));
        };

        let branch = if condition.is_truthy() {
            Some((at + 1, else_at.unwrap_or(close)))
        } else {
            else_at.map(|else_at| (else_at + 1, close))
        };
        if let Some((start, stop)) = branch {
            self.nested(|rt| rt.run_tokens(tokens, start, stop))?;
        }
        Ok(close + 1)
    }

    /// `[ ... ]`: everything pushed above the entry depth becomes one array.
    fn execute_array(&mut self, tokens: &[Token], at: usize, end: usize) -> ExecutionResult<usize> {
        let mut depth = 0usize;
        let mut close = None;
        for (k, token) in tokens.iter().enumerate().take(end).skip(at + 1) {
            match token.kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket if depth == 0 => {
                    close = Some(k);
                    break;
                }
                TokenKind::RBracket => depth -= 1,
                _ => {}
            }
        }
        let Some(close) = close else {
            return Err(PithError::parse("`[` without matching `]`", tokens[at].line()));
        };

        let entry = self.state.depth();
        self.nested(|rt| rt.run_tokens(tokens, at + 1, close))?;
        let pushed = self.state.depth().saturating_sub(entry);
        let items = self.state.stack_pop_slice(pushed).unwrap_or_default();
        self.state.push(Value::Array(items))?;
        Ok(close + 1)
    }

    // ═══════════════════════════════════════════════════════════════
    // Word dispatch
    // ═══════════════════════════════════════════════════════════════

    fn execute_word(&mut self, name: &str) -> ExecutionResult {
        if let Some(signal_name) = name.strip_suffix('!').filter(|s| !s.is_empty()) {
            return self.write_signal(signal_name, name);
        }

        if let Some(primitive) = self.primitives.get(name).copied() {
            return self.call_primitive(primitive);
        }

        if let Some(slot) = lookup(&self.current_dict, name) {
            return match slot.cached_dict() {
                Some(dict) => self.invoke_dict(dict.clone()),
                None => self.execute_slot(&slot),
            };
        }

        if let Some(dict) = find_dict(&self.root, name) {
            return self.invoke_dict(dict);
        }

        Err(PithError::UnknownWord(name.to_string()))
    }

    pub(crate) fn call_primitive(&mut self, primitive: &'static Primitive) -> ExecutionResult {
        if self.state.depth() < primitive.inputs {
            return Err(PithError::StackUnderflow {
                word: primitive.name.to_string(),
            });
        }
        trace!("{} {}", primitive.name, primitive.stack_effect());
        let mut ctx = PrimitiveContext::new(self, primitive.name);
        (primitive.ptr)(&mut ctx)
    }

    /// A component runs its `ui` in its own context and styles the view it
    /// leaves; any other dictionary is pushed as a value.
    fn invoke_dict(&mut self, dict: DictRef) -> ExecutionResult {
        let Some(ui) = lookup(&dict, "ui") else {
            return self.state.push(Value::Dict(dict));
        };

        self.with_dict(dict.clone(), |rt| rt.execute_slot(&ui))?;
        if let Some(Value::View(view)) = self.state.peek() {
            view.borrow_mut().apply_dict_styles(&dict);
        }
        Ok(())
    }

    /// `name!`: pop a value into the signal cached in `name`.
    fn write_signal(&mut self, name: &str, word: &str) -> ExecutionResult {
        let slot = lookup(&self.current_dict, name).or_else(|| lookup(&self.root, name));
        let Some(Value::Signal(signal)) = slot.and_then(|s| s.cached) else {
            return Err(PithError::UnknownSignal(word.to_string()));
        };
        let value = self.pop_for(word)?;
        signal.borrow_mut().set(value);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Dot paths
    // ───────────────────────────────────────────────────────────────

    /// `root-dict.slot.slot`, where the last part may be a signal write.
    fn execute_path(&mut self, path: &[&str]) -> ExecutionResult {
        let Some((last, hops)) = path.split_last() else {
            return Ok(());
        };
        let dict = self.resolve_path(hops)?;

        if let Some(signal_name) = last.strip_suffix('!').filter(|s| !s.is_empty()) {
            let Some(Value::Signal(signal)) = lookup(&dict, signal_name).and_then(|s| s.cached)
            else {
                return Err(PithError::UnknownSignal(last.to_string()));
            };
            let value = self.pop_for(last)?;
            signal.borrow_mut().set(value);
            return Ok(());
        }

        let slot = lookup(&dict, last).ok_or_else(|| PithError::UnknownSlot(last.to_string()))?;
        self.with_dict(dict, |rt| rt.execute_slot(&slot))
    }

    /// Walks every part to a dictionary. The first part names a root
    /// dictionary; later code slots are run and must produce one.
    pub(crate) fn resolve_path(&mut self, parts: &[&str]) -> ExecutionResult<DictRef> {
        let Some((first, rest)) = parts.split_first() else {
            return Ok(self.root.clone());
        };
        let mut dict = find_dict(&self.root, first)
            .ok_or_else(|| PithError::UnknownDictionary(first.to_string()))?;

        for part in rest {
            let slot = lookup(&dict, part).ok_or_else(|| PithError::UnknownSlot(part.to_string()))?;
            dict = match &slot.cached {
                Some(Value::Dict(inner)) => inner.clone(),
                Some(_) => return Err(PithError::NotADictionary(part.to_string())),
                None => {
                    self.with_dict(dict, |rt| rt.execute_slot(&slot))?;
                    match self.pop_for(part)? {
                        Value::Dict(inner) => inner,
                        _ => return Err(PithError::NotADictionary(part.to_string())),
                    }
                }
            };
        }
        Ok(dict)
    }
}

/// Collects `WORD (DOT WORD)+` starting at `at`, with the index after it.
fn dot_path(tokens: &[Token], at: usize, end: usize) -> Option<(Vec<&str>, usize)> {
    let mut parts = vec![tokens[at].word()?];
    let mut i = at + 1;
    while i + 1 < end && matches!(tokens[i].kind, TokenKind::Dot) {
        let Some(word) = tokens[i + 1].word() else {
            break;
        };
        parts.push(word);
        i += 2;
    }
    (parts.len() > 1).then_some((parts, i))
}

/// Index of the `end` closing the `do` at `at`; nested `if`/`do` nest.
fn matching_end(tokens: &[Token], at: usize, end: usize) -> ExecutionResult<usize> {
    let mut depth = 0usize;
    for (k, token) in tokens.iter().enumerate().take(end).skip(at + 1) {
        match token.kind {
            TokenKind::If | TokenKind::Do => depth += 1,
            TokenKind::End if depth == 0 => return Ok(k),
            TokenKind::End => depth -= 1,
            _ => {}
        }
    }
    Err(PithError::parse("`do` without matching `end`", tokens[at].line()))
}
