//! Load-time structural analysis: turns a token stream into root slots
//! and dictionaries whose bodies are ranges of that stream.
//!
//! A source file is a sequence of `name: ... end` blocks. A block whose
//! body starts with another `word:` header is a dictionary; anything else
//! becomes a code slot of the root dictionary.
//!
//! Matching a block's `end` has one subtlety: a nested `word:` header
//! owns a trailing `end` only when its body spans several lines. A
//! single-line slot ends implicitly, and the next `end` belongs to the
//! enclosing construct.

use log::{debug, warn};

use crate::{
    Block, DictRef, Dictionary, PithError, SignalRegistry, Slot, Token, TokenKind, Value,
    dictionary::{find_dict, would_cycle},
};

/// The value a single literal token stands for.
pub fn literal_value(kind: &TokenKind) -> Option<Value> {
    match kind {
        TokenKind::Number(n) => Some(Value::Number(*n)),
        TokenKind::String(s) => Some(Value::String(s.clone())),
        TokenKind::True => Some(Value::Bool(true)),
        TokenKind::False => Some(Value::Bool(false)),
        TokenKind::Nil => Some(Value::Nil),
        _ => None,
    }
}

pub struct Loader<'a> {
    tokens: &'a [Token],
}

impl<'a> Loader<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens }
    }

    fn kind(&self, i: usize) -> Option<&TokenKind> {
        self.tokens.get(i).map(|t| &t.kind)
    }

    /// The slot name if `i` starts a `WORD COLON` header.
    fn header(&self, i: usize) -> Option<&'a str> {
        let name = self.tokens.get(i)?.word()?;
        matches!(self.kind(i + 1), Some(TokenKind::Colon)).then_some(name)
    }

    /// Whether the slot whose header is at `i` has body tokens on a later line.
    ///
    /// The scan stops at the first `end` or the next header.
    fn is_multiline(&self, i: usize) -> bool {
        let line = self.tokens[i].line();
        let mut k = i + 2;
        while k < self.tokens.len() {
            if matches!(self.kind(k), Some(TokenKind::End)) || self.header(k).is_some() {
                return false;
            }
            if self.tokens[k].line() > line {
                return true;
            }
            k += 1;
        }
        false
    }

    /// Index of the `end` that closes the block whose body starts at `start`.
    fn find_block_end(&self, name: &str, start: usize) -> Result<usize, PithError> {
        let mut depth = 1usize;
        // slot_open[d]: a multi-line slot at depth d still owns an `end`
        let mut slot_open = vec![false; 2];
        let mut j = start;

        while j < self.tokens.len() {
            match &self.tokens[j].kind {
                TokenKind::Do | TokenKind::If => {
                    depth += 1;
                    if slot_open.len() <= depth {
                        slot_open.resize(depth + 1, false);
                    }
                }
                TokenKind::Word(_) if self.header(j).is_some() => {
                    if self.is_multiline(j) {
                        slot_open[depth] = true;
                    }
                    j += 1;
                }
                TokenKind::End => {
                    if slot_open[depth] {
                        slot_open[depth] = false;
                    } else {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(j);
                        }
                    }
                }
                TokenKind::Eof => break,
                _ => {}
            }
            j += 1;
        }

        let line = self.tokens.last().map_or(0, Token::line);
        Err(PithError::parse(
            format!("unexpected end of file in block '{name}'"),
            line,
        ))
    }

    /// Splits a dictionary body into its slots.
    fn parse_dictionary(&self, name: &str, start: usize, end: usize) -> Dictionary {
        let mut dict = Dictionary::new(Some(name));
        let mut i = start;

        while i < end {
            let Some(slot_name) = self.header(i).filter(|_| i + 1 < end) else {
                i += 1;
                continue;
            };
            i += 2;
            let body_start = i;
            let mut depth = 0usize;

            while i < end {
                match &self.tokens[i].kind {
                    TokenKind::Do | TokenKind::If => depth += 1,
                    TokenKind::End if depth > 0 => depth -= 1,
                    TokenKind::End => break,
                    TokenKind::Word(_) if depth == 0 && i + 1 < end && self.header(i).is_some() => {
                        break;
                    }
                    _ => {}
                }
                i += 1;
            }

            dict.add_slot(slot_name, Block::new(body_start, i));
            if i < end && matches!(self.kind(i), Some(TokenKind::End)) {
                i += 1;
            }
        }

        dict
    }

    /// Pass one: every top-level block from `start` up to the next `Eof`.
    ///
    /// Nothing is returned unless the whole source is well formed.
    pub fn parse_blocks(&self, start: usize) -> Result<Vec<Slot>, PithError> {
        let mut slots = Vec::new();
        let mut i = start;

        while i < self.tokens.len() {
            if matches!(self.kind(i), Some(TokenKind::Eof)) {
                break;
            }
            let Some(name) = self.header(i) else {
                i += 1;
                continue;
            };

            let body_start = i + 2;
            let body_end = self.find_block_end(name, body_start)?;
            let body = Block::new(body_start, body_end);

            let is_dictionary = body_start + 1 < body_end && self.header(body_start).is_some();
            if is_dictionary {
                let dict = self.parse_dictionary(name, body_start, body_end);
                debug!("dictionary '{name}' with {} slots", dict.slots().len());
                slots.push(Slot {
                    name: name.into(),
                    body,
                    cached: Some(Value::dict(dict)),
                });
            } else {
                debug!("root slot '{name}' [{body_start}, {body_end})");
                slots.push(Slot::code(name, body));
            }

            i = body_end + 1;
        }

        Ok(slots)
    }

    /// Pass two: point each root dictionary at the dictionary its `parent` slot names.
    pub fn resolve_parents(&self, root: &DictRef) {
        let dicts: Vec<DictRef> = root
            .borrow()
            .slots()
            .iter()
            .filter_map(|s| s.cached_dict().cloned())
            .collect();

        for dict in dicts {
            let parent_name = {
                let d = dict.borrow();
                let Some(slot) = d.local("parent") else {
                    continue;
                };
                if slot.body.is_empty() {
                    continue;
                }
                match self.tokens.get(slot.body.start).and_then(Token::word) {
                    Some(word) => word.to_string(),
                    None => continue,
                }
            };

            let Some(parent) = find_dict(root, &parent_name) else {
                continue;
            };
            if would_cycle(&dict, &parent) {
                warn!(
                    "ignoring parent '{parent_name}' of '{}': it would form a cycle",
                    dict.borrow().name().unwrap_or("?")
                );
                continue;
            }
            dict.borrow_mut().set_parent(Some(&parent));
        }
    }

    /// Pass three: cache single-literal bodies and `<literal> signal` cells.
    ///
    /// Applies to root slots and to the slots of every root dictionary.
    pub fn cache_literals(&self, root: &DictRef, signals: &mut SignalRegistry) {
        let dicts: Vec<DictRef> = std::iter::once(root.clone())
            .chain(
                root.borrow()
                    .slots()
                    .iter()
                    .filter_map(|s| s.cached_dict().cloned()),
            )
            .collect();

        for dict in dicts {
            let updates: Vec<(Slot, Value)> = dict
                .borrow()
                .slots()
                .iter()
                .filter(|slot| !slot.is_cached())
                .filter_map(|slot| Some((slot.clone(), self.literal_body(slot, signals)?)))
                .collect();

            let mut d = dict.borrow_mut();
            for (slot, value) in updates {
                d.define(Slot {
                    cached: Some(value),
                    ..slot
                });
            }
        }
    }

    fn literal_body(&self, slot: &Slot, signals: &mut SignalRegistry) -> Option<Value> {
        let body = slot.body;
        match body.len() {
            1 => literal_value(self.kind(body.start)?),
            2 => {
                let initial = literal_value(self.kind(body.start)?)?;
                (self.tokens.get(body.start + 1)?.word()? == "signal")
                    .then(|| Value::Signal(signals.create(initial)))
            }
            _ => None,
        }
    }
}
