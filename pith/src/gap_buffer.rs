//! Cursor-centric text buffer with a relocatable gap.
//!
//! Content is `buffer[..gap_start] ++ buffer[gap_end..]`; the cursor is
//! always `gap_start`. Positions and lengths are in bytes.

const INITIAL_CAPACITY: usize = 64;
const MIN_GAP: usize = 32;

#[derive(Clone, PartialEq, Eq)]
pub struct GapBuffer {
    buffer: Vec<u8>,
    gap_start: usize,
    gap_end: usize,
}

impl GapBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            gap_start: 0,
            gap_end: capacity,
        }
    }

    /// Builds a buffer holding `text` with the cursor at the start.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut buffer = vec![0; bytes.len() + MIN_GAP];
        buffer[MIN_GAP..].copy_from_slice(bytes);
        Self {
            buffer,
            gap_start: 0,
            gap_end: MIN_GAP,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.capacity() - self.gap_len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.gap_start
    }

    /// Grows the gap so at least `needed` bytes fit, keeping `MIN_GAP` slack.
    fn expand_gap(&mut self, needed: usize) {
        if self.gap_len() >= needed {
            return;
        }
        let after = self.capacity() - self.gap_end;
        let new_capacity = self.capacity() + needed + MIN_GAP;
        let mut buffer = vec![0; new_capacity];
        buffer[..self.gap_start].copy_from_slice(&self.buffer[..self.gap_start]);
        let new_gap_end = new_capacity - after;
        buffer[new_gap_end..].copy_from_slice(&self.buffer[self.gap_end..]);
        self.buffer = buffer;
        self.gap_end = new_gap_end;
    }

    /// Relocates the gap so it starts at `pos` (clamped to the content).
    fn move_gap(&mut self, pos: usize) {
        let pos = pos.min(self.len());
        if pos < self.gap_start {
            let shift = self.gap_start - pos;
            self.buffer
                .copy_within(pos..self.gap_start, self.gap_end - shift);
            self.gap_start -= shift;
            self.gap_end -= shift;
        } else if pos > self.gap_start {
            let shift = pos - self.gap_start;
            self.buffer
                .copy_within(self.gap_end..self.gap_end + shift, self.gap_start);
            self.gap_start += shift;
            self.gap_end += shift;
        }
    }

    /// Inserts `text` at the cursor and advances the cursor past it.
    pub fn insert(&mut self, text: &str) {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return;
        }
        self.expand_gap(bytes.len());
        self.buffer[self.gap_start..self.gap_start + bytes.len()].copy_from_slice(bytes);
        self.gap_start += bytes.len();
    }

    /// Deletes `n` bytes forward (`n > 0`) or backward (`n < 0`), clamped.
    pub fn delete(&mut self, n: isize) {
        let count = n.unsigned_abs();
        if n > 0 {
            let available = self.capacity() - self.gap_end;
            self.gap_end += count.min(available);
        } else if n < 0 {
            self.gap_start -= count.min(self.gap_start);
        }
    }

    /// Moves the cursor by `delta`, clamped to `[0, len]`.
    pub fn move_by(&mut self, delta: isize) {
        let target = self.cursor().saturating_add_signed(delta).min(self.len());
        self.move_gap(target);
    }

    /// Moves the cursor to `pos`, clamped to `[0, len]`.
    pub fn goto(&mut self, pos: usize) {
        self.move_gap(pos);
    }

    /// The byte at logical position `pos`, if any.
    #[must_use]
    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        if pos >= self.len() {
            return None;
        }
        let idx = if pos < self.gap_start {
            pos
        } else {
            pos + self.gap_len()
        };
        self.buffer.get(idx).copied()
    }

    /// The content as contiguous bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.buffer[..self.gap_start]);
        out.extend_from_slice(&self.buffer[self.gap_end..]);
        out
    }

    /// The content as text; byte-level edits that split a character render lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.to_bytes()).into_owned()
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GapBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GapBuffer")
            .field("text", &self.text())
            .field("cursor", &self.gap_start)
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_buffer_is_empty() {
        let gb = GapBuffer::new();
        assert_eq!(gb.len(), 0);
        assert_eq!(gb.capacity(), INITIAL_CAPACITY);
        assert_eq!(gb.cursor(), 0);
        assert_eq!(gb.text(), "");
    }

    #[test]
    fn from_text_puts_cursor_at_start() {
        let gb = GapBuffer::from_text("hello");
        assert_eq!(gb.cursor(), 0);
        assert_eq!(gb.len(), 5);
        assert_eq!(gb.capacity(), 5 + MIN_GAP);
        assert_eq!(gb.text(), "hello");
    }

    #[test]
    fn insert_at_cursor() {
        let mut gb = GapBuffer::from_text("world");
        gb.insert("hello ");
        assert_eq!(gb.text(), "hello world");
        assert_eq!(gb.cursor(), 6);
        gb.goto(11);
        gb.insert("!");
        assert_eq!(gb.text(), "hello world!");
    }

    #[test]
    fn insert_grows_past_capacity() {
        let mut gb = GapBuffer::with_capacity(4);
        let long = "x".repeat(100);
        gb.insert(&long);
        assert_eq!(gb.len(), 100);
        assert!(gb.capacity() >= 100 + MIN_GAP);
        assert_eq!(gb.text(), long);
    }

    #[test]
    fn delete_forward_and_backward() {
        let mut gb = GapBuffer::from_text("abcdef");
        gb.goto(3);
        gb.delete(1);
        assert_eq!(gb.text(), "abcef");
        gb.delete(-2);
        assert_eq!(gb.text(), "aef");
        assert_eq!(gb.cursor(), 1);
    }

    #[test]
    fn delete_clamps_to_bounds() {
        let mut gb = GapBuffer::from_text("abc");
        gb.delete(-10);
        assert_eq!(gb.text(), "abc");
        gb.delete(10);
        assert_eq!(gb.text(), "");
    }

    #[test]
    fn move_clamps() {
        let mut gb = GapBuffer::from_text("abc");
        gb.move_by(-5);
        assert_eq!(gb.cursor(), 0);
        gb.move_by(99);
        assert_eq!(gb.cursor(), 3);
        gb.goto(1);
        assert_eq!(gb.cursor(), 1);
        assert_eq!(gb.text(), "abc");
    }

    #[test]
    fn byte_at_skips_gap() {
        let mut gb = GapBuffer::from_text("abcd");
        gb.goto(2);
        assert_eq!(gb.byte_at(0), Some(b'a'));
        assert_eq!(gb.byte_at(2), Some(b'c'));
        assert_eq!(gb.byte_at(3), Some(b'd'));
        assert_eq!(gb.byte_at(4), None);
    }

    proptest! {
        #[test]
        fn text_round_trips(s in ".*") {
            prop_assert_eq!(GapBuffer::from_text(&s).text(), s);
        }

        #[test]
        fn empty_insert_and_zero_delete_are_noops(s in "[a-z ]{0,40}", pos in 0usize..50) {
            let mut gb = GapBuffer::from_text(&s);
            gb.goto(pos);
            let before = (gb.text(), gb.cursor());
            gb.insert("");
            gb.delete(0);
            prop_assert_eq!((gb.text(), gb.cursor()), before);
        }

        #[test]
        fn move_then_move_back_restores_cursor(s in "[a-z]{0,40}", pos in 0usize..40, d in -60isize..60) {
            let mut gb = GapBuffer::from_text(&s);
            gb.goto(pos);
            let start = gb.cursor();
            gb.move_by(d);
            let moved = gb.cursor();
            gb.move_by(-d);
            let expected = (moved as isize - d).clamp(0, s.len() as isize) as usize;
            prop_assert_eq!(gb.cursor(), expected);
            if moved as isize - start as isize == d {
                prop_assert_eq!(gb.cursor(), start);
            }
            prop_assert_eq!(gb.text(), s);
        }

        #[test]
        fn edits_match_string_model(s in "[a-z]{0,30}", pos in 0usize..35, ins in "[A-Z]{0,10}") {
            let mut gb = GapBuffer::from_text(&s);
            gb.goto(pos);
            gb.insert(&ins);
            let at = pos.min(s.len());
            let mut model = s.clone();
            model.insert_str(at, &ins);
            prop_assert_eq!(gb.text(), model);
            prop_assert_eq!(gb.len(), s.len() + ins.len());
        }
    }
}
