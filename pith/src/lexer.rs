//! Single-pass lexer for Pith source text.
//!
//! The [`Lexer`] walks a borrowed source string and implements
//! [`Iterator`] over [`Token`]s, finishing with exactly one `Eof`.
//!
//! | Input              | Result                                   |
//! |--------------------|------------------------------------------|
//! | space, tab, `,`    | separator, skipped                       |
//! | `# …`              | comment to end of line, skipped          |
//! | `: . [ ] { }`      | single-character punctuation             |
//! | `"…"`              | string, escapes `\n \t \r \\ \"`         |
//! | `12`, `-3.5`       | number                                   |
//! | `foo-bar?`, `+`    | word (operators are ordinary words)      |
//!
//! Characters outside these classes are recorded as [`LexError`]s and
//! skipped; lexing continues after them.

use crate::error::LexError;
use crate::span::{Pos, Span};
use crate::token::{Token, TokenKind};

// ═══════════════════════════════════════════════════════════════════
// Character classes
// ═══════════════════════════════════════════════════════════════════

fn is_separator(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | b',')
}

/// Word characters: alphanumerics plus the operator set.
fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            b'_' | b'-' | b'?' | b'!' | b'=' | b'<' | b'>' | b'+' | b'*' | b'/'
        )
}

// ═══════════════════════════════════════════════════════════════════
// Lexer
// ═══════════════════════════════════════════════════════════════════

pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    offset: usize,
    line: usize,
    column: usize,
    emitted_eof: bool,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        let origin = Pos::origin();
        Self {
            source,
            bytes: source.as_bytes(),
            offset: origin.offset,
            line: origin.line,
            column: origin.column,
            emitted_eof: false,
            errors: Vec::new(),
        }
    }

    /// Lex the whole source, returning the tokens and any recorded errors.
    pub fn tokenize(source: &'src str) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Self::new(source);
        let tokens = lexer.by_ref().collect();
        (tokens, lexer.errors)
    }

    fn pos(&self) -> Pos {
        Pos::new(self.offset, self.line, self.column)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.offset + n).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.offset += 1;
        if c == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if is_separator(c) {
                self.advance();
            } else if c == b'#' {
                while self.peek().is_some_and(|c| c != b'\n') {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn finish(&self, kind: TokenKind, start: Pos) -> Token {
        Token::new(kind, Span::new(start, self.pos()))
    }

    fn lex_string(&mut self, start: Pos) -> Token {
        self.advance();
        let mut text = Vec::new();
        while let Some(c) = self.peek() {
            if c == b'"' {
                break;
            }
            self.advance();
            if c == b'\\' {
                if let Some(esc) = self.advance() {
                    text.push(match esc {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'r' => b'\r',
                        other => other,
                    });
                    continue;
                }
            }
            text.push(c);
        }
        // An unterminated string runs to the end of input.
        if self.peek() == Some(b'"') {
            self.advance();
        }
        let text = String::from_utf8_lossy(&text).into_owned();
        self.finish(TokenKind::String(text), start)
    }

    fn lex_number(&mut self, start: Pos) -> Token {
        if self.peek() == Some(b'-') {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some(b'.') {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = &self.source[start.offset..self.offset];
        let value = text.trim_end_matches('.').parse::<f64>().unwrap_or(0.0);
        self.finish(TokenKind::Number(value), start)
    }

    fn lex_word(&mut self, start: Pos) -> Token {
        while self.peek().is_some_and(is_word_char) {
            self.advance();
        }
        let text = &self.source[start.offset..self.offset];
        let kind = TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Word(text.to_string()));
        self.finish(kind, start)
    }

    /// Skip one (possibly multi-byte) unknown character and record it.
    fn skip_unknown(&mut self, start: Pos) {
        let ch = self.source[start.offset..].chars().next().unwrap_or('\u{FFFD}');
        log::warn!("{start}: skipping unexpected character {ch:?}");
        self.errors.push(LexError { ch, pos: start });
        for _ in 0..ch.len_utf8() {
            self.advance();
        }
    }

    fn next_token(&mut self) -> Token {
        loop {
            self.skip_trivia();
            let start = self.pos();

            let Some(c) = self.peek() else {
                return self.finish(TokenKind::Eof, start);
            };

            let single = match c {
                b':' => Some(TokenKind::Colon),
                b'.' => Some(TokenKind::Dot),
                b'[' => Some(TokenKind::LBracket),
                b']' => Some(TokenKind::RBracket),
                b'{' => Some(TokenKind::LBrace),
                b'}' => Some(TokenKind::RBrace),
                _ => None,
            };
            if let Some(kind) = single {
                self.advance();
                return self.finish(kind, start);
            }

            if c == b'"' {
                return self.lex_string(start);
            }

            let negative_number =
                c == b'-' && self.peek_ahead(1).is_some_and(|d| d.is_ascii_digit());
            if c.is_ascii_digit() || negative_number {
                return self.lex_number(start);
            }

            if is_word_char(c) {
                return self.lex_word(start);
            }

            self.skip_unknown(start);
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let tok = self.next_token();
        if tok.is_eof() {
            self.emitted_eof = true;
        }
        Some(tok)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).map(|t| t.kind).collect()
    }

    fn word(w: &str) -> TokenKind {
        TokenKind::Word(w.to_string())
    }

    // ── Literals ─────────────────────────────────────────────

    #[test]
    fn lex_numbers() {
        assert_eq!(
            kinds("42 -7 3.25 1."),
            vec![
                TokenKind::Number(42.0),
                TokenKind::Number(-7.0),
                TokenKind::Number(3.25),
                TokenKind::Number(1.0),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn minus_alone_is_a_word() {
        assert_eq!(kinds("- -x"), vec![word("-"), word("-x"), TokenKind::Eof]);
    }

    #[test]
    fn lex_string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\t\"q\"\\ \z""#),
            vec![TokenKind::String("a\nb\t\"q\"\\ z".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_runs_to_eof() {
        assert_eq!(
            kinds("\"open"),
            vec![TokenKind::String("open".into()), TokenKind::Eof]
        );
    }

    // ── Words and keywords ───────────────────────────────────

    #[test]
    fn operators_are_words() {
        assert_eq!(
            kinds("+ <= != empty? count!"),
            vec![
                word("+"),
                word("<="),
                word("!="),
                word("empty?"),
                word("count!"),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn keywords() {
        assert_eq!(
            kinds("end if else do true false nil"),
            vec![
                TokenKind::End,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Do,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Nil,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn slot_header_and_dot_path() {
        assert_eq!(
            kinds("app: a.b.c! end"),
            vec![
                word("app"),
                TokenKind::Colon,
                word("a"),
                TokenKind::Dot,
                word("b"),
                TokenKind::Dot,
                word("c!"),
                TokenKind::End,
                TokenKind::Eof
            ]
        );
    }

    // ── Trivia ───────────────────────────────────────────────

    #[test]
    fn commas_and_comments_are_skipped() {
        assert_eq!(
            kinds("[1, 2] # trailing\n{ }"),
            vec![
                TokenKind::LBracket,
                TokenKind::Number(1.0),
                TokenKind::Number(2.0),
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn tracks_lines_and_columns() {
        let toks: Vec<Token> = Lexer::new("a\n  b").collect();
        assert_eq!((toks[0].span.start.line, toks[0].span.start.column), (1, 1));
        assert_eq!((toks[1].span.start.line, toks[1].span.start.column), (2, 3));
    }

    // ── Errors ───────────────────────────────────────────────

    #[test]
    fn unknown_characters_are_recorded_and_skipped() {
        let (tokens, errors) = Lexer::tokenize("a @ b ; é");
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![word("a"), word("b"), TokenKind::Eof]);
        let chars: Vec<char> = errors.iter().map(|e| e.ch).collect();
        assert_eq!(chars, vec!['@', ';', 'é']);
    }

    #[test]
    fn empty_source_yields_only_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   # just a comment"), vec![TokenKind::Eof]);
    }
}
