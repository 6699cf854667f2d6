//! The BLK tokenizer.
//!
//! Splits the source into single-character punctuation tokens and maximal
//! runs of everything else, skipping whitespace and `//` line comments. All
//! cursor state (byte position, 1-based line counter, comment flags) lives on
//! the [`Lexer`] value, so independent documents can be tokenized on separate
//! threads without interference.

use tracing::warn;

use crate::error::{Diagnostic, FallbackPolicy};

/// Characters that always form a single-character token.
fn is_punct(b: u8) -> bool {
    matches!(
        b,
        b',' | b';' | b':' | b'=' | b'{' | b'}' | b'\'' | b'"'
    )
}

/// One token of BLK source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token<'a> {
    /// A single punctuation character from `, ; : = { } ' "`.
    Punct(u8),
    /// A maximal run of non-punctuation, non-whitespace characters: an
    /// identifier, number, or keyword.
    Word(&'a str),
    /// End of input.
    Eof,
}

impl<'a> Token<'a> {
    pub fn is_punct(self, b: u8) -> bool {
        matches!(self, Token::Punct(p) if p == b)
    }

    /// The token's text, for error messages and for the places where the
    /// grammar accepts any token as a name.
    pub fn describe(self) -> String {
        match self {
            Token::Punct(b) => (b as char).to_string(),
            Token::Word(w) => w.to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// Character cursor over one document.
pub(crate) struct Lexer<'a> {
    pub(crate) src: &'a str,
    pub(crate) pos: usize,
    /// 1-based, for diagnostics. Newlines inside quoted strings are scanned
    /// raw and do not advance it.
    pub(crate) line: usize,
    in_comment: bool,
    slash_pending: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src,
            pos: 0,
            line: 1,
            in_comment: false,
            slash_pending: false,
        }
    }

    /// Skips whitespace and `//` comments. A `/` not followed by a second `/`
    /// is diagnosed and treated as whitespace.
    fn skip_trivia(&mut self, diags: &mut Vec<Diagnostic>) {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if self.in_comment {
                if b == b'\n' {
                    self.in_comment = false;
                    self.line += 1;
                }
                self.pos += 1;
            } else if self.slash_pending {
                self.slash_pending = false;
                if b == b'/' {
                    self.in_comment = true;
                    self.pos += 1;
                } else {
                    warn!(line = self.line, "hanging / found");
                    diags.push(Diagnostic::new(
                        self.line,
                        FallbackPolicy::TreatedAsWhitespace,
                        "hanging / found",
                    ));
                    // Reprocess b as ordinary input.
                }
            } else {
                match b {
                    b' ' | b'\t' | b'\r' => self.pos += 1,
                    b'\n' => {
                        self.line += 1;
                        self.pos += 1;
                    }
                    b'/' => {
                        self.slash_pending = true;
                        self.pos += 1;
                    }
                    _ => break,
                }
            }
        }
        if self.pos >= bytes.len() && self.slash_pending {
            self.slash_pending = false;
            warn!(line = self.line, "hanging / found");
            diags.push(Diagnostic::new(
                self.line,
                FallbackPolicy::TreatedAsWhitespace,
                "hanging / found",
            ));
        }
    }

    /// Returns the next token, or [`Token::Eof`] at end of input.
    pub fn next_token(&mut self, diags: &mut Vec<Diagnostic>) -> Token<'a> {
        self.skip_trivia(diags);
        let bytes = self.src.as_bytes();
        if self.pos >= bytes.len() {
            return Token::Eof;
        }
        let b = bytes[self.pos];
        if is_punct(b) {
            self.pos += 1;
            return Token::Punct(b);
        }
        let start = self.pos;
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            // A '/' ends the word; skip_trivia decides whether it opens a
            // comment on the next call.
            if is_punct(b) || matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'/') {
                break;
            }
            self.pos += 1;
        }
        Token::Word(&self.src[start..self.pos])
    }
}
