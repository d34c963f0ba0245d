use std::iter::Peekable;
use std::str::CharIndices;

const WHITESPACE: &str = " \t\r\n\x0b";
const SYMBOLS: &str = "<|>&;()";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    Word,
    Pipe,
    RedirectIn,     // <
    RedirectOut,    // >
    RedirectAppend, // >>
    Semi,
    Amp,
    LParen,
    RParen,
    End,
}

/// Byte range of a token within the input line.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Hands out tokens lazily, front to back. Never fails: anything that is
/// not a symbol or whitespace is part of a word.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.offset();

        let kind = match self.read_char() {
            None => TokenKind::End,
            Some(c) => match c {
                '|' => TokenKind::Pipe,
                ';' => TokenKind::Semi,
                '&' => TokenKind::Amp,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '<' => TokenKind::RedirectIn,
                '>' => {
                    if self.peek_char() == Some('>') {
                        self.read_char();
                        TokenKind::RedirectAppend
                    } else {
                        TokenKind::RedirectOut
                    }
                }
                _ => {
                    self.read_word();
                    TokenKind::Word
                }
            },
        };

        Token {
            kind,
            span: Span {
                start,
                end: self.offset(),
            },
        }
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn read_char(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !WHITESPACE.contains(c) {
                break;
            }
            self.read_char();
        }
    }

    fn read_word(&mut self) {
        while let Some(c) = self.peek_char() {
            if WHITESPACE.contains(c) || SYMBOLS.contains(c) {
                break;
            }
            self.read_char();
        }
    }
}
