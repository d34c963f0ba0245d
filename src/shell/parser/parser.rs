use std::os::fd::RawFd;

use super::ast::{Command, RedirectMode};
use super::lexer::{Lexer, Span, Token, TokenKind};
use crate::shell::errors::SyntaxError;

type Node = Command<Span>;

const STDIN: RawFd = 0;
const STDOUT: RawFd = 1;

/// Recursive-descent parser over one input line.
///
/// ```text
/// line      := pipeline ('&')* (';' line)?
/// pipeline  := unit ('|' pipeline)?
/// unit      := '(' line ')' redirs | exec_unit
/// exec_unit := redirs? (WORD redirs?)*
/// redirs    := (('<' | '>' | '>>') WORD)*
/// ```
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current_token: Token,
    max_args: usize,
}

impl<'a> Parser<'a> {
    pub fn with_max_args(input: &'a str, max_args: usize) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            input,
            lexer,
            current_token,
            max_args,
        }
    }

    fn next_token(&mut self) -> Token {
        std::mem::replace(&mut self.current_token, self.lexer.next_token())
    }

    fn peek(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current_token.kind)
    }

    fn text(&self, token: &Token) -> String {
        token.span.slice(self.input).to_string()
    }

    /// Parses the whole line into a tree whose words are owned strings.
    pub fn parse_command(mut self) -> Result<Command, SyntaxError> {
        let node = self.parse_line()?;
        if self.current_token.kind != TokenKind::End {
            let start = self.current_token.span.start;
            return Err(SyntaxError::Leftovers(self.input[start..].trim_end().to_string()));
        }
        Ok(self.finalize(node))
    }

    /// Cuts every word out of the input so the tree no longer borrows it.
    fn finalize(&self, node: Node) -> Command {
        node.map_words(&mut |span: Span| span.slice(self.input).to_string())
    }

    fn parse_line(&mut self) -> Result<Node, SyntaxError> {
        let mut node = self.parse_pipeline()?;
        while self.peek(&[TokenKind::Amp]) {
            self.next_token();
            node = Command::background(node);
        }
        if self.peek(&[TokenKind::Semi]) {
            self.next_token();
            let rest = self.parse_line()?;
            node = Command::sequence(node, rest);
        }
        Ok(node)
    }

    fn parse_pipeline(&mut self) -> Result<Node, SyntaxError> {
        let node = self.parse_unit()?;
        if !self.peek(&[TokenKind::Pipe]) {
            return Ok(node);
        }
        if node.is_empty() {
            return Err(SyntaxError::MissingPipeOperand);
        }
        self.next_token();
        let rest = self.parse_pipeline()?;
        if rest.is_empty() {
            return Err(SyntaxError::MissingPipeOperand);
        }
        Ok(Command::pipe(node, rest))
    }

    fn parse_unit(&mut self) -> Result<Node, SyntaxError> {
        if self.peek(&[TokenKind::LParen]) {
            self.parse_block()
        } else {
            self.parse_exec()
        }
    }

    fn parse_block(&mut self) -> Result<Node, SyntaxError> {
        self.next_token(); // (
        let node = self.parse_line()?;
        if !self.peek(&[TokenKind::RParen]) {
            return Err(SyntaxError::UnbalancedParen);
        }
        self.next_token();
        self.parse_redirections(node)
    }

    fn parse_exec(&mut self) -> Result<Node, SyntaxError> {
        let mut argv = Vec::new();
        let mut redirections = Vec::new();

        self.collect_redirections(&mut redirections)?;
        while !self.peek(&[
            TokenKind::Pipe,
            TokenKind::RParen,
            TokenKind::Amp,
            TokenKind::Semi,
            TokenKind::End,
        ]) {
            let token = self.next_token();
            if token.kind != TokenKind::Word {
                return Err(SyntaxError::UnexpectedToken(self.text(&token)));
            }
            if argv.len() >= self.max_args {
                return Err(SyntaxError::TooManyArgs(self.max_args));
            }
            argv.push(token.span);
            self.collect_redirections(&mut redirections)?;
        }

        Ok(wrap_redirections(Command::Exec { argv }, redirections))
    }

    fn parse_redirections(&mut self, node: Node) -> Result<Node, SyntaxError> {
        let mut redirections = Vec::new();
        self.collect_redirections(&mut redirections)?;
        Ok(wrap_redirections(node, redirections))
    }

    fn collect_redirections(
        &mut self,
        redirections: &mut Vec<(Span, RedirectMode, RawFd)>,
    ) -> Result<(), SyntaxError> {
        while self.peek(&[
            TokenKind::RedirectIn,
            TokenKind::RedirectOut,
            TokenKind::RedirectAppend,
        ]) {
            let operator = self.next_token();
            let target = self.next_token();
            if target.kind != TokenKind::Word {
                return Err(SyntaxError::MissingRedirectTarget(self.text(&operator)));
            }
            let (mode, fd) = match operator.kind {
                TokenKind::RedirectIn => (RedirectMode::ReadOnly, STDIN),
                TokenKind::RedirectAppend => (RedirectMode::AppendCreate, STDOUT),
                _ => (RedirectMode::WriteCreate, STDOUT),
            };
            redirections.push((target.span, mode, fd));
        }
        Ok(())
    }
}

/// The first redirection written ends up innermost, right around `node`.
fn wrap_redirections(node: Node, redirections: Vec<(Span, RedirectMode, RawFd)>) -> Node {
    redirections
        .into_iter()
        .fold(node, |node, (target, mode, fd)| {
            Command::redirect(node, target, mode, fd)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::DEFAULT_MAX_ARGS;

    fn parse(input: &str) -> Result<Command, SyntaxError> {
        Parser::with_max_args(input, DEFAULT_MAX_ARGS).parse_command()
    }

    fn exec(argv: &[&str]) -> Command {
        Command::exec(argv.iter().copied())
    }

    #[allow(clippy::unwrap_used)]
    fn parsed(input: &str) -> Command {
        parse(input).unwrap()
    }

    #[test]
    fn test_simple_command() {
        assert_eq!(parsed("echo hi"), exec(&["echo", "hi"]));
        assert_eq!(parsed("   ls   -l  "), exec(&["ls", "-l"]));
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(parsed(""), exec(&[]));
        assert_eq!(parsed(" \t "), exec(&[]));
    }

    #[test]
    fn test_pipeline_is_right_associative() {
        assert_eq!(
            parsed("a | b | c"),
            Command::pipe(exec(&["a"]), Command::pipe(exec(&["b"]), exec(&["c"])))
        );
    }

    #[test]
    fn test_redirection() {
        assert_eq!(
            parsed("a > f"),
            Command::redirect(exec(&["a"]), "f", RedirectMode::WriteCreate, 1)
        );
        assert_eq!(
            parsed("sort < in >> out"),
            Command::redirect(
                Command::redirect(exec(&["sort"]), "in", RedirectMode::ReadOnly, 0),
                "out",
                RedirectMode::AppendCreate,
                1
            )
        );
    }

    #[test]
    fn test_redirections_between_words() {
        assert_eq!(
            parsed("> out echo a < in b"),
            Command::redirect(
                Command::redirect(exec(&["echo", "a", "b"]), "out", RedirectMode::WriteCreate, 1),
                "in",
                RedirectMode::ReadOnly,
                0
            )
        );
    }

    #[test]
    fn test_sequence() {
        assert_eq!(parsed("a ; b"), Command::sequence(exec(&["a"]), exec(&["b"])));
        assert_eq!(
            parsed("a ; b ; c"),
            Command::sequence(exec(&["a"]), Command::sequence(exec(&["b"]), exec(&["c"])))
        );
        assert_eq!(parsed("a ;"), Command::sequence(exec(&["a"]), exec(&[])));
    }

    #[test]
    fn test_background() {
        assert_eq!(parsed("a &"), Command::background(exec(&["a"])));
        assert_eq!(
            parsed("a | b &"),
            Command::background(Command::pipe(exec(&["a"]), exec(&["b"])))
        );
    }

    #[test]
    fn test_background_then_sequence() {
        assert_eq!(
            parsed("sleep 1 & ; echo done"),
            Command::sequence(
                Command::background(exec(&["sleep", "1"])),
                exec(&["echo", "done"])
            )
        );
    }

    #[test]
    fn test_each_ampersand_wraps_again() {
        assert_eq!(
            parsed("a & &"),
            Command::background(Command::background(exec(&["a"])))
        );
    }

    #[test]
    fn test_group_with_redirection() {
        assert_eq!(
            parsed("(a ; b) > f"),
            Command::redirect(
                Command::sequence(exec(&["a"]), exec(&["b"])),
                "f",
                RedirectMode::WriteCreate,
                1
            )
        );
        assert_eq!(
            parsed("(a | b) | c"),
            Command::pipe(Command::pipe(exec(&["a"]), exec(&["b"])), exec(&["c"]))
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(parse("a |"), Err(SyntaxError::MissingPipeOperand));
        assert_eq!(parse("| a"), Err(SyntaxError::MissingPipeOperand));
        assert_eq!(parse("(a"), Err(SyntaxError::UnbalancedParen));
        assert_eq!(parse("a )"), Err(SyntaxError::Leftovers(String::from(")"))));
        assert_eq!(
            parse("a & b c"),
            Err(SyntaxError::Leftovers(String::from("b c")))
        );
        assert_eq!(
            parse("cat <"),
            Err(SyntaxError::MissingRedirectTarget(String::from("<")))
        );
        assert_eq!(
            parse("echo >> ;"),
            Err(SyntaxError::MissingRedirectTarget(String::from(">>")))
        );
        assert_eq!(
            parse("a (b)"),
            Err(SyntaxError::UnexpectedToken(String::from("(")))
        );
    }

    #[test]
    fn test_too_many_args() {
        let ten = "a b c d e f g h i j";
        assert_eq!(parse(ten).map(|cmd| cmd.to_string()), Ok(ten.to_string()));
        assert_eq!(
            parse("a b c d e f g h i j k"),
            Err(SyntaxError::TooManyArgs(10))
        );
        assert_eq!(
            Parser::with_max_args("a b c", 2).parse_command(),
            Err(SyntaxError::TooManyArgs(2))
        );
    }

    #[test]
    fn test_words_outlive_the_input() {
        let mut line = String::from("echo one > out");
        let tree = parse(&line);
        line.clear();
        line.push_str("something else entirely");
        assert_eq!(
            tree,
            Ok(Command::redirect(
                exec(&["echo", "one"]),
                "out",
                RedirectMode::WriteCreate,
                1
            ))
        );
    }
}
