use nix::errno::Errno;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Malformed command text. Fatal to the current line only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("missing file for redirection after '{0}'")]
    MissingRedirectTarget(String),
    #[error("missing )")]
    UnbalancedParen,
    #[error("too many args (at most {0})")]
    TooManyArgs(usize),
    #[error("leftovers: {0}")]
    Leftovers(String),
    #[error("unexpected '{0}'")]
    UnexpectedToken(String),
    #[error("missing command around '|'")]
    MissingPipeOperand,
}

/// A process-control primitive failed while evaluating a tree.
/// Local to the process that hit it.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("exec {program} failed: {errno}")]
    Exec { program: String, errno: Errno },
    #[error("exec {0} failed: argument contains a NUL byte")]
    InvalidArgument(String),
    #[error("open {path} failed: {errno}")]
    Open { path: String, errno: Errno },
    #[error("dup onto fd {fd} failed: {errno}")]
    Duplicate { fd: i32, errno: Errno },
    #[error("pipe failed: {0}")]
    Pipe(Errno),
}

/// Unrecoverable for the shell invocation.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("fork failed: {0}")]
    Fork(Errno),
    #[error("readline: {0}")]
    Readline(#[from] ReadlineError),
}
