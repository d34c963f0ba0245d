use std::process;

use log::{debug, error, info};
use nix::unistd::{ForkResult, Pid};

use super::process::{self as sys, STDIN, STDOUT};
use super::wait::wait_child;
use crate::shell::errors::{ExecError, ShellError};
use crate::shell::parser::Command;

/// How a process that evaluated a tree ends, once control is back with it.
///
/// A successful image replacement never produces one: `sys::replace_image`
/// returns `Result<Infallible, _>`, so only its failure reaches the caller.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination(pub i32);

impl Termination {
    pub const SUCCESS: Termination = Termination(0);
    pub const FAILURE: Termination = Termination(1);

    pub fn exit(self) -> ! {
        process::exit(self.0)
    }
}

/// Forks a child that evaluates `command` and returns its pid.
pub fn spawn(command: &Command) -> Result<Pid, ShellError> {
    match sys::fork()? {
        ForkResult::Parent { child } => {
            debug!("forked {} for `{}`", child, command);
            Ok(child)
        }
        ForkResult::Child => run(command),
    }
}

/// Evaluates `command` in the current process, then ends it.
pub fn run(command: &Command) -> ! {
    let termination = match eval(command) {
        Ok(termination) => termination,
        Err(e) => {
            error!("{}", e);
            eprintln!("minish: {}", e);
            Termination::FAILURE
        }
    };
    termination.exit()
}

fn report(e: &ExecError) -> Termination {
    error!("{}", e);
    eprintln!("{}", e);
    Termination::FAILURE
}

fn eval(command: &Command) -> Result<Termination, ShellError> {
    match command {
        Command::Exec { argv } => Ok(exec(argv)),
        Command::Redirect {
            inner,
            target,
            mode,
            fd,
        } => match sys::redirect(target, *mode, *fd) {
            Ok(()) => eval(inner),
            Err(e) => Ok(report(&e)),
        },
        Command::Sequence { left, right } => {
            let child = spawn(left)?;
            wait_child(child);
            eval(right)
        }
        Command::Pipe { left, right } => eval_pipe(left, right),
        Command::Background { inner } => {
            let child = spawn(inner)?;
            info!("background {} for `{}`", child, inner);
            Ok(Termination::SUCCESS)
        }
    }
}

fn exec(argv: &[String]) -> Termination {
    if argv.is_empty() {
        return Termination::SUCCESS;
    }
    match sys::replace_image(argv) {
        Ok(never) => match never {},
        Err(e) => report(&e),
    }
}

fn eval_pipe(left: &Command, right: &Command) -> Result<Termination, ShellError> {
    let (reader, writer) = match sys::make_pipe() {
        Ok(ends) => ends,
        Err(e) => return Ok(report(&e)),
    };

    let left_pid = match sys::fork()? {
        ForkResult::Child => {
            if let Err(e) = sys::duplicate_onto(&writer, STDOUT) {
                report(&e).exit();
            }
            drop(reader);
            drop(writer);
            run(left)
        }
        ForkResult::Parent { child } => child,
    };

    let right_pid = match sys::fork()? {
        ForkResult::Child => {
            if let Err(e) = sys::duplicate_onto(&reader, STDIN) {
                report(&e).exit();
            }
            drop(reader);
            drop(writer);
            run(right)
        }
        ForkResult::Parent { child } => child,
    };

    // the reader only sees end-of-stream once every write end is closed,
    // this process's copy included
    drop(reader);
    drop(writer);

    debug!("pipe {} | {}", left_pid, right_pid);
    wait_child(left_pid);
    Ok(Termination(wait_child(right_pid)))
}
