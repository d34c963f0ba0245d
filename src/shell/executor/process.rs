//! Thin wrappers over the process-control system calls the evaluator drives.

use std::convert::Infallible;
use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use log::debug;
use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{self, ForkResult};

use crate::shell::errors::{ExecError, ShellError};
use crate::shell::parser::RedirectMode;
use crate::utils::path::resolve_program;

pub const STDIN: RawFd = 0;
pub const STDOUT: RawFd = 1;

/// Duplicates the current process.
pub fn fork() -> Result<ForkResult, ShellError> {
    // buffered output would otherwise be written once per process
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    // SAFETY: the shell never starts threads, so the child is a full copy
    // of the only thread there is.
    unsafe { unistd::fork() }.map_err(ShellError::Fork)
}

/// Replaces the process image with `argv[0]`. Only returns on failure.
pub fn replace_image(argv: &[String]) -> Result<Infallible, ExecError> {
    let program = argv.first().map(String::as_str).unwrap_or_default();
    let to_cstring =
        |word: &str| CString::new(word).map_err(|_| ExecError::InvalidArgument(program.to_string()));

    let path = to_cstring(resolve_program(program).as_str())?;
    let args = argv
        .iter()
        .map(|arg| to_cstring(arg.as_str()))
        .collect::<Result<Vec<CString>, ExecError>>()?;

    debug!("exec {:?} as {:?}", argv, path);
    unistd::execv(&path, &args).map_err(|errno| ExecError::Exec {
        program: program.to_string(),
        errno,
    })
}

/// Closes whatever `fd` refers to and opens `path` in its place.
pub fn redirect(path: &str, mode: RedirectMode, fd: RawFd) -> Result<(), ExecError> {
    let flags = match mode {
        RedirectMode::ReadOnly => OFlag::O_RDONLY,
        RedirectMode::WriteCreate => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        RedirectMode::AppendCreate => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
    };

    // fd may already be closed; the open below takes the lowest free slot
    let _ = unistd::close(fd);
    let opened = fcntl::open(path, flags, Mode::from_bits_truncate(0o644)).map_err(|errno| {
        ExecError::Open {
            path: path.to_string(),
            errno,
        }
    })?;

    if opened != fd {
        unistd::dup2(opened, fd).map_err(|errno| ExecError::Duplicate { fd, errno })?;
        let _ = unistd::close(opened);
    }
    Ok(())
}

pub fn make_pipe() -> Result<(OwnedFd, OwnedFd), ExecError> {
    unistd::pipe().map_err(ExecError::Pipe)
}

/// Makes `fd` another name for the stream behind `source`.
pub fn duplicate_onto(source: &OwnedFd, fd: RawFd) -> Result<(), ExecError> {
    unistd::dup2(source.as_raw_fd(), fd)
        .map(|_| ())
        .map_err(|errno| ExecError::Duplicate { fd, errno })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_image_rejects_nul() {
        let argv = vec![String::from("echo"), String::from("bad\0arg")];
        match replace_image(&argv) {
            Err(ExecError::InvalidArgument(program)) => assert_eq!(program, "echo"),
            other => panic!("expected InvalidArgument, got {:?}", other.err()),
        }
    }
}
