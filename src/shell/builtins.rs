use std::env;
use std::io::{self, Write};

use log::{debug, warn};

use crate::utils::listing::{self, ListOption};

pub const LS_USAGE: &str = "Usage: ls -<opt> <dir>";

/// Commands the shell runs itself instead of forking.
#[derive(Debug, PartialEq, Eq)]
pub enum Builtin<'a> {
    /// `cd <path>`: must run here, a child's directory change is lost.
    Cd(&'a str),
    /// `ls`, or `None` when its arguments do not fit the usage.
    Ls(Option<ListArgs>),
}

#[derive(Debug, PartialEq, Eq)]
pub struct ListArgs {
    pub option: ListOption,
    pub path: String,
}

impl Builtin<'_> {
    pub fn parse(line: &str) -> Option<Builtin<'_>> {
        if let Some(path) = line.strip_prefix("cd ") {
            return Some(Builtin::Cd(path.trim()));
        }

        let mut words = line.split_whitespace();
        if words.next() != Some("ls") {
            return None;
        }
        let args = words.collect::<Vec<&str>>();
        Some(Builtin::Ls(parse_ls_args(&args)))
    }

    pub fn execute(&self) {
        match self {
            Builtin::Cd(path) => change_directory(path),
            Builtin::Ls(Some(args)) => list(args),
            Builtin::Ls(None) => println!("{}", LS_USAGE),
        }
    }
}

fn flag(arg: &str) -> Option<ListOption> {
    match arg {
        "-l" => Some(ListOption::Long),
        "-r" => Some(ListOption::Recursive),
        _ => None,
    }
}

/// Accepts nothing, a flag, a path, or a flag and a path in either order.
fn parse_ls_args(args: &[&str]) -> Option<ListArgs> {
    let (option, path) = match *args {
        [] => (ListOption::Plain, ""),
        [arg] => match flag(arg) {
            Some(option) => (option, ""),
            None => (ListOption::Plain, arg),
        },
        [first, second] => match (flag(first), flag(second)) {
            (Some(option), None) => (option, second),
            (None, Some(option)) => (option, first),
            _ => return None,
        },
        _ => return None,
    };
    Some(ListArgs {
        option,
        path: path.to_string(),
    })
}

fn change_directory(path: &str) {
    if path.is_empty() {
        debug!("cd without a path");
        return;
    }
    match env::set_current_dir(path) {
        Ok(()) => debug!("cd {}", path),
        Err(e) => {
            warn!("cd {} failed: {}", path, e);
            eprintln!("cd: {}: {}", path, e);
        }
    }
}

fn list(args: &ListArgs) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = listing::list_contents(&args.path, args.option, &mut out) {
        let shown = if args.path.is_empty() { "." } else { &args.path };
        warn!("ls {} failed: {}", shown, e);
        eprintln!("ls: cannot open {}: {}", shown, e);
    }
    let _ = out.flush();
}
