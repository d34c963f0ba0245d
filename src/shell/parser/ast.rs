use std::fmt;
use std::os::fd::RawFd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `<`: the file must exist.
    ReadOnly,
    /// `>`: created if absent, truncated otherwise.
    WriteCreate,
    /// `>>`: created if absent, written at the end.
    AppendCreate,
}

impl RedirectMode {
    pub fn symbol(&self) -> &'static str {
        match self {
            RedirectMode::ReadOnly => "<",
            RedirectMode::WriteCreate => ">",
            RedirectMode::AppendCreate => ">>",
        }
    }
}

/// A parsed command line. Each node owns its children.
///
/// `W` is the word representation: spans into the input while parsing,
/// owned strings once the tree is handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<W = String> {
    /// An empty `argv` is a no-op.
    Exec { argv: Vec<W> },
    Redirect {
        inner: Box<Command<W>>,
        target: W,
        mode: RedirectMode,
        fd: RawFd,
    },
    /// `left`'s standard output feeds `right`'s standard input.
    Pipe {
        left: Box<Command<W>>,
        right: Box<Command<W>>,
    },
    Sequence {
        left: Box<Command<W>>,
        right: Box<Command<W>>,
    },
    Background { inner: Box<Command<W>> },
}

impl<W> Command<W> {
    pub fn exec<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<W>,
    {
        Command::Exec {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    pub fn redirect(inner: Command<W>, target: impl Into<W>, mode: RedirectMode, fd: RawFd) -> Self {
        Command::Redirect {
            inner: Box::new(inner),
            target: target.into(),
            mode,
            fd,
        }
    }

    pub fn pipe(left: Command<W>, right: Command<W>) -> Self {
        Command::Pipe {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn sequence(left: Command<W>, right: Command<W>) -> Self {
        Command::Sequence {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn background(inner: Command<W>) -> Self {
        Command::Background {
            inner: Box::new(inner),
        }
    }

    /// An `Exec` with nothing to run.
    pub fn is_empty(&self) -> bool {
        matches!(self, Command::Exec { argv } if argv.is_empty())
    }

    /// Rebuilds the tree with every word passed through `f`, argv words
    /// before redirect targets, left subtrees before right ones.
    pub fn map_words<V>(self, f: &mut impl FnMut(W) -> V) -> Command<V> {
        match self {
            Command::Exec { argv } => Command::Exec {
                argv: argv.into_iter().map(&mut *f).collect(),
            },
            Command::Redirect {
                inner,
                target,
                mode,
                fd,
            } => {
                let inner = inner.map_words(f);
                Command::redirect(inner, f(target), mode, fd)
            }
            Command::Pipe { left, right } => {
                let left = left.map_words(f);
                Command::pipe(left, right.map_words(f))
            }
            Command::Sequence { left, right } => {
                let left = left.map_words(f);
                Command::sequence(left, right.map_words(f))
            }
            Command::Background { inner } => Command::background(inner.map_words(f)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Exec { argv } => write!(f, "{}", argv.join(" ")),
            Command::Redirect {
                inner,
                target,
                mode,
                ..
            } => match inner.as_ref() {
                Command::Exec { .. } | Command::Redirect { .. } => {
                    write!(f, "{} {} {}", inner, mode.symbol(), target)
                }
                _ => write!(f, "({}) {} {}", inner, mode.symbol(), target),
            },
            Command::Pipe { left, right } => write!(f, "{} | {}", left, right),
            Command::Sequence { left, right } => write!(f, "{} ; {}", left, right),
            Command::Background { inner } => write!(f, "{} &", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(Command::<String>::exec(Vec::<String>::new()).is_empty());
        assert!(!Command::<String>::exec(["true"]).is_empty());
        let redirected = Command::<String>::redirect(
            Command::exec(Vec::<String>::new()),
            "f",
            RedirectMode::WriteCreate,
            1,
        );
        assert!(!redirected.is_empty());
    }

    #[test]
    fn test_map_words_order() {
        let tree: Command<&str> = Command::pipe(
            Command::redirect(Command::exec(["a", "b"]), "in", RedirectMode::ReadOnly, 0),
            Command::exec(["c"]),
        );
        let mut seen = Vec::new();
        let mapped: Command<String> = tree.map_words(&mut |w: &str| {
            seen.push(w.to_string());
            w.to_uppercase()
        });
        assert_eq!(seen, vec!["a", "b", "in", "c"]);
        assert_eq!(mapped.to_string(), "A B < IN | C");
    }

    #[test]
    fn test_display() {
        let tree: Command = Command::sequence(
            Command::background(Command::exec(["sleep", "1"])),
            Command::redirect(
                Command::sequence(Command::exec(["a"]), Command::exec(["b"])),
                "log",
                RedirectMode::AppendCreate,
                1,
            ),
        );
        assert_eq!(tree.to_string(), "sleep 1 & ; (a ; b) >> log");
    }
}
