use chrono::{DateTime, Local};
use std::fs::{self, ReadDir};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOption {
    Plain,
    /// `-l`: size, modification time and attributes before the name.
    Long,
    /// `-r`: descend into subdirectories.
    Recursive,
}

/// An open directory. Dropping it closes the underlying stream.
pub struct Directory {
    entries: ReadDir,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
    pub readonly: bool,
}

impl Directory {
    /// An empty path opens the current directory.
    pub fn open(path: &str) -> io::Result<Self> {
        let path = if path.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(path)
        };
        Ok(Self {
            entries: fs::read_dir(path)?,
        })
    }
}

impl Iterator for Directory {
    type Item = io::Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(entry.and_then(|entry| {
            // file_type() does not follow symlinks, so -r never loops
            let file_type = entry.file_type()?;
            let metadata = entry.metadata()?;
            Ok(Entry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path(),
                size: metadata.len(),
                modified: metadata.modified().ok(),
                is_dir: file_type.is_dir(),
                readonly: metadata.permissions().readonly(),
            })
        }))
    }
}

impl Entry {
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    fn attributes(&self) -> String {
        let mut attrs = String::new();
        if self.readonly {
            attrs.push_str(" RO");
        }
        if self.is_hidden() {
            attrs.push_str(" H");
        }
        if self.is_dir {
            attrs.push_str(" Sub");
        }
        attrs
    }
}

fn format_time(time: Option<SystemTime>) -> String {
    match time {
        Some(time) => DateTime::<Local>::from(time)
            .format("%d/%m/%Y @ %H:%M")
            .to_string(),
        None => String::from("--/--/---- @ --:--"),
    }
}

pub fn format_entry(entry: &Entry, option: ListOption, prefix: &str) -> String {
    let name = if entry.is_dir && option == ListOption::Recursive {
        format!("{}{}/", prefix, entry.name)
    } else {
        format!("{}{}", prefix, entry.name)
    };
    match option {
        ListOption::Long => format!(
            "{:>8}  Mod. {}  Attr:{}  {}",
            entry.size,
            format_time(entry.modified),
            entry.attributes(),
            name
        ),
        _ => name,
    }
}

fn sorted_entries(directory: Directory) -> io::Result<Vec<Entry>> {
    let mut entries = directory.collect::<io::Result<Vec<Entry>>>()?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Writes the listing of `path` to `out`.
pub fn list_contents(path: &str, option: ListOption, out: &mut impl Write) -> io::Result<()> {
    let directory = Directory::open(path)?;
    list_directory(directory, option, "", out)
}

fn list_directory(
    directory: Directory,
    option: ListOption,
    prefix: &str,
    out: &mut impl Write,
) -> io::Result<()> {
    for entry in sorted_entries(directory)? {
        writeln!(out, "{}", format_entry(&entry, option, prefix))?;
        if option == ListOption::Recursive && entry.is_dir {
            let nested = format!("{}{}/", prefix, entry.name);
            match Directory::open(&entry.path.to_string_lossy()) {
                Ok(sub) => list_directory(sub, option, &nested, out)?,
                Err(e) => writeln!(out, "ls: cannot open {}: {}", nested, e)?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("minish-ls-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[allow(clippy::unwrap_used)]
    fn listing(path: &Path, option: ListOption) -> String {
        let mut out = Vec::new();
        list_contents(&path.to_string_lossy(), option, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_plain_listing_is_sorted() {
        let dir = scratch("plain");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("b.txt"), "bb").unwrap();
        fs::write(dir.join("a.txt"), "a").unwrap();

        assert_eq!(listing(&dir, ListOption::Plain), "a.txt\nb.txt\nsub\n");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_recursive_listing() {
        let dir = scratch("recursive");
        fs::create_dir_all(dir.join("sub/deeper")).unwrap();
        fs::write(dir.join("sub/inner.txt"), "x").unwrap();
        fs::write(dir.join("top.txt"), "x").unwrap();

        assert_eq!(
            listing(&dir, ListOption::Recursive),
            "sub/\nsub/deeper/\nsub/inner.txt\ntop.txt\n"
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_long_format() {
        let entry = Entry {
            name: String::from(".hidden"),
            path: PathBuf::from(".hidden"),
            size: 42,
            modified: None,
            is_dir: true,
            readonly: true,
        };
        assert_eq!(
            format_entry(&entry, ListOption::Long, ""),
            "      42  Mod. --/--/---- @ --:--  Attr: RO H Sub  .hidden"
        );
        assert_eq!(format_entry(&entry, ListOption::Plain, ""), ".hidden");
    }

    #[test]
    fn test_open_missing_directory() {
        assert!(Directory::open("/definitely/not/here").is_err());
    }
}
