use std::env;
use std::fs::read_dir;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use log::{debug, error};

/// Looks `filename` up in each directory of `search_path`, in order.
pub fn find_file_in_path(filename: &str, search_path: &str, exec: bool) -> Option<PathBuf> {
    for p in search_path.split(':').filter(|p| !p.is_empty()) {
        match read_dir(p) {
            Ok(list) => {
                for entry in list.flatten() {
                    if entry.file_name().to_str() != Some(filename) {
                        continue;
                    }

                    let metadata = match entry.metadata() {
                        Ok(x) => x,
                        Err(e) => {
                            error!("metadata error: {}: {:?}", p, e);
                            continue;
                        }
                    };
                    if metadata.is_dir() {
                        continue;
                    }
                    if exec && metadata.permissions().mode() & 0o111 == 0 {
                        continue;
                    }

                    return Some(entry.path());
                }
            }
            Err(e) => {
                if e.kind() == ErrorKind::NotFound {
                    continue;
                }
                error!("read_dir error: {}: {}", p, e);
            }
        }
    }
    None
}

/// Resolves the program a command word names.
///
/// Words with a `/` are paths already; bare names go through `PATH`.
/// Anything not found comes back unchanged so the exec failure names it.
pub fn resolve_program(program: &str) -> String {
    if program.contains('/') {
        return program.to_string();
    }
    let env_path = match env::var("PATH") {
        Ok(x) => x,
        Err(e) => {
            debug!("PATH unavailable: {:?}", e);
            return program.to_string();
        }
    };
    match find_file_in_path(program, &env_path, true) {
        Some(path) => path.to_string_lossy().to_string(),
        None => program.to_string(),
    }
}

pub fn current_dir() -> String {
    let current_dir = match env::current_dir() {
        Ok(x) => x,
        Err(e) => {
            error!("PROMPT: env current_dir error: {}", e);
            return String::new();
        }
    };
    match current_dir.to_str() {
        Some(x) => x.to_string(),
        None => {
            error!("PROMPT: to_str error");
            current_dir.to_string_lossy().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_find_file_in_path() {
        let root = env::temp_dir().join(format!("minish-path-{}", std::process::id()));
        let first = root.join("first");
        let second = root.join("second");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();

        let plain = first.join("tool");
        fs::write(&plain, "data").unwrap();
        fs::set_permissions(&plain, fs::Permissions::from_mode(0o644)).unwrap();
        let runnable = second.join("tool");
        fs::write(&runnable, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&runnable, fs::Permissions::from_mode(0o755)).unwrap();

        let search = format!("{}:{}", first.display(), second.display());
        assert_eq!(find_file_in_path("tool", &search, true), Some(runnable));
        assert_eq!(find_file_in_path("tool", &search, false), Some(plain));
        assert_eq!(find_file_in_path("missing", &search, false), None);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_resolve_program_keeps_paths() {
        assert_eq!(resolve_program("./run.sh"), "./run.sh");
        assert_eq!(resolve_program("/bin/echo"), "/bin/echo");
        assert_eq!(
            resolve_program("surely-not-a-program-name"),
            "surely-not-a-program-name"
        );
    }
}
