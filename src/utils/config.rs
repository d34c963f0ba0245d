use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MAX_ARGS: usize = 10;

pub struct Config {
    pub name: String,
    pub config_dir: PathBuf,
    pub logger_dir: PathBuf,
    pub logger_level: String,
    pub log_to_stderr: bool,
    pub theme: String,
    pub editor_mode: String,
    pub max_args: usize,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/minish")
        } else {
            env::temp_dir().join("minish")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from(env!("CARGO_PKG_NAME")),
            logger_dir: config_dir.join("logs"),
            config_dir,
            logger_level: String::from("info"),
            log_to_stderr: false,
            theme: String::from("default"),
            editor_mode: String::from("emacs"),
            max_args: DEFAULT_MAX_ARGS,
        }
    }

    pub fn new() -> Self {
        // .env values land in the process environment before the overrides below
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();

        if let Ok(level) = env::var("MINISH_LOG_LEVEL") {
            config.logger_level = level;
        }

        if let Ok(dir) = env::var("MINISH_LOG_DIR") {
            config.logger_dir = PathBuf::from(dir);
        }

        if let Ok(flag) = env::var("MINISH_LOG_STDERR") {
            config.log_to_stderr = parse_flag(&flag);
        }

        if let Ok(theme) = env::var("MINISH_THEME") {
            config.theme = theme;
        }

        if let Ok(editor) = env::var("MINISH_EDITOR") {
            config.editor_mode = editor;
        }

        if let Ok(max_args) = env::var("MINISH_MAX_ARGS") {
            if let Some(max_args) = parse_max_args(&max_args) {
                config.max_args = max_args;
            }
        }

        config
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_max_args(value: &str) -> Option<usize> {
    value.trim().parse().ok().filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }

    #[test]
    fn test_parse_max_args() {
        assert_eq!(parse_max_args("16"), Some(16));
        assert_eq!(parse_max_args("0"), None);
        assert_eq!(parse_max_args("ten"), None);
    }

    #[test]
    fn test_edit_mode() {
        let mut config = Config::default();
        assert_eq!(config.get_edit_mode(), EditMode::Emacs);
        config.editor_mode = String::from("Vi");
        assert_eq!(config.get_edit_mode(), EditMode::Vi);
    }
}
