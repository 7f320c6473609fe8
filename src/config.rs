use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "athenaeum")]
#[command(about = "Runs the athenaeum service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".athenaeum")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_database_url")]
    database_url: String,
    #[serde(default = "default_database_name")]
    database_name: String,
    #[serde(default = "default_port")]
    port: i32,
    #[serde(default = "default_body_limit_mb")]
    body_limit_mb: usize,
}

fn default_database_url() -> String {
    env::var("MONGODB_URL").unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string())
}

fn default_database_name() -> String {
    "athenaeum".to_string()
}

fn default_port() -> i32 {
    8000
}

fn default_body_limit_mb() -> usize {
    50
}

impl Default for App {
    fn default() -> Self {
        App {
            database_url: default_database_url(),
            database_name: default_database_name(),
            port: default_port(),
            body_limit_mb: default_body_limit_mb(),
        }
    }
}

impl App {
    pub fn get_database_url(&self) -> &str {
        &self.database_url
    }

    pub fn get_database_name(&self) -> &str {
        &self.database_name
    }

    pub fn get_port(&self) -> i32 {
        self.port
    }

    pub fn get_body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }
}

/// Toggles for how the author<->book relationship is maintained.
///
/// By default only the book side of the relationship is written: creating a
/// book with an `author` does NOT append the book to that author's `books`
/// list; callers maintain that list themselves.
#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct Relations {
    /// Maintain the author's `books` list on book create/update/delete.
    #[serde(default)]
    pub link_both_sides: bool,
    /// Run the author-delete cascade inside a session transaction.
    /// Requires a replica-set deployment.
    #[serde(default)]
    pub transactional_cascade: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub relations: Relations,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Config::default());
        }
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        let yaml_with_env = Config::substitute_env_vars(&yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // Handle default values like ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_env_vars_with_default() {
        let yaml = "database_url: ${ATHENAEUM_TEST_UNSET_VAR:-mongodb://fallback:27017}";
        let out = Config::substitute_env_vars(yaml).unwrap();
        assert_eq!(out, "database_url: mongodb://fallback:27017");
    }

    #[test]
    fn test_substitute_env_vars_set() {
        unsafe { env::set_var("ATHENAEUM_TEST_PORT", "9000") };
        let out = Config::substitute_env_vars("port: ${ATHENAEUM_TEST_PORT}").unwrap();
        assert_eq!(out, "port: 9000");
    }

    #[test]
    fn test_substitute_env_vars_missing_becomes_empty() {
        let out = Config::substitute_env_vars("token: ${ATHENAEUM_TEST_NO_SUCH_VAR}").unwrap();
        assert_eq!(out, "token: ");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
app:
  database_url: mongodb://db.internal:27017
  database_name: catalogue
  port: 8080
  body_limit_mb: 10
relations:
  link_both_sides: true
  transactional_cascade: true
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.app.get_database_url(), "mongodb://db.internal:27017");
        assert_eq!(cfg.app.get_database_name(), "catalogue");
        assert_eq!(cfg.app.get_port(), 8080);
        assert_eq!(cfg.app.get_body_limit_bytes(), 10 * 1024 * 1024);
        assert!(cfg.relations.link_both_sides);
        assert!(cfg.relations.transactional_cascade);
    }

    #[test]
    fn test_relations_default_off() {
        let cfg: Config = serde_yaml::from_str("app:\n  port: 8000\n").unwrap();
        assert!(!cfg.relations.link_both_sides);
        assert!(!cfg.relations.transactional_cascade);
    }
}
