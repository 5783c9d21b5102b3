use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const GOFER_DIR: &str = ".gofer";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProxyConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub system_prompt: Option<String>,
    pub temperature: f64,
    pub max_tool_loops: usize,
    pub sandbox_timeout_ms: u64,
    pub search: SearchConfig,
    pub proxy: ProxyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            temperature: 0.2,
            max_tool_loops: 6,
            sandbox_timeout_ms: 2_000,
            search: SearchConfig::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

pub fn get_gofer_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(GOFER_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_gofer_dir().join("config.toml")
}

pub fn ensure_gofer_dir() -> Result<PathBuf> {
    let gofer_dir = get_gofer_dir();

    if !gofer_dir.exists() {
        std::fs::create_dir_all(&gofer_dir).with_context(|| {
            format!(
                "Failed to create gofer directory at {}",
                gofer_dir.display()
            )
        })?;
    }

    Ok(gofer_dir)
}

pub fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    if !config_path.exists() {
        anyhow::bail!("Config file not found. Run 'gofer onboard' to set up your configuration.");
    }
    read_config(&config_path)
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_gofer_dir()?;
    write_config(config, &get_config_path())
}

fn write_config(config: &Config, path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_loop_and_sandbox() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.system_prompt, None);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tool_loops, 6);
        assert_eq!(config.sandbox_timeout_ms, 2_000);
        assert_eq!(config.search, SearchConfig::default());
        assert_eq!(config.proxy, ProxyConfig::default());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            api_key = "sk-test"
            system_prompt = "Answer tersely."

            [search]
            api_key = "cse-key"
        "#,
        )
        .unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.system_prompt.as_deref(), Some("Answer tersely."));
        assert_eq!(config.search.api_key.as_deref(), Some("cse-key"));
        assert_eq!(config.search.engine_id, None);
        assert_eq!(config.max_tool_loops, 6);
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.api_key = "sk-test".to_string();
        config.max_tool_loops = 3;
        config.proxy.base_url = Some("https://proxy.dev".to_string());

        write_config(&config, &path).unwrap();
        let loaded = read_config(&path).unwrap();
        assert_eq!(loaded.api_key, "sk-test");
        assert_eq!(loaded.max_tool_loops, 3);
        assert_eq!(loaded.proxy.base_url.as_deref(), Some("https://proxy.dev"));
    }
}
