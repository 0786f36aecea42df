use std::path::{Path, PathBuf};

use {secrecy::Secret, tracing::debug};

use crate::{env_subst::substitute_env, schema::CadenceConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "cadence.toml",
    "cadence.yaml",
    "cadence.yml",
    "cadence.json",
];

/// Environment variable consulted when the config carries no token.
pub const TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<CadenceConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}

/// Load the config for this process.
///
/// An explicit path must exist. Otherwise the standard locations are searched:
/// 1. `./cadence.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/cadence/cadence.{toml,yaml,yml,json}` (user-global)
///
/// Falls back to `CadenceConfig::default()` when nothing is found. A file that
/// exists but does not parse is an error. The token is then filled from
/// `DISCORD_TOKEN` if the file did not set one.
pub fn discover_and_load(explicit: Option<&Path>) -> anyhow::Result<CadenceConfig> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => match find_config_file() {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                load_config(&path)?
            },
            None => {
                debug!("no config file found, using defaults");
                CadenceConfig::default()
            },
        },
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Fill settings the file left unset from the environment.
pub fn apply_env_overrides(config: &mut CadenceConfig, lookup: impl Fn(&str) -> Option<String>) {
    if config.discord.token.is_none()
        && let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty())
    {
        debug!(var = TOKEN_ENV, "using token from environment");
        config.discord.token = Some(Secret::new(token));
    }
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|p| p.exists())
}

/// Returns the user-global config directory: `~/.config/cadence/`.
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().join(".config").join("cadence"))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<CadenceConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
