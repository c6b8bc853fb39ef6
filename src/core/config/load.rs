//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies `INSPECTOR_LOG_LEVEL` and `INSPECTOR_ENDPOINT_MODE` overrides.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::AppError;

use super::raw::RawConfig;
use super::types::*;

/// Deep-merge two TOML values.
/// Tables merge recursively; any other overlay value replaces the base value.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// merged value. `visited` holds canonical paths already seen in this chain.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let base = overlay
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
        .map(|b| {
            if Path::new(b).is_absolute() {
                PathBuf::from(b)
            } else {
                path.parent().unwrap_or(Path::new(".")).join(b)
            }
        });

    match base {
        Some(base_path) => {
            let base_val = load_raw_merged(&base_path, visited)?;
            Ok(merge_toml(base_val, overlay))
        }
        None => Ok(overlay),
    }
}

/// Load config from the given path, or `config/default.toml`, then apply env overrides.
/// With no explicit path and no default file, the built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let log_level_override = env::var("INSPECTOR_LOG_LEVEL").ok();
    let mode_override = env::var("INSPECTOR_ENDPOINT_MODE").ok();

    if let Some(path) = config_path {
        return load_from(Path::new(path), log_level_override.as_deref(), mode_override.as_deref());
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(default_path, log_level_override.as_deref(), mode_override.as_deref())
    } else {
        resolve(RawConfig::default(), log_level_override.as_deref(), mode_override.as_deref())
    }
}

/// Internal loader: accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    log_level_override: Option<&str>,
    mode_override: Option<&str>,
) -> Result<Config, AppError> {
    let merged = load_raw_merged(path, &mut HashSet::new())?;

    let parsed: RawConfig = Deserialize::deserialize(merged).map_err(|e: toml::de::Error| {
        AppError::Config(format!("config error in {}: {e}", path.display()))
    })?;

    resolve(parsed, log_level_override, mode_override)
}

fn resolve(
    parsed: RawConfig,
    log_level_override: Option<&str>,
    mode_override: Option<&str>,
) -> Result<Config, AppError> {
    let mode_str = mode_override.unwrap_or(&parsed.endpoint.mode);
    let mode = EndpointMode::parse(mode_str).ok_or_else(|| {
        AppError::Config(format!("unknown endpoint mode '{mode_str}' (expected relay or direct)"))
    })?;

    if parsed.inspector.facet_timeout_seconds == 0 {
        return Err(AppError::Config("inspector.facet_timeout_seconds must be > 0".into()));
    }

    Ok(Config {
        log_level: log_level_override.unwrap_or(&parsed.general.log_level).to_string(),
        catalog_path: expand_home(&parsed.general.catalog),
        endpoint: EndpointConfig {
            mode,
            relay_url: parsed.endpoint.relay_url.trim_end_matches('/').to_string(),
            sparql_url: parsed.endpoint.sparql_url,
            search_url: parsed.endpoint.search_url,
            user_agent: parsed.endpoint.user_agent,
            timeout_seconds: parsed.endpoint.timeout_seconds,
        },
        inspector: InspectorConfig {
            facet_timeout: Duration::from_secs(parsed.inspector.facet_timeout_seconds),
            facets: FacetToggles {
                market: parsed.inspector.facets.market,
                brands: parsed.inspector.facets.brands,
            },
        },
        search: SearchConfig {
            debounce: Duration::from_millis(parsed.search.debounce_ms),
            language: parsed.search.language,
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
