// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tagtable_api::{DEFAULT_BASE_URL, DEFAULT_SITE, DEFAULT_SORT, MAX_PAGE_SIZE, TagQuery};
use tagtable_app::{PageSize, SORT_KEY_COUNT, SORT_KEY_NAME, SortDirection, TableState};

pub const APP_NAME: &str = "tagtable";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub site: Option<String>,
    pub sort: Option<String>,
    pub page_size: Option<i64>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub rows_per_page: Option<i64>,
    pub sort_key: Option<String>,
    pub sort_direction: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TAGTABLE_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TAGTABLE_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [api], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `tagtable --print-example-config` for the current schema",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(page_size) = self.api.page_size
            && !(1..=i64::from(MAX_PAGE_SIZE)).contains(&page_size)
        {
            bail!(
                "api.page_size in {} must be between 1 and {MAX_PAGE_SIZE}, got {}",
                path.display(),
                page_size
            );
        }

        for (field, value) in [("api.site", &self.api.site), ("api.sort", &self.api.sort)] {
            if let Some(value) = value
                && value.trim().is_empty()
            {
                bail!("{field} in {} must not be empty", path.display());
            }
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(rows) = self.ui.rows_per_page {
            let allowed = usize::try_from(rows).ok().and_then(PageSize::from_rows);
            if allowed.is_none() {
                bail!(
                    "ui.rows_per_page in {} must be one of 5, 10, 25, got {}",
                    path.display(),
                    rows
                );
            }
        }

        if let Some(key) = &self.ui.sort_key
            && key != SORT_KEY_NAME
            && key != SORT_KEY_COUNT
        {
            bail!(
                "ui.sort_key in {} must be \"{SORT_KEY_NAME}\" or \"{SORT_KEY_COUNT}\", got {key:?}",
                path.display()
            );
        }

        if let Some(direction) = &self.ui.sort_direction
            && SortDirection::parse(direction).is_none()
        {
            bail!(
                "ui.sort_direction in {} must be \"asc\" or \"desc\", got {direction:?}",
                path.display()
            );
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn tag_query(&self) -> TagQuery {
        let page_size = self
            .api
            .page_size
            .and_then(|size| u32::try_from(size).ok())
            .unwrap_or(MAX_PAGE_SIZE);
        TagQuery {
            site: self.api.site.as_deref().unwrap_or(DEFAULT_SITE).to_owned(),
            sort: self.api.sort.as_deref().unwrap_or(DEFAULT_SORT).to_owned(),
            page_size,
        }
    }

    /// Starting view state: pending dataset, page 0, empty selection.
    pub fn initial_state(&self) -> TableState {
        let mut state = TableState::default();
        if let Some(size) = self
            .ui
            .rows_per_page
            .and_then(|rows| usize::try_from(rows).ok())
            .and_then(PageSize::from_rows)
        {
            state.page_size = size;
        }
        if let Some(key) = &self.ui.sort_key {
            state.sort_key = key.clone();
        }
        if let Some(direction) = self.ui.sort_direction.as_deref().and_then(SortDirection::parse) {
            state.sort_direction = direction;
        }
        state
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// `TAGTABLE_LOG_PATH` wins over `[log].path`, which wins over the
    /// platform data dir.
    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = env::var_os("TAGTABLE_LOG_PATH") {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set TAGTABLE_LOG_PATH or [log].path")
        })?;
        Ok(data_root.join(APP_NAME).join("tagtable.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# tagtable config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\nsite = \"{}\"\nsort = \"{}\"\npage_size = {}\ntimeout = \"{}\"\n\n[ui]\n# 5, 10 or 25\nrows_per_page = 5\n# \"name\" or \"count\"\nsort_key = \"count\"\nsort_direction = \"asc\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/tagtable/tagtable.log)\n# path = \"/absolute/path/to/tagtable.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_SITE,
            DEFAULT_SORT,
            MAX_PAGE_SIZE,
            DEFAULT_TIMEOUT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let invalid = || format!("invalid timeout duration {raw:?}");
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value.parse().with_context(invalid)?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value.parse().with_context(invalid)?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value.parse().with_context(invalid)?;
        let Some(secs) = mins.checked_mul(60) else {
            bail!("timeout duration {raw:?} is too large");
        };
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
