//! Configuration handling for the form lab

use crate::schema::SchemaDescriptor;
use crate::state::{Page, StackOrder, ToastConfig, ToastPosition};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "FORM_LAB_CONFIG";

/// User configuration; every field is optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// How long a confirmation toast stays open
    pub toast_duration_ms: Option<u64>,
    /// Corner the toasts stack from
    pub toast_position: Option<ToastPosition>,
    /// Put the oldest toast nearest the anchor edge
    pub toast_reverse_order: Option<bool>,
    /// Validate Touched forms on every change
    pub live_validation: Option<bool>,
    /// Page shown at startup
    pub start_page: Option<Page>,
    /// JSON rules for the dynamic engine
    pub dynamic_schema_path: Option<PathBuf>,
}

impl AppConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("io", "form-lab", "form-lab")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn toast_config(&self) -> ToastConfig {
        let defaults = ToastConfig::default();
        ToastConfig {
            duration: self
                .toast_duration_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.duration),
            position: self.toast_position.unwrap_or(defaults.position),
            order: match self.toast_reverse_order {
                Some(true) => StackOrder::OldestFirst,
                Some(false) => StackOrder::NewestFirst,
                None => defaults.order,
            },
        }
    }

    pub fn live_validation(&self) -> bool {
        self.live_validation.unwrap_or(true)
    }

    pub fn start_page(&self) -> Page {
        self.start_page.unwrap_or_default()
    }

    /// Descriptor for the dynamic engine, if one is configured
    pub fn dynamic_schema(&self) -> Result<Option<SchemaDescriptor>> {
        let Some(path) = &self.dynamic_schema_path else {
            return Ok(None);
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading dynamic schema {}", path.display()))?;
        let descriptor = SchemaDescriptor::from_json(&json)
            .with_context(|| format!("loading dynamic schema {}", path.display()))?;
        Ok(Some(descriptor))
    }
}
