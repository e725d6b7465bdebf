use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::roster::{Group, MemberId, Position, SelectionModel};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_LOG_FILTER: &str = "roster_select=info";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    pub groups: Vec<GroupConfig>,
    /// Initial section order. Empty means every group in declaration order.
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub multi_select: Vec<String>,
    /// Identities selected at startup, as `"Group|Member"`.
    #[serde(default)]
    pub preselect: Vec<String>,
    pub reorder: Option<ReorderConfig>,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
    /// Generated members are named `"{prefix} {n}"` for n in 1..=count.
    pub prefix: Option<String>,
    #[serde(default)]
    pub count: usize,
}

impl GroupConfig {
    fn generated(name: &str, prefix: &str, count: usize) -> Self {
        Self {
            name: name.to_string(),
            members: Vec::new(),
            prefix: Some(prefix.to_string()),
            count,
        }
    }

    pub fn to_group(&self) -> Group {
        let prefix = self.prefix.as_deref().unwrap_or(&self.name);
        let mut members = self.members.clone();
        members.extend((1..=self.count).map(|n| format!("{} {}", prefix, n)));
        Group::new(self.name.clone(), members)
    }
}

/// One-shot reorder scheduled after a selection at a given position.
#[derive(Debug, Deserialize, Clone)]
pub struct ReorderConfig {
    #[serde(default)]
    pub trigger_section: usize,
    #[serde(default)]
    pub trigger_row: usize,
    #[serde(default = "default_reorder_delay_ms")]
    pub delay_ms: u64,
    pub order: Vec<String>,
}

fn default_reorder_delay_ms() -> u64 {
    5000
}

impl ReorderConfig {
    pub fn trigger(&self) -> Position {
        Position::new(self.trigger_section, self.trigger_row)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            groups: vec![
                GroupConfig::generated("Pilots", "Pilot", 2),
                GroupConfig::generated("Crew", "Crew", 5),
                GroupConfig::generated("Passengers", "Passenger", 249),
            ],
            sections: vec!["Pilots".into(), "Crew".into(), "Passengers".into()],
            multi_select: vec!["Passengers".into()],
            preselect: Vec::new(),
            reorder: Some(ReorderConfig {
                trigger_section: 0,
                trigger_row: 0,
                delay_ms: default_reorder_delay_ms(),
                order: vec!["Crew".into(), "Pilots".into(), "Passengers".into()],
            }),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the built-in demo roster.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn section_order(&self) -> Vec<String> {
        if self.sections.is_empty() {
            self.groups.iter().map(|g| g.name.clone()).collect()
        } else {
            self.sections.clone()
        }
    }

    /// Build the selection model described by this config, with `preselect`
    /// already applied.
    pub fn build_model(&self) -> Result<SelectionModel> {
        let groups = self.groups.iter().map(GroupConfig::to_group).collect();
        let mut model = SelectionModel::new(groups, self.section_order(), self.multi_select.iter().cloned())
            .context("Invalid roster in config")?;
        for key in &self.preselect {
            let id: MemberId = key
                .parse()
                .with_context(|| format!("Invalid preselect entry {:?}", key))?;
            model
                .select_identity(&id)
                .with_context(|| format!("Cannot preselect {}", id))?;
        }
        model.drain_events();
        Ok(model)
    }
}
