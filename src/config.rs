use crate::error::RingError;
use crate::ring_buffer::{RingBuffer, SlotPolicy, Value};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Number of slots. Must be at least 1.
    pub size: usize,
    /// Value every slot starts with.
    pub default_value: Value,
    /// "retain" keeps popped values in storage, "reset" overwrites them with default_value
    pub slot_policy: SlotPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Keep replaying a script after a pop/peek underflow.
    pub keep_going: bool,
    /// Emit a JSON report instead of plain text.
    pub json: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for BufferConfig {
    fn default() -> Self {
        Self { size: 8, default_value: 0, slot_policy: SlotPolicy::default() }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    /// Load the default config file. A missing file is replaced with the
    /// defaults (written best-effort); a file that fails to read or parse is
    /// an error.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            log::debug!("no config dir, using defaults");
            return Ok(Config::default());
        };
        if !path.exists() {
            // Write defaults on first run (best-effort)
            if let Err(e) = write_defaults(&path) {
                log::warn!("could not write default config {}: {:#}", path.display(), e);
            }
            return Ok(Config::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rbuf").join("rbuf.toml"))
    }

    pub fn build_buffer(&self) -> Result<RingBuffer, RingError> {
        let b = &self.buffer;
        RingBuffer::with_policy(b.default_value, b.size, b.slot_policy)
    }
}

fn write_defaults(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# rbuf configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}
