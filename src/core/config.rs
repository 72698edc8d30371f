/*!
 * Host Configuration
 * Runtime settings loaded from the environment or a JSON file
 */

use super::limits::{
    DEFAULT_DEVICE_RAM_BASE, DEFAULT_DEVICE_RAM_SIZE, DEFAULT_EVENT_CAPACITY,
    DEFAULT_INTERRUPT_LINES,
};
use super::types::{Address, IrqNumber, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },

    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Host-side settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Interrupt lines the device exposes
    pub interrupt_lines: IrqNumber,
    /// Capacity of the inbound interrupt event channel
    pub event_capacity: usize,
    /// Base address of the loopback device's RAM window
    pub loopback_ram_base: Address,
    /// Size of the loopback device's RAM window
    pub loopback_ram_size: Size,
    /// Emit JSON-formatted logs
    pub trace_json: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            interrupt_lines: DEFAULT_INTERRUPT_LINES,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            loopback_ram_base: DEFAULT_DEVICE_RAM_BASE,
            loopback_ram_size: DEFAULT_DEVICE_RAM_SIZE,
            trace_json: false,
        }
    }
}

impl HostConfig {
    /// Load settings from `MCU_*` environment variables, falling back to defaults
    ///
    /// - MCU_INTERRUPT_LINES
    /// - MCU_EVENT_CAPACITY
    /// - MCU_LOOPBACK_RAM_BASE (decimal or 0x-prefixed hex)
    /// - MCU_LOOPBACK_RAM_SIZE
    /// - MCU_TRACE_JSON ("1" or "true")
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(v) = env_var("MCU_INTERRUPT_LINES") {
            config.interrupt_lines = parse_number("MCU_INTERRUPT_LINES", &v)?;
        }
        if let Some(v) = env_var("MCU_EVENT_CAPACITY") {
            config.event_capacity = parse_number("MCU_EVENT_CAPACITY", &v)?;
        }
        if let Some(v) = env_var("MCU_LOOPBACK_RAM_BASE") {
            config.loopback_ram_base = parse_number("MCU_LOOPBACK_RAM_BASE", &v)?;
        }
        if let Some(v) = env_var("MCU_LOOPBACK_RAM_SIZE") {
            config.loopback_ram_size = parse_number("MCU_LOOPBACK_RAM_SIZE", &v)?;
        }
        if let Some(v) = env_var("MCU_TRACE_JSON") {
            config.trace_json = v == "1" || v.eq_ignore_ascii_case("true");
        }

        config.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        let config: Self =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid("event_capacity must be non-zero".into()));
        }
        if self.loopback_ram_size == 0 {
            return Err(ConfigError::Invalid("loopback_ram_size must be non-zero".into()));
        }
        if self.loopback_ram_base == 0 {
            // 0 is the allocator's failure sentinel
            return Err(ConfigError::Invalid("loopback_ram_base must be non-zero".into()));
        }
        let end = u64::from(self.loopback_ram_base) + self.loopback_ram_size as u64;
        if end > u64::from(Address::MAX) + 1 {
            return Err(ConfigError::Invalid(format!(
                "loopback RAM window 0x{:x}+{} exceeds the 32-bit address space",
                self.loopback_ram_base, self.loopback_ram_size
            )));
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_number<T>(name: &'static str, value: &str) -> ConfigResult<T>
where
    T: TryFrom<u64>,
{
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };

    parsed
        .ok()
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| ConfigError::InvalidVar {
            name,
            value: value.to_string(),
        })
}
