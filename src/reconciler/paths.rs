//! # KV Path Shaping
//!
//! The KV engine version decides where listings and payloads live:
//!
//! | mode | list path          | read path            |
//! |------|--------------------|----------------------|
//! | V1   | `{base}/`          | `{base}/{name}`      |
//! | V2   | `{base}/metadata/` | `{base}/data/{name}` |
//!
//! The mode is fixed for the whole run and is never detected at runtime; it
//! must match how the engine is mounted.

use std::fmt;
use std::str::FromStr;

/// KV secrets engine version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KvMode {
    V1,
    #[default]
    V2,
}

impl KvMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            KvMode::V1 => "1",
            KvMode::V2 => "2",
        }
    }
}

impl fmt::Display for KvMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kv-v{}", self.as_str())
    }
}

impl FromStr for KvMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "v1" => Ok(KvMode::V1),
            "2" | "v2" => Ok(KvMode::V2),
            other => Err(format!("unsupported KV version '{other}', expected 1 or 2")),
        }
    }
}

/// Trim whitespace and trailing separators from a configured base path
#[must_use]
pub fn normalize_base_path(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Path whose listing yields the secret names
#[must_use]
pub fn list_path(base_path: &str, mode: KvMode) -> String {
    match mode {
        KvMode::V1 => format!("{base_path}/"),
        KvMode::V2 => format!("{base_path}/metadata/"),
    }
}

/// Path holding the payload of `name`
#[must_use]
pub fn read_path(base_path: &str, mode: KvMode, name: &str) -> String {
    match mode {
        KvMode::V1 => format!("{base_path}/{name}"),
        KvMode::V2 => format!("{base_path}/data/{name}"),
    }
}
