//! Preference snapshot: the read-only key-value source for one decision.
//!
//! A [`Preferences`] is captured once at the start of a decision and never
//! mutated while the chain runs, so identical inputs always produce
//! identical reason trails. Every read takes an explicit fallback default;
//! a missing or wrongly-typed key is never an error inside the engine.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PrefsError;

/// Well-known preference keys.
pub mod keys {
    /// Age bracket: "child", "teenage", "adult" or "resistantadult".
    pub const AGE: &str = "age";
    /// APS operating mode: "open", "closed" or "lgs".
    pub const APS_MODE: &str = "aps_mode";
    /// Whether super-micro-bolus delivery is enabled.
    pub const USE_SMB: &str = "use_smb";
    /// Treatment-safety bolus ceiling in U.
    pub const MAX_BOLUS: &str = "max_bolus";
    /// Treatment-safety carbs ceiling in g.
    pub const MAX_CARBS: &str = "max_carbs";
    /// Algorithm basal ceiling in U/h.
    pub const APS_MAX_BASAL: &str = "aps_max_basal";
    /// Multiplier applied to the profile's current basal.
    pub const CURRENT_BASAL_MULTIPLIER: &str = "current_basal_safety_multiplier";
    /// Multiplier applied to the profile's max daily basal.
    pub const MAX_DAILY_MULTIPLIER: &str = "max_daily_safety_multiplier";
    /// AMA-family IOB ceiling in U.
    pub const AMA_MAX_IOB: &str = "ama_max_iob";
    /// SMB-family IOB ceiling in U.
    pub const SMB_MAX_IOB: &str = "smb_max_iob";
}

/// A single typed preference value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Immutable-per-decision preference store.
///
/// Backed by a `BTreeMap` so iteration (and any derived output) is
/// deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    values: BTreeMap<String, PrefValue>,
}

impl Preferences {
    /// Empty snapshot; every read falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from a flat TOML table.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, PrefsError> {
        toml::from_str(text).map_err(|e| PrefsError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load a snapshot from a TOML file.
    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        let text = std::fs::read_to_string(path).map_err(|source| PrefsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Builder-style setter, mainly for tests and fixtures.
    pub fn with(mut self, key: &str, value: PrefValue) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn with_bool(self, key: &str, value: bool) -> Self {
        self.with(key, PrefValue::Bool(value))
    }

    pub fn with_f64(self, key: &str, value: f64) -> Self {
        self.with(key, PrefValue::Float(value))
    }

    pub fn with_i32(self, key: &str, value: i32) -> Self {
        self.with(key, PrefValue::Int(value as i64))
    }

    pub fn with_str(self, key: &str, value: &str) -> Self {
        self.with(key, PrefValue::Text(value.to_string()))
    }

    /// Boolean read with fallback.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(PrefValue::Bool(b)) => *b,
            Some(other) => {
                tracing::warn!(key, ?other, "preference has wrong type, using default");
                default
            }
            None => default,
        }
    }

    /// Floating-point read with fallback; integer values are widened.
    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        match self.values.get(key) {
            Some(PrefValue::Float(f)) => *f,
            Some(PrefValue::Int(i)) => *i as f64,
            Some(other) => {
                tracing::warn!(key, ?other, "preference has wrong type, using default");
                default
            }
            None => default,
        }
    }

    /// Integer read with fallback.
    pub fn i32_or(&self, key: &str, default: i32) -> i32 {
        match self.values.get(key) {
            Some(PrefValue::Int(i)) => *i as i32,
            Some(other) => {
                tracing::warn!(key, ?other, "preference has wrong type, using default");
                default
            }
            None => default,
        }
    }

    /// String read with fallback.
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.values.get(key) {
            Some(PrefValue::Text(s)) => s.as_str(),
            Some(other) => {
                tracing::warn!(key, ?other, "preference has wrong type, using default");
                default
            }
            None => default,
        }
    }
}
