//! Reason-text catalog: the string-resolution collaborator.
//!
//! Checkers emit reasons by calling these helpers with the clamped value
//! and a cause label; the wording is centralized here so trails stay
//! byte-identical across checkers and a future localization layer has a
//! single seam to replace.

// Cause labels, interpolated into the "because of ..." slot.
pub const HARD_LIMIT: &str = "hard limit";
pub const PUMP_LIMIT: &str = "pump limit";
pub const MAX_VALUE_IN_PREFERENCES: &str = "max value in preferences";
pub const MUST_BE_POSITIVE: &str = "it must be positive value";
pub const MAX_BASAL_MULTIPLIER: &str = "max basal multiplier";
pub const MAX_DAILY_BASAL_MULTIPLIER: &str = "max daily basal multiplier";
pub const LOW_GLUCOSE_SUSPEND: &str = "Low Glucose Suspend";

// Gate sentences, surfaced verbatim in the UI and log.
pub const PUMP_NOT_TEMP_BASAL_CAPABLE: &str = "Pump is not temp basal capable";
pub const CLOSED_LOOP_DISABLED_IN_PREFERENCES: &str = "Closed loop mode disabled in preferences";
pub const CLOSED_LOOP_DISABLED_ON_DEV: &str = "Running dev version. Closed loop is disabled.";
pub const SMB_DISABLED_IN_PREFERENCES: &str = "SMB disabled in preferences";
pub const SMB_NOT_ALLOWED_IN_OPEN_LOOP: &str = "SMB not allowed in open loop mode";
pub const SMB_NEEDS_ADVANCED_FILTERING: &str =
    "SMB always and after carbs disabled because active BG source doesn't support advanced filtering";

pub fn limiting_basal(rate: f64, because: &str) -> String {
    format!("Limiting max basal rate to {rate:.2} U/h because of {because}")
}

pub fn limiting_percent_rate(percent: i32, because: &str) -> String {
    format!("Limiting max percent rate to {percent}% because of {because}")
}

pub fn limiting_bolus(units: f64, because: &str) -> String {
    format!("Limiting bolus to {units:.1} U because of {because}")
}

pub fn limiting_iob(units: f64, because: &str) -> String {
    format!("Limiting IOB to {units:.1} U because of {because}")
}

pub fn limiting_carbs(grams: i32, because: &str) -> String {
    format!("Limiting carbs to {grams} g because of {because}")
}

pub fn percent_recalculated(percent: i32, absolute: f64, current_basal: f64) -> String {
    format!(
        "Percent rate {percent}% recalculated to {absolute:.2} U/h with current basal {current_basal:.2} U/h"
    )
}
