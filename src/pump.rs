//! Active pump capability descriptor.
//!
//! The pump driver publishes what the hardware can do; the constraint chain
//! only ever reads it. A checker whose concern is architecturally absent on
//! the active pump (e.g. a percent ceiling on an absolute-only pump) simply
//! has no effect.

use serde::{Deserialize, Serialize};

/// How the pump expresses temporary basal rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempBasalStyle {
    /// Rates in U/h.
    Absolute,
    /// Rates as a percentage of the profile basal.
    Percent,
}

/// Capability flags and native caps of the active pump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpDescription {
    /// Whether the pump can run temp basals at all. Without this the
    /// closed loop must not be invoked this cycle.
    pub is_temp_basal_capable: bool,
    pub temp_basal_style: TempBasalStyle,
    /// Native absolute basal ceiling in U/h.
    pub max_basal: f64,
    /// Native percent-rate ceiling.
    pub max_percent: i32,
    pub is_extended_bolus_capable: bool,
}

impl Default for PumpDescription {
    /// A fully capable virtual pump, matching the defaults the loop is
    /// tested against.
    fn default() -> Self {
        Self {
            is_temp_basal_capable: true,
            temp_basal_style: TempBasalStyle::Absolute,
            max_basal: 500.0,
            max_percent: 200,
            is_extended_bolus_capable: true,
        }
    }
}
