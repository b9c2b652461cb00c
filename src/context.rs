//! Decision context: everything a checker may read, captured up front.
//!
//! There are no global lookups inside the chain. A [`DecisionContext`] is
//! assembled once per decision from the live collaborators (preference
//! store, pump driver, glucose source, build info) and passed by shared
//! reference through every checker, so a chain is reproducible and each
//! checker is testable with injected fixtures.

use crate::hard_limits::HardLimits;
use crate::prefs::{Preferences, keys};
use crate::pump::PumpDescription;

/// Requested automated-dosing mode, a stored user preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApsMode {
    /// Suggestion-only; nothing is delivered automatically.
    Open,
    /// Fully automated dosing.
    Closed,
    /// Low-Glucose-Suspend: loop runs, but IOB is pinned to the floor.
    Lgs,
}

impl ApsMode {
    pub fn from_key(key: &str) -> Self {
        match key {
            "open" => Self::Open,
            "closed" => Self::Closed,
            "lgs" => Self::Lgs,
            other => {
                tracing::warn!(mode = other, "unknown APS mode, assuming open loop");
                Self::Open
            }
        }
    }
}

/// Release channel of the running build. Closed loop is gated off on
/// development builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildFlavor {
    Release,
    Engineering,
    Dev,
}

impl BuildFlavor {
    /// Whether this build is trusted to run a closed loop.
    pub fn closed_loop_capable(self) -> bool {
        matches!(self, Self::Release | Self::Engineering)
    }
}

/// Which predictive-algorithm family is active for this decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Ama,
    Smb,
}

/// Capability flags of the active glucose data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BgSourceCaps {
    /// Whether the source performs advanced (noise) filtering. SMB is not
    /// allowed on unfiltered data.
    pub advanced_filtering: bool,
}

impl Default for BgSourceCaps {
    fn default() -> Self {
        Self {
            advanced_filtering: true,
        }
    }
}

/// Read-only snapshot threaded into every checker call.
#[derive(Debug, Clone)]
pub struct DecisionContext {
    pub prefs: Preferences,
    pub pump: PumpDescription,
    pub bg_source: BgSourceCaps,
    pub flavor: BuildFlavor,
    pub algorithm: Algorithm,
}

impl DecisionContext {
    /// Snapshot with release-build defaults around the given preferences.
    pub fn new(prefs: Preferences) -> Self {
        Self {
            prefs,
            pump: PumpDescription::default(),
            bg_source: BgSourceCaps::default(),
            flavor: BuildFlavor::Release,
            algorithm: Algorithm::Smb,
        }
    }

    /// The requested dosing mode, read from the snapshot.
    pub fn aps_mode(&self) -> ApsMode {
        ApsMode::from_key(self.prefs.str_or(keys::APS_MODE, "open"))
    }

    /// Hard limits for the snapshot's age bracket.
    pub fn hard_limits(&self) -> HardLimits {
        HardLimits::new(&self.prefs)
    }
}
