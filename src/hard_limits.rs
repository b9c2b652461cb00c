//! Hard limits: age-bucketed absolute physiological ceilings.
//!
//! These are the values no preference and no checker may loosen. They are
//! the outermost fence: a preference-configured cap can only ever sit
//! *inside* the bracket's hard ceiling. Checkers consult [`HardLimits`] and
//! apply the result through `Constraint::set_if_smaller`; this module never
//! mutates a constraint itself.

use crate::prefs::{Preferences, keys};

/// Patient age bracket, a stored user preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    Child,
    Teenage,
    Adult,
    ResistantAdult,
}

impl AgeBracket {
    /// Parse the preference value, falling back to the most conservative
    /// adult bracket when the stored string is unknown.
    pub fn from_key(key: &str) -> Self {
        match key {
            "child" => Self::Child,
            "teenage" => Self::Teenage,
            "adult" => Self::Adult,
            "resistantadult" => Self::ResistantAdult,
            other => {
                tracing::warn!(age = other, "unknown age bracket, assuming adult");
                Self::Adult
            }
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Child => 0,
            Self::Teenage => 1,
            Self::Adult => 2,
            Self::ResistantAdult => 3,
        }
    }
}

impl std::fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Child => write!(f, "child"),
            Self::Teenage => write!(f, "teenage"),
            Self::Adult => write!(f, "adult"),
            Self::ResistantAdult => write!(f, "resistantadult"),
        }
    }
}

// Bracket tables: child, teenage, adult, resistant adult.
const MAX_BASAL: [f64; 4] = [2.0, 5.0, 10.0, 12.0];
const MAX_IOB_AMA: [f64; 4] = [3.0, 7.0, 12.0, 25.0];
const MAX_IOB_SMB: [f64; 4] = [7.0, 22.0, 30.0, 45.0];
const MAX_BOLUS: [f64; 4] = [5.0, 10.0, 17.0, 25.0];

/// IOB ceiling in Low-Glucose-Suspend mode, independent of age.
pub const MAX_IOB_LGS: f64 = 0.0;

/// Carbs ceiling in grams, independent of age.
pub const MAX_CARBS: i32 = 200;

/// Query surface over the bracket tables.
///
/// The age bracket is read from the preference snapshot at construction;
/// checkers build a `HardLimits` per invocation so a changed preference is
/// picked up on the next decision, never mid-chain.
#[derive(Debug, Clone, Copy)]
pub struct HardLimits {
    age: AgeBracket,
}

impl HardLimits {
    pub fn new(prefs: &Preferences) -> Self {
        Self {
            age: AgeBracket::from_key(prefs.str_or(keys::AGE, "adult")),
        }
    }

    /// Build for an explicit bracket (fixtures and tests).
    pub fn for_age(age: AgeBracket) -> Self {
        Self { age }
    }

    pub fn age(&self) -> AgeBracket {
        self.age
    }

    pub fn max_basal(&self) -> f64 {
        MAX_BASAL[self.age.index()]
    }

    pub fn max_iob_ama(&self) -> f64 {
        MAX_IOB_AMA[self.age.index()]
    }

    pub fn max_iob_smb(&self) -> f64 {
        MAX_IOB_SMB[self.age.index()]
    }

    /// Ultra-conservative IOB ceiling for Low-Glucose-Suspend mode.
    pub fn max_iob_lgs(&self) -> f64 {
        MAX_IOB_LGS
    }

    pub fn max_bolus(&self) -> f64 {
        MAX_BOLUS[self.age.index()]
    }

    pub fn max_carbs(&self) -> i32 {
        MAX_CARBS
    }

    // Floors: negative proposals are always rejected down to zero.

    pub fn min_basal(&self) -> f64 {
        0.0
    }

    pub fn min_bolus(&self) -> f64 {
        0.0
    }

    pub fn min_carbs(&self) -> i32 {
        0
    }
}
