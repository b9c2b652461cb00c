//! # doseguard
//!
//! Safety constraint engine for an automated insulin dosing system: every
//! dosing-relevant quantity (basal rate, percent basal, bolus, carbs, IOB
//! ceiling, the loop/SMB enable gates) flows through an ordered chain of
//! independent checkers. Each checker may tighten — never loosen — the
//! value, and every tightening is recorded so the final number sent to the
//! pump is fully explainable after the fact.
//!
//! ## Architecture
//!
//! - **Constraint** (`constraint`): monotonically-tightening value plus an
//!   append-only reason trail, created fresh per decision.
//! - **Hard limits** (`hard_limits`): age-bucketed physiological ceilings
//!   no preference can override.
//! - **Checkers** (`checkers`): core safety, pump capabilities, and the
//!   AMA/SMB algorithm families, all behind one capability contract and an
//!   explicit ordered registry.
//! - **Decision context** (`context`): a read-only snapshot of
//!   preferences, pump descriptor, glucose-source capabilities and build
//!   flavor, captured once per decision — no global lookups in the chain.
//!
//! ## Library usage
//!
//! ```
//! use doseguard::checkers::ConstraintRegistry;
//! use doseguard::context::DecisionContext;
//! use doseguard::prefs::{Preferences, keys};
//! use doseguard::profile::Profile;
//!
//! let prefs = Preferences::new().with_str(keys::AGE, "child");
//! let ctx = DecisionContext::new(prefs);
//! let registry = ConstraintRegistry::with_defaults();
//!
//! let max_basal = registry.max_basal_allowed(&Profile::default(), &ctx);
//! assert!(max_basal.value() <= 2.0); // child hard limit
//! println!("{}", max_basal.get_reasons());
//! ```

pub mod checkers;
pub mod constraint;
pub mod context;
pub mod error;
pub mod hard_limits;
pub mod prefs;
pub mod profile;
pub mod pump;
pub mod strings;
