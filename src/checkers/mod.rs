//! Constraint checkers: the capability contract and the ordered registry.
//!
//! # Architecture
//!
//! - [`ConstraintsChecker`] trait: one method per constraint kind, each
//!   taking the in-flight [`Constraint`] and the decision snapshot. Every
//!   method has a pass-through default, so a checker implements only the
//!   concerns it owns.
//! - [`ConstraintRegistry`]: an explicit, ordered list of checkers built at
//!   startup. For a given kind every registered checker runs, in
//!   registration order, on the same constraint. Because checkers only
//!   tighten, the final value is order-independent; the reason trail is
//!   order-dependent on purpose — it records the sequence of checks, not
//!   just the binding one.

pub mod ama;
pub mod pump_limits;
pub mod safety;
pub mod smb;

use std::fmt;

use crate::constraint::Constraint;
use crate::context::DecisionContext;
use crate::prefs::keys;
use crate::profile::Profile;
use crate::strings;

/// Sentinel proposals used to ask the chain "how much is allowed at most?".
pub const REALLY_HIGH_BASAL_RATE: f64 = 1_111_111.0;
pub const REALLY_HIGH_PERCENT_BASAL_RATE: i32 = 1_111_111;
pub const REALLY_HIGH_BOLUS: f64 = 1_111_111.0;
pub const REALLY_HIGH_CARBS: i32 = 1_111_111;
pub const REALLY_HIGH_IOB: f64 = 1_111_111.0;

/// The capability contract every checker implements a subset of.
///
/// Each call applies at most one concern's worth of clamps to the
/// constraint; a checker whose concern is architecturally absent for the
/// current context leaves the constraint untouched. Checkers must be
/// side-effect-free beyond the constraint itself: everything they read
/// comes from the [`DecisionContext`] snapshot.
pub trait ConstraintsChecker {
    /// Source label recorded in reason trails.
    fn name(&self) -> &'static str;

    /// Whether the closed loop may run at all this cycle.
    fn is_loop_invocation_allowed(&self, _value: &mut Constraint<bool>, _ctx: &DecisionContext) {}

    /// Whether fully automated dosing is allowed.
    fn is_closed_loop_allowed(&self, _value: &mut Constraint<bool>, _ctx: &DecisionContext) {}

    /// Whether super-micro-bolus delivery is allowed.
    fn is_smb_mode_enabled(&self, _value: &mut Constraint<bool>, _ctx: &DecisionContext) {}

    /// Whether the glucose source is clean enough for SMB variants.
    fn is_advanced_filtering_enabled(&self, _value: &mut Constraint<bool>, _ctx: &DecisionContext) {
    }

    /// Clamp an absolute basal rate in U/h.
    fn apply_basal_constraints(
        &self,
        _value: &mut Constraint<f64>,
        _profile: &Profile,
        _ctx: &DecisionContext,
    ) {
    }

    /// Clamp a percent basal rate.
    fn apply_basal_percent_constraints(
        &self,
        _value: &mut Constraint<i32>,
        _profile: &Profile,
        _ctx: &DecisionContext,
    ) {
    }

    /// Clamp the IOB ceiling in U.
    fn apply_max_iob_constraints(&self, _value: &mut Constraint<f64>, _ctx: &DecisionContext) {}

    /// Clamp a bolus amount in U.
    fn apply_bolus_constraints(&self, _value: &mut Constraint<f64>, _ctx: &DecisionContext) {}

    /// Clamp a carb entry in g.
    fn apply_carbs_constraints(&self, _value: &mut Constraint<i32>, _ctx: &DecisionContext) {}
}

/// Basal clamps shared by the two algorithm-family checkers.
///
/// Both families honor the same three preference-driven ceilings: the
/// absolute max-basal preference, a multiple of the current basal, and a
/// multiple of the day's highest scheduled basal.
pub(crate) fn apply_algorithm_basal_limits(
    label: &'static str,
    value: &mut Constraint<f64>,
    profile: &Profile,
    ctx: &DecisionContext,
) {
    let pref_max = ctx.prefs.f64_or(keys::APS_MAX_BASAL, 1.0);
    value.set_if_smaller(
        pref_max,
        label,
        strings::limiting_basal(pref_max, strings::MAX_VALUE_IN_PREFERENCES),
    );

    let current_mult = ctx.prefs.f64_or(keys::CURRENT_BASAL_MULTIPLIER, 4.0);
    let from_current = profile.current_basal * current_mult;
    value.set_if_smaller(
        from_current,
        label,
        strings::limiting_basal(from_current, strings::MAX_BASAL_MULTIPLIER),
    );

    let daily_mult = ctx.prefs.f64_or(keys::MAX_DAILY_MULTIPLIER, 3.0);
    let from_daily = profile.max_daily_basal * daily_mult;
    value.set_if_smaller(
        from_daily,
        label,
        strings::limiting_basal(from_daily, strings::MAX_DAILY_BASAL_MULTIPLIER),
    );
}

impl fmt::Debug for dyn ConstraintsChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstraintsChecker({})", self.name())
    }
}

/// Ordered registry of checkers; the aggregator of the constraint engine.
///
/// Registration order is fixed at construction and identical on every
/// invocation, which makes reason trails reproducible for identical inputs.
pub struct ConstraintRegistry {
    checkers: Vec<Box<dyn ConstraintsChecker>>,
}

impl fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintRegistry")
            .field("checkers", &self.checker_names())
            .finish()
    }
}

impl ConstraintRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            checkers: Vec::new(),
        }
    }

    /// The standard chain: core safety, then pump capabilities, then the
    /// algorithm-family checkers.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register(Box::new(safety::SafetyChecker));
        reg.register(Box::new(pump_limits::PumpCapsChecker));
        reg.register(Box::new(ama::AmaChecker));
        reg.register(Box::new(smb::SmbChecker));
        reg
    }

    /// Append a checker to the end of the chain.
    pub fn register(&mut self, checker: Box<dyn ConstraintsChecker>) {
        self.checkers.push(checker);
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Registered source labels, in chain order.
    pub fn checker_names(&self) -> Vec<&'static str> {
        self.checkers.iter().map(|c| c.name()).collect()
    }

    // -----------------------------------------------------------------------
    // Chain walks: every checker, registration order, same constraint.
    // -----------------------------------------------------------------------

    pub fn is_loop_invocation_allowed(&self, value: &mut Constraint<bool>, ctx: &DecisionContext) {
        for checker in &self.checkers {
            checker.is_loop_invocation_allowed(value, ctx);
        }
        tracing::debug!(allowed = value.value(), "loop invocation chain complete");
    }

    pub fn is_closed_loop_allowed(&self, value: &mut Constraint<bool>, ctx: &DecisionContext) {
        for checker in &self.checkers {
            checker.is_closed_loop_allowed(value, ctx);
        }
        tracing::debug!(allowed = value.value(), "closed loop chain complete");
    }

    pub fn is_smb_mode_enabled(&self, value: &mut Constraint<bool>, ctx: &DecisionContext) {
        for checker in &self.checkers {
            checker.is_smb_mode_enabled(value, ctx);
        }
        tracing::debug!(enabled = value.value(), "SMB chain complete");
    }

    pub fn is_advanced_filtering_enabled(
        &self,
        value: &mut Constraint<bool>,
        ctx: &DecisionContext,
    ) {
        for checker in &self.checkers {
            checker.is_advanced_filtering_enabled(value, ctx);
        }
        tracing::debug!(enabled = value.value(), "advanced filtering chain complete");
    }

    pub fn apply_basal_constraints(
        &self,
        value: &mut Constraint<f64>,
        profile: &Profile,
        ctx: &DecisionContext,
    ) {
        for checker in &self.checkers {
            checker.apply_basal_constraints(value, profile, ctx);
        }
        tracing::debug!(rate = value.value(), "basal chain complete");
    }

    pub fn apply_basal_percent_constraints(
        &self,
        value: &mut Constraint<i32>,
        profile: &Profile,
        ctx: &DecisionContext,
    ) {
        for checker in &self.checkers {
            checker.apply_basal_percent_constraints(value, profile, ctx);
        }
        tracing::debug!(percent = value.value(), "percent basal chain complete");
    }

    pub fn apply_max_iob_constraints(&self, value: &mut Constraint<f64>, ctx: &DecisionContext) {
        for checker in &self.checkers {
            checker.apply_max_iob_constraints(value, ctx);
        }
        tracing::debug!(iob = value.value(), "max IOB chain complete");
    }

    pub fn apply_bolus_constraints(&self, value: &mut Constraint<f64>, ctx: &DecisionContext) {
        for checker in &self.checkers {
            checker.apply_bolus_constraints(value, ctx);
        }
        tracing::debug!(units = value.value(), "bolus chain complete");
    }

    pub fn apply_carbs_constraints(&self, value: &mut Constraint<i32>, ctx: &DecisionContext) {
        for checker in &self.checkers {
            checker.apply_carbs_constraints(value, ctx);
        }
        tracing::debug!(grams = value.value(), "carbs chain complete");
    }

    // -----------------------------------------------------------------------
    // Seeded entry points for callers asking "how much is allowed?".
    // -----------------------------------------------------------------------

    pub fn loop_invocation_allowed(&self, ctx: &DecisionContext) -> Constraint<bool> {
        let mut value = Constraint::new(true);
        self.is_loop_invocation_allowed(&mut value, ctx);
        value
    }

    pub fn closed_loop_allowed(&self, ctx: &DecisionContext) -> Constraint<bool> {
        let mut value = Constraint::new(true);
        self.is_closed_loop_allowed(&mut value, ctx);
        value
    }

    pub fn smb_enabled(&self, ctx: &DecisionContext) -> Constraint<bool> {
        let mut value = Constraint::new(true);
        self.is_smb_mode_enabled(&mut value, ctx);
        value
    }

    pub fn advanced_filtering_enabled(&self, ctx: &DecisionContext) -> Constraint<bool> {
        let mut value = Constraint::new(true);
        self.is_advanced_filtering_enabled(&mut value, ctx);
        value
    }

    pub fn max_basal_allowed(&self, profile: &Profile, ctx: &DecisionContext) -> Constraint<f64> {
        let mut value = Constraint::new(REALLY_HIGH_BASAL_RATE);
        self.apply_basal_constraints(&mut value, profile, ctx);
        value
    }

    pub fn max_basal_percent_allowed(
        &self,
        profile: &Profile,
        ctx: &DecisionContext,
    ) -> Constraint<i32> {
        let mut value = Constraint::new(REALLY_HIGH_PERCENT_BASAL_RATE);
        self.apply_basal_percent_constraints(&mut value, profile, ctx);
        value
    }

    pub fn max_bolus_allowed(&self, ctx: &DecisionContext) -> Constraint<f64> {
        let mut value = Constraint::new(REALLY_HIGH_BOLUS);
        self.apply_bolus_constraints(&mut value, ctx);
        value
    }

    pub fn max_carbs_allowed(&self, ctx: &DecisionContext) -> Constraint<i32> {
        let mut value = Constraint::new(REALLY_HIGH_CARBS);
        self.apply_carbs_constraints(&mut value, ctx);
        value
    }

    pub fn max_iob_allowed(&self, ctx: &DecisionContext) -> Constraint<f64> {
        let mut value = Constraint::new(REALLY_HIGH_IOB);
        self.apply_max_iob_constraints(&mut value, ctx);
        value
    }
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::Preferences;

    /// A checker that must never loosen anything, used to prove the walk
    /// hits every registered checker in order.
    struct Recorder(&'static str);

    impl ConstraintsChecker for Recorder {
        fn name(&self) -> &'static str {
            self.0
        }

        fn apply_bolus_constraints(&self, value: &mut Constraint<f64>, _ctx: &DecisionContext) {
            let current = value.value();
            value.set_if_smaller(current - 1.0, self.0, "tighten by one");
        }
    }

    #[test]
    fn default_chain_order_is_fixed() {
        let reg = ConstraintRegistry::with_defaults();
        assert_eq!(
            reg.checker_names(),
            vec!["Safety", "Pump", "APS-AMA", "APS-SMB"]
        );
    }

    #[test]
    fn every_checker_runs_in_registration_order() {
        let mut reg = ConstraintRegistry::new();
        reg.register(Box::new(Recorder("A")));
        reg.register(Box::new(Recorder("B")));
        reg.register(Box::new(Recorder("C")));

        let ctx = DecisionContext::new(Preferences::new());
        let mut value = Constraint::new(10.0);
        reg.apply_bolus_constraints(&mut value, &ctx);

        assert_eq!(value.value(), 7.0);
        assert_eq!(
            value.get_reasons(),
            "A: tighten by one\nB: tighten by one\nC: tighten by one"
        );
    }

    #[test]
    fn empty_registry_passes_values_through() {
        let reg = ConstraintRegistry::new();
        assert!(reg.is_empty());
        let ctx = DecisionContext::new(Preferences::new());
        let value = reg.max_bolus_allowed(&ctx);
        assert_eq!(value.value(), REALLY_HIGH_BOLUS);
        assert!(value.reasons().is_empty());
    }
}
