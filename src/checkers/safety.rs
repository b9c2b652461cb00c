//! Core safety checker: the first link of every chain.
//!
//! Owns the gates and clamps that apply regardless of pump or algorithm:
//! loop-capability, closed-loop and SMB gating, zero floors, and the
//! age-bucketed hard limits. Runs first so later checkers can only tighten
//! what it already allowed.

use crate::constraint::Constraint;
use crate::context::{ApsMode, DecisionContext};
use crate::profile::Profile;
use crate::prefs::keys;
use crate::pump::TempBasalStyle;
use crate::strings;

use super::ConstraintsChecker;

const LABEL: &str = "Safety";

pub struct SafetyChecker;

impl ConstraintsChecker for SafetyChecker {
    fn name(&self) -> &'static str {
        LABEL
    }

    fn is_loop_invocation_allowed(&self, value: &mut Constraint<bool>, ctx: &DecisionContext) {
        if !ctx.pump.is_temp_basal_capable {
            value.set(false, LABEL, strings::PUMP_NOT_TEMP_BASAL_CAPABLE);
        }
    }

    fn is_closed_loop_allowed(&self, value: &mut Constraint<bool>, ctx: &DecisionContext) {
        let mode = ctx.aps_mode();
        if mode != ApsMode::Open && !ctx.flavor.closed_loop_capable() {
            value.set(false, LABEL, strings::CLOSED_LOOP_DISABLED_ON_DEV);
        }
        if mode == ApsMode::Open {
            value.set(false, LABEL, strings::CLOSED_LOOP_DISABLED_IN_PREFERENCES);
        }
    }

    fn is_smb_mode_enabled(&self, value: &mut Constraint<bool>, ctx: &DecisionContext) {
        // Composition instead of a callback into the aggregator: the
        // closed-loop gates live here, so re-running them on a scratch
        // constraint answers the question without a checker cycle.
        let mut closed_loop = Constraint::new(true);
        self.is_closed_loop_allowed(&mut closed_loop, ctx);
        if !closed_loop.value() {
            value.set(false, LABEL, strings::SMB_NOT_ALLOWED_IN_OPEN_LOOP);
        }
    }

    fn is_advanced_filtering_enabled(&self, value: &mut Constraint<bool>, ctx: &DecisionContext) {
        if !ctx.bg_source.advanced_filtering {
            value.set(false, LABEL, strings::SMB_NEEDS_ADVANCED_FILTERING);
        }
    }

    fn apply_basal_constraints(
        &self,
        value: &mut Constraint<f64>,
        _profile: &Profile,
        ctx: &DecisionContext,
    ) {
        let hard = ctx.hard_limits();
        value.set_if_greater(
            hard.min_basal(),
            LABEL,
            strings::limiting_basal(hard.min_basal(), strings::MUST_BE_POSITIVE),
        );
        value.set_if_smaller(
            hard.max_basal(),
            LABEL,
            strings::limiting_basal(hard.max_basal(), strings::HARD_LIMIT),
        );
    }

    fn apply_basal_percent_constraints(
        &self,
        value: &mut Constraint<i32>,
        profile: &Profile,
        ctx: &DecisionContext,
    ) {
        // Percent requests are clamped in absolute space: convert, run the
        // absolute chain on a scratch constraint, convert the ceiling back.
        // The reconversion rounds down, so the resulting percent can never
        // re-exceed the absolute ceiling it came from.
        let absolute = profile.percent_to_absolute(value.original_value());
        value.add_reason(
            LABEL,
            strings::percent_recalculated(value.original_value(), absolute, profile.current_basal),
        );

        let mut absolute_constraint = Constraint::new(absolute);
        self.apply_basal_constraints(&mut absolute_constraint, profile, ctx);
        value.copy_reasons(&absolute_constraint);

        let percent_ceiling = profile.absolute_to_percent(absolute_constraint.value());
        value.set(
            percent_ceiling,
            LABEL,
            strings::limiting_percent_rate(percent_ceiling, strings::PUMP_LIMIT),
        );

        match ctx.pump.temp_basal_style {
            TempBasalStyle::Percent => {
                value.set_if_smaller(
                    ctx.pump.max_percent,
                    LABEL,
                    strings::limiting_percent_rate(ctx.pump.max_percent, strings::PUMP_LIMIT),
                );
            }
            TempBasalStyle::Absolute => {
                // The pump thinks in U/h; express its native cap as the
                // percent it corresponds to, worded in absolute terms.
                let native_cap = profile.absolute_to_percent(ctx.pump.max_basal);
                value.set_if_smaller(
                    native_cap,
                    LABEL,
                    strings::limiting_basal(ctx.pump.max_basal, strings::PUMP_LIMIT),
                );
            }
        }
    }

    fn apply_max_iob_constraints(&self, value: &mut Constraint<f64>, ctx: &DecisionContext) {
        if ctx.aps_mode() == ApsMode::Lgs {
            let hard = ctx.hard_limits();
            // Unconditional: Low Glucose Suspend overrides every
            // algorithm preference, including pathological proposals.
            value.set(
                hard.max_iob_lgs(),
                LABEL,
                strings::limiting_iob(hard.max_iob_lgs(), strings::LOW_GLUCOSE_SUSPEND),
            );
        }
    }

    fn apply_bolus_constraints(&self, value: &mut Constraint<f64>, ctx: &DecisionContext) {
        let hard = ctx.hard_limits();
        value.set_if_greater(
            hard.min_bolus(),
            LABEL,
            strings::limiting_bolus(hard.min_bolus(), strings::MUST_BE_POSITIVE),
        );
        let pref_max = ctx.prefs.f64_or(keys::MAX_BOLUS, 3.0);
        value.set_if_smaller(
            pref_max,
            LABEL,
            strings::limiting_bolus(pref_max, strings::MAX_VALUE_IN_PREFERENCES),
        );
        value.set_if_smaller(
            hard.max_bolus(),
            LABEL,
            strings::limiting_bolus(hard.max_bolus(), strings::HARD_LIMIT),
        );
    }

    fn apply_carbs_constraints(&self, value: &mut Constraint<i32>, ctx: &DecisionContext) {
        let hard = ctx.hard_limits();
        value.set_if_greater(
            hard.min_carbs(),
            LABEL,
            strings::limiting_carbs(hard.min_carbs(), strings::MUST_BE_POSITIVE),
        );
        let pref_max = ctx.prefs.i32_or(keys::MAX_CARBS, 48);
        value.set_if_smaller(
            pref_max,
            LABEL,
            strings::limiting_carbs(pref_max, strings::MAX_VALUE_IN_PREFERENCES),
        );
        value.set_if_smaller(
            hard.max_carbs(),
            LABEL,
            strings::limiting_carbs(hard.max_carbs(), strings::HARD_LIMIT),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::{
        REALLY_HIGH_BASAL_RATE, REALLY_HIGH_BOLUS, REALLY_HIGH_CARBS, REALLY_HIGH_IOB,
        REALLY_HIGH_PERCENT_BASAL_RATE,
    };
    use crate::context::BuildFlavor;
    use crate::prefs::Preferences;

    fn ctx_with(prefs: Preferences) -> DecisionContext {
        DecisionContext::new(prefs)
    }

    fn child_ctx() -> DecisionContext {
        ctx_with(Preferences::new().with_str(keys::AGE, "child"))
    }

    #[test]
    fn incapable_pump_blocks_loop_invocation() {
        let mut ctx = ctx_with(Preferences::new());
        ctx.pump.is_temp_basal_capable = false;

        let mut c = Constraint::new(true);
        SafetyChecker.is_loop_invocation_allowed(&mut c, &ctx);
        assert!(!c.value());
        assert_eq!(c.get_reasons(), "Safety: Pump is not temp basal capable");
    }

    #[test]
    fn dev_build_blocks_closed_loop() {
        let mut ctx = ctx_with(Preferences::new().with_str(keys::APS_MODE, "closed"));
        ctx.flavor = BuildFlavor::Dev;

        let mut c = Constraint::new(true);
        SafetyChecker.is_closed_loop_allowed(&mut c, &ctx);
        assert!(!c.value());
        assert!(
            c.get_reasons()
                .contains("Running dev version. Closed loop is disabled.")
        );
    }

    #[test]
    fn open_mode_blocks_closed_loop() {
        let ctx = ctx_with(Preferences::new().with_str(keys::APS_MODE, "open"));
        let mut c = Constraint::new(true);
        SafetyChecker.is_closed_loop_allowed(&mut c, &ctx);
        assert!(!c.value());
        assert!(
            c.get_reasons()
                .contains("Closed loop mode disabled in preferences")
        );
    }

    #[test]
    fn open_loop_prevents_smb() {
        let ctx = ctx_with(Preferences::new().with_str(keys::APS_MODE, "open"));
        let mut c = Constraint::new(true);
        SafetyChecker.is_smb_mode_enabled(&mut c, &ctx);
        assert!(!c.value());
        assert!(c.get_reasons().contains("SMB not allowed in open loop mode"));
    }

    #[test]
    fn closed_mode_leaves_smb_alone() {
        let ctx = ctx_with(Preferences::new().with_str(keys::APS_MODE, "closed"));
        let mut c = Constraint::new(true);
        SafetyChecker.is_smb_mode_enabled(&mut c, &ctx);
        assert!(c.value());
        assert!(c.reasons().is_empty());
    }

    #[test]
    fn unfiltered_bg_source_blocks_smb_variants() {
        let mut ctx = ctx_with(Preferences::new());
        ctx.bg_source.advanced_filtering = false;

        let mut c = Constraint::new(true);
        SafetyChecker.is_advanced_filtering_enabled(&mut c, &ctx);
        assert!(!c.value());
        assert_eq!(
            c.get_reasons(),
            "Safety: SMB always and after carbs disabled because active BG source doesn't support advanced filtering"
        );
    }

    #[test]
    fn basal_is_clamped_to_hard_limit() {
        let ctx = child_ctx();
        let profile = Profile::default();
        let mut c = Constraint::new(REALLY_HIGH_BASAL_RATE);
        SafetyChecker.apply_basal_constraints(&mut c, &profile, &ctx);
        assert_eq!(c.value(), 2.0);
        assert_eq!(
            c.get_reasons(),
            "Safety: Limiting max basal rate to 2.00 U/h because of hard limit"
        );
        assert_eq!(
            c.get_most_limited_reasons(),
            "Safety: Limiting max basal rate to 2.00 U/h because of hard limit"
        );
    }

    #[test]
    fn negative_basal_is_floored() {
        let ctx = child_ctx();
        let profile = Profile::default();
        let mut c = Constraint::new(-0.5);
        SafetyChecker.apply_basal_constraints(&mut c, &profile, &ctx);
        assert_eq!(c.value(), 0.0);
        assert_eq!(
            c.get_reasons(),
            "Safety: Limiting max basal rate to 0.00 U/h because of it must be positive value"
        );
    }

    #[test]
    fn percent_basal_full_trail() {
        let ctx = child_ctx();
        let profile = Profile::default();
        let mut c = Constraint::new(REALLY_HIGH_PERCENT_BASAL_RATE);
        SafetyChecker.apply_basal_percent_constraints(&mut c, &profile, &ctx);
        assert_eq!(c.value(), 200);
        assert_eq!(
            c.get_reasons(),
            "Safety: Percent rate 1111111% recalculated to 11111.11 U/h with current basal 1.00 U/h\n\
             Safety: Limiting max basal rate to 2.00 U/h because of hard limit\n\
             Safety: Limiting max percent rate to 200% because of pump limit\n\
             Safety: Limiting max basal rate to 500.00 U/h because of pump limit"
        );
        assert_eq!(
            c.get_most_limited_reasons(),
            "Safety: Limiting max percent rate to 200% because of pump limit"
        );
    }

    #[test]
    fn negative_percent_basal_is_floored() {
        let ctx = child_ctx();
        let profile = Profile::default();
        let mut c = Constraint::new(-22);
        SafetyChecker.apply_basal_percent_constraints(&mut c, &profile, &ctx);
        assert_eq!(c.value(), 0);
        assert_eq!(
            c.get_reasons(),
            "Safety: Percent rate -22% recalculated to -0.22 U/h with current basal 1.00 U/h\n\
             Safety: Limiting max basal rate to 0.00 U/h because of it must be positive value\n\
             Safety: Limiting max percent rate to 0% because of pump limit"
        );
        assert_eq!(
            c.get_most_limited_reasons(),
            "Safety: Limiting max percent rate to 0% because of pump limit"
        );
    }

    #[test]
    fn percent_ceiling_on_percent_style_pumps() {
        let mut ctx = child_ctx();
        ctx.pump.temp_basal_style = TempBasalStyle::Percent;
        ctx.pump.max_percent = 150;
        let profile = Profile::default();
        let mut c = Constraint::new(REALLY_HIGH_PERCENT_BASAL_RATE);
        SafetyChecker.apply_basal_percent_constraints(&mut c, &profile, &ctx);
        assert_eq!(c.value(), 150);
        assert!(
            c.get_most_limited_reasons()
                .contains("Limiting max percent rate to 150% because of pump limit")
        );
    }

    #[test]
    fn lgs_mode_pins_iob_to_zero() {
        let ctx = ctx_with(
            Preferences::new()
                .with_str(keys::APS_MODE, "lgs")
                .with_str(keys::AGE, "teenage"),
        );
        let mut c = Constraint::new(REALLY_HIGH_IOB);
        SafetyChecker.apply_max_iob_constraints(&mut c, &ctx);
        assert_eq!(c.value(), 0.0);
        assert_eq!(
            c.get_reasons(),
            "Safety: Limiting IOB to 0.0 U because of Low Glucose Suspend"
        );
        assert_eq!(
            c.get_most_limited_reasons(),
            "Safety: Limiting IOB to 0.0 U because of Low Glucose Suspend"
        );
    }

    #[test]
    fn non_lgs_mode_leaves_iob_alone() {
        let ctx = ctx_with(Preferences::new().with_str(keys::APS_MODE, "closed"));
        let mut c = Constraint::new(REALLY_HIGH_IOB);
        SafetyChecker.apply_max_iob_constraints(&mut c, &ctx);
        assert_eq!(c.value(), REALLY_HIGH_IOB);
        assert!(c.reasons().is_empty());
    }

    #[test]
    fn bolus_pref_binds_hard_limit_still_logged() {
        let ctx = child_ctx();
        let mut c = Constraint::new(REALLY_HIGH_BOLUS);
        SafetyChecker.apply_bolus_constraints(&mut c, &ctx);
        assert_eq!(c.value(), 3.0);
        assert_eq!(
            c.get_reasons(),
            "Safety: Limiting bolus to 3.0 U because of max value in preferences\n\
             Safety: Limiting bolus to 5.0 U because of hard limit"
        );
        assert_eq!(
            c.get_most_limited_reasons(),
            "Safety: Limiting bolus to 3.0 U because of max value in preferences"
        );
    }

    #[test]
    fn negative_bolus_is_floored() {
        let ctx = child_ctx();
        let mut c = Constraint::new(-22.0);
        SafetyChecker.apply_bolus_constraints(&mut c, &ctx);
        assert_eq!(c.value(), 0.0);
        assert_eq!(
            c.get_reasons(),
            "Safety: Limiting bolus to 0.0 U because of it must be positive value"
        );
        assert_eq!(
            c.get_most_limited_reasons(),
            "Safety: Limiting bolus to 0.0 U because of it must be positive value"
        );
    }

    #[test]
    fn carbs_are_floored_and_capped() {
        let ctx = ctx_with(Preferences::new());

        let mut negative = Constraint::new(-22);
        SafetyChecker.apply_carbs_constraints(&mut negative, &ctx);
        assert_eq!(negative.value(), 0);
        assert_eq!(
            negative.get_reasons(),
            "Safety: Limiting carbs to 0 g because of it must be positive value"
        );

        let mut high = Constraint::new(REALLY_HIGH_CARBS);
        SafetyChecker.apply_carbs_constraints(&mut high, &ctx);
        assert_eq!(high.value(), 48);
        assert_eq!(
            high.get_most_limited_reasons(),
            "Safety: Limiting carbs to 48 g because of max value in preferences"
        );
    }
}
