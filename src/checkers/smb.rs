//! Constraint checker for the SMB predictive-algorithm family.
//!
//! The SMB family adds super-micro-bolus delivery on top of the shared
//! basal ceilings, so it also owns the use-SMB preference gate. Its IOB
//! bracket is wider than AMA's; the hard-limit table accounts for that.

use crate::constraint::Constraint;
use crate::context::{Algorithm, DecisionContext};
use crate::prefs::keys;
use crate::profile::Profile;
use crate::strings;

use super::{ConstraintsChecker, apply_algorithm_basal_limits};

const LABEL: &str = "APS-SMB";

pub struct SmbChecker;

impl ConstraintsChecker for SmbChecker {
    fn name(&self) -> &'static str {
        LABEL
    }

    fn is_smb_mode_enabled(&self, value: &mut Constraint<bool>, ctx: &DecisionContext) {
        if ctx.algorithm != Algorithm::Smb {
            return;
        }
        if !ctx.prefs.bool_or(keys::USE_SMB, false) {
            value.set(false, LABEL, strings::SMB_DISABLED_IN_PREFERENCES);
        }
    }

    fn apply_basal_constraints(
        &self,
        value: &mut Constraint<f64>,
        profile: &Profile,
        ctx: &DecisionContext,
    ) {
        if ctx.algorithm != Algorithm::Smb {
            return;
        }
        apply_algorithm_basal_limits(LABEL, value, profile, ctx);
    }

    fn apply_max_iob_constraints(&self, value: &mut Constraint<f64>, ctx: &DecisionContext) {
        if ctx.algorithm != Algorithm::Smb {
            return;
        }
        let pref_max = ctx.prefs.f64_or(keys::SMB_MAX_IOB, 3.0);
        value.set_if_smaller(
            pref_max,
            LABEL,
            strings::limiting_iob(pref_max, strings::MAX_VALUE_IN_PREFERENCES),
        );
        let hard_max = ctx.hard_limits().max_iob_smb();
        value.set_if_smaller(
            hard_max,
            LABEL,
            strings::limiting_iob(hard_max, strings::HARD_LIMIT),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::{REALLY_HIGH_BASAL_RATE, REALLY_HIGH_IOB};
    use crate::prefs::Preferences;

    fn smb_ctx(prefs: Preferences) -> DecisionContext {
        DecisionContext::new(prefs)
    }

    #[test]
    fn smb_disabled_in_preferences_gates_it_off() {
        let ctx = smb_ctx(Preferences::new().with_str(keys::APS_MODE, "closed"));
        let mut c = Constraint::new(true);
        SmbChecker.is_smb_mode_enabled(&mut c, &ctx);
        assert!(!c.value());
        assert!(c.get_reasons().contains("SMB disabled in preferences"));
    }

    #[test]
    fn smb_enabled_passes_through() {
        let ctx = smb_ctx(Preferences::new().with_bool(keys::USE_SMB, true));
        let mut c = Constraint::new(true);
        SmbChecker.is_smb_mode_enabled(&mut c, &ctx);
        assert!(c.value());
        assert!(c.reasons().is_empty());
    }

    #[test]
    fn iob_preference_binds_before_hard_limit() {
        let ctx = smb_ctx(Preferences::new().with_str(keys::AGE, "teenage"));
        let mut c = Constraint::new(REALLY_HIGH_IOB);
        SmbChecker.apply_max_iob_constraints(&mut c, &ctx);
        assert_eq!(c.value(), 3.0);
        assert_eq!(
            c.get_reasons(),
            "APS-SMB: Limiting IOB to 3.0 U because of max value in preferences\n\
             APS-SMB: Limiting IOB to 22.0 U because of hard limit"
        );
        assert_eq!(
            c.get_most_limited_reasons(),
            "APS-SMB: Limiting IOB to 3.0 U because of max value in preferences"
        );
    }

    #[test]
    fn basal_trail_matches_the_preference_multiplier_sequence() {
        let ctx = smb_ctx(Preferences::new());
        let profile = Profile::new(1.0, 1.0);
        let mut c = Constraint::new(REALLY_HIGH_BASAL_RATE);
        SmbChecker.apply_basal_constraints(&mut c, &profile, &ctx);
        assert_eq!(c.value(), 1.0);
        assert_eq!(
            c.get_reasons(),
            "APS-SMB: Limiting max basal rate to 1.00 U/h because of max value in preferences\n\
             APS-SMB: Limiting max basal rate to 4.00 U/h because of max basal multiplier\n\
             APS-SMB: Limiting max basal rate to 3.00 U/h because of max daily basal multiplier"
        );
        assert_eq!(
            c.get_most_limited_reasons(),
            "APS-SMB: Limiting max basal rate to 1.00 U/h because of max value in preferences"
        );
    }
}
