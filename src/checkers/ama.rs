//! Constraint checker for the AMA predictive-algorithm family.
//!
//! Inert unless AMA is the active algorithm for the decision. Applies the
//! shared preference-driven basal ceilings plus the family's own IOB
//! ceiling, preference first and hard limit second so the trail shows the
//! hard limit even when the preference binds.

use crate::constraint::Constraint;
use crate::context::{Algorithm, DecisionContext};
use crate::prefs::keys;
use crate::profile::Profile;
use crate::strings;

use super::{ConstraintsChecker, apply_algorithm_basal_limits};

const LABEL: &str = "APS-AMA";

pub struct AmaChecker;

impl ConstraintsChecker for AmaChecker {
    fn name(&self) -> &'static str {
        LABEL
    }

    fn apply_basal_constraints(
        &self,
        value: &mut Constraint<f64>,
        profile: &Profile,
        ctx: &DecisionContext,
    ) {
        if ctx.algorithm != Algorithm::Ama {
            return;
        }
        apply_algorithm_basal_limits(LABEL, value, profile, ctx);
    }

    fn apply_max_iob_constraints(&self, value: &mut Constraint<f64>, ctx: &DecisionContext) {
        if ctx.algorithm != Algorithm::Ama {
            return;
        }
        let pref_max = ctx.prefs.f64_or(keys::AMA_MAX_IOB, 1.5);
        value.set_if_smaller(
            pref_max,
            LABEL,
            strings::limiting_iob(pref_max, strings::MAX_VALUE_IN_PREFERENCES),
        );
        let hard_max = ctx.hard_limits().max_iob_ama();
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

    fn ama_ctx(prefs: Preferences) -> DecisionContext {
        let mut ctx = DecisionContext::new(prefs);
        ctx.algorithm = Algorithm::Ama;
        ctx
    }

    #[test]
    fn iob_preference_binds_before_hard_limit() {
        let ctx = ama_ctx(Preferences::new().with_str(keys::AGE, "teenage"));
        let mut c = Constraint::new(REALLY_HIGH_IOB);
        AmaChecker.apply_max_iob_constraints(&mut c, &ctx);
        assert_eq!(c.value(), 1.5);
        assert_eq!(
            c.get_reasons(),
            "APS-AMA: Limiting IOB to 1.5 U because of max value in preferences\n\
             APS-AMA: Limiting IOB to 7.0 U because of hard limit"
        );
        assert_eq!(
            c.get_most_limited_reasons(),
            "APS-AMA: Limiting IOB to 1.5 U because of max value in preferences"
        );
    }

    #[test]
    fn basal_preference_and_multipliers() {
        let ctx = ama_ctx(Preferences::new());
        let profile = Profile::new(1.0, 1.0);
        let mut c = Constraint::new(REALLY_HIGH_BASAL_RATE);
        AmaChecker.apply_basal_constraints(&mut c, &profile, &ctx);
        assert_eq!(c.value(), 1.0);
        assert_eq!(
            c.get_reasons(),
            "APS-AMA: Limiting max basal rate to 1.00 U/h because of max value in preferences\n\
             APS-AMA: Limiting max basal rate to 4.00 U/h because of max basal multiplier\n\
             APS-AMA: Limiting max basal rate to 3.00 U/h because of max daily basal multiplier"
        );
    }

    #[test]
    fn inert_when_another_algorithm_is_active() {
        let mut ctx = ama_ctx(Preferences::new());
        ctx.algorithm = Algorithm::Smb;
        let mut c = Constraint::new(REALLY_HIGH_IOB);
        AmaChecker.apply_max_iob_constraints(&mut c, &ctx);
        assert_eq!(c.value(), REALLY_HIGH_IOB);
        assert!(c.reasons().is_empty());
    }
}
