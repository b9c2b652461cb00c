//! Hardware-adapter checker: the active pump's native caps.
//!
//! Applies whatever the paired pump physically cannot exceed. Checks whose
//! capability the pump does not have (a percent ceiling on an
//! absolute-only pump, and vice versa) simply never run.

use crate::constraint::Constraint;
use crate::context::DecisionContext;
use crate::profile::Profile;
use crate::pump::TempBasalStyle;
use crate::strings;

use super::ConstraintsChecker;

const LABEL: &str = "Pump";

pub struct PumpCapsChecker;

impl ConstraintsChecker for PumpCapsChecker {
    fn name(&self) -> &'static str {
        LABEL
    }

    fn apply_basal_constraints(
        &self,
        value: &mut Constraint<f64>,
        _profile: &Profile,
        ctx: &DecisionContext,
    ) {
        if ctx.pump.temp_basal_style != TempBasalStyle::Absolute {
            return;
        }
        value.set_if_smaller(
            ctx.pump.max_basal,
            LABEL,
            strings::limiting_basal(ctx.pump.max_basal, strings::PUMP_LIMIT),
        );
    }

    fn apply_basal_percent_constraints(
        &self,
        value: &mut Constraint<i32>,
        _profile: &Profile,
        ctx: &DecisionContext,
    ) {
        if ctx.pump.temp_basal_style != TempBasalStyle::Percent {
            return;
        }
        value.set_if_smaller(
            ctx.pump.max_percent,
            LABEL,
            strings::limiting_percent_rate(ctx.pump.max_percent, strings::PUMP_LIMIT),
        );
    }
}
