//! Constraint accumulator: the value type every dosing quantity flows through.
//!
//! A [`Constraint`] is created fresh for a single decision (one loop cycle,
//! one bolus request, one carb entry), seeded with a proposed or
//! theoretical-maximum value, and passed through an ordered chain of
//! checkers. Each checker may only *tighten* the value; every tightening,
//! and every ceiling that was tighter than the original proposal, is
//! recorded so the final value is fully explainable.

use serde::Serialize;

/// One entry in the audit trail: which checker spoke, and what it said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reason {
    /// Label of the checker that produced the entry (e.g. "Safety").
    pub source: String,
    /// Preformatted human-readable message.
    pub message: String,
}

impl Reason {
    fn new(source: &str, message: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// A monotonically-tightening value with an append-only reason trail.
///
/// `reasons` records every check that was tighter than the original
/// proposal, binding or not. `most_limiting` records only the calls that
/// actually changed the value, in chronological order.
#[derive(Debug, Clone)]
pub struct Constraint<T> {
    value: T,
    original_value: T,
    reasons: Vec<Reason>,
    most_limiting: Vec<Reason>,
}

impl<T: Copy + PartialOrd> Constraint<T> {
    /// Seed a fresh constraint for one decision.
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            original_value: initial,
            reasons: Vec::new(),
            most_limiting: Vec::new(),
        }
    }

    /// Current (possibly tightened) value.
    pub fn value(&self) -> T {
        self.value
    }

    /// The value at construction, kept for reporting.
    pub fn original_value(&self) -> T {
        self.original_value
    }

    /// Overwrite the value unconditionally, logging `message`.
    ///
    /// This is the one primitive that does not compare against the running
    /// value; it is reserved for overrides that must bind regardless of
    /// what earlier checkers did (e.g. the Low-Glucose-Suspend IOB ceiling)
    /// and for boolean gates.
    pub fn set(&mut self, value: T, source: &str, message: impl Into<String>) {
        let changed = value != self.value;
        self.value = value;
        let reason = Reason::new(source, message);
        if changed {
            self.most_limiting.push(reason.clone());
        }
        self.reasons.push(reason);
    }

    /// Apply a ceiling: replace the value only if `value` is strictly
    /// smaller than the running value.
    ///
    /// The reason is recorded whenever the ceiling is tighter than the
    /// *original* proposal, so a non-binding ceiling (one already beaten by
    /// an earlier checker) still shows up in the audit trail.
    pub fn set_if_smaller(&mut self, value: T, source: &str, message: impl Into<String>) {
        let reason = Reason::new(source, message);
        if value < self.value {
            self.value = value;
            self.most_limiting.push(reason.clone());
        }
        if value < self.original_value {
            self.reasons.push(reason);
        }
    }

    /// Apply a floor: replace the value only if `value` is strictly greater
    /// than the running value. Mirror image of [`set_if_smaller`].
    ///
    /// [`set_if_smaller`]: Constraint::set_if_smaller
    pub fn set_if_greater(&mut self, value: T, source: &str, message: impl Into<String>) {
        let reason = Reason::new(source, message);
        if value > self.value {
            self.value = value;
            self.most_limiting.push(reason.clone());
        }
        if value > self.original_value {
            self.reasons.push(reason);
        }
    }

    /// Record an informational entry without touching the value.
    pub fn add_reason(&mut self, source: &str, message: impl Into<String>) {
        self.reasons.push(Reason::new(source, message));
    }

    /// Append another constraint's reason trail to this one.
    ///
    /// Used when one chain delegates to another (the percent-basal chain
    /// runs the absolute chain on a scratch constraint and folds its trail
    /// back in). Only `reasons` is copied; what was most limiting for the
    /// scratch value is not necessarily most limiting here.
    pub fn copy_reasons<U>(&mut self, other: &Constraint<U>) {
        self.reasons.extend(other.reasons.iter().cloned());
    }

    /// All recorded reasons, in order.
    pub fn reasons(&self) -> &[Reason] {
        &self.reasons
    }

    /// Only the reasons that actually changed the value, in order.
    pub fn most_limiting(&self) -> &[Reason] {
        &self.most_limiting
    }

    /// Full trail as text, one `Source: message` line per entry.
    pub fn get_reasons(&self) -> String {
        join_lines(&self.reasons)
    }

    /// Trail of value-changing entries only, same formatting.
    pub fn get_most_limited_reasons(&self) -> String {
        join_lines(&self.most_limiting)
    }
}

fn join_lines(reasons: &[Reason]) -> String {
    reasons
        .iter()
        .map(Reason::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
