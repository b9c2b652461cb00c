//! Diagnostic error types for doseguard.
//!
//! The constraint engine itself never raises errors: out-of-range proposals
//! are clamped and logged, not rejected. Errors here cover the edges of the
//! system — loading a preference snapshot, or a caller invoking the CLI
//! without the collaborators a decision needs.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for doseguard.
#[derive(Debug, Error, Diagnostic)]
pub enum DoseguardError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Prefs(#[from] PrefsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Context(#[from] ContextError),
}

/// Result type alias for doseguard operations.
pub type DoseResult<T> = std::result::Result<T, DoseguardError>;

/// Errors while loading or reading a preference snapshot.
#[derive(Debug, Error, Diagnostic)]
pub enum PrefsError {
    #[error("cannot read preferences file '{path}'")]
    #[diagnostic(
        code(doseguard::prefs::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("preferences file '{path}' is not valid TOML: {message}")]
    #[diagnostic(
        code(doseguard::prefs::parse),
        help(
            "Preferences are a flat TOML table of key = value pairs, \
             e.g. `age = \"child\"` or `max_bolus = 3.0`."
        )
    )]
    Parse { path: String, message: String },
}

/// Errors assembling a decision context outside the engine proper.
///
/// These are the upstream hard-fail conditions: the chain must not be
/// invoked at all when a required collaborator is missing.
#[derive(Debug, Error, Diagnostic)]
pub enum ContextError {
    #[error("no active pump descriptor available")]
    #[diagnostic(
        code(doseguard::context::no_pump),
        help(
            "A dosing decision needs the active pump's capability \
             descriptor. Verify pump pairing before running the chain."
        )
    )]
    PumpUnavailable,

    #[error("no active profile available")]
    #[diagnostic(
        code(doseguard::context::no_profile),
        help("Basal constraints need the currently active profile.")
    )]
    ProfileUnavailable,
}
