//! doseguard CLI: run a dosing proposal through the constraint chain.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use doseguard::checkers::ConstraintRegistry;
use doseguard::constraint::{Constraint, Reason};
use doseguard::context::DecisionContext;
use doseguard::prefs::Preferences;
use doseguard::profile::Profile;

#[derive(Parser)]
#[command(
    name = "doseguard",
    version,
    about = "Safety constraint engine for automated insulin dosing"
)]
struct Cli {
    /// Preference snapshot (flat TOML table). Defaults apply if omitted.
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// Current profile basal rate in U/h.
    #[arg(long, global = true, default_value = "1.0")]
    current_basal: f64,

    /// Highest scheduled basal rate of the day in U/h.
    #[arg(long, global = true, default_value = "1.0")]
    max_daily_basal: f64,

    /// Emit the result as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clamp a proposed value and print the reason trail.
    Check {
        #[command(subcommand)]
        kind: CheckKind,
    },

    /// Evaluate the boolean gates (loop, closed loop, SMB, filtering).
    Gates,

    /// Show the ceilings the chain currently allows.
    Limits,
}

#[derive(Subcommand)]
enum CheckKind {
    /// Absolute basal rate in U/h.
    Basal { value: f64 },
    /// Percent basal rate.
    Percent { value: i32 },
    /// Bolus amount in U.
    Bolus { value: f64 },
    /// Carb entry in g.
    Carbs { value: i32 },
    /// IOB ceiling in U.
    Iob { value: f64 },
}

#[derive(Serialize)]
struct Outcome<T> {
    value: T,
    original_value: T,
    reasons: Vec<Reason>,
    most_limiting: Vec<Reason>,
}

impl<T: Copy + PartialOrd + Serialize + std::fmt::Display> Outcome<T> {
    fn from(constraint: &Constraint<T>) -> Self {
        Self {
            value: constraint.value(),
            original_value: constraint.original_value(),
            reasons: constraint.reasons().to_vec(),
            most_limiting: constraint.most_limiting().to_vec(),
        }
    }

    fn print(&self, json: bool) -> Result<()> {
        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(self).into_diagnostic()?
            );
        } else {
            println!("allowed: {}", self.value);
            for reason in &self.reasons {
                println!("  {reason}");
            }
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let prefs = match &cli.prefs {
        Some(path) => Preferences::load(path)?,
        None => Preferences::new(),
    };
    let ctx = DecisionContext::new(prefs);
    let profile = Profile::new(cli.current_basal, cli.max_daily_basal);
    let registry = ConstraintRegistry::with_defaults();

    match cli.command {
        Commands::Check { kind } => match kind {
            CheckKind::Basal { value } => {
                let mut c = Constraint::new(value);
                registry.apply_basal_constraints(&mut c, &profile, &ctx);
                Outcome::from(&c).print(cli.json)?;
            }
            CheckKind::Percent { value } => {
                let mut c = Constraint::new(value);
                registry.apply_basal_percent_constraints(&mut c, &profile, &ctx);
                Outcome::from(&c).print(cli.json)?;
            }
            CheckKind::Bolus { value } => {
                let mut c = Constraint::new(value);
                registry.apply_bolus_constraints(&mut c, &ctx);
                Outcome::from(&c).print(cli.json)?;
            }
            CheckKind::Carbs { value } => {
                let mut c = Constraint::new(value);
                registry.apply_carbs_constraints(&mut c, &ctx);
                Outcome::from(&c).print(cli.json)?;
            }
            CheckKind::Iob { value } => {
                let mut c = Constraint::new(value);
                registry.apply_max_iob_constraints(&mut c, &ctx);
                Outcome::from(&c).print(cli.json)?;
            }
        },

        Commands::Gates => {
            let gates = [
                ("loop invocation", registry.loop_invocation_allowed(&ctx)),
                ("closed loop", registry.closed_loop_allowed(&ctx)),
                ("SMB", registry.smb_enabled(&ctx)),
                (
                    "advanced filtering",
                    registry.advanced_filtering_enabled(&ctx),
                ),
            ];
            if cli.json {
                let out: Vec<_> = gates
                    .iter()
                    .map(|(name, c)| {
                        serde_json::json!({
                            "gate": name,
                            "allowed": c.value(),
                            "reasons": c.reasons(),
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&out).into_diagnostic()?
                );
            } else {
                for (name, c) in &gates {
                    println!("{name}: {}", if c.value() { "allowed" } else { "blocked" });
                    for reason in c.reasons() {
                        println!("  {reason}");
                    }
                }
            }
        }

        Commands::Limits => {
            let basal = registry.max_basal_allowed(&profile, &ctx);
            let percent = registry.max_basal_percent_allowed(&profile, &ctx);
            let bolus = registry.max_bolus_allowed(&ctx);
            let carbs = registry.max_carbs_allowed(&ctx);
            let iob = registry.max_iob_allowed(&ctx);
            if cli.json {
                let out = serde_json::json!({
                    "max_basal": basal.value(),
                    "max_basal_percent": percent.value(),
                    "max_bolus": bolus.value(),
                    "max_carbs": carbs.value(),
                    "max_iob": iob.value(),
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&out).into_diagnostic()?
                );
            } else {
                println!("max basal:   {:.2} U/h", basal.value());
                println!("max percent: {}%", percent.value());
                println!("max bolus:   {:.1} U", bolus.value());
                println!("max carbs:   {} g", carbs.value());
                println!("max IOB:     {:.1} U", iob.value());
            }
        }
    }

    Ok(())
}
