//! Command-line front end for the risk engine.
//!
//! Usage:
//!     redflag assess --input submission.json --industry consultant_it
//!     redflag simulate --input submission.json --set total_expenses=25000
//!     redflag profiles

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use redflag_catalog::{lookup, profile_for, profiles};
use redflag_engine::{evaluate, rules};
use redflag_explain::{checklist, indicator_summaries, summarize};
use redflag_model::{
    AssessmentResult, FinancialInput, InputError, InputOverrides, RuleSet, SectorProfile,
};
use redflag_simulate::{simulate, Simulation};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "redflag")]
#[command(about = "Score a self-assessment submission against HMRC red-flag rules")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Rule set (v1 = flat thresholds, v2 = industry-aware)
    #[arg(long, default_value = "v2", value_parser = parse_rule_set, global = true)]
    rule_set: RuleSet,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: String,

    /// Log engine decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a submission
    Assess {
        /// Path to the submission JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Industry id, overrides the submission's own
        #[arg(long)]
        industry: Option<String>,

        /// List every check, including those that passed
        #[arg(long)]
        checklist: bool,

        /// Limited output: score, band and indicator names only
        #[arg(long)]
        preview: bool,
    },

    /// Re-score a submission with some fields changed
    Simulate {
        /// Path to the baseline submission JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Industry id, overrides the submission's own
        #[arg(long)]
        industry: Option<String>,

        /// Field override as key=value (repeatable)
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },

    /// List the built-in sector profiles
    Profiles,
}

/// A submission as read from disk: the figures plus an optional industry.
#[derive(Debug, Deserialize)]
struct Submission {
    #[serde(default)]
    industry: Option<String>,

    #[serde(flatten)]
    input: FinancialInput,
}

fn parse_rule_set(s: &str) -> Result<RuleSet, InputError> {
    s.parse()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "redflag=debug" } else { "redflag=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    let json = cli.format == "json";

    match cli.command {
        Commands::Assess {
            input,
            industry,
            checklist,
            preview,
        } => run_assess(&input, industry.as_deref(), cli.rule_set, json, checklist, preview),
        Commands::Simulate {
            input,
            industry,
            overrides,
        } => run_simulate(&input, industry.as_deref(), &overrides, cli.rule_set, json),
        Commands::Profiles => run_profiles(json),
    }
}

fn load_submission(path: &Path) -> Result<Submission> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let submission: Submission = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid submission in {}", path.display()))?;
    tracing::info!(path = %path.display(), industry = ?submission.industry, "Loaded submission");
    Ok(submission)
}

/// Flag wins over the submission; an explicit but unknown id is an error.
fn resolve_profile(
    flag: Option<&str>,
    submitted: Option<&str>,
) -> Result<&'static SectorProfile> {
    match flag.or(submitted) {
        Some(id) if !id.trim().is_empty() => Ok(lookup(id)?),
        _ => Ok(profile_for(None)),
    }
}

/// Build overrides from `key=value` pairs. Values are JSON literals, or
/// plain strings when they do not parse as JSON.
fn parse_overrides(pairs: &[String]) -> Result<InputOverrides> {
    let mut map = serde_json::Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("Override {pair:?} is not KEY=VALUE"))?;
        let raw = raw.trim();
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        map.insert(key.trim().to_string(), value);
    }
    serde_json::from_value(serde_json::Value::Object(map)).context("Invalid override")
}

fn run_assess(
    path: &Path,
    industry: Option<&str>,
    rule_set: RuleSet,
    json: bool,
    show_checklist: bool,
    preview: bool,
) -> Result<()> {
    let submission = load_submission(path)?;
    let profile = resolve_profile(industry, submission.industry.as_deref())?;
    let result = evaluate(&submission.input, profile, rule_set)?;

    if json {
        let output = if preview {
            serde_json::json!({
                "risk_score": result.score,
                "risk_band": result.band,
                "triggered_rules_count": result.indicators.len(),
                "indicators": indicator_summaries(&result),
            })
        } else if show_checklist {
            serde_json::json!({
                "result": &result,
                "checklist": checklist(&result, &rules(rule_set)),
            })
        } else {
            serde_json::to_value(&result)?
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Profile: {} (rule set {})", profile.name, rule_set);
    println!("Score: {}/100 ({})", result.score, result.band);
    if preview {
        println!("{} risk indicator(s) triggered", result.indicators.len());
        return Ok(());
    }
    println!("---");
    print_result(&result, show_checklist);
    println!("---");
    println!("{}", summarize(&result));

    Ok(())
}

fn print_result(result: &AssessmentResult, show_checklist: bool) {
    let f = &result.figures;
    println!(
        "Profit: £{:.2} | Profit margin: {:.1}% | Expense ratio: {:.1}%",
        f.profit, f.profit_ratio, f.expense_ratio
    );
    println!(
        "Motor: {:.1}% | Home office: {:.1}% | Travel: {:.1}% | Mileage value: £{:.2}",
        f.motor_ratio, f.home_office_ratio, f.travel_ratio, f.mileage_value
    );

    let indicators = if show_checklist {
        checklist(result, &rules(result.rule_set))
    } else {
        result.indicators.clone()
    };

    for (i, indicator) in indicators.iter().enumerate() {
        let mark = if indicator.triggered { "!" } else { "ok" };
        println!(
            "\n{}. [{}] {} ({}, +{})",
            i + 1,
            mark,
            indicator.name,
            indicator.weight.as_str(),
            indicator.points
        );
        println!("   {}", indicator.explanation);
        if indicator.triggered {
            println!("   HMRC: {}", indicator.hmrc_context);
            println!("   Records: {}", indicator.documentation_tip);
        }
    }

    if !result.notes.is_empty() {
        println!("\nNotes:");
        for note in &result.notes {
            println!("  - {}", note);
        }
    }
}

fn run_simulate(
    path: &Path,
    industry: Option<&str>,
    pairs: &[String],
    rule_set: RuleSet,
    json: bool,
) -> Result<()> {
    let submission = load_submission(path)?;
    let profile = resolve_profile(industry, submission.industry.as_deref())?;
    let overrides = parse_overrides(pairs)?;
    if overrides.is_empty() {
        tracing::warn!("No overrides given, simulation will match the baseline");
    }

    let simulation = simulate(&submission.input, &overrides, profile, rule_set)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&simulation)?);
    } else {
        print_simulation(&simulation);
    }

    Ok(())
}

fn print_simulation(simulation: &Simulation) {
    println!("Changed: {}", simulation.changed_fields.join(", "));
    println!(
        "Original:  {}/100 ({})",
        simulation.original_score, simulation.original_band
    );
    println!(
        "Simulated: {}/100 ({})",
        simulation.simulated_score(),
        simulation.simulated_band()
    );
    println!("Delta: {:+}", simulation.score_delta);

    if !simulation.resolved.is_empty() {
        let ids: Vec<_> = simulation.resolved.iter().map(|r| r.label()).collect();
        println!("Resolved: {}", ids.join(", "));
    }
    if !simulation.introduced.is_empty() {
        let ids: Vec<_> = simulation.introduced.iter().map(|r| r.label()).collect();
        println!("Introduced: {}", ids.join(", "));
    }

    println!("---");
    println!("{}", summarize(&simulation.simulated));
}

fn run_profiles(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(profiles())?);
        return Ok(());
    }

    for profile in profiles() {
        println!(
            "{:<18} {:<28} margin {:>2.0}-{:<2.0}%  expenses {:>2.0}-{:<2.0}%  motor {:>2.0}%  travel {:>2.0}%  home {:>2.0}%",
            profile.id,
            profile.name,
            profile.profit_margin.min,
            profile.profit_margin.max,
            profile.expense_ratio.min,
            profile.expense_ratio.max,
            profile.motor_threshold,
            profile.travel_threshold,
            profile.home_office_threshold,
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use redflag_model::AccountingMethod;

    #[test]
    fn test_parse_overrides() {
        let pairs = vec![
            "total_expenses=25000".to_string(),
            "method=mileage".to_string(),
            "loss_this_year = false".to_string(),
        ];
        let overrides = parse_overrides(&pairs).unwrap();
        assert_eq!(overrides.total_expenses, Some(25_000.0));
        assert_eq!(overrides.method, Some(AccountingMethod::Mileage));
        assert_eq!(overrides.loss_this_year, Some(false));
    }

    #[test]
    fn test_parse_overrides_rejects_bad_input() {
        assert!(parse_overrides(&["turnover".to_string()]).is_err());
        assert!(parse_overrides(&["salary=1".to_string()]).is_err());
        assert!(parse_overrides(&["method=lease".to_string()]).is_err());
    }

    #[test]
    fn test_resolve_profile() {
        assert_eq!(resolve_profile(None, None).unwrap().id, "other");
        assert_eq!(resolve_profile(None, Some("retail")).unwrap().id, "retail");
        assert_eq!(
            resolve_profile(Some("phv_taxi"), Some("retail")).unwrap().id,
            "phv_taxi"
        );
        assert!(resolve_profile(Some("astronaut"), None).is_err());
    }

    #[test]
    fn test_submission_with_industry() {
        let raw = r#"{
            "tax_year": "2023-24",
            "industry": "construction_cis",
            "turnover": 60000,
            "total_expenses": 35000,
            "motor_costs": 5000,
            "method": "actual",
            "email": "someone@example.com"
        }"#;
        let submission: Submission = serde_json::from_str(raw).unwrap();
        assert_eq!(submission.industry.as_deref(), Some("construction_cis"));
        assert_eq!(submission.input.turnover, 60_000.0);
        assert_eq!(submission.input.tax_year.as_deref(), Some("2023-24"));
    }
}
