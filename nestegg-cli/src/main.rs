mod format;
mod logging;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use nestegg_core::calculations::{ProjectionInput, TaxCalculator, project};
use nestegg_core::db::{DbConfig, RepositoryRegistry};
use nestegg_core::{
    CalculatorRepository, IncomeInputs, NewProjectionRun, NewTaxRun, ProjectionPoint,
    ProjectionRun, RunHistory, TaxResult, TaxRun,
};
use nestegg_data::schedules;
use nestegg_db_sqlite::SqliteRepositoryFactory;

use crate::format::{format_currency, parse_decimal};

fn decimal_arg(s: &str) -> Result<Decimal, String> {
    parse_decimal(s).map_err(|e| e.to_string())
}

/// Pension growth projection and quick federal + state tax estimates.
///
/// Saved runs go to the database named by NESTEGG_DB_URL (and
/// NESTEGG_DB_BACKEND), or to the URL passed via --database.
#[derive(Parser, Debug)]
#[command(name = "nestegg", version, about, long_about = None)]
struct Cli {
    /// Database URL override (e.g. sqlite:nestegg.db?mode=rwc)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Project savings growth over a contribution phase and a growth phase
    Project(ProjectArgs),
    /// Estimate federal and state tax for the shipped 2024 configuration
    Tax(TaxArgs),
    /// List recently saved runs, newest first
    History(HistoryArgs),
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Starting balance
    #[arg(long, default_value = "0", value_parser = decimal_arg)]
    initial_balance: Decimal,

    /// Contribution deposited at the end of each period
    #[arg(long, default_value = "60000", value_parser = decimal_arg)]
    contribution: Decimal,

    /// Expected return per period, in percent (7.0 means 7%)
    #[arg(long, default_value = "7.0", value_parser = decimal_arg)]
    rate: Decimal,

    /// Number of contributing periods
    #[arg(long, default_value_t = 30)]
    contribution_periods: u32,

    /// Total periods, including growth-only ones
    #[arg(long, default_value_t = 40)]
    total_periods: u32,

    /// Save the run to the configured database
    #[arg(long, default_value_t = false)]
    save: bool,
}

#[derive(Args, Debug)]
struct TaxArgs {
    /// W-2 wages
    #[arg(long, default_value = "0", value_parser = decimal_arg)]
    wages: Decimal,

    /// Short-term capital gains
    #[arg(long, default_value = "0", value_parser = decimal_arg)]
    short_term_gains: Decimal,

    /// Business profit
    #[arg(long, default_value = "0", value_parser = decimal_arg)]
    business_profit: Decimal,

    /// Pre-tax retirement contribution (e.g. 401(k))
    #[arg(long, default_value = "0", value_parser = decimal_arg)]
    retirement_contribution: Decimal,

    /// Mortgage interest paid
    #[arg(long, default_value = "0", value_parser = decimal_arg)]
    mortgage_interest: Decimal,

    /// Property taxes paid
    #[arg(long, default_value = "0", value_parser = decimal_arg)]
    property_tax: Decimal,

    /// Expenses eligible for the dependent-care style credit
    #[arg(long, default_value = "0", value_parser = decimal_arg)]
    credit_eligible_expenses: Decimal,

    /// Federal tax withheld
    #[arg(long, default_value = "0", value_parser = decimal_arg)]
    federal_withholding: Decimal,

    /// State tax withheld
    #[arg(long, default_value = "0", value_parser = decimal_arg)]
    state_withholding: Decimal,

    /// Load the year configuration from the database instead of the
    /// built-in 2024 schedules
    #[arg(long, default_value_t = false)]
    from_db: bool,

    /// Save the estimate to the configured database
    #[arg(long, default_value_t = false)]
    save: bool,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    #[arg(value_enum)]
    kind: HistoryKind,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HistoryKind {
    Projections,
    Taxes,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_default_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Project(args) => run_project(args, cli.database.as_deref()).await,
        Commands::Tax(args) => run_tax(args, cli.database.as_deref()).await,
        Commands::History(args) => run_history(args, cli.database.as_deref()).await,
    }
}

async fn open_repository(database: Option<&str>) -> Result<Box<dyn CalculatorRepository>> {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));

    let mut config = DbConfig::from_env();
    if let Some(url) = database {
        config.connection_string = url.to_string();
    }

    tracing::debug!(backend = %config.backend, "opening calculation store");
    registry
        .create(&config)
        .await
        .context("failed to open the calculation store")
}

async fn run_project(
    args: ProjectArgs,
    database: Option<&str>,
) -> Result<()> {
    let input = ProjectionInput {
        initial_balance: args.initial_balance,
        periodic_contribution: args.contribution,
        periodic_rate: args.rate / Decimal::ONE_HUNDRED,
        contribution_periods: args.contribution_periods,
        total_periods: args.total_periods,
    };

    let points = project(&input)?;
    render_projection(&points, args.contribution_periods);

    let final_balance = points.last().map_or(input.initial_balance, |p| p.balance);
    println!();
    println!("Final balance: {}", format_currency(final_balance));

    if args.save {
        let repo = open_repository(database).await?;
        let run = repo
            .create_projection_run(NewProjectionRun {
                initial_balance: input.initial_balance,
                periodic_contribution: input.periodic_contribution,
                periodic_rate: input.periodic_rate,
                contribution_periods: input.contribution_periods,
                total_periods: input.total_periods,
                final_balance,
            })
            .await?;
        tracing::info!(id = run.id, "saved projection run");
    }

    Ok(())
}

fn render_projection(
    points: &[ProjectionPoint],
    contribution_periods: u32,
) {
    println!("{:>6}  {:>18}  Phase", "Period", "Balance");
    for point in points {
        if contribution_periods > 0 && point.period == contribution_periods + 1 {
            println!("{:-^40}", " end of contributions ");
        }
        println!(
            "{:>6}  {:>18}  {}",
            point.period,
            format_currency(point.balance),
            point.phase.as_str()
        );
    }
}

async fn run_tax(
    args: TaxArgs,
    database: Option<&str>,
) -> Result<()> {
    let repo = if args.from_db || args.save {
        Some(open_repository(database).await?)
    } else {
        None
    };

    let (authorities, standard_deduction) = match (&repo, args.from_db) {
        (Some(repo), true) => {
            let config = repo.get_tax_config(schedules::TAX_YEAR).await?;
            let names = repo.list_authorities().await?;
            let mut authorities = Vec::with_capacity(names.len());
            for name in &names {
                authorities.push(repo.get_authority(name).await?);
            }
            (authorities, config.standard_deduction)
        }
        _ => (
            schedules::shipped_authorities(),
            schedules::standard_deduction_2024(),
        ),
    };

    let input = IncomeInputs {
        wages: args.wages,
        short_term_gains: args.short_term_gains,
        business_profit: args.business_profit,
        retirement_contribution: args.retirement_contribution,
        mortgage_interest: args.mortgage_interest,
        property_tax: args.property_tax,
        credit_eligible_expenses: args.credit_eligible_expenses,
        withholding: BTreeMap::from([
            ("federal".to_string(), args.federal_withholding),
            ("state".to_string(), args.state_withholding),
        ]),
    };

    let calculator = TaxCalculator::new(&authorities, standard_deduction);
    let result = calculator.calculate(&input);
    render_tax_result(&result);

    if args.save {
        let repo = match repo {
            Some(repo) => repo,
            None => open_repository(database).await?,
        };
        let run = repo
            .create_tax_run(NewTaxRun {
                wages: input.wages,
                short_term_gains: input.short_term_gains,
                business_profit: input.business_profit,
                retirement_contribution: input.retirement_contribution,
                mortgage_interest: input.mortgage_interest,
                property_tax: input.property_tax,
                credit_eligible_expenses: input.credit_eligible_expenses,
                federal_withholding: args.federal_withholding,
                state_withholding: args.state_withholding,
                agi: result.agi,
                federal_liability: result.liability_for("federal").unwrap_or_default(),
                federal_refund_or_owed: result.refund_or_owed_for("federal").unwrap_or_default(),
                state_liability: result.liability_for("state").unwrap_or_default(),
                state_refund_or_owed: result.refund_or_owed_for("state").unwrap_or_default(),
            })
            .await?;
        tracing::info!(id = run.id, "saved tax run");
    }

    Ok(())
}

fn render_tax_result(result: &TaxResult) {
    println!("Adjusted gross income: {:>16}", format_currency(result.agi));
    println!(
        "Deductions applied:    {:>16}",
        format_currency(result.deductions)
    );

    for outcome in &result.outcomes {
        println!();
        println!("{}", outcome.authority);
        println!(
            "  Taxable income: {:>16}",
            format_currency(outcome.taxable_income)
        );
        println!(
            "  Liability:      {:>16}",
            format_currency(outcome.liability)
        );
        if outcome.refund_or_owed >= Decimal::ZERO {
            println!(
                "  Refund:         {:>16}",
                format_currency(outcome.refund_or_owed)
            );
        } else {
            println!(
                "  Amount owed:    {:>16}",
                format_currency(-outcome.refund_or_owed)
            );
        }
    }
}

async fn run_history(
    args: HistoryArgs,
    database: Option<&str>,
) -> Result<()> {
    let repo = open_repository(database).await?;

    match args.kind {
        HistoryKind::Projections => {
            let mut history: RunHistory<ProjectionRun> = RunHistory::new();
            let runs = repo
                .list_projection_runs(history.capacity() as u32)
                .await?;
            // The store lists newest first; record oldest first so the
            // newest ends up at the head.
            history.extend(runs.into_iter().rev());

            if history.is_empty() {
                println!("No saved projections yet.");
            }
            for run in history.iter() {
                println!("{}", projection_run_line(run));
            }
        }
        HistoryKind::Taxes => {
            let mut history: RunHistory<TaxRun> = RunHistory::new();
            let runs = repo.list_tax_runs(history.capacity() as u32).await?;
            history.extend(runs.into_iter().rev());

            if history.is_empty() {
                println!("No saved tax estimates yet.");
            }
            for run in history.iter() {
                println!("{}", tax_run_line(run));
            }
        }
    }

    Ok(())
}

fn projection_run_line(run: &ProjectionRun) -> String {
    format!(
        "#{:<4} {}  start {} + {}/period at {}%  {} periods ({} contributing)  final {}",
        run.id,
        run.created_at.format("%Y-%m-%d %H:%M"),
        format_currency(run.initial_balance),
        format_currency(run.periodic_contribution),
        run.periodic_rate * Decimal::ONE_HUNDRED,
        run.total_periods,
        run.contribution_periods,
        format_currency(run.final_balance),
    )
}

fn tax_run_line(run: &TaxRun) -> String {
    format!(
        "#{:<4} {}  wages {}  agi {}  federal {}  state {}",
        run.id,
        run.created_at.format("%Y-%m-%d %H:%M"),
        format_currency(run.wages),
        format_currency(run.agi),
        format_currency(run.federal_liability),
        format_currency(run.state_liability),
    )
}
