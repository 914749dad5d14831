//! ticketgate Helpdesk Reference Demo CLI
//!
//! Runs the helpdesk access scenarios, checks route and seed files, and
//! drives a JSON-file-backed desk from the command line.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- analyst-status
//!   cargo run -p demo -- direct-owner
//!   cargo run -p demo -- group-visibility
//!   cargo run -p demo -- check-policy --policy routes.toml --seed seed.toml
//!   cargo run -p demo -- bootstrap --store helpdesk.json
//!   cargo run -p demo -- tickets --store helpdesk.json --as manager1@example.com

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ticketgate_contracts::{
    error::{GateError, GateResult},
    request::RequestContext,
};
use ticketgate_core::{directory::Directory, traits::Store, Desk};
use ticketgate_policy::{Seed, TomlRoutePolicy};
use ticketgate_ref_helpdesk::{
    fixtures,
    scenarios::{analyst_status, direct_owner, group_visibility},
};
use ticketgate_store::JsonFileStore;

// ── CLI definition ────────────────────────────────────────────────────────────

/// ticketgate: role-based access control for a support-ticket desk.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "ticketgate helpdesk reference demo",
    long_about = "Runs ticketgate helpdesk scenarios showing permission-gated actions,\n\
                  ownership-gated ticket access, and group-scoped ticket listing."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three helpdesk scenarios in sequence.
    RunAll,
    /// Scenario 1: Analyst may change status but not edit.
    AnalystStatus,
    /// Scenario 2: Roleless direct owner may view but not delete.
    DirectOwner,
    /// Scenario 3: Group members see group tickets, outsiders do not.
    GroupVisibility,
    /// Load a route table and seed, and check them against each other.
    CheckPolicy {
        /// Route table TOML. Defaults to the built-in table.
        #[arg(long)]
        policy: Option<PathBuf>,
        /// Seed TOML. Defaults to the built-in seed.
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Seed a JSON directory file and load the demo accounts into it.
    Bootstrap {
        #[arg(long)]
        store: PathBuf,
    },
    /// Print, as JSON, the tickets visible to one account in a JSON directory.
    Tickets {
        #[arg(long)]
        store: PathBuf,
        /// Email of the account to act as.
        #[arg(long = "as")]
        email: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => {
            print_banner();
            run_all()
        }
        Command::AnalystStatus => {
            print_banner();
            analyst_status::run_scenario()
        }
        Command::DirectOwner => {
            print_banner();
            direct_owner::run_scenario()
        }
        Command::GroupVisibility => {
            print_banner();
            group_visibility::run_scenario()
        }
        Command::CheckPolicy { policy, seed } => check_policy(policy.as_deref(), seed.as_deref()),
        Command::Bootstrap { store } => bootstrap(&store),
        Command::Tickets { store, email } => tickets(&store, &email),
    };

    match result {
        Ok(()) => {}
        Err(GateError::ValidationFailed(errors)) => {
            eprintln!("Demo error: validation failed");
            for (field, messages) in errors.fields() {
                for message in messages {
                    eprintln!("  {field}: {message}");
                }
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_all() -> GateResult<()> {
    analyst_status::run_scenario()?;
    direct_owner::run_scenario()?;
    group_visibility::run_scenario()?;
    println!("All selected scenarios completed successfully.");
    Ok(())
}

// ── Configuration and store commands ─────────────────────────────────────────

fn load_routes(path: Option<&Path>) -> GateResult<TomlRoutePolicy> {
    match path {
        Some(p) => TomlRoutePolicy::from_file(p),
        None => TomlRoutePolicy::default_policy(),
    }
}

fn load_seed(path: Option<&Path>) -> GateResult<Seed> {
    match path {
        Some(p) => Seed::from_file(p),
        None => Seed::default_seed(),
    }
}

/// Apply the seed to an empty directory and validate the routes against it.
fn check_policy(policy: Option<&Path>, seed: Option<&Path>) -> GateResult<()> {
    let routes = load_routes(policy)?;
    let seed = load_seed(seed)?;

    let mut dir = Directory::new();
    let report = seed.apply(&mut dir)?;
    routes.validate_against(&dir)?;

    println!("superuser role: {}", routes.config().superuser_role);
    for (action, permission) in routes.routes() {
        println!("  {:<22} requires {}", action.as_str(), permission);
    }
    println!(
        "seed: {} permission(s), {} status(es), {} role(s)",
        report.permissions_created, report.statuses_created, report.roles_created
    );
    println!("route table and seed are consistent.");
    Ok(())
}

fn bootstrap(path: &Path) -> GateResult<()> {
    let store = JsonFileStore::open(path)?;
    let seed = Seed::default_seed()?;
    let routes = TomlRoutePolicy::default_policy()?;

    let (seeded, loaded) = store.write(|dir| {
        let seeded = seed.apply(dir)?;
        let loaded = fixtures::apply(dir)?;
        routes.validate_against(dir)?;
        Ok((seeded, loaded))
    })?;

    info!(path = %store.path().display(), "directory bootstrapped");
    println!("{}", to_json(&serde_json::json!({ "seed": seeded, "fixtures": loaded }))?);
    Ok(())
}

fn tickets(path: &Path, email: &str) -> GateResult<()> {
    let desk = Desk::new(JsonFileStore::open(path)?, Box::new(TomlRoutePolicy::default_policy()?));
    let principal = desk
        .store()
        .read(|dir| dir.principal_by_email(email).map(|p| p.id))?
        .ok_or_else(|| GateError::not_found("user", email))?;

    let visible = desk.list_tickets(&RequestContext::authenticated(principal))?;
    println!("{}", to_json(&visible)?);
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> GateResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| GateError::Storage {
        reason: format!("failed to render JSON: {}", e),
    })
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("ticketgate: Support Desk Access Control");
    println!("Helpdesk Reference Demo");
    println!("=======================================");
    println!();
    println!("Guard order per desk call:");
    println!("  [1] Resolve the principal (anonymous or inactive → authentication required)");
    println!("  [2] Tier gate: route permission, staff flag, or none");
    println!("  [3] Look up the target instance");
    println!("  [4] Ownership check for ticket detail and comments");
    println!("  [5] Validate fields, then commit on a staged copy");
    println!();
}
