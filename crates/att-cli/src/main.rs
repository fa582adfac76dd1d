use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use att_cli::commands::record::RecordSettings;
use att_cli::commands::util::{parse_calendar_date, request_date};
use att_cli::commands::vacation::VacationInput;
use att_cli::commands::{area, department, employee, init, record, resolve, roster, status, vacation};
use att_cli::{
    AreaAction, Cli, Commands, Config, DepartmentAction, EmployeeAction, RecordAction,
    VacationAction,
};
use att_core::{ResolveOptions, RosterRequest, Variant};
use att_db::{Database, NewEmployee};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn resolve_options(config: &Config, compact: bool) -> Result<ResolveOptions> {
    Ok(ResolveOptions {
        timezone: config.timezone()?,
        variant: if compact { Variant::Compact } else { Variant::Full },
    })
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Init) => {
            let (_db, config) = open_database(cli.config.as_deref())?;
            init::run(&mut stdout, &config.database_path)?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &config.database_path)?;
        }
        Some(Commands::Department(action)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match action {
                DepartmentAction::Add { name } => department::add(&mut stdout, &db, name)?,
                DepartmentAction::List { json } => department::list(&mut stdout, &db, *json)?,
            }
        }
        Some(Commands::Area(action)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                AreaAction::Add { name, points } => area::add(&mut stdout, &mut db, name, points)?,
                AreaAction::List { json } => area::list(&mut stdout, &db, *json)?,
            }
        }
        Some(Commands::Employee(action)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match action {
                EmployeeAction::Add {
                    handle,
                    full_name,
                    department,
                    position,
                    gender,
                    birth_date,
                    phone,
                    uuid,
                } => {
                    let new = NewEmployee {
                        uuid: uuid.clone(),
                        handle: handle.clone(),
                        full_name: full_name.clone(),
                        department_id: *department,
                        position: position.clone(),
                        gender: gender.map(Into::into),
                        birth_date: birth_date
                            .as_deref()
                            .map(parse_calendar_date)
                            .transpose()?,
                        phone: phone.clone(),
                        ..NewEmployee::default()
                    };
                    employee::add(&mut stdout, &db, &new)?;
                }
                EmployeeAction::List { json } => employee::list(&mut stdout, &db, *json)?,
                EmployeeAction::Deactivate { employee: reference } => {
                    employee::deactivate(&mut stdout, &db, reference)?;
                }
            }
        }
        Some(Commands::Record(action)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let settings = RecordSettings {
                timezone: config.timezone()?,
                late_after: config.late_after()?,
            };
            match action {
                RecordAction::Entry(args) => record::entry(&mut stdout, &db, args, &settings)?,
                RecordAction::Exit(args) => record::exit(&mut stdout, &db, args, &settings)?,
            }
        }
        Some(Commands::Vacation(action)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match action {
                VacationAction::Add {
                    employee,
                    start,
                    end,
                    kind,
                    file,
                } => {
                    let input = VacationInput {
                        employee,
                        start,
                        end,
                        kind: kind.as_deref(),
                        file: file.as_deref(),
                    };
                    vacation::add(&mut stdout, &db, &input)?;
                }
                VacationAction::List { employee, json } => {
                    vacation::list(&mut stdout, &db, employee, *json)?;
                }
                VacationAction::Cancel { id } => vacation::cancel(&mut stdout, &db, *id)?,
            }
        }
        Some(Commands::Resolve {
            employee,
            date,
            compact,
            json,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let options = resolve_options(&config, *compact)?;
            let date = request_date(date, options.timezone)?;
            resolve::run(&mut stdout, &db, employee, date, &options, *json)?;
        }
        Some(Commands::Roster {
            department,
            date,
            compact,
            json,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let options = resolve_options(&config, *compact)?;
            let request = RosterRequest {
                date: request_date(date, options.timezone)?,
                department: *department,
                options,
                failure_policy: config.roster_failures,
                workers: config.workers(),
            };
            roster::run(&mut stdout, &db, &request, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
