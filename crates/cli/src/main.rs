use clap::{Parser, Subcommand};
use mutu_core::config::password_iterations_from_env_value;
use mutu_core::constants::DEFAULT_SESSION_COOKIE;
use mutu_core::records::unit::NewUnit;
use mutu_core::records::user::NewUser;
use mutu_core::{chronology, Actor, CoreConfig, Role, Scope, Services, StoreBackend};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mutu")]
#[command(about = "Mutu hospital quality records CLI")]
struct Cli {
    /// Directory holding the record files
    #[arg(long, env = "MUTU_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user account (use this to bootstrap the first Admin)
    CreateUser {
        name: String,
        email: String,
        /// At least 8 characters
        password: String,
        /// Role name as shown in the UI, e.g. "Admin" or "PJ Ruangan"
        #[arg(long, default_value = "Admin")]
        role: String,
        /// Required for unit-level roles
        #[arg(long)]
        unit: Option<String>,
    },
    /// List user accounts
    ListUsers,
    /// Create a hospital unit
    CreateUnit { name: String },
    /// List hospital units
    ListUnits,
    /// Print the system log, newest first
    Logs {
        /// Show at most this many entries
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Normalise an incident chronology and print it
    FormatChronology { text: String },
}

fn open_services(data_dir: Option<PathBuf>) -> anyhow::Result<Services> {
    let Some(dir) = data_dir else {
        anyhow::bail!("no data directory given; pass --data-dir or set MUTU_DATA_DIR");
    };
    let iterations =
        password_iterations_from_env_value(std::env::var("MUTU_PASSWORD_ITERATIONS").ok())?;
    let cfg = CoreConfig::new(StoreBackend::Files(dir), iterations, DEFAULT_SESSION_COOKIE)?;
    Ok(Services::open(&cfg)?)
}

fn run(cli: Cli) -> anyhow::Result<Vec<String>> {
    let command = match cli.command {
        Some(command) => command,
        None => return Ok(vec!["Use 'mutu --help' for commands".into()]),
    };

    if let Commands::FormatChronology { text } = &command {
        return Ok(vec![chronology::format(text)]);
    }

    let services = open_services(cli.data_dir)?;
    let actor = Actor::system();

    let lines = match command {
        Commands::CreateUser {
            name,
            email,
            password,
            role,
            unit,
        } => {
            let user = services.users.create(
                &actor,
                NewUser {
                    name,
                    email,
                    password,
                    role: role.parse::<Role>()?,
                    unit,
                },
            )?;
            vec![format!("Created user {} <{}> with id {}", user.name, user.email, user.id)]
        }
        Commands::ListUsers => {
            let users = services.users.list(&Scope::All)?;
            if users.is_empty() {
                vec!["No users found.".into()]
            } else {
                users
                    .into_iter()
                    .map(|u| {
                        let unit = u.unit.map(|unit| unit.to_string()).unwrap_or_default();
                        format!("{}  {}  <{}>  {}  {}", u.id, u.name, u.email, u.role, unit)
                    })
                    .collect()
            }
        }
        Commands::CreateUnit { name } => {
            let unit = services.units.create(&actor, NewUnit { name })?;
            vec![format!("Created unit {} with id {}", unit.name, unit.id)]
        }
        Commands::ListUnits => {
            let units = services.units.find_all(&Scope::All)?;
            if units.is_empty() {
                vec!["No units found.".into()]
            } else {
                units
                    .into_iter()
                    .map(|u| format!("{}  {}", u.id, u.name))
                    .collect()
            }
        }
        Commands::Logs { limit } => services
            .logs
            .list()?
            .into_iter()
            .take(limit)
            .map(|log| {
                format!(
                    "{}  {:<6}  {}  {}",
                    log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    log.action,
                    log.user,
                    log.details
                )
            })
            .collect(),
        Commands::FormatChronology { .. } => Vec::new(),
    };

    Ok(lines)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mutu_core=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    for line in run(Cli::parse())? {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> anyhow::Result<Vec<String>> {
        run(Cli::try_parse_from(args)?)
    }

    #[test]
    fn formats_chronology_without_a_data_dir() {
        let lines = run_args(&["mutu", "format-chronology", "first step\nsecond step"]).unwrap();
        assert_eq!(lines, vec!["First step.\nSecond step.".to_string()]);
    }

    #[test]
    fn store_commands_need_a_data_dir() {
        let err = run(Cli {
            data_dir: None,
            command: Some(Commands::ListUnits),
        })
        .unwrap_err();
        assert!(err.to_string().contains("MUTU_DATA_DIR"));
    }

    #[test]
    fn created_units_and_users_persist_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        run_args(&["mutu", "--data-dir", data_dir, "create-unit", "RANAP"]).unwrap();
        run_args(&[
            "mutu",
            "--data-dir",
            data_dir,
            "create-user",
            "Rina",
            "rina@rs.example",
            "kata-sandi-1",
            "--role",
            "PJ Ruangan",
            "--unit",
            "RANAP",
        ])
        .unwrap();

        let units = run_args(&["mutu", "--data-dir", data_dir, "list-units"]).unwrap();
        assert_eq!(units.len(), 1);
        assert!(units[0].ends_with("RANAP"));

        let users = run_args(&["mutu", "--data-dir", data_dir, "list-users"]).unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].contains("rina@rs.example"));
        assert!(users[0].contains("PJ Ruangan"));

        let logs = run_args(&["mutu", "--data-dir", data_dir, "logs", "--limit", "1"]).unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].contains("CREATE"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_args(&[
            "mutu",
            "--data-dir",
            dir.path().to_str().unwrap(),
            "create-user",
            "X",
            "x@rs.example",
            "kata-sandi-1",
            "--role",
            "Perawat",
        ]);
        assert!(result.is_err());
    }
}
