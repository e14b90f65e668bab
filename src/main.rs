use anyhow::{Context, Result};
use clap::{ArgGroup, Args as ClapArgs, Parser, Subcommand, ValueEnum};
use idmctl::client::IdmClient;
use idmctl::commands;
use idmctl::config::{Config, HOST_ENV, TOKEN_ENV};
use idmctl::entitlement::{self, EntitlementTarget, SubjectType};
use idmctl::output::{Console, Report};
use idmctl::scim::{BasicUser, ResourceType};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for SCIM-style identity directories
#[derive(Parser, Debug)]
#[command(name = "idmctl", version = idmctl::VERSION, about, long_about = None)]
struct Args {
    /// Base URL of the directory API
    #[arg(long, global = true)]
    host: Option<String>,

    /// Bearer token for API calls
    #[arg(long, global = true)]
    token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Manage groups
    #[command(subcommand)]
    Group(NamedCommand),
    /// Manage roles
    #[command(subcommand)]
    Role(NamedCommand),
    /// Entitle a user and/or group to a catalog application
    #[command(group(
        ArgGroup::new("subject")
            .required(true)
            .multiple(true)
            .args(["user", "group"])
    ))]
    Entitle {
        /// Catalog item id of the application
        catalog_item_id: String,
        /// Application name used in messages
        #[arg(long, default_value = "")]
        app_name: String,
        /// User name to entitle
        #[arg(long)]
        user: Option<String>,
        /// Group display name to entitle
        #[arg(long)]
        group: Option<String>,
    },
    /// Inspect entitlements
    #[command(subcommand)]
    Entitlement(EntitlementCommand),
    /// Show or change the saved configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(ClapArgs, Debug)]
struct UserFields {
    /// Given name
    #[arg(long, default_value = "")]
    given: String,
    /// Family name
    #[arg(long, default_value = "")]
    family: String,
    /// Email address
    #[arg(long, default_value = "")]
    email: String,
}

#[derive(ClapArgs, Debug)]
struct ListArgs {
    /// Maximum number of resources (0 = server default)
    #[arg(long, default_value_t = 0)]
    count: usize,
    /// SCIM filter expression
    #[arg(long, default_value = "")]
    filter: String,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user
    Add {
        name: String,
        #[command(flatten)]
        fields: UserFields,
        /// Initial password
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Create users listed in a YAML file
    Load { file: PathBuf },
    /// Update name parts and email of a user
    Update {
        name: String,
        #[command(flatten)]
        fields: UserFields,
    },
    /// Set a user's password
    Password { name: String, password: String },
    /// Show a user
    Get { name: String },
    /// Delete a user
    Delete { name: String },
    /// List users
    List(ListArgs),
}

#[derive(Subcommand, Debug)]
enum NamedCommand {
    /// Show a resource by display name
    Get { name: String },
    /// Delete a resource by display name
    Delete { name: String },
    /// List resources
    List(ListArgs),
    /// Add a user as member, or remove with --remove
    Member {
        name: String,
        user: String,
        #[arg(long)]
        remove: bool,
    },
}

#[derive(Subcommand, Debug)]
enum EntitlementCommand {
    /// Show entitlements of a user, group or app (catalog item id)
    Get {
        #[arg(value_enum)]
        target: EntitlementTarget,
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Save the directory base URL
    SetHost { url: String },
    /// Save the access token
    SetToken { token: String },
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Could not open log file {}: {}", log_path.display(), e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("idmctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("idmctl").join("idmctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".idmctl").join("idmctl.log");
    }
    PathBuf::from("idmctl.log")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();

    if let Command::Config(cmd) = &args.command {
        return run_config(cmd, &mut config, &args);
    }

    let host = config.effective_host(args.host.as_deref()).with_context(|| {
        format!(
            "No directory URL configured. Set {} or use --host (or 'idmctl config set-host')",
            HOST_ENV
        )
    })?;
    let token = config.effective_token(args.token.as_deref()).with_context(|| {
        format!(
            "No access token configured. Set {} or use --token (or 'idmctl config set-token')",
            TOKEN_ENV
        )
    })?;

    tracing::info!("Using directory: {}", host);
    let client = IdmClient::new(&host, &token)?;
    let mut console = Console;

    run(&client, &mut console, args.command).await;
    Ok(())
}

fn run_config(cmd: &ConfigCommand, config: &mut Config, args: &Args) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let host = config.effective_host(args.host.as_deref());
            let token = config.effective_token(args.token.as_deref());
            println!("host:  {}", host.as_deref().unwrap_or("-"));
            println!("token: {}", if token.is_some() { "[set]" } else { "-" });
        }
        ConfigCommand::SetHost { url } => {
            url::Url::parse(url).with_context(|| format!("Invalid directory URL: {}", url))?;
            config.set_host(url)?;
            println!("Saved host {}", url);
        }
        ConfigCommand::SetToken { token } => {
            config.set_token(token)?;
            println!("Saved access token");
        }
    }
    Ok(())
}

async fn run(client: &IdmClient, report: &mut dyn Report, command: Command) {
    match command {
        Command::User(cmd) => run_user(client, report, cmd).await,
        Command::Group(cmd) => run_named(client, report, ResourceType::Group, cmd).await,
        Command::Role(cmd) => run_named(client, report, ResourceType::Role, cmd).await,
        Command::Entitle {
            catalog_item_id,
            app_name,
            user,
            group,
        } => {
            let app_name = if app_name.is_empty() {
                catalog_item_id.clone()
            } else {
                app_name
            };
            entitlement::maybe_entitle(
                client,
                report,
                &catalog_item_id,
                user.as_deref().unwrap_or_default(),
                SubjectType::User,
                &app_name,
            )
            .await;
            entitlement::maybe_entitle(
                client,
                report,
                &catalog_item_id,
                group.as_deref().unwrap_or_default(),
                SubjectType::Group,
                &app_name,
            )
            .await;
        }
        Command::Entitlement(EntitlementCommand::Get { target, name }) => {
            entitlement::get_entitlement(client, report, target, &name).await
        }
        // handled before the client is built
        Command::Config(_) => {}
    }
}

async fn run_user(client: &IdmClient, report: &mut dyn Report, cmd: UserCommand) {
    match cmd {
        UserCommand::Add {
            name,
            fields,
            password,
        } => {
            let user = BasicUser {
                name,
                given: fields.given,
                family: fields.family,
                email: fields.email,
                pwd: password,
            };
            commands::cmd_add_user(client, report, &user).await
        }
        UserCommand::Load { file } => {
            commands::cmd_load_users(client, report, &file).await;
        }
        UserCommand::Update { name, fields } => {
            let user = BasicUser {
                name,
                given: fields.given,
                family: fields.family,
                email: fields.email,
                pwd: String::new(),
            };
            commands::cmd_update_user(client, report, &user).await
        }
        UserCommand::Password { name, password } => {
            commands::cmd_set_password(client, report, &name, &password).await
        }
        UserCommand::Get { name } => {
            commands::cmd_get(client, report, ResourceType::User, &name).await
        }
        UserCommand::Delete { name } => {
            commands::cmd_delete(client, report, ResourceType::User, &name).await
        }
        UserCommand::List(list) => {
            commands::cmd_list(client, report, ResourceType::User, list.count, &list.filter).await
        }
    }
}

async fn run_named(
    client: &IdmClient,
    report: &mut dyn Report,
    resource_type: ResourceType,
    cmd: NamedCommand,
) {
    match cmd {
        NamedCommand::Get { name } => commands::cmd_get(client, report, resource_type, &name).await,
        NamedCommand::Delete { name } => {
            commands::cmd_delete(client, report, resource_type, &name).await
        }
        NamedCommand::List(list) => {
            commands::cmd_list(client, report, resource_type, list.count, &list.filter).await
        }
        NamedCommand::Member { name, user, remove } => {
            commands::cmd_member(client, report, resource_type, &name, &user, remove).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entitle_requires_user_or_group() {
        let err = Args::try_parse_from(["idmctl", "entitle", "cat-1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_entitle_accepts_group_alone() {
        let args =
            Args::try_parse_from(["idmctl", "entitle", "cat-1", "--group", "Engineers"]).unwrap();
        match args.command {
            Command::Entitle { user, group, .. } => {
                assert_eq!(user, None);
                assert_eq!(group.as_deref(), Some("Engineers"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_entitle_accepts_user_and_group() {
        let args = Args::try_parse_from([
            "idmctl", "entitle", "cat-1", "--user", "alice", "--group", "Engineers",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Entitle { user: Some(_), group: Some(_), .. }
        ));
    }
}
