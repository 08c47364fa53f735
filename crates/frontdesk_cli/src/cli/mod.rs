use clap::{Args, Parser, Subcommand};
use frontdesk_core::{
    init_logging, require_admin, require_user, AuthGateway, AuthUser, FrontdeskConfig,
    InMemoryAuthGateway, SqliteRequestRepository,
};

mod export;
mod intake;
mod report;
mod show;

#[derive(Debug, Parser)]
#[command(name = "frontdesk", about = "Municipal front-desk intake and reporting", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    credentials: Credentials,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Register a new service request for today
    Intake(intake::IntakeArgs),
    /// Change one field of an existing request
    Edit(intake::EditArgs),
    /// List one day's requests, newest first
    Today(intake::TodayArgs),
    /// Show the admin dashboard for a day range
    Report(report::ReportArgs),
    /// Export the filtered set or its summary
    Export(export::ExportCommand),
    /// Show every field of one request, including the raw national ID
    Show(show::ShowArgs),
}

#[derive(Debug, Args)]
struct Credentials {
    /// Operator e-mail
    #[arg(long, global = true, env = "FRONTDESK_EMAIL")]
    email: Option<String>,

    /// Operator password
    #[arg(long, global = true, env = "FRONTDESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

/// Signed-in collaborators for one command.
pub(crate) struct Session {
    pub(crate) config: FrontdeskConfig,
    pub(crate) store: SqliteRequestRepository,
    auth: InMemoryAuthGateway,
}

impl Session {
    pub(crate) fn operator(&self) -> Result<AuthUser, String> {
        require_user(&self.auth).map_err(|error| error.to_string())
    }

    pub(crate) fn admin(&self) -> Result<AuthUser, String> {
        require_admin(&self.auth, &self.config.admin_email).map_err(|error| error.to_string())
    }
}

impl Cli {
    pub(crate) fn run(self) -> Result<(), String> {
        let session = open_session(&self.credentials)?;
        match self.command {
            Commands::Intake(args) => intake::run_intake(session, args),
            Commands::Edit(args) => intake::run_edit(session, args),
            Commands::Today(args) => intake::run_today(session, args),
            Commands::Report(args) => report::run(session, args),
            Commands::Export(command) => export::run(session, command),
            Commands::Show(args) => show::run(session, args),
        }
    }
}

fn open_session(credentials: &Credentials) -> Result<Session, String> {
    let config =
        FrontdeskConfig::from_env().map_err(|error| format!("invalid configuration: {error}"))?;
    init_logging(&config.log_level, config.log_dir.as_deref())
        .map_err(|error| format!("failed to initialize logging: {error}"))?;

    for key in config.missing_keys() {
        log::warn!("event=config_load module=cli status=degraded missing={key}");
    }

    let mut auth = config.auth_gateway();
    if let (Some(email), Some(password)) = (&credentials.email, &credentials.password) {
        auth.login(email, password)
            .map_err(|error| format!("failed to sign in: {error}"))?;
    }

    let store = config.open_store();
    Ok(Session {
        config,
        store,
        auth,
    })
}
