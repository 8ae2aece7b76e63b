use clap::{Parser, Subcommand};
use famdir::{
    config, db, maintenance, repositories::SqliteUserRepository, services::UserService,
};
use std::{process::ExitCode, sync::Arc};

#[derive(Parser)]
#[command(name = "famdir-maint")]
#[command(about = "One-shot maintenance commands for the family directory store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every user's id, email, name and admin flag as JSON
    ListUsers,

    /// Print all stored fields for one user
    ShowUser {
        #[arg(short, long, env = "FAMDIR_EMAIL")]
        email: String,
    },

    /// Set a user's profile photo URL
    UpdatePhoto {
        #[arg(short, long, env = "FAMDIR_EMAIL")]
        email: String,

        #[arg(short, long, env = "FAMDIR_PHOTO_URL")]
        url: String,
    },

    /// Grant (or with --revoke, remove) admin access
    SetAdmin {
        #[arg(short, long, env = "FAMDIR_EMAIL")]
        email: String,

        #[arg(long)]
        revoke: bool,
    },

    /// Create a login account
    CreateUser {
        #[arg(short, long, env = "FAMDIR_EMAIL")]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long, env = "FAMDIR_PASSWORD")]
        password: Option<String>,

        #[arg(long)]
        admin: bool,
    },
}

fn prompt_password() -> anyhow::Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("passwords do not match");
    }
    Ok(password)
}

async fn run(command: Command, service: &UserService) -> anyhow::Result<()> {
    let mut out = std::io::stdout();

    match command {
        Command::ListUsers => {
            let count = maintenance::list_users(service, &mut out).await?;
            tracing::info!(count, "listed users");
        }
        Command::ShowUser { email } => {
            if !maintenance::show_user(service, &email, &mut out).await? {
                anyhow::bail!("user {email} not found");
            }
        }
        Command::UpdatePhoto { email, url } => {
            maintenance::update_photo(service, &email, &url, &mut out).await?;
        }
        Command::SetAdmin { email, revoke } => {
            maintenance::set_admin(service, &email, !revoke, &mut out).await?;
        }
        Command::CreateUser {
            email,
            password,
            admin,
        } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };
            maintenance::create_user(service, &email, password, admin, &mut out).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "famdir=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let database_url = match config::database_url() {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = db::with_store(&database_url, |pool| async move {
        let service = UserService::new(Arc::new(SqliteUserRepository::new(pool)));
        run(cli.command, &service).await
    })
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
