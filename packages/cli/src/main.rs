use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

mod config;
mod server;

use config::Config;

#[derive(Parser)]
#[command(name = "planea")]
#[command(about = "Planea - didactic planning review service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Override the PORT environment variable
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create an administrator account
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

async fn create_admin(
    config: &Config,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    use planea_auth::{hash_password, Role};
    use planea_planning::{validator, DbState, UserCreateInput};

    let input = UserCreateInput {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: Role::Admin,
    };
    let errors = validator::validate_user_create(&input);
    if !errors.is_empty() {
        bail!("Invalid input: {}", errors[0].message);
    }

    let db = DbState::init_with_path(config.database_path.clone()).await?;

    let email = planea_core::normalize_email(email);
    if db.users.get_by_email(&email).await?.is_some() {
        bail!("A user with email '{}' already exists", email);
    }

    let password_hash = hash_password(password).context("Failed to hash password")?;
    let user = db
        .users
        .create(name.trim(), &email, &password_hash, Role::Admin)
        .await?;

    println!("Administrator account created: {} <{}>", user.name, user.email);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            server::run(config).await
        }
        Commands::CreateAdmin { name, email, password } => {
            create_admin(&config, &name, &email, &password).await
        }
    }
}
