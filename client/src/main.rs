use clap::{Parser, Subcommand};
use profile_auth_client::{forms, ApiClient, ClientError, SessionStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "profile-auth", version, about = "Sign up, log in and manage a profile image")]
struct Cli {
    /// Base URL of the API, e.g. https://abc123.execute-api.us-east-1.amazonaws.com/prod
    #[arg(long, env = "PROFILE_AUTH_API_URL")]
    api_url: Option<String>,

    /// Where the login session is kept
    #[arg(long, env = "PROFILE_AUTH_SESSION")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and upload a profile image
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        /// Profile image (png, jpg, gif, webp, bmp or svg, at most 5MB)
        #[arg(long)]
        image: PathBuf,
    },
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the logged-in user
    Profile,
    /// Replace the profile image
    UpdateImage {
        #[arg(long)]
        image: PathBuf,
    },
    /// Forget the stored session
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    let store = SessionStore::new(cli.session_file.unwrap_or_else(SessionStore::default_path));
    let api = || -> Result<ApiClient, ClientError> {
        let url = cli
            .api_url
            .as_deref()
            .ok_or_else(|| ClientError::InvalidUrl("set --api-url or PROFILE_AUTH_API_URL".into()))?;
        ApiClient::new(url)
    };

    match cli.command {
        Command::Signup {
            email,
            name,
            password,
            confirm_password,
            image,
        } => {
            let form = forms::SignupForm {
                email,
                name,
                password,
                confirm_password,
                image,
            };
            forms::signup(&api()?, &form).await?;
            println!("Upload successful! You can now log in.");
        }
        Command::Login { email, password } => {
            let session = forms::login(&api()?, &store, &email, &password).await?;
            println!("Logged in as {}", email);
            println!("Profile image: {}", session.profile_image_url);
        }
        Command::Profile => {
            let session = store.require().await?;
            let token = session.token()?;
            println!("Email: {}", token.email);
            println!("Logged in at: {}", token.issued_at);
            println!("Profile image: {}", session.profile_image_url);
        }
        Command::UpdateImage { image } => {
            let session = forms::update_image(&api()?, &store, &image).await?;
            println!("Image uploaded successfully!");
            println!("Profile image: {}", session.profile_image_url);
        }
        Command::Logout => {
            store.clear().await?;
            println!("Logged out.");
        }
    }

    Ok(())
}
