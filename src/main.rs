use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use vpn_auth_agent::agent::{AgentError, AuthMode, CredentialAgent};
use vpn_auth_agent::config::Config;
use vpn_auth_agent::management::ManagementClient;
use vpn_auth_agent::{dialog, keychain, prompt};

#[derive(Parser)]
#[command(name = "vpn-auth")]
#[command(about = "Credential agent for VPN connection profiles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: <config dir>/vpn-auth-agent/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Prompt with native dialogs instead of the terminal
    #[arg(long, global = true)]
    gui: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
    /// Obtain credentials for a profile (keychain or prompt)
    Auth { profile: String },
    /// Prompt for credentials and save them to the keychain
    Store { profile: String },
    /// Show whether the keychain holds a secret for a profile
    Status { profile: String },
    /// Remove a profile's secret from the keychain
    Forget { profile: String },
    /// Answer credential requests from OpenVPN's management interface
    ///
    /// Start OpenVPN with `--management <host> <port> --management-query-passwords`.
    Serve {
        profile: String,
        /// Management host (overrides the profile)
        #[arg(long)]
        host: Option<String>,
        /// Management port (overrides the profile)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for command output
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    if let Err(e) = run(&cli, &config_path).await {
        error!("{}", e);
        if cli.gui {
            dialog::show_message("VPN Authentication", &e.to_string(), true);
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: &Cli, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Commands::Init { force } => {
            if config_path.exists() && !force {
                return Err(format!(
                    "Config already exists at {} (use --force to overwrite)",
                    config_path.display()
                )
                .into());
            }
            Config::default().save(config_path)?;
            println!("Created default config: {}", config_path.display());
        }
        Commands::Auth { profile } => {
            let config = Config::load(config_path)?;
            let mut agent = load_agent(cli, &config, profile)?;
            agent.perform_authentication()?;
            match agent.auth_mode() {
                AuthMode::Password => println!(
                    "Credentials ready for '{}' (user: {})",
                    profile,
                    agent.username().unwrap_or_default()
                ),
                AuthMode::PrivateKey => println!("Passphrase ready for '{}'", profile),
            }
            agent.clear();
        }
        Commands::Store { profile } => {
            let config = Config::load(config_path)?;
            let agent = load_agent(cli, &config, profile)?;
            agent.prompt_and_store()?;
            println!("Saved {} secret for '{}' to keychain", agent.auth_mode(), profile);
        }
        Commands::Status { profile } => {
            let config = Config::load(config_path)?;
            let agent = load_agent(cli, &config, profile)?;
            let save = config
                .profile(profile)
                .map(|p| p.save_in_keychain)
                .unwrap_or(false);
            println!("Profile: {}", profile);
            println!("  Auth mode: {}", agent.auth_mode());
            println!("  Use keychain: {}", if save { "yes" } else { "no" });
            println!(
                "  Keychain secret: {}",
                if agent.keychain_has_passphrase() {
                    "stored"
                } else {
                    "none"
                }
            );
        }
        Commands::Forget { profile } => {
            let config = Config::load(config_path)?;
            let agent = load_agent(cli, &config, profile)?;
            agent.delete_passphrase_from_keychain()?;
            println!("Removed {} secret for '{}' from keychain", agent.auth_mode(), profile);
        }
        Commands::Serve {
            profile,
            host,
            port,
        } => {
            // Requests are answered from a blocking worker thread
            if cli.gui && dialog::requires_main_thread() {
                return Err(AgentError::ConfigurationError(
                    "--gui is not supported with serve on this platform, use terminal prompts"
                        .to_string(),
                )
                .into());
            }

            let config = Config::load(config_path)?;
            let agent = load_agent(cli, &config, profile)?;
            let management = config
                .profile(profile)
                .map(|p| p.management.clone())
                .unwrap_or_default();
            let host = host.clone().unwrap_or(management.host);
            let port = port.unwrap_or(management.port);

            let client = ManagementClient::connect(&host, port).await?;
            info!("Serving credential requests for '{}'", profile);
            tokio::select! {
                result = client.serve(agent) => result?,
                _ = tokio::signal::ctrl_c() => info!("Interrupted, stopping"),
            }
        }
    }

    Ok(())
}

fn load_agent(cli: &Cli, config: &Config, profile: &str) -> Result<CredentialAgent, AgentError> {
    CredentialAgent::new(
        profile,
        config,
        keychain::get_secret_store(),
        prompt::get_prompter(cli.gui),
    )
}
