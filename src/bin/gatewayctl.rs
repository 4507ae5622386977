use clap::{Parser, Subcommand};
use serde_json::Value;

use newsroom_gateway::config::{load_config, resolve_backend_url, GatewayConfig, RuntimeEnv};

#[derive(Parser)]
#[command(name = "gatewayctl")]
#[command(about = "Operator CLI for the newsroom gateway", long_about = None)]
struct Cli {
    /// Gateway base URL.
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Gateway config file, used by `backend-url`.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the backend origin this environment resolves to
    BackendUrl,
    /// Check gateway liveness
    Health,
    /// List the aggregated category groups
    Categories,
    /// Show one category group (leaf slugs resolve to their group)
    Group { slug: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = cli.url.trim_end_matches('/');
    let client = reqwest::Client::new();

    match cli.command {
        Commands::BackendUrl => {
            let config = match &cli.config {
                Some(path) => load_config(path)?,
                None => GatewayConfig::default(),
            };
            let env = RuntimeEnv::from_process();
            println!("{}", resolve_backend_url(&env, &config.backend));
            println!("production: {}", env.is_production());
        }
        Commands::Health => {
            let res = client.get(format!("{base}/healthz")).send().await?;
            print_response(res).await?;
        }
        Commands::Categories => {
            let res = client.get(format!("{base}/api/client/categories")).send().await?;
            print_response(res).await?;
        }
        Commands::Group { slug } => {
            let res = client
                .get(format!("{base}/api/client/categories/{slug}"))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
