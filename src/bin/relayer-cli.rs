use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relayer-cli")]
#[command(about = "Operator CLI for the ghost relayer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    /// Operator token for protected routes
    #[arg(short, long, env = "RELAYER_ADMIN_TOKEN")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relayer health and balance
    Health,
    /// Published fee schedule
    Fees,
    /// Paymaster pool state
    Paymaster,
    /// Top up the paymaster pool (amount in wei)
    Fund { amount: String },
    /// Status of an on-chain transaction
    Status { tx_hash: String },
    /// Private balance of a shielded wallet
    Balance { wallet_id: String },
    /// Pipeline state of a withdrawal
    Withdrawal { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))?,
        );
    }

    let res = match cli.command {
        Commands::Health => client.get(format!("{base}/api/health")).send().await?,
        Commands::Fees => client.get(format!("{base}/api/fees")).send().await?,
        Commands::Paymaster => client.get(format!("{base}/api/paymaster")).send().await?,
        Commands::Fund { amount } => {
            client
                .post(format!("{base}/api/paymaster/fund"))
                .headers(headers)
                .json(&json!({ "amount": amount }))
                .send()
                .await?
        }
        Commands::Status { tx_hash } => {
            client
                .get(format!("{base}/api/status/{tx_hash}"))
                .send()
                .await?
        }
        Commands::Balance { wallet_id } => {
            client
                .get(format!("{base}/api/status/balance/{wallet_id}"))
                .send()
                .await?
        }
        Commands::Withdrawal { id } => {
            client
                .get(format!("{base}/api/unshield/{id}"))
                .send()
                .await?
        }
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: relayer returned status {status}");
        eprintln!("Response: {text}");
        std::process::exit(1);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}
