use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the SmartEvent gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "GATEWAY_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the gateway is up
    Health,
    /// Run a payment verification
    Verify {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        transaction_id: Option<String>,
    },
    /// GET an upstream path through the proxy
    Get {
        path: String,
        /// Authorization header to forward
        #[arg(long)]
        auth: Option<String>,
    },
    /// POST a JSON body to an upstream path through the proxy
    Post {
        path: String,
        #[arg(long, default_value = "{}")]
        json: String,
        /// Authorization header to forward
        #[arg(long)]
        auth: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Verify {
            order_id,
            transaction_id,
        } => {
            let res = client
                .post(format!("{}/api/payment/verify", base))
                .json(&json!({
                    "order_id": order_id,
                    "transaction_id": transaction_id,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Get { path, auth } => {
            let res = client
                .get(proxy_url(base, &path))
                .headers(auth_headers(auth.as_deref())?)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Post { path, json, auth } => {
            let body: Value = serde_json::from_str(&json)?;
            let res = client
                .post(proxy_url(base, &path))
                .headers(auth_headers(auth.as_deref())?)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn proxy_url(base: &str, path: &str) -> String {
    format!("{}/api/proxy/{}", base, path.trim_start_matches('/'))
}

fn auth_headers(auth: Option<&str>) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    if let Some(value) = auth {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value)?);
    }
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
