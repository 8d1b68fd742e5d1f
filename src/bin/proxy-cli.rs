use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Probe and exercise a running secure-api-proxy", long_about = None)]
struct Cli {
    #[arg(short, long, env = "PROXY_URL", default_value = "http://localhost:3000")]
    url: String,

    #[arg(short, long, env = "BEARER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "HEALTH_PATH", default_value = "/proxy/health")]
    health_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the proxy's health endpoint (no token needed)
    Health,
    /// Send an authenticated request through the proxy
    Call {
        /// HTTP method, e.g. GET or POST
        method: String,
        /// Path and optional query, e.g. /v1/models?limit=5
        path: String,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}{}", base, cli.health_path)).send().await?;
            print_response(res).await?;
        }
        Commands::Call { method, path, data } => {
            let token = cli
                .token
                .ok_or("a bearer token is required (--token or BEARER_TOKEN)")?;
            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );

            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let mut req = client
                .request(method, format!("{}{}", base, path))
                .headers(headers);
            if let Some(data) = data {
                let body: Value = serde_json::from_str(&data)?;
                req = req.json(&body);
            }
            print_response(req.send().await?).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if status.is_success() {
        println!("{}", status);
    } else {
        eprintln!("Error: proxy returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
