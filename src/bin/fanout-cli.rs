use clap::Parser;
use fanout_service::ServiceResponse;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

#[derive(Parser)]
#[command(name = "fanout-cli")]
#[command(about = "Call a fan-out service node and print its call tree", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9080")]
    url: String,

    /// Comma-separated backends to call instead of the node's own list
    #[arg(short, long)]
    backends: Option<String>,

    /// Delay the node should inject before fanning out (e.g. 250ms, 1.5s)
    #[arg(short, long)]
    latency: Option<String>,

    /// Extra request header as key=value; repeatable
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Print the raw JSON instead of an outline
    #[arg(long)]
    json: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut headers = HeaderMap::new();
    for (key, value) in &cli.headers {
        headers.append(HeaderName::try_from(key.as_str())?, HeaderValue::from_str(value)?);
    }
    if let Some(backends) = &cli.backends {
        headers.insert("backends", HeaderValue::from_str(backends)?);
    }
    if let Some(latency) = &cli.latency {
        headers.insert("latency", HeaderValue::from_str(latency)?);
    }

    let client = reqwest::Client::new();
    let res = client.get(&cli.url).headers(headers).send().await?;

    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: node returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let tree: ServiceResponse = res.json().await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print_tree(&tree, 0);
    }
    Ok(())
}

fn print_tree(node: &ServiceResponse, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{} ({}ms) {}", indent, node.name, node.time_ms, node.message);
    if node.has_error() {
        println!("{}  error: {}", indent, node.error);
    }
    for child in &node.backend_responses {
        print_tree(child, depth + 1);
    }
}
