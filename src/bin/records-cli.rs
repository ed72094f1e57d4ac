use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "records-cli")]
#[command(about = "Command-line client for the records service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:45000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a record with the given name
    Create { name: String },
    /// Fetch one record by id
    Get { id: String },
    /// List every record
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Create { name } => {
            client
                .post(format!("{}/records", base))
                .json(&json!({ "name": name }))
                .send()
                .await?
        }
        Commands::Get { id } => client.get(format!("{}/records/{}", base, id)).send().await?,
        Commands::List => client.get(format!("{}/records", base)).send().await?,
    };

    if !print_response(res).await? {
        std::process::exit(1);
    }
    Ok(())
}

/// Print status and body. Returns whether the status was 2xx.
async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: records API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        return Ok(false);
    }

    println!("Status: {}", status);
    if text.is_empty() {
        println!("(no content)");
    } else {
        match serde_json::from_str::<Value>(&text) {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("{}", text),
        }
    }
    Ok(true)
}
