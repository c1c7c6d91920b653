//! Fillwatch CLI
//!
//! Command-line interface for Fillwatch operations:
//! - Log fill-level readings
//! - Show a bin's history over a lookback window
//! - Manage locations and bins
//! - Check status

use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fillwatch-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fill-level event history for waste receptacles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8082", global = true)]
    pub api_url: String,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log a fill-level reading
    Log {
        /// Bin id
        bin: i64,
        /// Fill level as reported by the sensor
        fill_level: f64,
        /// Sensor status flag
        #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
        status: bool,
    },

    /// Show trend and frequency for a bin
    History {
        /// Bin id
        bin: i64,
        /// Lookback window (one_week, three_weeks, one_month .. six_months)
        #[arg(short, long, default_value = "one_week")]
        window: String,
    },

    /// List all locations
    Locations,

    /// Create a location
    AddLocation {
        /// Location name
        name: String,
        /// Free-form details
        #[arg(short, long, default_value = "")]
        details: String,
    },

    /// List bins
    Bins {
        /// Only bins at this location
        #[arg(short, long)]
        location: Option<i64>,
    },

    /// Create a bin at a location
    AddBin {
        /// Location id
        location: i64,
        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show system status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Log {
            bin,
            fill_level,
            status,
        } => {
            let body = serde_json::json!({
                "bin_id": bin,
                "fill_level": fill_level,
                "status": status,
            });

            let response = client
                .post(format!("{}/api/v1/events", cli.api_url))
                .json(&body)
                .send()
                .await?;

            let data: Value = ensure_success(response).await.json().await?;
            println!(
                "Logged bin {}: {} at {}",
                bin,
                fill_level,
                data["timestamp"].as_str().unwrap_or("unknown")
            );
        }

        Commands::History { bin, window } => {
            let response = client
                .get(format!(
                    "{}/api/v1/bins/{}/history/{}",
                    cli.api_url, bin, window
                ))
                .send()
                .await?;

            let response = ensure_success(response).await;

            let data: Value = response.json().await?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&data)?),
                "csv" => print_history_csv(&data),
                _ => print_history_table(&data),
            }
        }

        Commands::Locations => {
            let response = client
                .get(format!("{}/api/v1/locations", cli.api_url))
                .send()
                .await?;

            let response = ensure_success(response).await;

            let locations: Vec<Value> = response.json().await?;

            if locations.is_empty() && cli.format == "table" {
                println!("No locations defined yet.");
                println!();
                println!("Create your first location with:");
                println!("  fillwatch-cli add-location \"Main Plaza\"");
            } else {
                print_rows(&cli.format, &["id", "name", "details"], &locations);
            }
        }

        Commands::AddLocation { name, details } => {
            let body = serde_json::json!({ "name": name, "details": details });

            let response = client
                .post(format!("{}/api/v1/locations", cli.api_url))
                .json(&body)
                .send()
                .await?;

            let response = ensure_success(response).await;

            let location: Value = response.json().await?;
            println!(
                "Created location {} ({})",
                location["id"].as_i64().unwrap_or(0),
                location["name"].as_str().unwrap_or("-")
            );
        }

        Commands::Bins { location } => {
            let mut url = format!("{}/api/v1/bins", cli.api_url);
            if let Some(location_id) = location {
                url.push_str(&format!("?location_id={}", location_id));
            }

            let response = client.get(&url).send().await?;

            let response = ensure_success(response).await;

            let bins: Vec<Value> = response.json().await?;

            if bins.is_empty() && cli.format == "table" {
                println!("No bins found.");
            } else {
                print_rows(&cli.format, &["id", "location_id", "description"], &bins);
            }
        }

        Commands::AddBin {
            location,
            description,
        } => {
            let body = serde_json::json!({
                "location_id": location,
                "description": description,
            });

            let response = client
                .post(format!("{}/api/v1/bins", cli.api_url))
                .json(&body)
                .send()
                .await?;

            let response = ensure_success(response).await;

            let bin: Value = response.json().await?;
            println!(
                "Created bin {} at location {}",
                bin["id"].as_i64().unwrap_or(0),
                bin["location_id"].as_i64().unwrap_or(0)
            );
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: Value = resp.json().await?;

                    println!("Fillwatch v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Storage:    {}",
                        health["storage"].as_str().unwrap_or("unknown")
                    );

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Fillwatch API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Fillwatch API server is running:");
                    eprintln!("  cargo run --bin fillwatch");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = fillwatch::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Pass a successful response through; otherwise print the API's error and exit
async fn ensure_success(response: reqwest::Response) -> reqwest::Response {
    if response.status().is_success() {
        return response;
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(text);
    eprintln!("Failed ({}): {}", status, message);
    std::process::exit(1);
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn print_rows(format: &str, columns: &[&str], rows: &[Value]) {
    match format {
        "json" => match serde_json::to_string_pretty(rows) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Cannot render JSON: {}", e),
        },
        "csv" => {
            println!("{}", columns.join(","));
            for row in rows {
                let cells: Vec<String> = columns.iter().map(|c| cell(&row[*c])).collect();
                println!("{}", cells.join(","));
            }
        }
        _ => {
            for column in columns {
                print!("{:<16}", column);
            }
            println!();
            println!("{}", "-".repeat(16 * columns.len()));

            for row in rows {
                for column in columns {
                    print!("{:<16}", cell(&row[*column]));
                }
                println!();
            }
        }
    }
}

fn print_history_table(data: &Value) {
    println!(
        "Bin {} since {} ({})",
        cell(&data["BinId"]),
        cell(&data["Start"]),
        cell(&data["Window"])
    );
    println!();

    let trend = data["FillLevelTrend"].as_array().cloned().unwrap_or_default();
    if trend.is_empty() {
        println!("No readings for the selected window");
        return;
    }

    println!("{:<32} | {}", "Timestamp", "Fill level");
    println!("{}", "-".repeat(46));
    for point in &trend {
        println!(
            "{:<32} | {}",
            cell(&point["Timestamp"]),
            cell(&point["FillLevel"])
        );
    }

    println!();
    println!("{:<12} | {}", "Fill level", "Count");
    println!("{}", "-".repeat(22));
    for bucket in data["FillFrequency"].as_array().into_iter().flatten() {
        println!(
            "{:<12} | {}",
            cell(&bucket["FillLevel"]),
            cell(&bucket["Count"])
        );
    }
}

fn print_history_csv(data: &Value) {
    print!("{}", history_csv(data));
}

/// Trend rows, a blank line, then frequency rows
fn history_csv(data: &Value) -> String {
    let mut out = String::from("timestamp,fill_level\n");
    for point in data["FillLevelTrend"].as_array().into_iter().flatten() {
        out.push_str(&format!(
            "{},{}\n",
            cell(&point["Timestamp"]),
            cell(&point["FillLevel"])
        ));
    }

    out.push_str("\nfill_level,count\n");
    for bucket in data["FillFrequency"].as_array().into_iter().flatten() {
        out.push_str(&format!(
            "{},{}\n",
            cell(&bucket["FillLevel"]),
            cell(&bucket["Count"])
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7260), "2h 1m");
        assert_eq!(format_duration(90000), "1d 1h");
    }

    #[test]
    fn test_cell_strips_string_quotes() {
        assert_eq!(cell(&serde_json::json!("Plaza")), "Plaza");
        assert_eq!(cell(&serde_json::json!(42)), "42");
        assert_eq!(cell(&Value::Null), "-");
    }

    #[test]
    fn test_history_csv_includes_frequency_section() {
        let data = serde_json::json!({
            "BinId": 7,
            "FillLevelTrend": [
                { "Timestamp": "2024-03-01T10:00:00Z", "FillLevel": 120.5 },
                { "Timestamp": "2024-03-01T11:00:00Z", "FillLevel": 300.0 },
                { "Timestamp": "2024-03-01T12:00:00Z", "FillLevel": 120.5 }
            ],
            "FillFrequency": [
                { "FillLevel": 120.5, "Count": 2 },
                { "FillLevel": 300.0, "Count": 1 }
            ]
        });

        let csv = history_csv(&data);
        let (trend, frequency) = csv.split_once("\n\n").unwrap();

        assert_eq!(
            trend.lines().collect::<Vec<_>>(),
            vec![
                "timestamp,fill_level",
                "2024-03-01T10:00:00Z,120.5",
                "2024-03-01T11:00:00Z,300.0",
                "2024-03-01T12:00:00Z,120.5",
            ]
        );
        assert_eq!(
            frequency.lines().collect::<Vec<_>>(),
            vec!["fill_level,count", "120.5,2", "300.0,1"]
        );
    }

    #[test]
    fn test_history_csv_empty_window_keeps_both_headers() {
        let csv = history_csv(&serde_json::json!({
            "FillLevelTrend": [],
            "FillFrequency": []
        }));
        assert_eq!(csv, "timestamp,fill_level\n\nfill_level,count\n");
    }

    #[test]
    fn test_status_flag_parses_explicit_false() {
        let cli = Cli::parse_from(["fillwatch-cli", "log", "5", "120.5", "--status", "false"]);
        match cli.command {
            Commands::Log {
                bin,
                fill_level,
                status,
            } => {
                assert_eq!(bin, 5);
                assert_eq!(fill_level, 120.5);
                assert!(!status);
            }
            _ => panic!("expected log command"),
        }
    }
}
