//! anagramd - A Cached Anagram Lookup Server
//!
//! This is the command-line entry point. It either runs the server until
//! Ctrl+C, or sends a single lookup to a running server and prints the result.

use anagramd::provider::HttpProvider;
use anagramd::{send_request, Server, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// What the binary was asked to do
enum Mode {
    Serve,
    Lookup { word: String, min_length: usize },
}

/// Command-line configuration
struct Cli {
    mode: Mode,
    config: ServerConfig,
}

impl Cli {
    /// Parse configuration from command-line arguments, on top of the environment
    fn from_args() -> Self {
        let mut config = ServerConfig::from_env();
        let mut positional = Vec::new();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    config.host = value_of(&args, i, "--host").to_string();
                    i += 2;
                }
                "--port" | "-p" => {
                    config.port = parse_value(&args, i, "--port");
                    i += 2;
                }
                "--endpoint" => {
                    config.endpoint = value_of(&args, i, "--endpoint").to_string();
                    i += 2;
                }
                "--ttl-ms" => {
                    config.cache.ttl = Duration::from_millis(parse_value(&args, i, "--ttl-ms"));
                    i += 2;
                }
                "--max-entries" => {
                    config.cache.max_entries = parse_value(&args, i, "--max-entries");
                    i += 2;
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("anagramd version {}", anagramd::VERSION);
                    std::process::exit(0);
                }
                arg if arg.starts_with('-') => {
                    eprintln!("Unknown argument: {}", arg);
                    print_help();
                    std::process::exit(1);
                }
                arg => {
                    positional.push(arg.to_string());
                    i += 1;
                }
            }
        }

        let mode = match positional.first().map(String::as_str) {
            None | Some("serve") if positional.len() <= 1 => Mode::Serve,
            Some("lookup") if (2..=3).contains(&positional.len()) => Mode::Lookup {
                word: positional[1].clone(),
                min_length: positional
                    .get(2)
                    .map(|s| {
                        s.parse::<usize>().unwrap_or_else(|_| {
                            eprintln!("Error: invalid minimum length");
                            std::process::exit(1);
                        })
                    })
                    .unwrap_or(0),
            },
            _ => {
                eprintln!("Error: unexpected arguments: {}", positional.join(" "));
                print_help();
                std::process::exit(1);
            }
        };

        Cli { mode, config }
    }
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i + 1) {
        Some(value) => value.as_str(),
        None => {
            eprintln!("Error: {} requires a value", flag);
            std::process::exit(1);
        }
    }
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    value_of(args, i, flag).parse().unwrap_or_else(|_| {
        eprintln!("Error: invalid value for {}", flag);
        std::process::exit(1);
    })
}

fn print_help() {
    println!(
        r#"
anagramd - A Cached Anagram Lookup Server

USAGE:
    anagramd [serve] [OPTIONS]
    anagramd lookup <WORD> [MIN_LENGTH] [OPTIONS]

OPTIONS:
    -h, --host <HOST>          Host to bind to / connect to (default: 127.0.0.1)
    -p, --port <PORT>          Port to listen on / connect to (default: 7878)
        --endpoint <URL>       Provider URL template with {{word}}
                               (default: http://www.anagramica.com/all/{{word}})
        --ttl-ms <MS>          Cache TTL in milliseconds (default: 10000)
        --max-entries <N>      Cache capacity (default: 10000)
    -v, --version              Print version information
        --help                 Print this help message

ENVIRONMENT:
    ANAGRAMD_HOST, ANAGRAMD_PORT, ANAGRAMD_ENDPOINT, ANAGRAMD_TTL_MS,
    ANAGRAMD_MAX_ENTRIES, ANAGRAMD_FETCH_TIMEOUT_MS, RUST_LOG

EXAMPLES:
    anagramd                          # Serve on 127.0.0.1:7878
    anagramd --port 9000              # Serve on port 9000
    anagramd lookup listen 5          # Ask a running server
    printf 'listen 5\n' | nc 127.0.0.1 7878
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::from_args();

    // Set up logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    match cli.mode {
        Mode::Lookup { word, min_length } => {
            let text = send_request(&cli.config.host, cli.config.port, &word, min_length).await?;
            println!("{}", text);
            Ok(())
        }
        Mode::Serve => serve(cli.config).await,
    }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let provider = Arc::new(HttpProvider::from_config(&config)?);
    let server = Server::start(config, provider).await?;

    println!(
        "anagramd v{} listening on {}. Use Ctrl+C to shutdown gracefully.",
        anagramd::VERSION,
        server.local_addr()
    );

    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C, shutting down");
    }
    info!("Shutdown signal received, stopping server...");

    server.stop();
    let cache = server.cache().stats();
    server.wait().await;

    info!(
        entries = cache.entries,
        hits = cache.hits,
        misses = cache.misses,
        expired = cache.expired,
        hit_rate = %format!("{:.2}%", cache.hit_rate() * 100.0),
        "Server shutdown complete"
    );
    Ok(())
}
