//! Relay server demo
//!
//! Run with: cargo run --example relay_server [PORT | BIND_ADDR]
//!
//! Examples:
//!   cargo run --example relay_server                   # binds to 127.0.0.1:3000
//!   cargo run --example relay_server 3100              # binds to 127.0.0.1:3100
//!   cargo run --example relay_server 0.0.0.0:3000      # binds to 0.0.0.0:3000
//!
//! ## Consume a stream
//!
//!   printf 'GET /capture\r\nStreamId: cam\r\n\r\n' | cat - /dev/stdin | nc localhost 3000
//!
//! ## Produce a stream
//!
//!   (printf 'POST /stream\r\nStreamId: cam\r\n\r\n'; cat input.bin) | nc -N localhost 3000

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use byte_relay::server::DEFAULT_PORT;
use byte_relay::{RelayServer, ServerConfig};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "3100" -> 127.0.0.1:3100
/// - "localhost" -> 127.0.0.1:3000
/// - "localhost:3100" -> 127.0.0.1:3100
/// - "0.0.0.0:3000" -> 0.0.0.0:3000
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    if let Ok(port) = arg.parse::<u16>() {
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port));
    }

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected PORT, IP:PORT, IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: relay_server [PORT | BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  PORT         Port on localhost (default: {})", DEFAULT_PORT);
    eprintln!("  BIND_ADDR    Address to bind to, e.g. 0.0.0.0:3000");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = ServerConfig::default();
    if let Some(arg) = args.get(1) {
        match parse_bind_addr(arg) {
            Ok(addr) => config = config.bind(addr),
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("byte_relay=info".parse()?),
        )
        .init();

    let server = RelayServer::new(config);

    server
        .run_until(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("\nShutting down...");
            }
        })
        .await?;

    Ok(())
}
