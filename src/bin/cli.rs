//! openvpn-mi CLI
//!
//! Command-line interface for querying and controlling an OpenVPN daemon
//! through its management interface.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use openvpn_mi::config::SUPPORTED_STATUS_FORMAT;
use openvpn_mi::protocol::{Command, KillTarget, Signal, Status};
use openvpn_mi::{Client, ClientConfig, Endpoint, MiError, Result};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

/// openvpn-mi CLI
#[derive(Parser, Debug)]
#[command(name = "openvpn-mi")]
#[command(about = "Query and control OpenVPN through its management interface")]
#[command(version)]
struct Args {
    /// Management interface TCP address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7505", conflicts_with = "unix")]
    tcp: String,

    /// Management interface unix socket path
    #[arg(short, long)]
    unix: Option<PathBuf>,

    /// Read timeout in milliseconds (0 disables)
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,

    /// Write timeout in milliseconds (0 disables)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show daemon and management protocol versions
    Version,

    /// Show the daemon process id
    Pid,

    /// Show client count and traffic counters
    LoadStats,

    /// List connected clients and the routing table
    Status,

    /// Disconnect client session(s)
    Kill {
        /// Common name, or real address as ip:port
        target: String,
    },

    /// Send a signal to the daemon (SIGHUP, SIGTERM, SIGUSR1, SIGUSR2)
    Signal {
        /// Signal name
        name: String,
    },

    /// Send any command and print the raw response
    Raw {
        /// Command words
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
}

fn main() {
    // Logs go to stderr so stdout stays parseable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,openvpn_mi=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = ClientConfig::builder()
        .tcp(&args.tcp)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .status_format(SUPPORTED_STATUS_FORMAT);
    if let Some(path) = &args.unix {
        builder = builder.unix(path);
    }
    let config = builder.build();

    if let Err(e) = run(&args, &config) {
        tracing::debug!("command failed: {:?}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Dial the configured endpoint and execute the requested command
fn run(args: &Args, config: &ClientConfig) -> Result<()> {
    config.validate()?;

    match &config.endpoint {
        Endpoint::Tcp(addr) => {
            tracing::info!("Connecting to management interface at {}", addr);
            let stream = TcpStream::connect(addr)?;
            stream.set_read_timeout(timeout(config.read_timeout_ms))?;
            stream.set_write_timeout(timeout(config.write_timeout_ms))?;
            execute(&mut Client::new(stream), &args.command, args.json)
        }
        #[cfg(unix)]
        Endpoint::Unix(path) => {
            tracing::info!("Connecting to management interface at {}", path.display());
            let stream = std::os::unix::net::UnixStream::connect(path)?;
            stream.set_read_timeout(timeout(config.read_timeout_ms))?;
            stream.set_write_timeout(timeout(config.write_timeout_ms))?;
            execute(&mut Client::new(stream), &args.command, args.json)
        }
        #[cfg(not(unix))]
        Endpoint::Unix(_) => Err(MiError::Config(
            "unix sockets are not supported on this platform".to_string(),
        )),
    }
}

fn timeout(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

fn execute<S: Read + Write>(client: &mut Client<S>, command: &Commands, json: bool) -> Result<()> {
    match command {
        Commands::Version => {
            let version = client.version()?;
            emit(&version, json, |v| {
                println!("OpenVPN:    {}", v.openvpn);
                println!("Management: {}", v.management);
            })
        }
        Commands::Pid => {
            let pid = client.pid()?;
            emit(&pid, json, |pid| println!("{}", pid))
        }
        Commands::LoadStats => {
            let stats = client.load_stats()?;
            emit(&stats, json, |s| {
                println!("clients:   {}", s.nclients);
                println!("bytes in:  {}", s.bytes_in);
                println!("bytes out: {}", s.bytes_out);
            })
        }
        Commands::Status => {
            let status = client.status()?;
            emit(&status, json, print_status)
        }
        Commands::Kill { target } => {
            let result = client.kill_session(&KillTarget::parse(target))?;
            emit(&result, json, |r| println!("{}", r.message))
        }
        Commands::Signal { name } => {
            let signal: Signal = name.parse()?;
            let message = client.signal(signal)?;
            emit(&message, json, |m| println!("{}", m))
        }
        Commands::Raw { words } => {
            let response = client.exchange(&Command::Raw(words.join(" ")))?;
            emit(&response, json, |r| print!("{}", r))
        }
    }
}

fn emit<T: Serialize>(value: &T, json: bool, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| MiError::Serialization(e.to_string()))?;
        println!("{}", text);
    } else {
        human(value);
    }
    Ok(())
}

fn print_status(status: &Status) {
    println!("{}", status.title);
    println!("Updated: {} ({})", status.time, status.time_epoch);

    println!();
    println!("Clients ({}):", status.client_list.len());
    for session in &status.client_list {
        println!(
            "  {:<24} {:<22} {:<15} rx={} tx={} since {} user={}",
            session.common_name,
            session.real_address,
            session.virtual_address,
            session.bytes_received,
            session.bytes_sent,
            session.connected_since,
            session.username.as_deref().unwrap_or("-"),
        );
    }

    println!();
    println!("Routes ({}):", status.routing_table.len());
    for route in &status.routing_table {
        println!(
            "  {:<15} {:<24} {:<22} last ref {}",
            route.virtual_address, route.common_name, route.real_address, route.last_ref,
        );
    }
}
