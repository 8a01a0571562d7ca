//! kvline CLI Client
//!
//! Command-line interface for talking to a key-value server.

use clap::{Parser, Subcommand, ValueEnum};
use kvline::{ClientConfig, Command, Connection, Reply, ReplyKind};
use tracing_subscriber::{fmt, EnvFilter};

/// kvline CLI
#[derive(Parser, Debug)]
#[command(name = "kvline-cli")]
#[command(about = "CLI for line-protocol key-value servers")]
#[command(version)]
struct Args {
    /// Server host (name or address)
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "6379")]
    port: u16,

    /// Connect/send/receive timeout in milliseconds
    #[arg(short, long, default_value = "2000")]
    timeout_ms: u64,

    /// Password to authenticate with after connecting
    #[arg(short = 'a', long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ping the server
    Ping,

    /// Print the server's info report
    Info,

    /// Print the server version negotiated at connect
    Version,

    /// Add a member to a set
    Sadd {
        /// The set key
        key: String,

        /// The member to add
        member: String,
    },

    /// Add a member with a score to a sorted set
    Zadd {
        /// The sorted set key
        key: String,

        /// The member's score
        #[arg(allow_hyphen_values = true)]
        score: f64,

        /// The member to add
        member: String,
    },

    /// Replicate from a master, or stop replicating when no host is given
    Slaveof {
        /// Master host
        host: Option<String>,

        /// Master port
        port: Option<u16>,
    },

    /// Send an arbitrary command and print its reply
    Raw {
        /// Reply shape to expect
        #[arg(short, long, value_enum, default_value = "status")]
        expect: ExpectedKind,

        /// Command name and arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExpectedKind {
    Status,
    Integer,
    Bulk,
    Multibulk,
}

impl From<ExpectedKind> for ReplyKind {
    fn from(kind: ExpectedKind) -> Self {
        match kind {
            ExpectedKind::Status => ReplyKind::Status,
            ExpectedKind::Integer => ReplyKind::Integer,
            ExpectedKind::Bulk => ReplyKind::Bulk,
            ExpectedKind::Multibulk => ReplyKind::MultiBulk,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> kvline::Result<()> {
    let config = ClientConfig::builder()
        .host(&args.host)
        .port(args.port)
        .timeout_ms(args.timeout_ms)
        .build();

    let mut conn = Connection::connect(&config)?;
    tracing::info!("connected to {} (server {})", conn.peer_addr(), conn.server_version());

    if let Some(password) = &args.password {
        conn.auth(password)?;
    }

    match args.command {
        Commands::Ping => {
            conn.ping()?;
            println!("PONG");
        }
        Commands::Info => print_info(&conn.info()?),
        Commands::Version => println!("{}", conn.server_version()),
        Commands::Sadd { key, member } => {
            let added = conn.sadd(key.as_bytes(), member.as_bytes())?;
            println!("{}", if added { "added" } else { "already a member" });
        }
        Commands::Zadd { key, score, member } => {
            let added = conn.zadd(key.as_bytes(), score, member.as_bytes())?;
            println!("{}", if added { "added" } else { "score updated" });
        }
        Commands::Slaveof { host, port } => {
            let master = host.as_deref().map(|host| (host, port.unwrap_or(6379)));
            conn.slaveof(master)?;
            println!("OK");
        }
        Commands::Raw { expect, args } => {
            let mut command = Command::new(&args[0]);
            for arg in &args[1..] {
                command.push(arg);
            }
            let reply = conn.send_and_receive(expect.into(), &command)?;
            print_reply(reply);
        }
    }

    conn.close();
    Ok(())
}

fn print_reply(reply: Reply<'_>) {
    match reply {
        Reply::Error(text) => println!("(error) {}", text),
        Reply::Status(text) => println!("{}", text),
        Reply::Integer(value) => println!("(integer) {}", value),
        Reply::Bulk(None) => println!("(nil)"),
        Reply::Bulk(Some(bytes)) => println!("\"{}\"", String::from_utf8_lossy(bytes)),
        Reply::MultiBulk(view) if view.is_empty() => println!("(empty list)"),
        Reply::MultiBulk(view) => {
            for (index, item) in view.iter().enumerate() {
                match item {
                    Some(bytes) => println!("{}) \"{}\"", index + 1, String::from_utf8_lossy(bytes)),
                    None => println!("{}) (nil)", index + 1),
                }
            }
        }
    }
}

fn print_info(info: &kvline::ServerInfo) {
    println!("redis_version: {}", info.redis_version);
    println!("arch_bits: {}", info.arch_bits);
    println!("multiplexing_api: {}", info.multiplexing_api);
    println!("process_id: {}", info.process_id);
    println!("uptime_in_seconds: {}", info.uptime_in_seconds);
    println!("uptime_in_days: {}", info.uptime_in_days);
    println!("connected_clients: {}", info.connected_clients);
    println!("connected_slaves: {}", info.connected_slaves);
    println!("blocked_clients: {}", info.blocked_clients);
    println!("used_memory: {}", info.used_memory);
    println!("used_memory_human: {}", info.used_memory_human);
    println!("changes_since_last_save: {}", info.changes_since_last_save);
    println!("bgsave_in_progress: {}", info.bgsave_in_progress);
    println!("last_save_time: {}", info.last_save_time);
    println!("bgrewriteaof_in_progress: {}", info.bgrewriteaof_in_progress);
    println!("total_connections_received: {}", info.total_connections_received);
    println!("total_commands_processed: {}", info.total_commands_processed);
    println!("expired_keys: {}", info.expired_keys);
    println!("hash_max_zipmap_entries: {}", info.hash_max_zipmap_entries);
    println!("hash_max_zipmap_value: {}", info.hash_max_zipmap_value);
    println!("pubsub_channels: {}", info.pubsub_channels);
    println!("pubsub_patterns: {}", info.pubsub_patterns);
    println!("vm_enabled: {}", info.vm_enabled);
    match info.role {
        Some(role) => println!("role: {}", role),
        None => println!("role: unknown"),
    }
}
