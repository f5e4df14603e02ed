//! UIDL compressor CLI binary.
//!
//! # Commands
//!
//! - `compress` - Apply a compression strategy to a payload
//! - `decompress` - Recover a payload from its transport form
//! - `analyze` - Show the three sizes and what each strategy would send
//! - `serve` - Start the demo HTTP server

use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uidl_compressor::{
    client::PayloadDecoder,
    codec::{CompressionStrategy, GzipCodec, PayloadForm, StrategySelector},
    config::Config,
    server::{Server, ServerConfig},
    VERSION,
};

#[derive(Parser)]
#[command(name = "uidl-compressor")]
#[command(version = VERSION)]
#[command(about = "Adaptive gzip+base64 compression of UIDL payloads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a payload with a strategy
    Compress {
        /// Payload input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Strategy (off, strict, adaptive)
        #[arg(short, long, default_value = "adaptive")]
        strategy: String,

        /// Gzip level (0-9)
        #[arg(short, long, default_value_t = uidl_compressor::codec::DEFAULT_LEVEL)]
        level: u32,

        /// Show compression statistics
        #[arg(long)]
        stats: bool,
    },

    /// Recover a payload from raw or gzip+base64 form
    Decompress {
        /// Payload input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Form of the input (identity, gzip+base64); sniffed when absent
        #[arg(short, long)]
        encoding: Option<String>,
    },

    /// Analyze a payload under every strategy
    Analyze {
        /// Payload input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Start the demo HTTP server
    Serve {
        /// Config file (default: user config dir, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Strategy (overrides config and UIDL_COMPRESSION)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,

        /// Log as JSON lines
        #[arg(long)]
        log_json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compress {
            input,
            file,
            output,
            strategy,
            level,
            stats,
        } => cmd_compress(input, file, output, &strategy, level, stats),

        Commands::Decompress {
            input,
            file,
            output,
            encoding,
        } => cmd_decompress(input, file, output, encoding.as_deref()),

        Commands::Analyze { input, file } => cmd_analyze(input, file),

        Commands::Serve {
            config,
            port,
            strategy,
            verbose,
            log_json,
        } => cmd_serve(config, port, strategy, verbose, log_json),
    }
}

fn cmd_compress(
    input: Option<String>,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    strategy: &str,
    level: u32,
    stats: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let strategy: CompressionStrategy = strategy.parse()?;
    let selector = StrategySelector::new()
        .with_strategy(strategy)
        .with_codec(GzipCodec::with_level(level));

    let selection = selector.select(content)?;
    write_output(output, &selection.body)?;

    if stats {
        eprintln!();
        eprintln!("Compression Statistics:");
        eprintln!("  Strategy:     {strategy}");
        eprintln!("  Sent as:      {}", selection.form);
        match selection.measurement {
            Some(m) => {
                eprintln!("  Raw:          {} bytes", m.raw_bytes);
                eprintln!("  Compressed:   {} bytes", m.compressed_bytes);
                eprintln!("  Encoded:      {} bytes", m.encoded_bytes);
                eprintln!("  Rate:         {:.1}%", m.compression_rate());
            },
            None => eprintln!("  Raw:          {} bytes (not measured)", selection.sent_bytes()),
        }
    }

    Ok(())
}

fn cmd_decompress(
    input: Option<String>,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    encoding: Option<&str>,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let trimmed = trim_trailing_newline(&content);
    let decoder = PayloadDecoder::new();

    let decoded = decoder.decode(trimmed, encoding)?;
    write_output(output, &decoded)?;

    Ok(())
}

fn cmd_analyze(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let selector = StrategySelector::new();

    let Some(m) = selector
        .select_with_strategy(content.clone(), CompressionStrategy::Strict)?
        .measurement
    else {
        anyhow::bail!("strict selection produced no measurement");
    };

    println!("Payload Analysis:");
    println!("  Raw:              {} bytes", m.raw_bytes);
    println!("  Gzip:             {} bytes", m.compressed_bytes);
    println!("  Gzip + Base64:    {} bytes", m.encoded_bytes);
    println!("  Compression rate: {:.1}%", m.compression_rate());
    println!("  Wire savings:     {:.1}%", m.transport_savings_percent());
    println!();

    println!("Strategy Comparison:");
    for strategy in CompressionStrategy::all() {
        let form = if strategy.compresses() {
            StrategySelector::choose(*strategy, &m)
        } else {
            PayloadForm::Raw
        };
        let sent = match form {
            PayloadForm::Raw => m.raw_bytes,
            PayloadForm::Encoded => m.encoded_bytes,
        };
        println!("  {:<10} sends {:<12} {} bytes", strategy.name(), form, sent);
    }

    Ok(())
}

fn cmd_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    strategy: Option<String>,
    verbose: bool,
    log_json: bool,
) -> anyhow::Result<()> {
    // Initialize logging
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    if log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Build config
    let mut config = Config::load(config_path)?;
    if let Some(strategy) = strategy {
        config.compression.strategy = Some(strategy);
        config.validate()?;
    }

    let mut server_config = ServerConfig::from_config(&config)?;
    if let Some(port) = port {
        server_config = server_config.with_port(port);
    }

    tracing::info!("Starting UIDL compressor on {}", server_config.addr);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        Server::new(server_config).run().await?;
        Ok::<_, anyhow::Error>(())
    })
}

// Helper functions

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<Vec<u8>> {
    if let Some(path) = file {
        Ok(std::fs::read(path)?)
    } else if let Some(s) = input.filter(|s| s != "-") {
        Ok(s.into_bytes())
    } else {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

fn write_output(output: Option<PathBuf>, content: &[u8]) -> anyhow::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content)?;
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

fn trim_trailing_newline(content: &[u8]) -> &[u8] {
    let end = content
        .iter()
        .rposition(|b| !matches!(b, b'\n' | b'\r'))
        .map_or(0, |i| i + 1);
    &content[..end]
}
