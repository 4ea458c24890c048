// src/main.rs
mod logger;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tempfile::NamedTempFile;

#[derive(Parser)]
#[command(name = "huffpack", version)]
#[command(about = "Huffman-encode and decode files.", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file
    Encode { input: PathBuf, output: PathBuf },
    /// Decode a file produced by `encode`
    Decode { input: PathBuf, output: PathBuf },
    /// Print the symbol table of an encoded file
    Inspect { input: PathBuf },
    /// Encode a file in memory and report sizes
    Stats {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = if cli.quiet { -1 } else { cli.verbose.min(3) as i8 };
    logger::init(verbosity)?;

    let span = tracing::info_span!("command_execution", command = ?std::env::args().collect::<Vec<_>>());
    let _enter = span.enter();

    match cli.command {
        Commands::Encode { input, output } => {
            let data = read(&input)?;
            let encoded = huffpack::encode(&data)
                .with_context(|| format!("failed to encode {}", input.display()))?;
            write_atomic(&output, &encoded)?;
            println!("{} bytes -> {} bytes", data.len(), encoded.len());
        }
        Commands::Decode { input, output } => {
            let data = read(&input)?;
            let decoded = huffpack::decode(&data)
                .with_context(|| format!("failed to decode {}", input.display()))?;
            write_atomic(&output, &decoded)?;
            println!("{} bytes -> {} bytes", data.len(), decoded.len());
        }
        Commands::Inspect { input } => {
            let data = read(&input)?;
            let header = huffpack::format::inspect(&data)
                .with_context(|| format!("failed to read header of {}", input.display()))?;
            println!(
                "symbol table: {} entries, {} bytes",
                header.entries.len(),
                header.table_bytes
            );
            for entry in &header.entries {
                println!(
                    "  0x{:02x} {:>6}  {:>2}  {}",
                    entry.symbol,
                    printable(entry.symbol),
                    entry.codeword.len(),
                    entry.codeword
                );
            }
            println!(
                "payload: {} bytes, {} padding bits, {} data bits",
                header.payload_bytes,
                header.padding,
                header.payload_bits()
            );
        }
        Commands::Stats { input, json } => {
            let data = read(&input)?;
            let report = huffpack::report(&data)
                .with_context(|| format!("failed to encode {}", input.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("original:  {} bytes", report.original_bytes);
                println!(
                    "encoded:   {} bytes ({:.1}%)",
                    report.encoded_bytes,
                    report.ratio * 100.0
                );
                println!("table:     {} bytes", report.table_bytes);
                println!("payload:   {} bits", report.payload_bits);
                println!(
                    "symbols:   {} distinct, longest code {} bits",
                    report.distinct_symbols, report.longest_codeword
                );
                println!("deflate:   {} bytes", report.deflate_bytes);
                println!("verified:  {}", report.verified);
            }
        }
    }

    Ok(())
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

// Write to a uniquely named temp file in the target's directory, then rename over the target.
fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a temp file in {}", dir.display()))?;
    temp.write_all(data)
        .with_context(|| format!("failed to write {}", temp.path().display()))?;
    temp.persist(path)
        .with_context(|| format!("failed to move output to {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "output written");
    Ok(())
}

fn printable(symbol: u8) -> String {
    match symbol {
        b' ' => "' '".to_string(),
        b'\n' => "\\n".to_string(),
        b'\t' => "\\t".to_string(),
        0x21..=0x7e => format!("'{}'", symbol as char),
        _ => String::new(),
    }
}
