//! binrec Example - ToonDNA
//!
//! This example treats the codec as a black box:
//! - Defining a versioned record type with migrations
//! - Decoding bytes written by an older version
//! - Reading and changing field values
//! - Re-encoding in the current layout
//!
//! Run with: cargo run -p toon_dna -- [-v] [HEX]

use binrec_codec::{Packer, Value};
use binrec_core::{CoreResult, MigrationRule, RecordType};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Palette of version 1, indexed by the old single-byte color.
const PALETTE: [(u8, u8, u8); 4] = [(0, 0, 0), (255, 255, 255), (200, 0, 0), (0, 0, 200)];

/// Decode a ToonDNA byte string from any version and print it.
#[derive(Parser)]
#[command(name = "toon_dna")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Hex-encoded record (defaults to a version 1 record)
    #[arg(default_value = "0102050403")]
    hex: String,

    /// Eyelid shape to set before re-encoding
    #[arg(short, long, default_value = "2")]
    eyelid: u8,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// ToonDNA v3: torsoIndex, legSize, species, color (RGB), eyelidShape.
fn toon_dna() -> CoreResult<RecordType> {
    RecordType::builder("ToonDNA")
        .version(3)
        .field("torsoIndex", Packer::uint8())
        .field("legSize", Packer::uint8())
        .field("species", Packer::uint8())
        .field(
            "color",
            Packer::tuple([Packer::uint8(), Packer::uint8(), Packer::uint8()]),
        )
        .field("eyelidShape", Packer::uint8())
        .migration(
            MigrationRule::try_converted(1, "color", Packer::uint8(), |old| {
                old.as_integer()
                    .and_then(|index| usize::try_from(index).ok())
                    .and_then(|index| PALETTE.get(index).copied())
                    .map(Value::from)
                    .ok_or_else(|| format!("no palette entry {old}"))
            })
            .named("colorToTuple"),
        )
        .migration(MigrationRule::added(2, "eyelidShape", || 0).named("defaultEyelidShape"))
        .build()
}

fn parse_hex(hex: &str) -> Result<Vec<u8>, String> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if hex.len() % 2 != 0 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("not an even number of hex digits: {hex:?}"));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("bad hex byte {:?}: {e}", &hex[i..i + 2]))
        })
        .collect()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over the flag.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let dna_type = toon_dna()?;
    info!(version = ?dna_type.version(), width = dna_type.current_encoded_len(), "defined ToonDNA");

    println!("=== binrec ToonDNA Example ===\n");
    println!("Current schema: {}", dna_type.schema());
    for migration in dna_type.migrations() {
        println!(
            "  v{} {} {} ({})",
            migration.from_version,
            migration.kind,
            migration.target_field,
            migration.name.as_deref().unwrap_or("unnamed")
        );
    }
    println!();

    let bytes = parse_hex(&cli.hex)?;
    let mut dna = dna_type.decode(&bytes)?;
    println!("Input:   {}", to_hex(&bytes));
    println!("Decoded: {dna}");
    println!("Encoded: {}", to_hex(&dna.encode()?));

    dna.set("eyelidShape", cli.eyelid)?;
    println!("\nAfter setting eyelidShape = {}:", cli.eyelid);
    println!("Decoded: {dna}");
    println!("Encoded: {}", to_hex(&dna.encode()?));

    println!("\n=== Example Complete ===");
    Ok(())
}
