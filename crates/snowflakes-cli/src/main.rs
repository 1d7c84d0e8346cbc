#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};

use clap::Parser;
use config::{CliArgs, CliConfig, Command};
use snowflakes::{Generator, Layout, Sleeper, SnowflakeId, TimeSource};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match config.command.clone() {
        Command::Generate { count, decode } => {
            let builder = Generator::builder(config.machine_id)
                .machine_id_bits(config.layout.machine_id_bits())
                .epoch(config.epoch);
            if config.time_travel {
                tracing::warn!("time travel enabled, timestamps will not match real time");
                generate(&builder.time_travel().build()?, count, decode, &mut out)?;
            } else {
                generate(&builder.build()?, count, decode, &mut out)?;
            }
        }
        Command::Decode { ids } => decode_ids(&config.layout, &ids, &mut out)?,
    }

    out.flush()?;
    Ok(())
}

fn generate<T, S>(
    generator: &Generator<T, S>,
    count: u64,
    decode: bool,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    T: TimeSource,
    S: Sleeper,
{
    tracing::info!(
        count,
        machine_id = generator.machine_id(),
        machine_id_bits = generator.layout().machine_id_bits(),
        "generating IDs"
    );

    for _ in 0..count {
        let id = generator.blocking_next_id()?;
        if decode {
            writeln!(out, "{id} {}", generator.decode_id(id))?;
        } else {
            writeln!(out, "{id}")?;
        }
    }
    Ok(())
}

fn decode_ids(layout: &Layout, ids: &[u64], out: &mut impl Write) -> anyhow::Result<()> {
    for &raw in ids {
        let id = SnowflakeId::from_raw(raw);
        if raw >> 63 != 0 {
            tracing::warn!(%id, "reserved bit is set, this is not a generated ID");
        }
        writeln!(out, "{id} {}", layout.decode(id))?;
    }
    Ok(())
}
