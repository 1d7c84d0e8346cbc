use anyhow::bail;
use clap::{Parser, Subcommand};
use core::time::Duration;
use snowflakes::{DEFAULT_MACHINE_ID_BITS, Layout};

/// Upper bound on IDs printed by a single `generate` invocation.
pub const MAX_COUNT: u64 = 100_000_000;

/// Command-line arguments for the `snowflakes` binary.
///
/// Layout options can also come from the environment (or a `.env` file), so a
/// deployment can pin its machine ID once instead of passing it on every
/// call.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowflakes",
    version,
    about = "Mint and decode coordination-free 64-bit Snowflake IDs"
)]
pub struct CliArgs {
    /// Machine ID encoded into every generated ID.
    ///
    /// Must fit in `--machine-id-bits` bits. Assigning distinct machine IDs
    /// to processes is up to you.
    ///
    /// Environment variable: `SNOWFLAKES_MACHINE_ID`
    #[arg(long, env = "SNOWFLAKES_MACHINE_ID", default_value_t = 0, global = true)]
    pub machine_id: u64,

    /// Bits reserved for the machine ID (1-21); the remaining of the 22 bits
    /// hold the per-millisecond sequence.
    ///
    /// Environment variable: `SNOWFLAKES_MACHINE_ID_BITS`
    #[arg(
        long,
        env = "SNOWFLAKES_MACHINE_ID_BITS",
        default_value_t = DEFAULT_MACHINE_ID_BITS,
        global = true
    )]
    pub machine_id_bits: u8,

    /// Epoch in milliseconds since 1970-01-01 UTC.
    ///
    /// Environment variable: `SNOWFLAKES_EPOCH_MS`
    #[arg(long, env = "SNOWFLAKES_EPOCH_MS", default_value_t = 0, global = true)]
    pub epoch_ms: u64,

    /// Decouple the generator from the real clock. Only for benchmarking:
    /// timestamps run ahead of real time.
    #[arg(long, default_value_t = false, global = true)]
    pub time_travel: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print freshly generated IDs, one per line.
    Generate {
        /// How many IDs to print.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u64,

        /// Print each ID's timestamp, machine ID and sequence next to it.
        #[arg(long, default_value_t = false)]
        decode: bool,
    },
    /// Print the components of existing IDs.
    Decode {
        /// IDs to decode, as decimal integers.
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

/// Validated configuration derived from [`CliArgs`].
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub machine_id: u64,
    pub layout: Layout,
    pub epoch: Duration,
    pub time_travel: bool,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let layout = Layout::new(args.machine_id_bits)?;

        if let Command::Generate { count, .. } = args.command {
            if count == 0 {
                bail!("--count must be greater than 0");
            }
            if count > MAX_COUNT {
                bail!("--count ({count}) exceeds the maximum of {MAX_COUNT}");
            }
            // Decoding does not need a valid machine ID.
            if !layout.accepts_machine_id(args.machine_id) {
                bail!(
                    "SNOWFLAKES_MACHINE_ID ({}) does not fit in {} bits (max = {})",
                    args.machine_id,
                    layout.machine_id_bits(),
                    layout.max_machine_id()
                );
            }
        }

        Ok(Self {
            machine_id: args.machine_id,
            layout,
            epoch: Duration::from_millis(args.epoch_ms),
            time_travel: args.time_travel,
            command: args.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<CliConfig> {
        let args = CliArgs::try_parse_from(args)?;
        CliConfig::try_from(args)
    }

    #[test]
    fn defaults() {
        let config = parse(&["snowflakes", "generate"]).unwrap();
        assert_eq!(config.machine_id, 0);
        assert_eq!(config.layout, Layout::default());
        assert_eq!(config.epoch, Duration::ZERO);
        assert!(!config.time_travel);
        assert_eq!(
            config.command,
            Command::Generate {
                count: 1,
                decode: false
            }
        );
    }

    #[test]
    fn global_options_after_subcommand() {
        let config = parse(&[
            "snowflakes",
            "generate",
            "-n",
            "5",
            "--machine-id",
            "378",
            "--epoch-ms",
            "1288834974657",
        ])
        .unwrap();
        assert_eq!(config.machine_id, 378);
        assert_eq!(config.epoch, Duration::from_millis(1_288_834_974_657));
    }

    #[test]
    fn rejects_zero_count() {
        assert!(parse(&["snowflakes", "generate", "--count", "0"]).is_err());
    }

    #[test]
    fn rejects_machine_id_outside_layout() {
        let err = parse(&[
            "snowflakes",
            "generate",
            "--machine-id",
            "16",
            "--machine-id-bits",
            "4",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("does not fit in 4 bits"));
    }

    #[test]
    fn rejects_bad_width() {
        assert!(parse(&["snowflakes", "generate", "--machine-id-bits", "22"]).is_err());
    }

    #[test]
    fn decode_ignores_machine_id() {
        let config = parse(&[
            "snowflakes",
            "decode",
            "--machine-id",
            "99999",
            "1541815603606036480",
        ])
        .unwrap();
        assert_eq!(
            config.command,
            Command::Decode {
                ids: vec![1_541_815_603_606_036_480]
            }
        );
    }

    #[test]
    fn decode_requires_ids() {
        assert!(CliArgs::try_parse_from(["snowflakes", "decode"]).is_err());
    }
}
