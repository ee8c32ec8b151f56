use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand, Args};
use console::style;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::codec::payload;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::source::WavSource;

mod codec;
mod config;
mod debounce;
mod detector;
mod error;
mod framer;
mod generator;
mod pipeline;
mod source;

#[derive(Parser)]
#[clap(author, version, about="Decode a checksummed message from DTMF tones in a WAV recording", long_about=None)]
pub(crate) struct Cli {
    /// 0 for errors only, 1 for info, 2 for detailed, 3 for every block
    #[clap(long, default_value_t = 0, global = true)]
    pub debug: u8,

    /// TOML file overriding detector, framer and generator settings
    #[clap(long, parse(from_os_str), global = true)]
    pub config: Option<PathBuf>,

    // Without a subcommand, decode from stdin.
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args)]
pub(crate) struct DecodeArgs {
    /// WAV file to read instead of stdin
    #[clap(long, short, parse(from_os_str))]
    pub input: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct EncodeArgs {
    #[clap(long, short)]
    pub message: String,

    #[clap(long, short, parse(from_os_str))]
    pub output: PathBuf,
}

#[derive(Args)]
pub(crate) struct LoopbackArgs {
    #[clap(long, short, default_value = "R2")]
    pub message: String,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print the first verified message found in a recording
    #[clap(name="decode")]
    Decode(DecodeArgs),

    /// Write a recording of a message and its checksum
    #[clap(name="encode")]
    Encode(EncodeArgs),

    /// Render a message and decode it in memory
    #[clap(name="loopback")]
    Loopback(LoopbackArgs),
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("r2d2_tool={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_logging(args.debug);

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match args.command {
        None => decode(DecodeArgs { input: None }, &config),
        Some(Commands::Decode(a)) => decode(a, &config),
        Some(Commands::Encode(a)) => encode(a, &config),
        Some(Commands::Loopback(a)) => loopback(a, &config),
    }
}

///////////////////////////////////////////////////////////////////////

fn decode(args: DecodeArgs, config: &Config) -> Result<()> {
    let message = match args.input {
        Some(path) => pipeline::decode_first(WavSource::open(path)?, config)?,
        None => pipeline::decode_first(WavSource::from_reader(BufReader::new(io::stdin()))?, config)?,
    };

    let message = message.ok_or(Error::NoMessage)?;
    info!(length = message.len(), "read full message");

    println!("{}", String::from_utf8_lossy(&message));

    Ok(())
}

fn encode(args: EncodeArgs, config: &Config) -> Result<()> {
    let keys = payload::encode(args.message.as_bytes());
    let samples = generator::render(&keys, &config.generator)?;

    info!(%keys, samples = samples.len(), output = %args.output.display(), "writing recording");
    source::wav::write_wav(&args.output, config.generator.sample_rate, &samples)?;

    Ok(())
}

fn loopback(args: LoopbackArgs, config: &Config) -> Result<()> {
    match pipeline::loopback(args.message.as_bytes(), config) {
        Ok(keys) => {
            eprintln!("{} {keys}", style("pass").green());
            Ok(())
        },
        Err(e @ Error::LoopbackMismatch { .. }) => {
            eprintln!("{}", style("fail").red());
            Err(e)
        },
        Err(e) => Err(e),
    }
}
