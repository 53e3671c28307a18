use anyhow::Result;
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use subcert::config::{self, Config};
use subcert::enumeration;
use subcert::retry::RetryPolicy;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target domain to get subdomains for from crt.sh
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    domain: String,

    /// Re-query every wildcard name found by the first search (one level)
    #[arg(short, long)]
    recursive: bool,

    /// Include wildcard names in the output
    #[arg(short, long)]
    wildcard: bool,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Maximum attempts per query when the connection fails
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = 2)]
    retry_delay: u64,

    /// Also write the discovered names to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Search URL template; `{query}` is replaced with the query string
    #[arg(long, default_value = config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Print request and parsing details to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            domain: args.domain,
            recursive: args.recursive,
            include_wildcards: args.wildcard,
            endpoint: args.endpoint,
            timeout: Duration::from_secs(args.timeout),
            retry: RetryPolicy::new(args.retries, Duration::from_secs(args.retry_delay)),
            output_file: args.output,
            verbose: args.verbose,
            ..Config::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from(Args::parse());

    let mut stdout = io::stdout();
    enumeration::run(&config, &mut stdout).await?;

    Ok(())
}
