//! `simplify` CLI: tokenize cards and inspect pinning and 3-D Secure data
//! from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Which endpoint does a key talk to?
//! simplify key sbpb_N2ZkOGIw
//!
//! # Tokenize a card read from a JSON file, pinned to a certificate bundle
//! simplify token --api-key sbpb_N2ZkOGIw --card card.json --pin simplify.pem
//!
//! # Tokenize from flags and request 3-D Secure, printing the request only
//! simplify token --number 5555555555554444 --exp-month 12 --exp-year 99 --cvc 123 \
//!     --amount 1500 --currency AUD --description Test --dry-run
//!
//! # List the certificates a PEM bundle pins
//! simplify pins simplify.pem
//!
//! # Interpret the redirect a 3-D Secure challenge page ends with
//! simplify redirect 'simplifysdk://secure3d?result=%7B%22secure3d%22%3A%7B%22authenticated%22%3Atrue%7D%7D'
//!
//! # Produce the challenge page for an enrolled card token
//! simplify challenge -i token.json -o challenge.html
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use simplify_core::{
    decode, decode_str, is_live, pem_blocks, validate_api_key, Card, ClientConfig, PinSet,
    Secure3dChallenge, Secure3dOutcome, Secure3dRequestData, Simplify, SimplifyError,
    TransportConfig, Value,
};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "simplify",
    version,
    about = "Simplify card tokenization CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an API key and print the environment it selects
    Key {
        /// Public API key
        key: String,
    },
    /// Exchange card details for a card token
    Token(TokenArgs),
    /// Decode PEM certificate bundles and list the pins they produce
    Pins {
        /// PEM files
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Interpret a 3-D Secure redirect URL
    Redirect {
        /// The URL the challenge page navigated to
        url: String,
    },
    /// Print the 3-D Secure challenge page for an enrolled card token
    Challenge {
        /// Card token JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(clap::Args)]
struct TokenArgs {
    /// Public API key
    #[arg(long, env = "SIMPLIFY_API_KEY")]
    api_key: String,

    /// Card JSON file, `{number, expMonth, expYear, cvc}` (reads from stdin if
    /// neither this nor --number is given)
    #[arg(long, conflicts_with = "number")]
    card: Option<String>,

    /// Card number
    #[arg(long, requires_all = ["exp_month", "exp_year", "cvc"])]
    number: Option<String>,
    #[arg(long)]
    exp_month: Option<String>,
    #[arg(long)]
    exp_year: Option<String>,
    #[arg(long)]
    cvc: Option<String>,

    /// Request a 3-D Secure check for this amount (minor units)
    #[arg(long)]
    amount: Option<i64>,
    /// 3-D Secure currency
    #[arg(long, requires = "amount")]
    currency: Option<String>,
    /// 3-D Secure description
    #[arg(long, requires = "amount")]
    description: Option<String>,

    /// PEM file of certificates to pin (repeatable)
    #[arg(long = "pin")]
    pins: Vec<String>,

    /// Host application identifier reported in the User-Agent
    #[arg(long, env = "SIMPLIFY_BUNDLE_ID")]
    bundle_id: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Print the request instead of sending it
    #[arg(long)]
    dry_run: bool,
}

const DEFAULT_CURRENCY: &str = "USD";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Key { key } => {
            if !validate_api_key(&key) {
                bail!("{}", SimplifyError::InvalidApiKey);
            }
            println!("{}", if is_live(&key) { "live" } else { "sandbox" });
        }
        Commands::Token(args) => run_token(args).await?,
        Commands::Pins { files } => run_pins(&files)?,
        Commands::Redirect { url } => {
            let url = reqwest::Url::parse(&url).with_context(|| format!("Invalid URL: {url}"))?;
            match Secure3dOutcome::from_redirect(&url) {
                None => bail!("Not a 3-D Secure redirect: {url}"),
                Some(Secure3dOutcome::Authenticated(true)) => println!("authenticated"),
                Some(Secure3dOutcome::Authenticated(false)) => println!("not authenticated"),
                Some(Secure3dOutcome::Failed(message)) => bail!("3-D Secure failed: {message}"),
            }
        }
        Commands::Challenge { input, output } => {
            let token = decode_str(&read_input(input.as_deref())?)
                .context("Failed to decode card token JSON")?;
            let challenge = Secure3dChallenge::from_card_token(&token)?;
            write_output(output.as_deref(), &challenge.html())?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

async fn run_token(args: TokenArgs) -> Result<()> {
    let card = read_card(&args)?;
    let secure3d = args
        .amount
        .map(|amount| {
            Secure3dRequestData::new(
                amount,
                args.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                args.description.as_deref().unwrap_or_default(),
            )
            .to_value()
            .context("Failed to convert 3-D Secure data")
        })
        .transpose()?;

    let mut pems = Vec::new();
    for file in &args.pins {
        let bundle =
            std::fs::read_to_string(file).with_context(|| format!("Failed to read file: {file}"))?;
        let blocks = pem_blocks(&bundle)?;
        if blocks.is_empty() {
            bail!("No PEM certificates in {file}");
        }
        pems.extend(blocks.into_iter().map(str::to_string));
    }
    debug!(pins = pems.len(), "loaded pinned certificates");

    let mut config = ClientConfig::new(args.api_key.as_str())
        .with_pinned_certificates(pems)
        .with_transport(TransportConfig {
            timeout_secs: args.timeout,
            ..TransportConfig::default()
        });
    if let Some(bundle_id) = &args.bundle_id {
        config = config.with_bundle_id(bundle_id);
    }
    let simplify = Simplify::new(config)?;

    if args.dry_run {
        let request = simplify.build_card_token_request(&card, secure3d.as_ref())?;
        println!("{} {}", request.method, request.url);
        for (name, value) in &request.headers {
            println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
        println!();
        println!("{}", pretty(&decode(&request.body)?)?);
        return Ok(());
    }

    match simplify.create_card_token(&card, secure3d.as_ref()).await {
        Ok(token) => println!("{}", pretty(&token)?),
        Err(SimplifyError::Api(error)) => {
            if let Some(body) = error.body.as_ref().filter(|b| !b.is_null()) {
                eprintln!("{}", pretty(body)?);
            }
            match error.status_code {
                Some(status) => bail!("API error ({status}): {}", error.message),
                None => bail!("API error: {}", error.message),
            }
        }
        Err(other) => return Err(other).context("Card token request failed"),
    }
    Ok(())
}

fn read_card(args: &TokenArgs) -> Result<Value> {
    if let (Some(number), Some(exp_month), Some(exp_year), Some(cvc)) =
        (&args.number, &args.exp_month, &args.exp_year, &args.cvc)
    {
        return Card::new(number, exp_month, exp_year, cvc)
            .to_value()
            .context("Failed to convert card");
    }
    let json = read_input(args.card.as_deref())?;
    let card = decode_str(&json).context("Failed to decode card JSON")?;
    if !card.is_map() {
        bail!("Card JSON must be an object");
    }
    Ok(card)
}

fn run_pins(files: &[String]) -> Result<()> {
    let mut total = 0;
    for file in files {
        let bundle =
            std::fs::read_to_string(file).with_context(|| format!("Failed to read file: {file}"))?;
        let pins = PinSet::from_pem_bundle(&bundle)?;
        println!("{file}: {} certificate(s)", pins.len());
        for (index, der) in pins.iter().enumerate() {
            println!("  [{index}] {} bytes DER", der.len());
        }
        total += pins.len();
    }
    if total == 0 {
        bail!("No certificates could be pinned");
    }
    Ok(())
}

fn pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to format JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
