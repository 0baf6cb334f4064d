//! GridAI - Interconnection bankability scoring
//!
//! Assess a single site from the command line:
//!
//!   gridai <lat> <lon> [--seed N] [--base S,C,R] [--json]
//!
//! Without `--base` the synthetic provider supplies base values (seeded with
//! `--seed` for reproducible output). `--json` prints the API response body
//! instead of the text report.

use eyre::{bail, eyre, Result, WrapErr};
use gridai::api::AnalysisResponse;
use gridai::utils::constants::DEFAULT_PROVIDER_TIMEOUT_MS;
use gridai::{
    BankabilityEngine, BaseFeatures, Coordinate, FeatureProvider, ScoringConfig,
    StaticFeatureProvider, SyntheticFeatureProvider,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "usage: gridai <lat> <lon> [--seed N] [--base S,C,R] [--json]";

#[derive(Debug, PartialEq)]
struct CliArgs {
    lat: f64,
    lon: f64,
    seed: Option<u64>,
    base: Option<BaseFeatures>,
    json: bool,
}

fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut positional = Vec::new();
    let mut seed = None;
    let mut base = None;
    let mut json = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--seed" => {
                let raw = iter.next().ok_or_else(|| eyre!("--seed needs a value"))?;
                seed = Some(raw.parse::<u64>().wrap_err("invalid --seed")?);
            }
            "--base" => {
                let raw = iter.next().ok_or_else(|| eyre!("--base needs S,C,R"))?;
                base = Some(parse_base(&raw)?);
            }
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
            _ => positional.push(arg),
        }
    }

    let [lat, lon] = positional.as_slice() else {
        bail!(USAGE);
    };

    Ok(CliArgs {
        lat: lat.parse().wrap_err("latitude must be a number")?,
        lon: lon.parse().wrap_err("longitude must be a number")?,
        seed,
        base,
        json,
    })
}

fn parse_base(raw: &str) -> Result<BaseFeatures> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .wrap_err("--base values must be numbers")?;

    match values.as_slice() {
        [s, c, r] => Ok(BaseFeatures::new(*s, *c, *r)),
        _ => bail!("--base needs exactly three values: stability,capacity,risk"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let coordinate = Coordinate::new(args.lat, args.lon)?;

    let config = ScoringConfig::default();
    let provider: Arc<dyn FeatureProvider> = match (args.base, args.seed) {
        (Some(base), _) => Arc::new(StaticFeatureProvider::new(base)),
        (None, Some(seed)) => Arc::new(SyntheticFeatureProvider::seeded(&config, seed)),
        (None, None) => Arc::new(SyntheticFeatureProvider::from_entropy(&config)),
    };

    let engine = BankabilityEngine::new(config, provider)?;
    let result = engine
        .assess_coordinate(
            &coordinate,
            Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
        )
        .await?;

    if args.json {
        let body = serde_json::to_string_pretty(&AnalysisResponse::from(&result))?;
        println!("{}", body);
    } else {
        println!("{}", result.summary(&coordinate));
    }

    Ok(())
}
