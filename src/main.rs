// Command-line client for the GUS BIR1 registry service.
//
// Each invocation opens a session, performs one call and logs out again.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use gus_bir_client::{
    AdapterError, Config, RegistryAdapter, ResultNode, SearchParameters, SoapAdapter, constants,
    load_yaml_config,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gus-bir", version, about = "Query the GUS BIR1 (REGON) registry")]
struct Cli {
    /// Path to config.yaml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User key issued by GUS
    #[arg(long, env = "GUS_BIR_KEY", global = true, hide_env_values = true)]
    key: Option<String>,

    /// Use the production service instead of the configured one
    #[arg(long, global = true)]
    production: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search records by identifier
    Search {
        #[arg(long)]
        nip: Option<String>,

        #[arg(long)]
        regon: Option<String>,

        #[arg(long)]
        krs: Option<String>,

        /// Raw search parameter, repeatable (e.g. --param Nipy=123,456)
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Print every matching record instead of the first
        #[arg(long)]
        all: bool,
    },

    /// Download a full report for a REGON
    Report {
        regon: String,

        /// Report name, e.g. PublDaneRaportPrawna
        report: String,
    },

    /// Read a service value such as StatusUslugi or KomunikatKod
    Value {
        name: String,

        /// Read the value within a logged-in session
        #[arg(long)]
        session: bool,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = load_yaml_config(cli.config.as_deref())?;
    if cli.production {
        let user_key = config.user_key.take();
        config = Config {
            transport: config.transport,
            ..Config::production(user_key.unwrap_or_default())
        };
    }

    let adapter = SoapAdapter::from_config(&config).context("Failed to build SOAP client")?;
    info!("Using registry service at {}", config.base_url);

    // Value lookups outside a session need no key
    if let Command::Value { name, session: false } = &cli.command {
        let value = adapter.get_value(None, name).await?;
        println!("{value}");
        return Ok(());
    }

    let user_key = cli
        .key
        .clone()
        .or_else(|| config.user_key.clone().filter(|k| !k.is_empty()))
        .or_else(|| (!cli.production).then(|| constants::TEST_USER_KEY.to_string()))
        .context("No user key: pass --key, set GUS_BIR_KEY or add user_key to config")?;

    let sid = adapter.login(&user_key).await?;
    if sid.is_empty() {
        bail!("Login rejected: the service returned an empty session id");
    }

    let outcome = run(&adapter, &sid, cli.command).await;

    if let Err(e) = adapter.logout(&sid).await {
        warn!("Logout failed: {}", e);
    }

    outcome
}

async fn run(adapter: &SoapAdapter, sid: &str, command: Command) -> Result<()> {
    match command {
        Command::Search {
            nip,
            regon,
            krs,
            params,
            all,
        } => {
            let mut parameters = SearchParameters::new();
            for (key, value) in [
                (constants::search::NIP, nip),
                (constants::search::REGON, regon),
                (constants::search::KRS, krs),
            ] {
                if let Some(value) = value {
                    parameters.insert(key.to_string(), value);
                }
            }
            parameters.extend(params);
            if parameters.is_empty() {
                bail!("Search needs at least one of --nip, --regon, --krs or --param");
            }

            if all {
                let records = report_not_found(adapter.search_all(sid, &parameters).await)?;
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                let record = report_not_found(adapter.search(sid, &parameters).await)?;
                print_node(&record)?;
            }
        }
        Command::Report { regon, report } => {
            let data = report_not_found(adapter.get_full_data(sid, &regon, &report).await)?;
            print_node(&data)?;
        }
        Command::Value { name, .. } => {
            let value = adapter.get_value(Some(sid), &name).await?;
            println!("{value}");
        }
    }
    Ok(())
}

fn report_not_found<T>(result: Result<T, AdapterError>) -> Result<T> {
    result.map_err(|e| match e {
        AdapterError::NotFound => anyhow::anyhow!("No matching records in the registry"),
        other => other.into(),
    })
}

fn print_node(node: &ResultNode) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(node)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_parser_splits_on_first_equals() {
        assert_eq!(
            parse_key_value("Nipy=1=2"),
            Ok(("Nipy".to_string(), "1=2".to_string()))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=1").is_err());
    }

    #[test]
    fn cli_parses_search_flags() {
        let cli = Cli::try_parse_from(["gus-bir", "search", "--nip", "5261040828", "--param", "Krs=1"])
            .unwrap();
        match cli.command {
            Command::Search { nip, params, all, .. } => {
                assert_eq!(nip.as_deref(), Some("5261040828"));
                assert_eq!(params, vec![("Krs".to_string(), "1".to_string())]);
                assert!(!all);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
