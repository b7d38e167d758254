use crate::commands::key::KeyCmd;
use crate::commands::parse_script::ParseScriptCmd;
use crate::commands::sighash::SighashCmd;
use crate::commands::verify::VerifyCmd;
use crate::commands::{self, Context};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Verify every input of a transaction.
    Verify(VerifyCmd),

    /// Print the signature digest of a transaction input.
    Sighash(SighashCmd),

    /// Disassemble a raw script.
    ParseScript(ParseScriptCmd),

    /// Derive the public key, WIF and address of a secret key.
    Key(KeyCmd),
}

/// Coinscript
#[derive(Debug, Parser)]
#[clap(version, about = "Bitcoin script and transaction verification tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Sets a custom logging filter (syntax: `<target>=<level>`).
    ///
    /// Log levels (least to most verbose) are `error`, `warn`, `info`, `debug`, and `trace`.
    ///
    /// Without this flag the filter is read from `RUST_LOG`, and all targets log `info`
    /// if that is unset too.
    ///
    /// *Example*: `--log coinscript_tx=debug,coinscript_script=trace`.
    #[arg(short = 'l', long, value_name = "LOG_PATTERN", num_args = 1.., global = true)]
    pub log: Vec<String>,

    /// Use testnet address prefixes.
    #[arg(long, global = true)]
    pub testnet: bool,

    /// JSON file mapping transaction ids to raw transactions, used to look up the
    /// outputs spent by the inputs being verified.
    #[arg(long, value_name = "PATH", global = true)]
    pub cache: Option<PathBuf>,
}

fn env_filter(log: &[String]) -> Result<EnvFilter> {
    if log.is_empty() {
        Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    } else {
        Ok(EnvFilter::try_new(log.join(","))?)
    }
}

/// Parse and run command line arguments
pub fn run() -> Result<()> {
    let Cli {
        command,
        log,
        testnet,
        cache,
    } = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&log)?)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::new(testnet, cache.as_deref())?;

    match command {
        Command::Verify(cmd) => commands::print_json(&cmd.run(&ctx)?),
        Command::Sighash(cmd) => commands::print_json(&cmd.run(&ctx)?),
        Command::ParseScript(cmd) => commands::print_json(&cmd.run(&ctx)?),
        Command::Key(cmd) => commands::print_json(&cmd.run(&ctx)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "coinscript",
            "sighash",
            "0100",
            "--input",
            "2",
            "--testnet",
            "--cache",
            "txs.json",
            "-l",
            "coinscript_tx=debug",
        ])
        .unwrap();

        assert!(cli.testnet);
        assert_eq!(cli.cache, Some(PathBuf::from("txs.json")));
        assert_eq!(cli.log, vec!["coinscript_tx=debug".to_string()]);
        match cli.command {
            Command::Sighash(cmd) => {
                assert_eq!(cmd.tx, "0100");
                assert_eq!(cmd.input, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_key_flags() {
        let cli = Cli::try_parse_from(["coinscript", "key", "01", "--uncompressed"]).unwrap();
        assert!(!cli.testnet);
        assert!(cli.cache.is_none());
        assert!(matches!(cli.command, Command::Key(KeyCmd { uncompressed: true, .. })));

        assert!(Cli::try_parse_from(["coinscript", "verify"]).is_err());
    }

    #[test]
    fn test_env_filter() {
        assert!(env_filter(&["coinscript_tx=debug".to_string(), "warn".to_string()]).is_ok());
        assert!(env_filter(&["coinscript_tx=loud".to_string()]).is_err());
    }
}
