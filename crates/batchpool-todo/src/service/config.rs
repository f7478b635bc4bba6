use crate::service::handler::DEFAULT_WORKERS;
use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use std::path::PathBuf;

/// Runtime configuration for the `batchpool-todo` binary.
///
/// Every setting can be passed as a CLI flag or through the environment
/// (including a `.env` file in the working directory).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "batchpool-todo",
    version,
    about = "Validate and store a batch of todos with a bounded worker pool"
)]
pub struct CliArgs {
    /// Number of workers validating items concurrently.
    ///
    /// Environment variable: `TODO_WORKERS`
    #[arg(long, env = "TODO_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub num_workers: usize,

    /// Abandon the batch if it has not been validated after this many
    /// milliseconds. Unbounded when omitted.
    ///
    /// Environment variable: `TODO_TIMEOUT_MS`
    #[arg(long, env = "TODO_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// JSON file holding an array of `{"title", "description"}` items, or `-`
    /// for stdin.
    ///
    /// Environment variable: `TODO_INPUT`
    #[arg(long, env = "TODO_INPUT", default_value = "-")]
    pub input: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    ///
    /// Environment variable: `TODO_LOG_JSON`
    #[arg(long, env = "TODO_LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

/// Where the batch is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub num_workers: usize,
    pub timeout: Option<Duration>,
    pub input: Input,
    pub log_json: bool,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 {
            bail!("TODO_WORKERS must be greater than 0");
        }

        let timeout = match args.timeout_ms {
            Some(0) => bail!("TODO_TIMEOUT_MS must be greater than 0"),
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        };

        let input = match args.input.as_str() {
            "" => bail!("TODO_INPUT must not be empty"),
            "-" => Input::Stdin,
            path => Input::File(PathBuf::from(path)),
        };

        Ok(Self {
            num_workers: args.num_workers,
            timeout,
            input,
            log_json: args.log_json,
        })
    }
}
