//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, WalkConfig};
use crate::error::{Error, Result};
use crate::paginated::PaginatedIterator;
use crate::retry::RetryPolicy;
use crate::sequence::{DoubleEndedSequence, Sequence};
use crate::source::{HttpPageSource, PagedSource};
use crate::types::{Direction, FetchTarget, JsonValue, LogLevel};
use serde_json::json;
use std::io::Write;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Log level requested on the command line
    pub fn log_level(&self) -> LogLevel {
        if self.cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }

    /// Run the CLI command, writing results to stdout
    pub fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_to(&mut out)
    }

    /// Run the CLI command, writing results to `out`
    pub fn run_to<W: Write>(&self, out: &mut W) -> Result<()> {
        match &self.cli.command {
            Commands::Count => self.count(out),
            Commands::Read { reverse, limit } => {
                let direction = if *reverse {
                    Direction::Backward
                } else {
                    Direction::Forward
                };
                self.read(out, direction, *limit)
            }
            Commands::Page { index } => self.page(out, *index),
            Commands::Validate => self.validate(out),
        }
    }

    fn load(&self) -> Result<WalkConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::missing_field("--config"))?;
        load_config(path)
    }

    fn policy(&self, config: &WalkConfig) -> RetryPolicy {
        let mut policy = config.retry_policy();
        if let Some(retries) = self.cli.retries {
            policy.retries = retries;
        }
        policy
    }

    fn count<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = self.load()?;
        let source = HttpPageSource::new(config.http_source())?;
        let walk = PaginatedIterator::with_policy(&source, self.policy(&config))?;

        self.emit(
            out,
            &json!({
                "name": config.name,
                "total_records": walk.total_records(),
                "total_pages": walk.total_pages(),
            }),
        )
    }

    fn read<W: Write>(&self, out: &mut W, direction: Direction, limit: Option<usize>) -> Result<()> {
        let config = self.load()?;
        let source = HttpPageSource::new(config.http_source())?;
        let walk = PaginatedIterator::with_policy(&source, self.policy(&config))?;
        info!(
            "Reading '{}': {} records across {} pages ({:?})",
            config.name,
            walk.total_records(),
            walk.total_pages(),
            direction
        );

        let limit = limit.unwrap_or(usize::MAX);
        let mut records: Box<dyn Sequence<Item = JsonValue> + '_> = match direction {
            Direction::Forward => Box::new(walk.bounded(limit)),
            Direction::Backward => Box::new(walk.reversed().bounded(limit)),
        };

        let start = Instant::now();
        let mut emitted = 0usize;
        while records.has_next() {
            let record = records.next()?;
            self.emit(out, &record)?;
            emitted += 1;
        }

        info!("Read {} records in {:?}", emitted, start.elapsed());
        Ok(())
    }

    fn page<W: Write>(&self, out: &mut W, index: usize) -> Result<()> {
        let config = self.load()?;
        let source = HttpPageSource::new(config.http_source())?;
        let records = self
            .policy(&config)
            .run(FetchTarget::Page(index), || source.page(index))?;

        self.emit(out, &JsonValue::Array(records))
    }

    fn validate<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = self.load()?;
        self.emit(
            out,
            &json!({
                "status": "valid",
                "name": config.name,
                "base_url": config.source.base_url,
            }),
        )
    }

    fn emit<W: Write>(&self, out: &mut W, value: &JsonValue) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        writeln!(out, "{line}")?;
        Ok(())
    }
}
