// Thu Oct 15 2026 - Alex

use super::args::Args;
use crate::config::Config;
use crate::finder::SymbolFinder;
use crate::object::ReadMode;
use crate::search::{Diagnostics, LogDiagnostics};
use crate::ui::output::{self, JsonReport};
use crate::utils::format_duration;
use crate::utils::logging::{init_logger, level_from_verbosity, scoped_timer};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const EXIT_FOUND: i32 = 0;
pub const EXIT_NOT_FOUND: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

#[derive(Default)]
pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        Self
    }

    /// Runs one search and returns the process exit status.
    pub fn execute(&self, args: Args) -> anyhow::Result<i32> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        if args.no_color {
            colored::control::set_override(false);
        }
        self.setup_logging(&args);

        let config = self.build_config(&args)?;
        log::debug!("Effective config: {:?}", config);

        let diagnostics = Arc::new(LogDiagnostics::new());
        let finder = SymbolFinder::new(config)?.with_diagnostics(diagnostics.clone() as Arc<dyn Diagnostics>);

        let spinner = if args.progress && !args.json {
            Some(self.create_spinner(&args)?)
        } else {
            None
        };

        let start = Instant::now();
        let result = {
            let _timer = scoped_timer("search");
            let files = finder.candidates(&args.so_dir)?;
            if let Some(pb) = &spinner {
                pb.set_message(format!("Scanning {} candidates for {}", files.len(), args.symbol));
            }
            finder.find_symbol_in(files, &args.symbol)?
        };

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let stats = diagnostics.stats();
        log::info!(
            "Scanned {} files ({} matched, {} skipped) in {}, {}",
            stats.files_scanned,
            stats.files_matched,
            stats.files_skipped,
            format_duration(start.elapsed()),
            result.termination()
        );

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if args.json {
            output::write_json(&mut out, &JsonReport::new(&args.symbol, &args.so_dir, &result))?;
        } else {
            output::write_text(&mut out, &args.symbol, &args.so_dir, &result)?;
        }

        Ok(if result.is_empty() { EXIT_NOT_FOUND } else { EXIT_FOUND })
    }

    fn setup_logging(&self, args: &Args) {
        let level = level_from_verbosity(args.verbose, args.log_level.as_deref());
        init_logger(level, !args.no_color);
    }

    fn build_config(&self, args: &Args) -> anyhow::Result<Config> {
        let mut config = match &args.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if args.all {
            config.find_all = true;
        }
        if let Some(workers) = args.worker_count() {
            config.concurrency = workers;
        }
        if args.mmap {
            config.read_mode = ReadMode::Mapped;
        }

        Ok(config)
    }

    fn create_spinner(&self, args: &Args) -> anyhow::Result<ProgressBar> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")?);
        pb.set_message(format!("Discovering shared objects in {}", args.so_dir.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Ok(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("findso.json");
        Config::new().with_concurrency(3).save(&path).unwrap();

        let args = Args::try_parse_from([
            "findso",
            "--config",
            path.to_str().unwrap(),
            "--all",
            "--mmap",
            "/lib",
            "puts",
        ])
        .unwrap();
        let config = CommandHandler::new().build_config(&args).unwrap();

        assert!(config.find_all);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.read_mode, ReadMode::Mapped);
    }

    #[test]
    fn test_jobs_flag_sets_concurrency() {
        let args = Args::try_parse_from(["findso", "-j", "6", "/lib", "puts"]).unwrap();
        let config = CommandHandler::new().build_config(&args).unwrap();
        assert_eq!(config.concurrency, 6);
        assert!(!config.find_all);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = Args::try_parse_from(["findso", "--config", "/nonexistent/findso.json", "/lib", "puts"]).unwrap();
        assert!(CommandHandler::new().build_config(&args).is_err());
    }
}
