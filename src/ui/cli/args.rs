// Thu Oct 15 2026 - Alex

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "findso")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Find which shared objects export a dynamic function symbol", long_about = None)]
pub struct Args {
    /// Directory searched recursively for shared objects
    pub so_dir: PathBuf,

    /// Exact name of the exported function
    pub symbol: String,

    /// Report every exporting object instead of stopping at the first
    #[arg(short, long)]
    pub all: bool,

    #[arg(short, long)]
    pub verbose: bool,

    /// Worker threads, 0 uses every CPU
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Memory-map objects instead of reading them into memory
    #[arg(long)]
    pub mmap: bool,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub log_level: Option<String>,

    #[arg(long)]
    pub json: bool,

    #[arg(long)]
    pub no_color: bool,

    #[arg(long)]
    pub progress: bool,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.is_empty() {
            return Err("Symbol name must not be empty".to_string());
        }
        if let Some(level) = &self.log_level {
            if crate::utils::logging::level_from_str(level).is_none() {
                return Err(format!("Unknown log level: {}", level));
            }
        }
        Ok(())
    }

    pub fn worker_count(&self) -> Option<usize> {
        self.jobs.map(|jobs| if jobs == 0 { num_cpus::get() } else { jobs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["findso", "/usr/lib", "puts"]).unwrap();
        assert_eq!(args.so_dir, PathBuf::from("/usr/lib"));
        assert_eq!(args.symbol, "puts");
        assert!(!args.all);
        assert!(args.worker_count().is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from(["findso", "--all", "-j", "4", "--mmap", "--json", "/lib", "malloc"]).unwrap();
        assert!(args.all);
        assert!(args.mmap);
        assert!(args.json);
        assert_eq!(args.worker_count(), Some(4));
    }

    #[test]
    fn test_zero_jobs_uses_cpu_count() {
        let args = Args::try_parse_from(["findso", "-j", "0", "/lib", "malloc"]).unwrap();
        assert_eq!(args.worker_count(), Some(num_cpus::get()));
    }

    #[test]
    fn test_missing_symbol_is_rejected() {
        assert!(Args::try_parse_from(["findso", "/lib"]).is_err());
        let args = Args::try_parse_from(["findso", "/lib", ""]).unwrap();
        assert!(args.validate().is_err());
        let args = Args::try_parse_from(["findso", "--log-level", "loud", "/lib", "x"]).unwrap();
        assert!(args.validate().is_err());
    }
}
