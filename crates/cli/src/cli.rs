use std::path::PathBuf;

use clap::Parser;

/// Run every analysis over a music library export in parallel.
///
/// Each analysis writes one artifact into the output directory. Failed
/// analyses are reported but do not stop the others.
#[derive(Parser, Debug)]
#[command(name = "tunegraph", version, about = "Parallel analyses over a music library export")]
pub struct CliArgs {
    /// Path to the library export (XML property list, or JSON)
    pub library: Option<PathBuf>,

    /// Path to the YAML config file
    #[arg(long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Output directory (default: library path without its extension)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Number of entries kept by ranking analyses
    #[arg(long, allow_negative_numbers = true)]
    pub top: Option<i64>,

    /// Worker pool size (0 = available parallelism)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Run only this analysis (repeatable)
    #[arg(long = "only", value_name = "UNIT")]
    pub only: Vec<String>,

    /// List available analyses and exit
    #[arg(long)]
    pub list: bool,

    /// Verbose logging with source locations
    #[arg(long)]
    pub debug: bool,

    /// Run analyses on the pool threads instead of one child process each
    #[arg(long)]
    pub in_process: bool,

    /// Time zone for the time-based analyses (e.g. Europe/Berlin)
    #[arg(long, value_name = "ZONE")]
    pub time_zone: Option<String>,

    /// Run the single job described in FILE and exit (worker processes)
    #[arg(long = "run-job", hide = true, value_name = "FILE")]
    pub run_job: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_args() {
        let args = CliArgs::parse_from(["tunegraph", "/path/to/library.json"]);
        assert_eq!(args.library, Some(PathBuf::from("/path/to/library.json")));
        assert_eq!(args.config, PathBuf::from("config.yaml"));
        assert_eq!(args.top, None);
        assert!(args.output.is_none());
        assert!(!args.debug);
        assert!(!args.list);
        assert!(!args.in_process);
        assert!(args.run_job.is_none());
    }

    #[test]
    fn all_options() {
        let args = CliArgs::parse_from([
            "tunegraph",
            "/path/to/library.json",
            "--config",
            "custom.yaml",
            "--output",
            "/custom/output",
            "--top",
            "20",
            "--workers",
            "3",
            "--only",
            "artist_plays",
            "--only",
            "genre_plays",
            "--debug",
            "--in-process",
            "--time-zone",
            "Europe/Berlin",
        ]);
        assert_eq!(args.config, PathBuf::from("custom.yaml"));
        assert_eq!(args.output, Some(PathBuf::from("/custom/output")));
        assert_eq!(args.top, Some(20));
        assert_eq!(args.workers, Some(3));
        assert_eq!(args.only, vec!["artist_plays", "genre_plays"]);
        assert!(args.debug);
        assert!(args.in_process);
        assert_eq!(args.time_zone.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn library_is_optional_at_parse_time() {
        let args = CliArgs::parse_from(["tunegraph", "--list"]);
        assert!(args.library.is_none());
        assert!(args.list);
    }

    #[test]
    fn worker_flag_matches_the_engine() {
        let args = CliArgs::parse_from(["tunegraph", tunegraph_compute::engine::RUN_JOB_FLAG, "/tmp/job-0.json"]);
        assert_eq!(args.run_job, Some(PathBuf::from("/tmp/job-0.json")));
        assert!(args.library.is_none());
    }

    #[test]
    fn worker_flag_is_hidden_from_help() {
        use clap::CommandFactory;
        let help = CliArgs::command().render_help().to_string();
        assert!(!help.contains("run-job"));
        assert!(help.contains("--in-process"));
    }

    #[test]
    fn negative_top_parses_for_later_validation() {
        let args = CliArgs::parse_from(["tunegraph", "lib.json", "--top", "-1"]);
        assert_eq!(args.top, Some(-1));
    }
}
