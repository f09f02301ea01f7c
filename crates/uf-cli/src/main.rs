//! unfurl CLI
//!
//! Pulls pieces out of URLs read from arguments or stdin.

mod input;
mod logging;
mod output;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use uf_core::{Extractor, HeuristicClassifier, Projection, PslClassifier, SuffixClassifier};

use output::Emitter;

#[derive(Parser)]
#[command(name = "unfurl")]
#[command(about = "Extract keys, values, domains, paths and custom formats from URLs")]
struct Cli {
    /// Print each distinct output line only once
    #[arg(short, long, global = true)]
    unique: bool,

    /// Public suffix list file (public_suffix_list.dat format)
    #[arg(long, env = "UNFURL_PSL", global = true)]
    psl: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keys from the query string (one per line)
    Keys {
        /// URLs to process (reads stdin when empty)
        urls: Vec<String>,
    },

    /// Values from the query string (one per line)
    Values {
        /// URLs to process (reads stdin when empty)
        urls: Vec<String>,
    },

    /// Key=value pairs from the query string (one per line)
    Keypairs {
        /// URLs to process (reads stdin when empty)
        urls: Vec<String>,
    },

    /// The hostname (e.g. sub.example.com)
    Domains {
        /// URLs to process (reads stdin when empty)
        urls: Vec<String>,
    },

    /// The apex domain (e.g. example.com from sub.example.com)
    Apexes {
        /// URLs to process (reads stdin when empty)
        urls: Vec<String>,
    },

    /// The path (e.g. /users)
    Paths {
        /// URLs to process (reads stdin when empty)
        urls: Vec<String>,
    },

    /// A custom format string
    ///
    /// Directives: %% literal percent, %s scheme, %u userinfo, %d domain,
    /// %P port, %S subdomain, %r root, %t TLD, %p path, %e path extension,
    /// %q query, %f fragment, %@ @ if userinfo, %: colon if port,
    /// %? ? if query, %# # if fragment, %a authority.
    Format {
        /// Template, e.g. "%s://%d%p"
        template: String,

        /// URLs to process (reads stdin when empty)
        urls: Vec<String>,
    },

    /// A JSON record of every extracted field
    Json {
        /// URLs to process (reads stdin when empty)
        urls: Vec<String>,
    },
}

impl Commands {
    fn into_projection(self) -> (Projection, Vec<String>) {
        match self {
            Commands::Keys { urls } => (Projection::Keys, urls),
            Commands::Values { urls } => (Projection::Values, urls),
            Commands::Keypairs { urls } => (Projection::KeyPairs, urls),
            Commands::Domains { urls } => (Projection::Domains, urls),
            Commands::Apexes { urls } => (Projection::Apexes, urls),
            Commands::Paths { urls } => (Projection::Paths, urls),
            Commands::Format { template, urls } => (Projection::Format(template), urls),
            Commands::Json { urls } => (Projection::Json, urls),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(cli, stdin.lock(), stdout.lock())
}

fn run_with<R: BufRead, W: Write>(cli: Cli, input: R, out: W) -> Result<(), String> {
    let classifier = load_classifier(cli.psl.as_deref())?;
    let extractor = Extractor::new(classifier);
    let (projection, urls) = cli.command.into_projection();

    let mut emitter = Emitter::new(out, cli.unique);
    let mut skipped = 0usize;

    input::for_each_url(&urls, input, |raw| {
        let url = match extractor.parse(raw) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("{}", e);
                skipped += 1;
                return Ok(());
            }
        };

        match extractor.project(&url, &projection) {
            Ok(lines) => emitter.emit_all(lines),
            Err(e) => {
                log::warn!("{}: {}", raw, e);
                skipped += 1;
                Ok(())
            }
        }
    })?;

    emitter.flush()?;

    if skipped > 0 {
        log::info!("skipped {} input(s)", skipped);
    }

    Ok(())
}

fn load_classifier(path: Option<&Path>) -> Result<Box<dyn SuffixClassifier>, String> {
    match path {
        Some(path) => {
            let classifier = PslClassifier::from_path(path).map_err(|e| e.to_string())?;
            Ok(Box::new(classifier))
        }
        None => {
            log::debug!("no suffix list configured, using heuristic classifier");
            Ok(Box::new(HeuristicClassifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_format_command() {
        let cli = Cli::try_parse_from(["unfurl", "-u", "format", "%d%p", "a.com/x", "b.com/y"]).unwrap();
        assert!(cli.unique);
        let (projection, urls) = cli.command.into_projection();
        assert_eq!(projection, Projection::Format("%d%p".to_string()));
        assert_eq!(urls, ["a.com/x", "b.com/y"]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["unfurl", "apexes", "--psl", "list.dat", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.psl.as_deref(), Some(Path::new("list.dat")));
        let (projection, urls) = cli.command.into_projection();
        assert_eq!(projection, Projection::Apexes);
        assert!(urls.is_empty());
    }

    fn run_on(args: &[&str], input: &str) -> Result<String, String> {
        let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
        let mut out = Vec::new();
        run_with(cli, input.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_malformed_url_is_skipped() {
        let out = run_on(&["unfurl", "paths"], "http://[\nexample.com/a?x=1\n").unwrap();
        assert_eq!(out, "/a\n");
    }

    #[test]
    fn test_only_malformed_input_still_succeeds() {
        let out = run_on(&["unfurl", "json"], "http://[\n").unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_unique_drops_repeated_lines() {
        let input = "a.com/x\nb.com\na.com/y\nb.com\n";
        let out = run_on(&["unfurl", "-u", "domains"], input).unwrap();
        assert_eq!(out, "a.com\nb.com\n");

        let out = run_on(&["unfurl", "domains"], input).unwrap();
        assert_eq!(out, "a.com\nb.com\na.com\nb.com\n");
    }

    #[test]
    fn test_args_win_over_input() {
        let out = run_on(&["unfurl", "format", "%d", "x.com/p"], "y.com\n").unwrap();
        assert_eq!(out, "x.com\n");
    }

    #[test]
    fn test_bad_list_file_fails_run() {
        let result = run_on(&["unfurl", "--psl", "/nonexistent/public_suffix_list.dat", "domains"], "a.com\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_list_file_is_an_error() {
        let result = load_classifier(Some(Path::new("/nonexistent/public_suffix_list.dat")));
        assert!(result.is_err());
    }
}
