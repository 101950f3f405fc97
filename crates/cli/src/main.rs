use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use rulescribe_agent::{pipeline, Backend, Config, Mode};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: rulescribe <path/to/rule.mvel> [model]";

/// Explain, verify, diff, and generate tests for rule scripts.
#[derive(Parser)]
#[command(
    name = "rulescribe",
    version,
    about = "Explain, verify, diff, and generate tests for rule scripts"
)]
struct Cli {
    /// Path to the rule script
    file: Option<PathBuf>,

    /// Model name for the text-generation backend (overrides [llm].model)
    model: Option<String>,

    /// Run mode: explain, verify, tests, diff, or agentic
    #[arg(long, default_value = "explain")]
    mode: Mode,

    /// Second rule script, parsed after FILE (for diff mode)
    #[arg(long)]
    against: Option<PathBuf>,

    /// Config file (default: ./rulescribe.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persist the run trace as JSON under [trace].dir
    #[arg(long)]
    trace: bool,

    /// Knowledge-base directory for context retrieval (overrides [retrieval].kb_dir)
    #[arg(long)]
    kb_dir: Option<PathBuf>,

    /// Use the deterministic template backend instead of a model
    #[arg(long)]
    offline: bool,

    /// Log debug detail to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(file) = cli.file.as_deref() else {
        eprintln!("{}", USAGE);
        process::exit(1);
    };

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    apply_overrides(&mut config, &cli);

    let mut inputs = vec![read_rule(file)];
    if let Some(against) = cli.against.as_deref() {
        inputs.push(read_rule(against));
    }

    let backend = if cli.offline {
        Backend::Offline
    } else {
        Backend::Ollama
    };
    debug!(mode = %cli.mode, backend = ?backend, model = %config.llm.model, "resolved run");

    match pipeline::run(cli.mode, &inputs, &config, backend) {
        Ok(output) => println!("\n{}\n", output),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rulescribe=debug,rulescribe_agent=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("rulescribe=warn,rulescribe_agent=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(kb_dir) = &cli.kb_dir {
        config.retrieval.kb_dir = kb_dir.clone();
    }
    if cli.trace {
        config.trace.enabled = true;
    }
}

fn read_rule(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "rulescribe",
            "rule.mvel",
            "qwen3:8b",
            "--kb-dir",
            "docs",
            "--trace",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.llm.model, "qwen3:8b");
        assert_eq!(config.retrieval.kb_dir, PathBuf::from("docs"));
        assert!(config.trace.enabled);
    }

    #[test]
    fn mode_flag_parses() {
        let cli = Cli::parse_from(["rulescribe", "a.mvel", "--mode", "diff", "--against", "b.mvel"]);
        assert_eq!(cli.mode, Mode::Diff);
        assert_eq!(cli.against, Some(PathBuf::from("b.mvel")));
    }
}
