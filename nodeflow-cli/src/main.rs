//! nodeflow binary: expand a prompt into a workflow tree and print it.

use clap::Parser;
use nodeflow_cli::{render_json, render_tree, run_with_options, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "nodeflow")]
#[command(about = "Expand a prompt into a laid-out workflow tree")]
struct Args {
    /// Prompt text (also accepted as positional words)
    #[arg(short, long, value_name = "TEXT")]
    prompt: Option<String>,

    /// Use the scripted offline generator (no API key needed)
    #[arg(long)]
    mock: bool,

    /// Print nodes and edges as JSON instead of a tree
    #[arg(long)]
    json: bool,

    /// Show debug logs from the engine
    #[arg(short, long)]
    verbose: bool,

    /// Model name (overrides OPENAI_MODEL)
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// Sampling temperature 0-2 (overrides OPENAI_TEMPERATURE)
    #[arg(long, value_name = "T")]
    temperature: Option<f32>,

    /// Per-expansion timeout in seconds; 0 disables it
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Positional prompt words (when -p/--prompt is not used)
    #[arg(trailing_var_arg = true)]
    rest: Vec<String>,
}

fn get_prompt(args: &Args) -> String {
    if let Some(ref p) = args.prompt {
        return p.clone();
    }
    if args.rest.is_empty() {
        return "Plan a small web application".to_string();
    }
    args.rest.join(" ").trim().to_string()
}

/// Stderr logging; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info,nodeflow=debug,nodeflow_cli=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let prompt = get_prompt(&args);

    let options = RunOptions {
        mock: args.mock,
        model: args.model.clone(),
        temperature: args.temperature,
        timeout_secs: args.timeout_secs,
        verbose: args.verbose,
    };

    let output = match run_with_options(&prompt, &options).await {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        println!("{}", render_json(&output)?);
    } else {
        print!("{}", render_tree(&output));
        if output.rejected > 0 {
            eprintln!("({} generated records rejected)", output.rejected);
        }
    }
    Ok(())
}
