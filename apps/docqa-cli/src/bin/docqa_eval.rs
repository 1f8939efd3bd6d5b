use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use docqa_cli::eval::{run_suite, EvalSuite};
use docqa_cli::setup::{build_engine, document_path, init_tracing, load_config};

#[derive(Parser)]
#[command(name = "docqa-eval")]
#[command(about = "Run a keyword-scored evaluation suite against the document", long_about = None)]
struct Args {
    /// Evaluation suite (TOML, one [[case]] table per question)
    #[arg(long, default_value = "eval/project_nova.toml")]
    suite: PathBuf,

    /// Where to write the per-case CSV report
    #[arg(short, long, default_value = "evaluation_results.csv")]
    output: PathBuf,

    /// Directory containing config.toml
    #[arg(long, env = "DOCQA_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Knowledge-base document (overrides [document] path)
    #[arg(short, long)]
    document: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config_dir).map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let suite = EvalSuite::load(&args.suite)?;

    println!("--- Starting Evaluation ---");
    let document = document_path(&config, args.document)?;
    let engine = match build_engine(&config, &document) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Failed to initialize query engine: {e:#}");
            std::process::exit(1);
        }
    };

    println!("\nRunning {} test cases...\n", suite.len());
    let pb = ProgressBar::new(suite.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cases ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );
    let total = suite.len();
    let report = run_suite(
        &suite,
        |question| {
            pb.set_message(question.chars().take(40).collect::<String>());
            engine.query(question)
        },
        |result| {
            pb.println(format!("[{}/{}] Testing Question: {}", result.id, total, result.question));
            pb.println(format!(
                "  -> Accuracy: {}, Time: {:.2}s",
                result.verdict(),
                result.elapsed.as_secs_f64()
            ));
            pb.inc(1);
        },
    );
    pb.finish_and_clear();

    println!("\n--- Evaluation Complete ---");
    println!("\n** Summary **");
    println!("{}", report.summary());

    match report.write_csv(&args.output) {
        Ok(()) => println!("\n📊 Results have been saved to '{}'", args.output.display()),
        Err(e) => eprintln!("\nError saving results to CSV: {e:#}"),
    }
    Ok(())
}
