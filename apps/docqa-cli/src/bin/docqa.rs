use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use docqa_cli::setup::{build_engine, document_path, init_tracing, load_config};
use docqa_engine::{Answer, QueryEngine};

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Answer questions grounded in a single document", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, global = true, env = "DOCQA_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Knowledge-base document (overrides [document] path)
    #[arg(short, long, global = true)]
    document: Option<PathBuf>,

    /// Show the retrieved chunks under each answer
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one question and exit
    Ask {
        question: String,
    },

    /// Interactive session; type `exit` or send EOF to leave
    Chat,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config_dir).map_err(|e| { eprintln!("Error loading config: {}", e); e })?;

    let document = document_path(&config, cli.document)?;
    if !document.is_file() {
        eprintln!("❌ Knowledge base unavailable: '{}' was not found.", document.display());
        eprintln!("   Add the document there or set [document] path in config.toml, then restart.");
        std::process::exit(1);
    }

    println!("📄 Loading {} ...", document.display());
    let engine = build_engine(&config, &document)?;
    println!("✅ Indexed {} chunks", engine.index().len());

    match cli.command {
        Commands::Ask { question } => print_answer(&engine.answer(&question), cli.verbose),
        Commands::Chat => chat(&engine, cli.verbose)?,
    }
    Ok(())
}

fn chat(engine: &QueryEngine, verbose: bool) -> anyhow::Result<()> {
    println!("\n🤖 Hello! I have studied the document. How can I help you?");
    println!("   (type 'exit' or press Ctrl-D to leave)");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let question = line?;
        let question = question.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        print_answer(&engine.answer(question), verbose);
    }
    println!("\n👋 Bye");
    Ok(())
}

fn print_answer(answer: &Answer, verbose: bool) {
    println!("\n{}", answer.text);
    if verbose {
        println!("\n  📚 Sources ({}):", answer.retrieved.len());
        for (i, hit) in answer.retrieved.iter().enumerate() {
            let preview: String = hit.chunk.text.chars().take(120).collect();
            println!(
                "  {}. score={:.4}  chunk={}  page={}",
                i + 1,
                hit.score,
                hit.chunk.id,
                hit.chunk.source_page
            );
            println!("     {}", preview.replace('\n', " "));
        }
    }
}
