use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use gofer_core::agent::{AgentLoop, ToolRegistry, TurnEvent, TurnOutcome};
use gofer_core::config::{self, Config};
use gofer_core::providers::OpenAIProvider;
use gofer_core::sandbox::SandboxExecutor;
use gofer_core::tools::{EvaluateTool, ProxyTool, WebSearchTool};
use gofer_core::traits::ToolOutcome;
use rustyline::error::ReadlineError;
use std::sync::Arc;
use termimad::MadSkin;
use tracing_subscriber::EnvFilter;

mod onboard;

const TOOL_PREVIEW_CHARS: usize = 200;

#[derive(Parser)]
#[command(name = "gofer")]
#[command(about = "gofer - a tool-calling agent with a sandboxed evaluator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Onboard,
    Chat {
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Internal: runs one sandbox evaluation over stdin/stdout.
    #[command(hide = true)]
    SandboxWorker,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Chat { message: None }
        }
    });

    match command {
        // The worker owns stdout for its one-line protocol; nothing else
        // may print.
        Commands::SandboxWorker => {
            gofer_core::sandbox::worker::run();
        }
        Commands::Onboard => match onboard::run_onboard() {
            Ok(onboard_config) => config::save_config(&onboard_config)?,
            Err(e) => {
                eprintln!("❌ Onboarding failed: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Chat { message } => {
            init_tracing();
            let config = config::load_config()?;
            let mut agent = build_agent(&config)?;
            let skin = MadSkin::default();

            if let Some(msg) = message {
                if let Err(e) = run_turn(&mut agent, &skin, &msg).await {
                    eprintln!("  {} {}", style("✗").red().bold(), style(&e).red());
                    std::process::exit(1);
                }
            } else {
                repl(&mut agent, &skin).await?;
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Environment variables win over the config file, so a key never has to be
// written to disk to be usable.
fn resolve_value(configured: Option<&str>, env_keys: &[&str]) -> Option<String> {
    for key in env_keys {
        if let Ok(value) = std::env::var(key)
            && !value.is_empty()
        {
            return Some(value);
        }
    }
    configured.filter(|v| !v.is_empty()).map(str::to_string)
}

fn build_agent(config: &Config) -> Result<AgentLoop> {
    let api_key = resolve_value(
        Some(config.api_key.as_str()),
        &["GOFER_OPENAI_API_KEY", "OPENAI_API_KEY"],
    )
    .context("OpenAI API key is not set. Run 'gofer onboard' or export OPENAI_API_KEY.")?;

    let mut provider = OpenAIProvider::new(api_key)
        .with_model(config.model.clone())
        .with_temperature(config.temperature);
    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url.clone());
    }

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WebSearchTool::new(
        resolve_value(config.search.api_key.as_deref(), &["GOFER_SEARCH_API_KEY"]),
        resolve_value(
            config.search.engine_id.as_deref(),
            &["GOFER_SEARCH_ENGINE_ID"],
        ),
    )));
    registry.register(Arc::new(ProxyTool::new(
        resolve_value(config.proxy.base_url.as_deref(), &["GOFER_PROXY_BASE_URL"]),
        resolve_value(config.proxy.token.as_deref(), &["GOFER_PROXY_TOKEN"]),
    )));

    let executor = SandboxExecutor::from_current_exe(["sandbox-worker"])
        .context("could not locate the sandbox worker")?;
    registry.register(Arc::new(
        EvaluateTool::new(executor).with_default_timeout_ms(config.sandbox_timeout_ms),
    ));

    let mut agent = AgentLoop::new(Arc::new(provider), Arc::new(registry))
        .with_max_tool_loops(config.max_tool_loops);
    if let Some(prompt) = &config.system_prompt {
        agent = agent.with_system_prompt(prompt.clone());
    }
    Ok(agent)
}

fn render_event(skin: &MadSkin, event: TurnEvent<'_>) {
    match event {
        TurnEvent::Assistant(text) => {
            println!();
            skin.print_text(text);
        }
        TurnEvent::ToolResult { name, outcome } => print_tool_result(name, outcome),
    }
}

fn print_tool_result(name: &str, outcome: &ToolOutcome) {
    let content = outcome.to_content();
    let preview: String = if content.chars().count() > TOOL_PREVIEW_CHARS {
        let truncated: String = content.chars().take(TOOL_PREVIEW_CHARS).collect();
        format!("{truncated}…")
    } else {
        content
    };

    let label = if outcome.is_failure() {
        style(format!("⚙ {name}")).red()
    } else {
        style(format!("⚙ {name}")).cyan()
    };
    println!("  {} {}", label, style(preview).dim());
}

async fn run_turn(agent: &mut AgentLoop, skin: &MadSkin, input: &str) -> Result<()> {
    let outcome = agent
        .run_turn_with_events(input, |event| render_event(skin, event))
        .await?;
    if outcome == TurnOutcome::MaxToolLoops {
        println!(
            "  {} Stopped after the maximum number of tool loops.",
            style("!").yellow().bold()
        );
    }
    println!();
    Ok(())
}

async fn repl(agent: &mut AgentLoop, skin: &MadSkin) -> Result<()> {
    println!("🧰 Gofer");
    println!("Type your message (Ctrl+D to exit):\n");

    let mut rl = rustyline::DefaultEditor::new()?;
    let history_path = config::get_gofer_dir().join("history.txt");
    let _ = rl.load_history(&history_path);

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input);

                if let Err(e) = run_turn(agent, skin, input).await {
                    eprintln!("  {} {}", style("✗").red().bold(), style(&e).red());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\n👋 Goodbye!");
                break;
            }
            Err(e) => {
                eprintln!("❌ Error: {}", e);
                break;
            }
        }
    }

    if config::ensure_gofer_dir().is_ok() {
        let _ = rl.save_history(&history_path);
    }
    Ok(())
}
