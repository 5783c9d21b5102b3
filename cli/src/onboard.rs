use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Select};
use gofer_core::config::{Config, ProxyConfig, SearchConfig};

const BANNER: &str = r"
    -------------------------------------

     ██████╗  ██████╗ ███████╗███████╗██████╗
    ██╔════╝ ██╔═══██╗██╔════╝██╔════╝██╔══██╗
    ██║  ███╗██║   ██║█████╗  █████╗  ██████╔╝
    ██║   ██║██║   ██║██╔══╝  ██╔══╝  ██╔══██╗
    ╚██████╔╝╚██████╔╝██║     ███████╗██║  ██║
     ╚═════╝  ╚═════╝ ╚═╝     ╚══════╝╚═╝  ╚═╝

    -------------------------------------
";

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn setup_api_key() -> Result<String> {
    let api_key: String = Input::new()
        .with_prompt("Enter your OpenAI API key")
        .interact_text()
        .context("Failed to read API key")?;

    if api_key.is_empty() {
        return Err(anyhow::anyhow!("API key cannot be empty"));
    }

    Ok(api_key)
}

fn setup_model() -> Result<String> {
    let models = vec!["gpt-4o-mini", "gpt-4o", "gpt-5-mini", "gpt-5"];

    let selection = Select::new()
        .with_prompt("Select your model")
        .items(&models)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok(models[selection].to_string())
}

fn setup_search() -> Result<SearchConfig> {
    println!(
        "  {}",
        style("Google Custom Search powers the web_search tool. Leave blank to skip.").dim()
    );
    let api_key: String = Input::new()
        .with_prompt("Search API key")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read search API key")?;
    let engine_id: String = Input::new()
        .with_prompt("Search engine id (cx)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read search engine id")?;

    Ok(SearchConfig {
        api_key: optional(api_key),
        engine_id: optional(engine_id),
    })
}

fn setup_proxy() -> Result<ProxyConfig> {
    println!(
        "  {}",
        style("proxy_call forwards JSON requests to a backend of yours. Leave blank to skip.")
            .dim()
    );
    let base_url: String = Input::new()
        .with_prompt("Proxy base URL")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read proxy base URL")?;
    let token: String = Input::new()
        .with_prompt("Proxy Authorization header")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read proxy token")?;

    Ok(ProxyConfig {
        base_url: optional(base_url),
        token: optional(token),
    })
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan().bold());

    println!("  {}", style("Welcome to Gofer!").white().bold());
    println!(
        "  {}",
        style("This wizard will configure your agent in under 30 seconds.").dim()
    );
    println!();

    print_step(1, 4, "API Key Setup");
    let api_key = setup_api_key()?;

    print_step(2, 4, "Model Selection");
    let model = setup_model()?;

    print_step(3, 4, "Web Search (optional)");
    let search = setup_search()?;

    print_step(4, 4, "Proxy Backend (optional)");
    let proxy = setup_proxy()?;

    let config = Config {
        api_key,
        model,
        search,
        proxy,
        ..Default::default()
    };

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(gofer_core::config::get_config_path().display()).cyan()
    );
    println!();
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("gofer chat").cyan().bold()
    );
    println!();

    Ok(config)
}
