//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings, force: bool) -> anyhow::Result<()> {
    Output::header("Svar Setup");
    println!();
    println!("Welcome to Svar! Let's make sure everything is configured correctly.\n");

    // Step 1: Check API key
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    if std::env::var("OPENAI_API_KEY").is_err() {
        Output::warning("OPENAI_API_KEY environment variable is not set.");
        println!();
        println!("  Svar requires an OpenAI API key for embeddings and answers.");
        println!(
            "  Get your API key from: {}",
            style("https://platform.openai.com/api-keys").underlined()
        );
        println!();
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
    } else {
        Output::success("OpenAI API key is configured!");
    }

    println!();

    // Step 2: Create data directory
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    println!();

    // Step 3: Write config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() && !force {
        Output::info(&format!("Config file exists: {}", config_path.display()));
        Output::info("Use 'svar init --force' to overwrite it with defaults.");
    } else {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("svar config edit").green());
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("svar doctor").cyan());
    println!("  {} Fetch the episode directory", style("svar sync").cyan());
    println!(
        "  {} Index an episode transcript",
        style("svar process <episode>").cyan()
    );
    println!(
        "  {} Ask questions about an episode",
        style("svar ask <episode> \"<question>\"").cyan()
    );
    println!();
    println!("For more help: {}", style("svar --help").cyan());

    Ok(())
}
