//! Interactive chat command scoped to one episode.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(episode: i64, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::new(&settings)?;

    let Some((mut session, state)) = pipeline.chat(episode).await else {
        Output::error(&format!(
            "Episode {} not found. Run 'svar sync' to fetch the episode directory.",
            episode
        ));
        anyhow::bail!("episode {} not found", episode);
    };

    if !state.processed {
        Output::warning(&format!(
            "Episode {} has not been processed yet; answers will say so.",
            episode
        ));
        Output::info(&format!("Process it with: svar process {}", episode));
    }

    println!(
        "\n{} {}",
        style("Svar Chat").bold().cyan(),
        style(format!("(episode {}: {})", episode, session.episode_title())).dim()
    );
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            session.clear();
            Output::info("Conversation history cleared.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let answer = session.ask(input).await;
        spinner.finish_and_clear();

        println!("\n{} {}\n", style("Svar:").cyan().bold(), answer);
    }

    Ok(())
}
