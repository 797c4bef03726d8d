//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(episode: i64, question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::new(&settings)?;

    let spinner = Output::spinner("Searching the episode transcript...");
    let answer = pipeline.answer(question, episode).await;
    spinner.finish_and_clear();

    println!("\n{}\n", answer);

    Ok(())
}
