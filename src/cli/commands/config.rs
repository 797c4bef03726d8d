//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let mut settings = settings;
            set_value(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            // Try to open in editor
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply one dotted-key assignment to the settings.
fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.data_dir" => settings.general.data_dir = value.to_string(),
        "general.log_level" => settings.general.log_level = value.to_string(),
        "general.podcast_name" => settings.general.podcast_name = value.to_string(),
        "scraper.base_url" => settings.scraper.base_url = value.to_string(),
        "scraper.user_agent" => settings.scraper.user_agent = value.to_string(),
        "scraper.timeout_seconds" => settings.scraper.timeout_seconds = value.parse()?,
        "store.db_path" => settings.store.db_path = value.to_string(),
        "embedding.model" => settings.embedding.model = value.to_string(),
        "embedding.dimensions" => settings.embedding.dimensions = value.parse()?,
        "rag.model" => settings.rag.model = value.to_string(),
        "rag.answer_top_k" => settings.rag.answer_top_k = value.parse()?,
        "rag.temperature" => settings.rag.temperature = value.parse()?,
        "prompts.custom_dir" => settings.prompts.custom_dir = Some(value.to_string()),
        _ => anyhow::bail!(
            "Unknown configuration key: {}. Use 'svar config show' to see available keys.",
            key
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_known_keys() {
        let mut settings = Settings::default();

        set_value(&mut settings, "rag.answer_top_k", "8").unwrap();
        assert_eq!(settings.rag.answer_top_k, 8);

        set_value(&mut settings, "general.podcast_name", "Another Show").unwrap();
        assert_eq!(settings.general.podcast_name, "Another Show");

        set_value(&mut settings, "rag.temperature", "0.2").unwrap();
        assert!((settings.rag.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_set_value_unknown_key() {
        let mut settings = Settings::default();
        assert!(set_value(&mut settings, "nope.nope", "x").is_err());
    }

    #[test]
    fn test_set_value_bad_number() {
        let mut settings = Settings::default();
        assert!(set_value(&mut settings, "rag.answer_top_k", "four").is_err());
    }
}
