//! Prompt templates for Svar.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.
//! The default templates carry the exact wording the answer and summary
//! pipelines were tuned against; the QA template's instruction to decline
//! rather than fabricate is the system's only guard against hallucinated
//! answers, so edit with care.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub answer: AnswerPrompts,
    pub summary: SummaryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompt for grounded question answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPrompts {
    pub template: String,
}

impl Default for AnswerPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are a helpful assistant answering questions about podcast episodes from the {{podcast}} podcast.

Episode Title: {{title}}

Context from the episode:
{{context}}

Question: {{question}}

Please provide a clear and accurate answer based on the context provided.
If the context doesn't contain enough information to answer the question,
please say so rather than making up information.

Answer:"#
                .to_string(),
        }
    }
}

/// Prompt for structured episode summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub template: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are a helpful assistant that creates concise summaries of podcast episodes.

Please create a comprehensive summary of the following podcast episode: {{title}}

Context:
{{context}}

Please provide a well-structured summary that includes:
1. Main topics discussed
2. Key insights and takeaways
3. Important guests or references mentioned
4. Overall themes and conclusions

Summary:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load answer prompt if file exists
            let answer_path = custom_path.join("answer.toml");
            if answer_path.exists() {
                let content = std::fs::read_to_string(&answer_path)?;
                prompts.answer = toml::from_str(&content)?;
            }

            // Load summary prompt if file exists
            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts
            .answer
            .template
            .contains("rather than making up information"));
        assert!(prompts.summary.template.contains("1. Main topics discussed"));
        assert!(prompts
            .summary
            .template
            .contains("4. Overall themes and conclusions"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_with_custom_precedence() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("podcast".to_string(), "Custom Cast".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("podcast".to_string(), "Override Cast".to_string());

        let result = prompts.render_with_custom("{{podcast}}", &vars);
        assert_eq!(result, "Override Cast");
    }
}
