//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::error::Result;
use crate::openai::require_api_key;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Scraping needs only network access.
    Sync,
    /// Indexing spends embedding calls, so it needs the API key.
    Process,
    /// Answering and summarizing need the API key.
    Ask,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Sync => {
            // No credentials needed to scrape
        }
        Operation::Process | Operation::Ask => {
            require_api_key()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_sync_no_requirements() {
        // Sync should always pass pre-flight (no credentials required)
        assert!(check(Operation::Sync).is_ok());
    }
}
