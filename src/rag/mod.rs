//! Grounded answer and summary synthesis.
//!
//! Both synthesizers follow the same shape: gate on episode state, pull
//! transcript units through the retriever, render a prompt template, and
//! make one generation call. They never let an error escape to the
//! caller; the answer path degrades to fixed user-facing strings and the
//! summary path to "not available."

mod answer;
mod chat;
mod summary;

pub use answer::AnswerSynthesizer;
pub use chat::{ChatRole, ChatSession, ChatTurn};
pub use summary::SummarySynthesizer;

/// Join unit texts into the context block of a prompt.
///
/// Units are stitched with blank lines, preserving the order the caller
/// retrieved them in (similarity order for answers, transcript order for
/// summaries).
pub(crate) fn format_context<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    texts.into_iter().collect::<Vec<_>>().join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_context_preserves_order() {
        let context = format_context(["first", "second", "third"]);
        assert_eq!(context, "first\n\nsecond\n\nthird");
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context([]), "");
    }
}
