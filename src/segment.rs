//! Transcript segmentation.
//!
//! One paragraph becomes one retrievable unit. The paragraph breaks in
//! the source material already track topic shifts, and paragraph-sized
//! units keep retrieval prompts small, so no merging or splitting happens
//! here.

use crate::error::{Result, SvarError};
use crate::store::Episode;
use crate::vector_store::Unit;

/// Split an episode's transcript into ordered retrievable units.
///
/// Each unit carries the episode number, title, page URL, and its
/// zero-based position. Fails when there is nothing to segment; callers
/// must not proceed to indexing in that case.
pub fn segment_transcript(episode: &Episode) -> Result<Vec<Unit>> {
    let paragraphs = episode.transcript.as_deref().unwrap_or_default();
    if paragraphs.is_empty() {
        return Err(SvarError::EmptyTranscript(episode.episode_number));
    }

    Ok(paragraphs
        .iter()
        .enumerate()
        .map(|(i, text)| Unit {
            episode_number: episode.episode_number,
            episode_title: episode.title.clone(),
            ordinal: i as u32,
            text: text.clone(),
            url: episode.url.clone(),
        })
        .collect())
}
