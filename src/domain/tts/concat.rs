use crate::error::{TtsError, TtsResult};

/// Byte-concatenate fragments in chunk order.
///
/// `fragments[i]` must be the audio for chunk `i`; no separators are added
/// and nothing is re-encoded.
pub fn concat_fragments(fragments: Vec<Vec<u8>>, expected_chunks: usize) -> TtsResult<Vec<u8>> {
    if fragments.len() != expected_chunks {
        return Err(TtsError::FragmentMismatch {
            expected: expected_chunks,
            actual: fragments.len(),
        });
    }

    let total: usize = fragments.iter().map(Vec::len).sum();
    let mut merged_audio = Vec::with_capacity(total);
    for fragment in fragments {
        merged_audio.extend(fragment);
    }

    Ok(merged_audio)
}
