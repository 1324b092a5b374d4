use super::concat::concat_fragments;
use super::concurrency::{ConcurrencyBudget, ConcurrencyLimiter};
use super::text::{char_len, normalize_text, split_long_text, MaxChunkSize};
use crate::error::TtsResult;
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};

/// One bounded-length synthesis call, supplied by a vendor adapter.
///
/// The text passed in never exceeds the adapter's per-request limit when
/// called from [`LongSpeakOrchestrator`].
#[async_trait]
pub trait ChunkSynthesizer: Send + Sync {
    async fn synthesize_chunk(&self, chunk: &str) -> TtsResult<Vec<u8>>;
}

/// Synthesizes text longer than a single request allows: normalize, split,
/// fan out under a concurrency budget, then reassemble in chunk order.
#[derive(Debug, Clone)]
pub struct LongSpeakOrchestrator {
    max_chunk_size: MaxChunkSize,
    limiter: ConcurrencyLimiter,
}

impl LongSpeakOrchestrator {
    pub fn new(max_chunk_size: MaxChunkSize, budget: ConcurrencyBudget) -> Self {
        Self {
            max_chunk_size,
            limiter: ConcurrencyLimiter::new(budget),
        }
    }

    pub fn max_chunk_size(&self) -> MaxChunkSize {
        self.max_chunk_size
    }

    pub fn budget(&self) -> ConcurrencyBudget {
        self.limiter.budget()
    }

    /// Returns the assembled audio; the first chunk failure aborts the whole
    /// call and is returned unchanged.
    pub async fn long_speak<S>(&self, synthesizer: &S, text: &str) -> TtsResult<Vec<u8>>
    where
        S: ChunkSynthesizer + ?Sized,
    {
        let start_time = std::time::Instant::now();

        let normalized = normalize_text(text);
        let chunks = split_long_text(&normalized, self.max_chunk_size)?;

        tracing::info!(
            original_length = char_len(text),
            normalized_length = char_len(&normalized),
            chunk_count = chunks.len(),
            max_chunk_size = self.max_chunk_size.get(),
            max_concurrent_requests = %self.limiter.budget(),
            "Text split into chunks"
        );

        let fragments = self.synthesize_chunks(synthesizer, &chunks).await?;
        let audio_data = concat_fragments(fragments, chunks.len())?;

        let duration = start_time.elapsed();
        let characters_count = char_len(&normalized);
        let throughput_chars_per_sec = if duration.as_secs_f64() > 0.0 {
            characters_count as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        tracing::info!(
            latency_ms = duration.as_millis(),
            characters_count = characters_count,
            chunk_count = chunks.len(),
            audio_size_bytes = audio_data.len(),
            throughput_chars_per_sec = format!("{:.2}", throughput_chars_per_sec),
            "Long text synthesis completed"
        );

        Ok(audio_data)
    }

    /// Each task writes only its own slot, so completion order never leaks
    /// into the result.
    async fn synthesize_chunks<S>(&self, synthesizer: &S, chunks: &[String]) -> TtsResult<Vec<Vec<u8>>>
    where
        S: ChunkSynthesizer + ?Sized,
    {
        let mut slots: Vec<Option<Vec<u8>>> = vec![None; chunks.len()];
        let limiter = &self.limiter;

        let mut pending: FuturesUnordered<_> = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| async move {
                let result = limiter
                    .run(async {
                        tracing::debug!(
                            chunk_index = index,
                            chunk_size = char_len(chunk),
                            "Synthesizing chunk"
                        );
                        synthesizer.synthesize_chunk(chunk).await
                    })
                    .await;
                (index, result)
            })
            .collect();

        while let Some((index, result)) = pending.next().await {
            match result {
                Ok(fragment) => {
                    tracing::debug!(
                        chunk_index = index,
                        fragment_size = fragment.len(),
                        "Chunk synthesized"
                    );
                    slots[index] = Some(fragment);
                }
                Err(e) => {
                    tracing::error!(
                        chunk_index = index,
                        chunk_count = chunks.len(),
                        error = %e,
                        "Chunk synthesis failed, aborting long text synthesis"
                    );
                    return Err(e);
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }
}
