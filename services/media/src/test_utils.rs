//! Stub frame extractors for tests

use crate::thumbnail_generator::FrameExtractor;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Write,
    Fail,
    Silent,
    Panic,
}

/// Extractor that counts invocations instead of running ffmpeg
#[derive(Debug)]
pub struct StubExtractor {
    outcome: Outcome,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubExtractor {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Writes a fake image and succeeds
    pub fn succeeding() -> Self {
        Self::new(Outcome::Write)
    }

    /// Always reports failure
    pub fn failing() -> Self {
        Self::new(Outcome::Fail)
    }

    /// Reports success without producing a file
    pub fn silent() -> Self {
        Self::new(Outcome::Silent)
    }

    /// Panics inside the extraction
    pub fn panicking() -> Self {
        Self::new(Outcome::Panic)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameExtractor for StubExtractor {
    async fn extract_frame(&self, _video_path: &Path, thumbnail_path: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.outcome {
            Outcome::Write => {
                tokio::fs::write(thumbnail_path, b"\xFF\xD8\xFF\xD9").await?;
                Ok(())
            }
            Outcome::Fail => Err(anyhow::anyhow!("stub extractor failure")),
            Outcome::Silent => Ok(()),
            Outcome::Panic => panic!("stub extractor panic"),
        }
    }
}
