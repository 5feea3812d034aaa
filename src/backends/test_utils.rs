//! Test utilities and mock removers
//!
//! Mock implementations of `BackgroundRemover` so the session can be
//! exercised without an external program.

use crate::{
    config::RemovalOptions,
    error::{Result, StudioError},
    intake::ImageFile,
    remover::BackgroundRemover,
    services::PngNormalizer,
};
use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Encoded 2x2 fully transparent PNG
pub fn tiny_png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
    PngNormalizer::encode(&DynamicImage::ImageRgba8(img)).unwrap()
}

/// What a mock does when invoked
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return these bytes
    Succeed(Vec<u8>),
    /// Fail with this message
    Fail(String),
    /// Panic inside the capability
    Panic,
}

/// Mock remover with call history
#[derive(Debug, Clone)]
pub struct MockRemover {
    behavior: MockBehavior,
    delay: Option<Duration>,
    call_history: Arc<Mutex<Vec<(String, RemovalOptions)>>>,
}

impl MockRemover {
    /// Mock that returns a valid transparent PNG
    #[must_use]
    pub fn succeeding() -> Self {
        Self::with_behavior(MockBehavior::Succeed(tiny_png()))
    }

    /// Mock that fails with `message`
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(MockBehavior::Fail(message.to_string()))
    }

    /// Mock that panics
    #[must_use]
    pub fn panicking() -> Self {
        Self::with_behavior(MockBehavior::Panic)
    }

    #[must_use]
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sleep before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// File names and options seen so far
    pub fn get_call_history(&self) -> Vec<(String, RemovalOptions)> {
        self.call_history.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_history.lock().unwrap().len()
    }
}

#[async_trait]
impl BackgroundRemover for MockRemover {
    fn name(&self) -> &str {
        "mock"
    }

    async fn remove(&self, file: &ImageFile, options: &RemovalOptions) -> Result<Vec<u8>> {
        self.call_history
            .lock()
            .unwrap()
            .push((file.name.clone(), *options));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Succeed(bytes) => Ok(bytes.clone()),
            MockBehavior::Fail(message) => Err(StudioError::removal(message.clone())),
            MockBehavior::Panic => panic!("mock remover exploded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let mock = MockRemover::succeeding();
        let file = ImageFile::new("a.png", "image/png", vec![0u8]);

        let output = mock.remove(&file, &RemovalOptions::default()).await.unwrap();
        assert_eq!(output, tiny_png());
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.get_call_history()[0].0, "a.png");
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockRemover::failing("model load failed");
        let file = ImageFile::new("a.png", "image/png", vec![0u8]);

        let err = mock
            .remove(&file, &RemovalOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "model load failed");
    }
}
