//! Shared helpers for integration tests: mock removers, a recording
//! observer and generated image fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use bgremove_studio::{
    BackgroundRemover, ImageFile, IntakeRejection, ProcessingError, ProcessingStatus,
    RemovalOptions, Result, StatusObserver, StudioError,
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Encode a small gradient image in `format`
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut image = RgbaImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let intensity = ((x + y) % 100) as u8;
        *pixel = Rgba([intensity, 128, 255 - intensity, 255]);
    }
    let image = match format {
        // JPEG doesn't support alpha
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image).to_rgb8()),
        _ => DynamicImage::ImageRgba8(image),
    };

    let mut buffer = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut buffer), format)
        .unwrap();
    buffer
}

/// Transparent PNG, the shape of a real removal result
pub fn transparent_png() -> Vec<u8> {
    let image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

/// A dropped file of exactly `size` bytes
pub fn sized_file(name: &str, mime: &str, size: usize) -> ImageFile {
    ImageFile::new(name, mime, vec![0u8; size])
}

/// What the scripted remover answers
#[derive(Debug, Clone)]
pub enum Script {
    Return(Vec<u8>),
    Reject(String),
    Panic,
}

/// Remover that answers from a script and records the files it saw
pub struct ScriptedRemover {
    script: Script,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedRemover {
    pub fn returning(bytes: Vec<u8>) -> Self {
        Self::new(Script::Return(bytes))
    }

    pub fn rejecting(message: &str) -> Self {
        Self::new(Script::Reject(message.to_string()))
    }

    pub fn panicking() -> Self {
        Self::new(Script::Panic)
    }

    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold every call until `gate` is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackgroundRemover for ScriptedRemover {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn remove(&self, file: &ImageFile, _options: &RemovalOptions) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(file.name.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.script {
            Script::Return(bytes) => Ok(bytes.clone()),
            Script::Reject(message) => Err(StudioError::removal(message.clone())),
            Script::Panic => panic!("scripted remover panicked"),
        }
    }
}

/// Observer that records every notification
#[derive(Default)]
pub struct RecordingObserver {
    transitions: Mutex<Vec<(ProcessingStatus, ProcessingStatus)>>,
    rejections: Mutex<Vec<IntakeRejection>>,
    failures: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Status path starting from idle, e.g. [idle, processing, complete]
    pub fn path(&self) -> Vec<ProcessingStatus> {
        let transitions = self.transitions.lock().unwrap();
        let mut path = vec![ProcessingStatus::Idle];
        path.extend(transitions.iter().map(|(_, to)| *to));
        path
    }

    pub fn rejections(&self) -> Vec<IntakeRejection> {
        self.rejections.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl StatusObserver for RecordingObserver {
    fn on_transition(&self, from: ProcessingStatus, to: ProcessingStatus) {
        self.transitions.lock().unwrap().push((from, to));
    }

    fn on_rejected(&self, rejection: &IntakeRejection) {
        self.rejections.lock().unwrap().push(rejection.clone());
    }

    fn on_failure(&self, error: &ProcessingError) {
        self.failures.lock().unwrap().push(error.message.clone());
    }
}
