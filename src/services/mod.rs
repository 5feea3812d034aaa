//! Services that keep host concerns out of the state machine

pub mod format;
pub mod io;
pub mod progress;

pub use format::{PngNormalizer, PROCESSED_MIME};
pub use io::ExportService;
pub use progress::{ConsoleObserver, NoOpObserver, StatusObserver, PROGRESS_MESSAGE};
