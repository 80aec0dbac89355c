//! Chat orchestration: the session manager, task dispatch state machine,
//! and streaming renderer.

pub mod dispatch;
pub mod manager;
pub mod renderer;

pub use dispatch::{FinishedGeneration, PreparedGeneration};
pub use manager::ChatSessionManager;
pub use renderer::{render_incremental, RenderSink};
