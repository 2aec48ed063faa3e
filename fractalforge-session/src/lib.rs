pub mod controller;
pub mod history;
pub mod session;

pub use controller::{Phase, RenderController};
pub use history::{ViewHistory, ViewSnapshot};
pub use session::{FractalSession, SessionState};
