pub mod admin;
pub mod engine;
pub mod session;
pub mod states;
pub mod validation;

pub use engine::{EngineError, EngineSettings, FlowEngine};
pub use session::{Session, SessionStore};
pub use states::{FlowEvent, FlowState, SelectedItem};
