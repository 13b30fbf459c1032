pub mod machine;
pub mod rejection;
pub mod state;

pub use machine::Session;
pub use rejection::CommandRejection;
pub use state::{ExplosionSnapshot, SessionEvent, SessionState};
