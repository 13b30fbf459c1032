pub mod orchestrator;
pub mod pour;
pub mod registry;

pub use orchestrator::{EffectOrchestrator, PourTiming};
pub use pour::LabTimer;
pub use registry::{EffectAction, EffectCategory, EffectSignal};
