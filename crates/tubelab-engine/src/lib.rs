pub mod api;
pub mod core;
pub mod catalog;
pub mod reaction;
pub mod session;
pub mod effects;
pub mod bridge;

// Re-export key types at crate root for convenience
pub use api::command::LabCommand;
pub use api::config::{BreakPolicy, ConfigError, LabConfig};
pub use api::lab::{Lab, LabSnapshot};
pub use api::types::{AmbientConditions, ChemicalCharge, ChemicalId, Rgb};
pub use catalog::manifest::{Chemical, ChemicalClass, ChemicalManifest, PhysicalState};
pub use catalog::registry::ChemicalCatalog;
pub use core::time::FrameClock;
pub use core::timer::{TimerHandle, TimerQueue};
pub use reaction::insight::{Concentration, ReactionInsight, Thermal};
pub use reaction::resolver::{resolve, QuantityFactor, TemperatureFactor};
pub use reaction::result::{MatterState, Phenomenon, ReactionResult};
pub use session::machine::Session;
pub use session::rejection::CommandRejection;
pub use session::state::{ExplosionSnapshot, SessionEvent, SessionState};
pub use effects::orchestrator::{EffectOrchestrator, PourTiming};
pub use effects::registry::{EffectAction, EffectCategory, EffectSignal};
pub use bridge::protocol::{SignalBuffer, WireSignal, PROTOCOL_VERSION};
