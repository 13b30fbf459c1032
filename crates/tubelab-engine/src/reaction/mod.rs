pub mod insight;
pub mod resolver;
pub mod result;

pub use insight::ReactionInsight;
pub use resolver::resolve;
pub use result::{MatterState, Phenomenon, ReactionResult};
