pub mod registry;
pub mod settings;

pub use registry::StrategyRegistry;
pub use settings::{Strategy, StrategyInput, StrategyQuery};
