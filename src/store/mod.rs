//! Named data the solver reads: steady states, input shifts and the block registry.
pub mod registry;
pub mod steady_state;
pub mod types;

pub use registry::BlockRegistry;
pub use steady_state::SteadyState;
pub use types::Shift;
