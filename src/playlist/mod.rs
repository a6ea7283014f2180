pub mod assigner;
pub mod constraints;
pub mod export;
pub mod filters;
pub mod state;

pub use assigner::*;
pub use constraints::*;
pub use export::*;
pub use filters::*;
pub use state::*;
