mod enricher;
mod static_provider;

pub use enricher::*;
pub use static_provider::*;
