pub mod warm;

pub use warm::{PrecacheWarmUseCase, WarmingReport};
