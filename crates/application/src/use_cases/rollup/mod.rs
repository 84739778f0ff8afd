pub mod run;

pub use run::{RollupReport, RollupUseCase};
