pub mod run;

pub use run::{RetentionReport, RetentionUseCase};
