pub mod check;

pub use check::{ScheduleCheckUseCase, ScheduleReport};
