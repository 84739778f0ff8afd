pub mod ingest_events;
pub mod ptr_resolution;

pub use ingest_events::{IncomingEvent, IngestEventsUseCase};
pub use ptr_resolution::PtrResolutionService;
