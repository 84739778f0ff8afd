pub mod database;
pub mod logging;
pub mod security;

pub use database::init_database;
pub use logging::init_logging;
pub use security::enforce_security;
