pub mod audit_log;
pub mod recompile_flag;
pub mod settings_service;

pub use audit_log::AuditLog;
pub use recompile_flag::RecompileFlag;
pub use settings_service::SettingsService;
