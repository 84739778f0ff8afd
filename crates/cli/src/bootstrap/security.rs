use powerblockade_domain::AppConfig;
use tracing::{error, warn};

/// Refuse to serve with default admin credentials. Exits nonzero before any
/// listener is bound; `POWERBLOCKADE_ALLOW_INSECURE=true` downgrades the
/// refusal to a loud warning.
pub fn enforce_security(config: &AppConfig) {
    match config.validate_security() {
        Ok(issues) if issues.is_empty() => {}
        Ok(issues) => {
            warn!(
                "SECURITY WARNING (bypassed via POWERBLOCKADE_ALLOW_INSECURE):\n{}\nThis is UNSAFE for production use!",
                issues
                    .iter()
                    .map(|i| format!("  - {i}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
        Err(e) => {
            error!(
                "SECURITY ERROR - Cannot start with insecure configuration: {e}\n\
                 Set ADMIN_PASSWORD / ADMIN_SECRET_KEY to secure random values,\n\
                 or set POWERBLOCKADE_ALLOW_INSECURE=true (DEVELOPMENT ONLY)."
            );
            std::process::exit(1);
        }
    }
}
