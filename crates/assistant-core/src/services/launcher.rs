use super::ServiceError;
use tracing::info;

/// Hands a path, URL or URI scheme (`tel:`, `whatsapp://`) to the OS.
pub trait Launcher {
    fn launch(&self, target: &str) -> Result<(), ServiceError>;
}

/// Opens targets with the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, target: &str) -> Result<(), ServiceError> {
        info!(target, "launching");
        open::that(target).map_err(|e| ServiceError::Launch(format!("{target}: {e}")))
    }
}
