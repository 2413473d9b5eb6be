use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::MosaicError;

/// Signal d'annulation à l'échelle d'une requête.
///
/// Cloner le token partage le même drapeau. L'annulation est coopérative :
/// le pipeline vérifie entre deux étapes et laisse toujours les tâches de
/// rangée en cours se terminer.
///
/// # Example
/// ```
/// use dm_core::cancel::CancelToken;
/// let token = CancelToken::new();
/// assert!(token.checkpoint().is_ok());
/// token.cancel();
/// assert!(token.checkpoint().is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Fresh, un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once `cancel` has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Barrière inter-étapes du pipeline.
    ///
    /// # Errors
    /// `MosaicError::Cancelled` once the token is cancelled.
    pub fn checkpoint(&self) -> Result<(), MosaicError> {
        if self.is_cancelled() {
            Err(MosaicError::Cancelled)
        } else {
            Ok(())
        }
    }
}
