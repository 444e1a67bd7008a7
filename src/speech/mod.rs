pub mod whisper;

pub use whisper::WhisperRecognizer;

use crate::error::{MultiTranslateError, Result};
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, info};

/// A source of recognised speech. One call is one listening session.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Produce the final transcript of the session.
    async fn recognize(&self) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Cancels an in-progress listening session.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // notify_one stores a permit if nobody is waiting yet
        self.notify.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }
}

/// Run one listening session to its single terminal value.
///
/// Returns the trimmed text, [`MultiTranslateError::Speech`] for an empty
/// transcript, or [`MultiTranslateError::Cancelled`] if `cancel` fires first.
pub async fn listen(recognizer: &dyn SpeechRecognizer, cancel: &CancelHandle) -> Result<String> {
    if cancel.is_cancelled() {
        return Err(MultiTranslateError::Cancelled);
    }

    info!("Listening with {}", recognizer.name());

    let text = tokio::select! {
        result = recognizer.recognize() => result?,
        _ = cancel.cancelled() => {
            debug!("Listening session cancelled");
            return Err(MultiTranslateError::Cancelled);
        }
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(MultiTranslateError::Speech("Empty result".to_string()));
    }

    Ok(text.to_string())
}

/// Run [`listen`] until `interrupt` completes, whichever comes first.
///
/// `interrupt` only lives for this session and is dropped when it ends.
pub async fn listen_until<F>(recognizer: &dyn SpeechRecognizer, interrupt: F) -> Result<String>
where
    F: Future<Output = ()>,
{
    let cancel = CancelHandle::new();
    let session = listen(recognizer, &cancel);
    tokio::pin!(session);

    tokio::select! {
        result = &mut session => return result,
        _ = interrupt => cancel.cancel(),
    }
    session.await
}
