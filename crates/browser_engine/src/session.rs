use browser_logging::browser_info;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("session rejected: {0}")]
pub struct SessionError(pub String);

/// Hands a validated session URI to the remote-signing layer.
#[async_trait::async_trait]
pub trait SessionOpener: Send + Sync {
    async fn new_session(
        &self,
        uri: &str,
        redirect: Option<&str>,
        autosign: Option<&str>,
    ) -> Result<(), SessionError>;
}

/// Opener for hosts without a session layer; records the request in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSessionOpener;

#[async_trait::async_trait]
impl SessionOpener for LoggingSessionOpener {
    async fn new_session(
        &self,
        uri: &str,
        redirect: Option<&str>,
        autosign: Option<&str>,
    ) -> Result<(), SessionError> {
        browser_info!(
            "session: new session ({} chars, redirect={:?}, autosign={:?})",
            uri.len(),
            redirect,
            autosign
        );
        Ok(())
    }
}
