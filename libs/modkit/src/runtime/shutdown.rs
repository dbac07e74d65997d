use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Resolve once the process receives SIGTERM or SIGINT (Ctrl+C on every platform).
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
            _ = tokio::signal::ctrl_c() => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

/// Return a token that is cancelled when a shutdown signal arrives.
///
/// Must be called from within a tokio runtime.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(()) => tracing::info!("shutdown: signal received"),
            Err(e) => tracing::warn!(error = %e, "shutdown: failed to install signal handlers"),
        }
        trigger.cancel();
    });
    token
}
