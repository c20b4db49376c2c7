use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Shutdown signal shared by the processor loops, the dispatcher and its workers.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal, every waiter is released.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_terminated(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`Shutdown::shutdown`] has been called.
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let token = self.token.clone();
        async move { token.cancelled().await }
    }
}

#[cfg(test)]
mod test {
    use super::Shutdown;

    #[tokio::test]
    async fn test_shutdown_releases_waiters() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_terminated());

        let wait = shutdown.wait();
        let handle = tokio::spawn(wait);
        shutdown.shutdown();
        handle.await.unwrap();

        assert!(shutdown.is_terminated());
        // waiting after the fact resolves immediately
        shutdown.wait().await;
    }
}
