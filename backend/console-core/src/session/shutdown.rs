use tokio::sync::watch;

/// Receiving side of the edge-triggered shutdown request.
///
/// Dropping the sender counts as a shutdown request, so an owner that goes
/// away without asking still stops the loop.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    requested: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn new(requested: watch::Receiver<bool>) -> Self {
        Self { requested }
    }

    /// A sender/signal pair for driving a session by hand.
    pub fn pair() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self::new(rx))
    }

    pub fn is_requested(&self) -> bool {
        *self.requested.borrow() || self.requested.has_changed().is_err()
    }

    /// Resolves once shutdown has been requested.
    pub async fn wait(&mut self) {
        loop {
            let requested = *self.requested.borrow_and_update();
            if requested {
                return;
            }
            if self.requested.changed().await.is_err() {
                return;
            }
        }
    }
}
