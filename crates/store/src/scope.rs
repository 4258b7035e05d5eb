//! Scoped transactions.

use crate::{Result, StoreError, store::{Store, StoreSession}};

/// A session borrowed for the duration of one atomic unit of work.
///
/// The scope is resolved exactly once: [`commit`](Self::commit),
/// [`rollback`](Self::rollback) and [`finish`](Self::finish) consume it.
/// A scope dropped before resolution, for example because the owning
/// future was cancelled by a timeout or a disconnected client, drops
/// its session, which rolls the transaction back and returns the
/// connection to the pool.
pub struct TransactionScope<S: StoreSession> {
    session: Option<S>,
}

impl<S: StoreSession> TransactionScope<S> {
    /// Acquires a session from `store` and begins a transaction.
    pub async fn begin<St>(store: &St) -> Result<Self>
    where
        St: Store<Session = S>,
    {
        let session = store.begin().await?;
        tracing::debug!("transaction scope opened");
        Ok(Self {
            session: Some(session),
        })
    }

    /// Returns the session for running statements inside the transaction.
    pub fn session(&mut self) -> &mut S {
        self.session
            .as_mut()
            .expect("session is present until the scope is resolved")
    }

    /// Commits the transaction and releases the session.
    pub async fn commit(mut self) -> Result<()> {
        let session = self.take();
        let result = session.commit().await;
        match &result {
            Ok(()) => metrics::counter!("transactions_committed_total").increment(1),
            Err(e) => tracing::error!(error = %e, "transaction commit failed"),
        }
        result
    }

    /// Rolls the transaction back and releases the session.
    pub async fn rollback(mut self) -> Result<()> {
        let session = self.take();
        metrics::counter!("transactions_rolled_back_total").increment(1);
        session.rollback().await
    }

    /// Resolves the scope from the outcome of the work done inside it.
    ///
    /// On `Ok` the transaction is committed; a failed commit is reported
    /// in place of the value. On `Err` the transaction is rolled back and
    /// the original error is returned; a failed rollback is only logged,
    /// since the session is discarded either way.
    pub async fn finish<T, E>(self, outcome: std::result::Result<T, E>) -> std::result::Result<T, E>
    where
        E: From<StoreError>,
    {
        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    tracing::error!(error = %rollback_err, "transaction rollback failed");
                }
                Err(err)
            }
        }
    }

    fn take(&mut self) -> S {
        self.session
            .take()
            .expect("transaction scope resolved twice")
    }
}

impl<S: StoreSession> Drop for TransactionScope<S> {
    fn drop(&mut self) {
        if self.session.take().is_some() {
            metrics::counter!("transactions_abandoned_total").increment(1);
            tracing::warn!("transaction scope dropped before resolution, rolling back");
        }
    }
}
