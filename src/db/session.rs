//! Unit of work over a [`Store`].
//!
//! A session lazily begins a transaction on first use and keeps it open
//! until [`Session::commit`], [`Session::rollback`] or [`Session::close`].
//! Reads inside it see the session's own uncommitted writes. A transaction
//! pins one WAL snapshot, so callers end it after every unit of work to see
//! what other sessions have committed since.
//!
//! Closing is terminal: a closed session rejects every further call with
//! [`Error::SessionClosed`] instead of quietly starting a new transaction.

use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::Transaction;
use tracing::debug;

use super::Store;
use crate::error::{Error, Result};

pub struct Session {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
    active: bool,
}

impl Session {
    /// Open a fresh session bound to `store`. No connection is taken from
    /// the pool until the first query.
    pub fn open(store: &Store) -> Self {
        Self {
            pool: store.pool().clone(),
            tx: None,
            active: true,
        }
    }

    /// `false` once the session has been closed.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Connection for the current transaction, beginning one if needed.
    pub async fn conn(&mut self) -> Result<&mut SqliteConnection> {
        if !self.active {
            return Err(Error::SessionClosed);
        }
        if self.tx.is_none() {
            let tx = self.pool.begin().await?;
            debug!("Transaction started");
            self.tx = Some(tx);
        }
        match self.tx.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(Error::SessionClosed),
        }
    }

    /// Commit pending work. A commit with nothing pending succeeds trivially.
    pub async fn commit(&mut self) -> Result<()> {
        if !self.active {
            return Err(Error::SessionClosed);
        }
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
            debug!("Transaction committed");
        }
        Ok(())
    }

    /// Discard uncommitted work. The session stays usable; a closed session
    /// has nothing to roll back.
    pub async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            debug!("Transaction rolled back");
        }
        Ok(())
    }

    /// Discard uncommitted work and release the pooled connection.
    ///
    /// Closing an already closed session is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        self.active = false;
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            debug!("Transaction rolled back on close");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("active", &self.active)
            .field("in_transaction", &self.tx.is_some())
            .finish()
    }
}
