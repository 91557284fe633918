//! Reference-counted handle over one physical store connection.
//!
//! The first `acquire` opens the connection, nested acquisitions bump a
//! counter, and dropping the last guard closes it again unless the handle was
//! built with `keep_open`. Release is tied to `Drop`, so every exit path of an
//! operation (including `?` returns) gives its reference back.

use std::cell::{Cell, Ref, RefCell};

use tracing::{debug, warn};

use super::error::StorageError;
use super::storage::ConnectionProvider;

pub struct StoreHandle<P: ConnectionProvider> {
    provider: P,
    conn: RefCell<Option<P::Conn>>,
    refs: Cell<usize>,
    keep_open: bool,
}

impl<P: ConnectionProvider> StoreHandle<P> {
    pub fn new(provider: P, keep_open: bool) -> Self {
        Self {
            provider,
            conn: RefCell::new(None),
            refs: Cell::new(0),
            keep_open,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Acquire the connection, opening it if nobody holds it.
    pub fn acquire(&self) -> Result<HandleGuard<'_, P>, StorageError> {
        if self.conn.borrow().is_none() {
            let conn = self.provider.open()?;
            *self.conn.borrow_mut() = Some(conn);
            debug!("Store connection opened");
        }
        self.refs.set(self.refs.get() + 1);
        Ok(HandleGuard { handle: self })
    }

    /// Outstanding guards
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.refs.get()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.conn.borrow().is_some()
    }

    /// Close the connection if no guard holds it. Returns whether it is closed.
    pub fn close(&self) -> Result<bool, StorageError> {
        if self.refs.get() > 0 {
            return Ok(false);
        }
        let taken = self.conn.borrow_mut().take();
        if let Some(conn) = taken {
            self.provider.close(conn)?;
            debug!("Store connection closed");
        }
        Ok(true)
    }

    fn release(&self) {
        let refs = self.refs.get().saturating_sub(1);
        self.refs.set(refs);
        if refs > 0 || self.keep_open {
            return;
        }
        let taken = self.conn.borrow_mut().take();
        if let Some(conn) = taken {
            match self.provider.close(conn) {
                Ok(()) => debug!("Store connection closed"),
                Err(e) => warn!(error = %e, "Failed to close store connection"),
            }
        }
    }
}

/// One counted reference to the shared connection.
pub struct HandleGuard<'a, P: ConnectionProvider> {
    handle: &'a StoreHandle<P>,
}

impl<P: ConnectionProvider> HandleGuard<'_, P> {
    /// Borrow the open connection.
    pub fn conn(&self) -> Result<Ref<'_, P::Conn>, StorageError> {
        Ref::filter_map(self.handle.conn.borrow(), Option::as_ref).map_err(|_| StorageError::Closed)
    }
}

impl<P: ConnectionProvider> Drop for HandleGuard<'_, P> {
    fn drop(&mut self) {
        self.handle.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider that hands out numbered fake connections.
    #[derive(Default)]
    struct CountingProvider {
        opened: Cell<u32>,
        closed: Cell<u32>,
    }

    impl ConnectionProvider for CountingProvider {
        type Conn = u32;

        fn open(&self) -> Result<u32, StorageError> {
            self.opened.set(self.opened.get() + 1);
            Ok(self.opened.get())
        }

        fn close(&self, _conn: u32) -> Result<(), StorageError> {
            self.closed.set(self.closed.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_nested_acquire_opens_once() {
        let handle = StoreHandle::new(CountingProvider::default(), false);

        let outer = handle.acquire().unwrap();
        {
            let inner = handle.acquire().unwrap();
            assert_eq!(handle.ref_count(), 2);
            assert_eq!(*inner.conn().unwrap(), 1);
        }
        assert_eq!(handle.ref_count(), 1);
        assert!(handle.is_open());
        assert_eq!(handle.provider().closed.get(), 0);

        drop(outer);
        assert_eq!(handle.ref_count(), 0);
        assert!(!handle.is_open());
        assert_eq!(handle.provider().opened.get(), 1);
        assert_eq!(handle.provider().closed.get(), 1);
    }

    #[test]
    fn test_reopen_after_release() {
        let handle = StoreHandle::new(CountingProvider::default(), false);

        drop(handle.acquire().unwrap());
        let guard = handle.acquire().unwrap();
        assert_eq!(*guard.conn().unwrap(), 2);
        drop(guard);

        assert_eq!(handle.provider().opened.get(), 2);
        assert_eq!(handle.provider().closed.get(), 2);
    }

    #[test]
    fn test_keep_open_survives_release() {
        let handle = StoreHandle::new(CountingProvider::default(), true);

        drop(handle.acquire().unwrap());
        assert!(handle.is_open());
        assert_eq!(handle.provider().closed.get(), 0);

        assert!(handle.close().unwrap());
        assert!(!handle.is_open());
        assert_eq!(handle.provider().closed.get(), 1);
    }

    #[test]
    fn test_close_refused_while_held() {
        let handle = StoreHandle::new(CountingProvider::default(), true);
        let guard = handle.acquire().unwrap();

        assert!(!handle.close().unwrap());
        assert!(guard.conn().is_ok());
    }

    #[test]
    fn test_release_on_error_path() {
        fn failing_op(handle: &StoreHandle<CountingProvider>) -> Result<(), StorageError> {
            let _guard = handle.acquire()?;
            Err(StorageError::MissingRow(42))
        }

        let handle = StoreHandle::new(CountingProvider::default(), false);
        assert!(failing_op(&handle).is_err());
        assert_eq!(handle.ref_count(), 0);
        assert!(!handle.is_open());
    }
}
