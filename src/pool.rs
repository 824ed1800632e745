//! Fixed-capacity table of session slots.
//!
//! The pool is the only owner of session state. A slot is free while no
//! transport is attached to it; attaching a connection claims the lowest
//! free slot, and releasing hands the transport back for the caller to
//! close. The pool never grows, so a full pool is an explicit answer at
//! the acceptance boundary.

use crate::session::{Session, SessionId};
use tracing::{debug, info, instrument, warn};

/// Largest pool: ids must fit in one wire byte.
pub const MAX_POOL_SIZE: usize = SessionId::MAX as usize + 1;

#[derive(Debug)]
struct Slot<T> {
    session: Session,
    transport: Option<T>,
}

/// Bounded pool of sessions, each optionally bound to a transport `T`.
#[derive(Debug)]
pub struct SessionPool<T> {
    slots: Vec<Slot<T>>,
}

impl<T> SessionPool<T> {
    /// Creates `capacity` free slots with ids `0..capacity`.
    ///
    /// # Panics
    ///
    /// If `capacity` exceeds [`MAX_POOL_SIZE`]; configuration validation
    /// rejects such sizes before a pool is built.
    #[instrument]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity <= MAX_POOL_SIZE, "pool capacity {capacity} exceeds {MAX_POOL_SIZE}");
        info!(capacity, "Creating session pool");
        let slots = (0..capacity)
            .map(|id| Slot {
                session: Session::new(id as SessionId),
                transport: None,
            })
            .collect();
        Self { slots }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots with a transport attached.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.transport.is_some()).count()
    }

    /// Lowest free slot id, if any.
    pub fn free_slot(&self) -> Option<SessionId> {
        self.slots
            .iter()
            .position(|s| s.transport.is_none())
            .map(|index| index as SessionId)
    }

    /// True if a new connection could be taken.
    pub fn has_free_slot(&self) -> bool {
        self.free_slot().is_some()
    }

    /// Binds `transport` to the lowest free slot and resets its session.
    ///
    /// A full pool hands the transport back so the caller can close it.
    #[instrument(skip_all)]
    pub fn attach(&mut self, transport: T) -> Result<SessionId, T> {
        let Some(id) = self.free_slot() else {
            warn!(capacity = self.capacity(), "No free session slot");
            return Err(transport);
        };
        let slot = &mut self.slots[usize::from(id)];
        slot.session.reset();
        slot.transport = Some(transport);
        info!(session_id = id, "Attached connection to session slot");
        Ok(id)
    }

    /// Frees slot `id`, returning its transport if one was attached.
    #[instrument(skip(self))]
    pub fn release(&mut self, id: SessionId) -> Option<T> {
        let slot = self.slots.get_mut(usize::from(id))?;
        let transport = slot.transport.take();
        slot.session.reset();
        if transport.is_some() {
            debug!(session_id = id, "Released session slot");
        }
        transport
    }

    /// Whether slot `id` has a transport.
    pub fn is_connected(&self, id: SessionId) -> bool {
        self.slots
            .get(usize::from(id))
            .is_some_and(|s| s.transport.is_some())
    }

    /// Session in slot `id`.
    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.slots.get(usize::from(id)).map(|s| &s.session)
    }

    /// Mutable session in slot `id`.
    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.slots.get_mut(usize::from(id)).map(|s| &mut s.session)
    }

    /// Transport bound to slot `id`.
    pub fn transport(&self, id: SessionId) -> Option<&T> {
        self.slots.get(usize::from(id))?.transport.as_ref()
    }

    /// Mutable transport bound to slot `id`.
    pub fn transport_mut(&mut self, id: SessionId) -> Option<&mut T> {
        self.slots.get_mut(usize::from(id))?.transport.as_mut()
    }

    /// Sessions of every connected slot, in id order.
    pub fn connected_sessions_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.slots
            .iter_mut()
            .filter(|s| s.transport.is_some())
            .map(|s| &mut s.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_takes_lowest_free_slot() {
        let mut pool = SessionPool::new(3);
        assert_eq!(pool.attach("a"), Ok(0));
        assert_eq!(pool.attach("b"), Ok(1));
        assert_eq!(pool.release(0), Some("a"));
        assert_eq!(pool.attach("c"), Ok(0));
        assert_eq!(pool.transport(0), Some(&"c"));
        assert_eq!(pool.occupied(), 2);
    }

    #[test]
    fn test_full_pool_returns_transport() {
        let mut pool = SessionPool::new(2);
        pool.attach(1).unwrap();
        pool.attach(2).unwrap();
        assert!(!pool.has_free_slot());
        assert_eq!(pool.attach(3), Err(3));
    }

    #[test]
    fn test_attach_resets_previous_session() {
        let mut pool = SessionPool::new(1);
        pool.attach(()).unwrap();
        let session = pool.session_mut(0).unwrap();
        session.start_game();
        session.current_seq = 5;
        pool.release(0);

        pool.attach(()).unwrap();
        let session = pool.session(0).unwrap();
        assert!(!session.in_progress());
        assert_eq!(session.current_seq(), 0);
    }

    #[test]
    fn test_release_unknown_slot() {
        let mut pool: SessionPool<()> = SessionPool::new(1);
        assert_eq!(pool.release(0), None);
        assert_eq!(pool.release(9), None);
    }

    #[test]
    fn test_ids_match_slots() {
        let pool: SessionPool<()> = SessionPool::new(5);
        for id in 0..5 {
            assert_eq!(pool.session(id).map(Session::id), Some(id));
        }
        assert!(pool.session(5).is_none());
    }

    #[test]
    fn test_connected_sessions_skip_free_slots() {
        let mut pool = SessionPool::new(3);
        pool.attach('a').unwrap();
        pool.attach('b').unwrap();
        pool.release(0);
        let ids: Vec<_> = pool.connected_sessions_mut().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1]);
        assert!(pool.is_connected(1));
        assert!(!pool.is_connected(0));
    }
}
