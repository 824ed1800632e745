//! Idle-time accounting and timeout handling for sessions.

use crate::machine::Action;
use crate::pool::SessionPool;
use crate::session::SessionId;
use derive_getters::Getters;
use derive_setters::Setters;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Limits applied by [`sweep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct TimeoutPolicy {
    /// Silence tolerated before the last message is resent.
    idle_timeout: Duration,
    /// Resends of the last message before the session is dropped.
    max_resends: u32,
    /// Time allowed for the board that follows a RESUME.
    resume_timeout: Duration,
}

impl TimeoutPolicy {
    /// Creates a policy.
    pub fn new(idle_timeout: Duration, max_resends: u32, resume_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            max_resends,
            resume_timeout,
        }
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), 3, Duration::from_secs(5))
    }
}

/// Adds `elapsed` to the idle time of every connected session.
pub fn advance_idle<T>(pool: &mut SessionPool<T>, elapsed: Duration) {
    for session in pool.connected_sessions_mut() {
        session.idle += elapsed;
    }
}

/// Resends or drops sessions that have been quiet too long.
///
/// Returns the action for each affected session, in id order. Sessions
/// below their threshold are left untouched.
#[instrument(skip_all)]
pub fn sweep<T>(pool: &mut SessionPool<T>, policy: &TimeoutPolicy) -> Vec<(SessionId, Action)> {
    let mut actions = Vec::new();
    for session in pool.connected_sessions_mut() {
        let id = session.id;

        if session.awaiting_board() {
            if session.idle > policy.resume_timeout {
                warn!(session_id = id, "RESUME board never completed, dropping game");
                session.in_progress = false;
                actions.push((id, Action::Close));
            }
            continue;
        }

        if session.idle <= policy.idle_timeout {
            continue;
        }

        if !session.in_progress {
            info!(session_id = id, "Closing idle connection with no game in progress");
            actions.push((id, Action::Close));
        } else if session.resends < policy.max_resends {
            session.resends += 1;
            session.idle = Duration::ZERO;
            info!(
                session_id = id,
                resends = session.resends,
                max_resends = policy.max_resends,
                "Resending last message"
            );
            if let Some(msg) = session.last_sent {
                actions.push((id, Action::Reply(msg)));
            }
        } else {
            info!(session_id = id, "Pruned timed out game");
            session.in_progress = false;
            session.idle = Duration::ZERO;
            actions.push((id, Action::Close));
        }
    }
    actions
}
