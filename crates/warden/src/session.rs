//! Pending-verification session store and grading.
//!
//! One session per user, held in memory only: challenges deliberately do not
//! survive a restart, a user just starts over. The store is an injected
//! collaborator so the engine and renderer stay testable in isolation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tokio::time::{Duration, interval};

use rookery_common::constants::{DEFAULT_MAX_ATTEMPTS, SWEEP_INTERVAL_SECS};
use rookery_common::{ChallengeProblem, VerificationSession, Verdict};

/// Keyed store of in-flight verification sessions
pub struct SessionStore {
    sessions: RwLock<HashMap<u64, VerificationSession>>,
    max_attempts: u32,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl SessionStore {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_attempts,
        }
    }

    /// Open a session for a freshly generated challenge, replacing any
    /// earlier one the user abandoned.
    pub async fn open(&self, user_id: u64, problem: &ChallengeProblem, ttl_secs: u64) {
        let session = VerificationSession::new(problem, ttl_secs);
        tracing::info!(
            user_id,
            pattern = %session.pattern_id,
            "Verification started"
        );
        self.sessions.write().await.insert(user_id, session);
    }

    pub async fn get(&self, user_id: u64) -> Option<VerificationSession> {
        self.sessions.read().await.get(&user_id).cloned()
    }

    pub async fn remove(&self, user_id: u64) -> Option<VerificationSession> {
        self.sessions.write().await.remove(&user_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Grade a submitted answer.
    ///
    /// Success, lockout, and expiry all consume the session; only a wrong
    /// answer with attempts to spare keeps it open. The remaining-attempt
    /// count in `Retry` is the real number, ready for user feedback.
    pub async fn grade(&self, user_id: u64, answer: i64) -> Verdict {
        let mut sessions = self.sessions.write().await;

        let Some(session) = sessions.get_mut(&user_id) else {
            tracing::debug!(user_id, "Graded submission with no open session");
            return Verdict::Expired;
        };

        if session.is_expired() {
            tracing::info!(user_id, "Verification expired");
            sessions.remove(&user_id);
            return Verdict::Expired;
        }

        if answer == session.answer {
            tracing::info!(user_id, "Verification passed");
            sessions.remove(&user_id);
            return Verdict::Passed;
        }

        session.attempts += 1;
        if session.attempts >= self.max_attempts {
            tracing::info!(user_id, attempts = session.attempts, "Verification locked out");
            sessions.remove(&user_id);
            Verdict::LockedOut
        } else {
            let remaining = self.max_attempts - session.attempts;
            tracing::info!(user_id, remaining, "Wrong answer");
            Verdict::Retry { remaining }
        }
    }

    /// Drop every expired session, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        before - sessions.len()
    }
}

/// Background sweeper: periodically purges expired sessions until shutdown
pub async fn session_sweeper(store: Arc<SessionStore>, mut shutdown: broadcast::Receiver<()>) {
    let mut tick = interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
    loop {
        tokio::select! {
            _ = tick.tick() => {
                let purged = store.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "Swept expired verification sessions");
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!("Session sweeper shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(answer: i64) -> ChallengeProblem {
        ChallengeProblem {
            pattern_id: "raven4".to_string(),
            problem_text: "Let x be the correct pattern\nf(x) = 2x\nWhat is f'(x) + x?".to_string(),
            answer,
        }
    }

    #[tokio::test]
    async fn test_correct_answer_consumes_session() {
        let store = SessionStore::default();
        store.open(1, &problem(42), 600).await;

        assert_eq!(store.grade(1, 42).await, Verdict::Passed);
        assert!(store.get(1).await.is_none());
        // Replaying the same answer finds no session
        assert_eq!(store.grade(1, 42).await, Verdict::Expired);
    }

    #[tokio::test]
    async fn test_retry_countdown_and_lockout() {
        let store = SessionStore::default();
        store.open(7, &problem(42), 600).await;

        assert_eq!(store.grade(7, 1).await, Verdict::Retry { remaining: 2 });
        assert_eq!(store.grade(7, 2).await, Verdict::Retry { remaining: 1 });
        assert_eq!(store.grade(7, 3).await, Verdict::LockedOut);
        assert!(store.get(7).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_discarded() {
        let store = SessionStore::default();
        store.open(9, &problem(42), 600).await;

        // Force the window closed
        {
            let mut sessions = store.sessions.write().await;
            sessions.get_mut(&9).unwrap().expires_at = chrono::Utc::now().timestamp() - 1;
        }

        assert_eq!(store.grade(9, 42).await, Verdict::Expired);
        assert!(store.get(9).await.is_none());
    }

    #[tokio::test]
    async fn test_reopening_resets_attempts() {
        let store = SessionStore::default();
        store.open(3, &problem(10), 600).await;
        assert_eq!(store.grade(3, 0).await, Verdict::Retry { remaining: 2 });

        store.open(3, &problem(11), 600).await;
        assert_eq!(store.get(3).await.unwrap().attempts, 0);
        assert_eq!(store.grade(3, 11).await, Verdict::Passed);
    }

    #[tokio::test]
    async fn test_sweeper_purges_and_stops() {
        let store = Arc::new(SessionStore::default());
        store.open(5, &problem(1), 600).await;
        {
            let mut sessions = store.sessions.write().await;
            sessions.get_mut(&5).unwrap().expires_at = chrono::Utc::now().timestamp() - 1;
        }

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(session_sweeper(store.clone(), shutdown_rx));

        // The first interval tick fires immediately
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.len().await, 0);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = SessionStore::default();
        store.open(1, &problem(5), 600).await;
        store.open(2, &problem(6), 600).await;

        {
            let mut sessions = store.sessions.write().await;
            sessions.get_mut(&2).unwrap().expires_at = chrono::Utc::now().timestamp() - 1;
        }

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get(1).await.is_some());
    }
}
