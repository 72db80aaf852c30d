// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator session tracking.
//!
//! Gated commands require the operator to present the configured password
//! once per process lifetime. Sessions are in-memory and keyed by operator
//! id; each operator's entry is mutated only by that operator's own events.

use std::collections::HashSet;

use tokio::sync::Mutex;
use tracing::{info, warn};

/// In-memory set of operators who have presented the password.
pub struct OperatorSessions {
    password: String,
    authorized: Mutex<HashSet<i64>>,
}

impl OperatorSessions {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            authorized: Mutex::new(HashSet::new()),
        }
    }

    /// Checks a password attempt. A correct attempt authorizes the operator
    /// for the rest of the process lifetime; a wrong one mutates nothing.
    pub async fn authorize(&self, operator_id: i64, attempt: &str) -> bool {
        if attempt == self.password {
            self.authorized.lock().await.insert(operator_id);
            info!(operator_id, "operator authorized");
            true
        } else {
            warn!(operator_id, "failed authorization attempt");
            false
        }
    }

    pub async fn is_authorized(&self, operator_id: i64) -> bool {
        self.authorized.lock().await.contains(&operator_id)
    }

    /// Drops an operator's session, forcing re-authorization.
    pub async fn revoke(&self, operator_id: i64) {
        self.authorized.lock().await.remove(&operator_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn correct_password_authorizes() {
        let sessions = OperatorSessions::new("secret");
        assert!(!sessions.is_authorized(1).await);
        assert!(sessions.authorize(1, "secret").await);
        assert!(sessions.is_authorized(1).await);
    }

    #[tokio::test]
    async fn wrong_password_mutates_nothing() {
        let sessions = OperatorSessions::new("secret");
        assert!(!sessions.authorize(1, "guess").await);
        assert!(!sessions.is_authorized(1).await);
    }

    #[tokio::test]
    async fn sessions_are_per_operator() {
        let sessions = OperatorSessions::new("secret");
        sessions.authorize(1, "secret").await;
        assert!(sessions.is_authorized(1).await);
        assert!(!sessions.is_authorized(2).await);
    }

    #[tokio::test]
    async fn revoke_forces_reauthorization() {
        let sessions = OperatorSessions::new("secret");
        sessions.authorize(1, "secret").await;
        sessions.revoke(1).await;
        assert!(!sessions.is_authorized(1).await);
    }
}
