//! Session reconciliation and storage.
//!
//! [`apply_subscription`] is the pure merge of a subscription result into a
//! session. [`SessionStore`] holds visitor sessions and applies that merge
//! under a single write lock so readers never observe a half-written
//! subscription.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Session, SubscriptionInfo, SubscriptionResult};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("Subscription result has an empty tier")]
    EmptyTier,

    #[error("Subscription result has an invalid effective date: {0}")]
    InvalidEffectiveDate(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),
}

fn is_valid_effective_date(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Merge `result` into `session`, returning the updated session.
///
/// Only the subscription fields change. A malformed result is rejected and
/// the input session is left as it was.
pub fn apply_subscription(
    session: &Session,
    result: &SubscriptionResult,
) -> Result<Session, ReconcileError> {
    if result.tier.trim().is_empty() {
        return Err(ReconcileError::EmptyTier);
    }
    if !is_valid_effective_date(&result.effective_date) {
        return Err(ReconcileError::InvalidEffectiveDate(
            result.effective_date.clone(),
        ));
    }

    Ok(Session {
        subscription: Some(SubscriptionInfo {
            tier: result.tier.clone(),
            billing_period: result.billing_period,
            effective_date: result.effective_date.clone(),
        }),
        ..session.clone()
    })
}

/// Shared in-memory store of visitor sessions.
///
/// Readers only ever receive cloned snapshots.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a session.
    pub fn insert(&self, session: Session) {
        self.sessions.write().insert(session.visitor_id, session);
    }

    /// Snapshot of a visitor's session.
    pub fn get(&self, visitor_id: Uuid) -> Option<Session> {
        self.sessions.read().get(&visitor_id).cloned()
    }

    /// Snapshot of a visitor's session, creating an anonymous one if needed.
    pub fn get_or_create(&self, visitor_id: Uuid) -> Session {
        if let Some(session) = self.get(visitor_id) {
            return session;
        }
        self.sessions
            .write()
            .entry(visitor_id)
            .or_insert_with(|| Session::anonymous(visitor_id))
            .clone()
    }

    /// Apply a subscription result to a visitor's session as one merge.
    pub fn reconcile(
        &self,
        visitor_id: Uuid,
        result: &SubscriptionResult,
    ) -> Result<Session, ReconcileError> {
        let mut sessions = self.sessions.write();
        let current = sessions
            .get(&visitor_id)
            .ok_or(ReconcileError::SessionNotFound(visitor_id))?;

        let updated = apply_subscription(current, result)?;
        sessions.insert(visitor_id, updated.clone());

        tracing::info!(
            visitor_id = %visitor_id,
            tier = %result.tier,
            billing_period = %result.billing_period,
            "Session subscription updated"
        );

        Ok(updated)
    }
}
