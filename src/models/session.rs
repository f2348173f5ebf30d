//! Visitor session model.
//!
//! A session carries the visitor's identity and, once they have subscribed,
//! their current subscription. Only the checkout flow writes the subscription
//! fields; identity is owned by whoever created the session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::BillingPeriod;

/// Who the visitor is, if they are signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// The subscription currently attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    /// Tier name the visitor is subscribed to
    pub tier: String,

    /// Billing cadence
    pub billing_period: BillingPeriod,

    /// Date the subscription took effect, as reported by the billing backend
    pub effective_date: String,
}

/// Visitor session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Visitor identifier
    pub visitor_id: Uuid,

    /// Signed-in identity (None for anonymous visitors)
    pub identity: Option<Identity>,

    /// Active subscription, if any
    pub subscription: Option<SubscriptionInfo>,
}

impl Session {
    /// Creates an anonymous session with no subscription.
    pub fn anonymous(visitor_id: Uuid) -> Self {
        Self {
            visitor_id,
            identity: None,
            subscription: None,
        }
    }

    /// Creates a session for a signed-in visitor.
    pub fn with_identity(visitor_id: Uuid, name: String, email: String) -> Self {
        Self {
            visitor_id,
            identity: Some(Identity { name, email }),
            subscription: None,
        }
    }

    /// Name of the tier the visitor is currently on.
    pub fn current_tier(&self) -> Option<&str> {
        self.subscription.as_ref().map(|s| s.tier.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_session() {
        let id = Uuid::new_v4();
        let session = Session::anonymous(id);

        assert_eq!(session.visitor_id, id);
        assert!(session.identity.is_none());
        assert!(session.current_tier().is_none());
    }

    #[test]
    fn test_session_serialization() {
        let mut session = Session::with_identity(
            Uuid::new_v4(),
            "Ada Lovelace".to_string(),
            "ada@example.com".to_string(),
        );
        session.subscription = Some(SubscriptionInfo {
            tier: "Pro".to_string(),
            billing_period: BillingPeriod::Yearly,
            effective_date: "2026-10-15".to_string(),
        });

        let json = serde_json::to_string(&session).expect("Failed to serialize session");
        assert!(json.contains("\"tier\":\"Pro\""));
        assert!(json.contains("\"billing_period\":\"yearly\""));
        assert!(json.contains("\"email\":\"ada@example.com\""));
    }
}
