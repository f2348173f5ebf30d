//! Registry of open checkouts.
//!
//! A visitor has at most one open checkout. Opening another one dismisses the
//! previous checkout so that any result it still produces is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use super::catalog::PlanCatalog;
use super::orchestrator::{CheckoutDeps, CheckoutError, CheckoutOrchestrator};
use super::reconciler::SessionStore;

#[derive(Default)]
struct RegistryState {
    checkouts: HashMap<Uuid, Arc<CheckoutOrchestrator>>,
    by_visitor: HashMap<Uuid, Uuid>,
}

/// Owns every open checkout, keyed by checkout id.
pub struct CheckoutRegistry {
    catalog: Arc<PlanCatalog>,
    deps: CheckoutDeps,
    state: RwLock<RegistryState>,
}

impl CheckoutRegistry {
    pub fn new(catalog: Arc<PlanCatalog>, deps: CheckoutDeps) -> Self {
        Self {
            catalog,
            deps,
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.deps.sessions
    }

    /// Open a checkout for `plan`, replacing the visitor's current one.
    pub fn open(
        &self,
        visitor_id: Uuid,
        plan: &str,
    ) -> Result<Arc<CheckoutOrchestrator>, CheckoutError> {
        let tier = self
            .catalog
            .find_tier(plan)
            .cloned()
            .ok_or_else(|| CheckoutError::UnknownPlan(plan.to_string()))?;

        let session = self.deps.sessions.get_or_create(visitor_id);
        let checkout = CheckoutOrchestrator::open(
            Uuid::new_v4(),
            visitor_id,
            tier,
            session.identity.as_ref(),
            self.deps.clone(),
        );

        let mut state = self.state.write();
        if let Some(previous_id) = state.by_visitor.insert(visitor_id, checkout.id()) {
            if let Some(previous) = state.checkouts.remove(&previous_id) {
                previous.dismiss();
                tracing::info!(
                    visitor_id = %visitor_id,
                    checkout_id = %previous_id,
                    "Replaced open checkout"
                );
            }
        }
        let RegistryState {
            checkouts,
            by_visitor,
        } = &mut *state;
        checkouts.retain(|_, c| !c.is_discarded());
        checkouts.insert(checkout.id(), Arc::clone(&checkout));
        by_visitor.retain(|_, id| checkouts.contains_key(id));

        Ok(checkout)
    }

    /// Look up an open checkout.
    pub fn get(&self, checkout_id: Uuid) -> Result<Arc<CheckoutOrchestrator>, CheckoutError> {
        self.state
            .read()
            .checkouts
            .get(&checkout_id)
            .cloned()
            .ok_or(CheckoutError::NotFound(checkout_id))
    }

    /// Dismiss and forget a checkout.
    pub fn dismiss(&self, checkout_id: Uuid) -> Result<(), CheckoutError> {
        let mut state = self.state.write();
        let checkout = state
            .checkouts
            .remove(&checkout_id)
            .ok_or(CheckoutError::NotFound(checkout_id))?;

        let visitor_id = checkout.visitor_id();
        if state.by_visitor.get(&visitor_id) == Some(&checkout_id) {
            state.by_visitor.remove(&visitor_id);
        }
        checkout.dismiss();
        Ok(())
    }

    /// Number of checkouts currently tracked.
    pub fn len(&self) -> usize {
        self.state.read().checkouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BillingDetails, BillingPeriod, CardInput, CheckoutPhase, PaymentMethodRef, PromoOutcome,
        Session, SubscriptionResult,
    };
    use crate::services::contracts::{
        CreateSubscriptionError, PaymentTokenizer, PromoValidationError, PromoValidator,
        SubscriptionCreator, TokenizeError,
    };
    use crate::services::orchestrator::DEFAULT_SUCCESS_DELAY;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl PromoValidator for Unreachable {
        async fn validate(
            &self,
            _code: &str,
            _plan: &str,
        ) -> Result<PromoOutcome, PromoValidationError> {
            Err(PromoValidationError::Network("unreachable".to_string()))
        }
    }

    #[async_trait]
    impl PaymentTokenizer for Unreachable {
        async fn tokenize(
            &self,
            _card: CardInput,
            _billing: &BillingDetails,
        ) -> Result<PaymentMethodRef, TokenizeError> {
            Err(TokenizeError::GatewayUnavailable("unreachable".to_string()))
        }
    }

    #[async_trait]
    impl SubscriptionCreator for Unreachable {
        async fn create_subscription(
            &self,
            _payment_method: &PaymentMethodRef,
            _plan: &str,
            _billing_period: BillingPeriod,
            _promo_code: Option<&str>,
        ) -> Result<SubscriptionResult, CreateSubscriptionError> {
            Err(CreateSubscriptionError::Network("unreachable".to_string()))
        }
    }

    fn registry() -> CheckoutRegistry {
        let gateway = Arc::new(Unreachable);
        let deps = CheckoutDeps {
            promo: gateway.clone(),
            tokenizer: gateway.clone(),
            creator: gateway,
            sessions: SessionStore::new(),
            success_delay: DEFAULT_SUCCESS_DELAY,
        };
        CheckoutRegistry::new(Arc::new(PlanCatalog::default()), deps)
    }

    #[test]
    fn test_open_unknown_plan() {
        let registry = registry();
        let err = registry.open(Uuid::new_v4(), "Enterprise").unwrap_err();
        assert_eq!(err, CheckoutError::UnknownPlan("Enterprise".to_string()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_open_prefills_identity() {
        let registry = registry();
        let visitor_id = Uuid::new_v4();
        registry.sessions().insert(Session::with_identity(
            visitor_id,
            "Ada Lovelace".to_string(),
            "ada@example.com".to_string(),
        ));

        let checkout = registry.open(visitor_id, "Pro").unwrap();
        let view = checkout.view();

        assert_eq!(view.phase, CheckoutPhase::Idle);
        assert_eq!(view.name, "Ada Lovelace");
        assert_eq!(view.email, "ada@example.com");
    }

    #[test]
    fn test_reopen_replaces_previous_checkout() {
        let registry = registry();
        let visitor_id = Uuid::new_v4();

        let first = registry.open(visitor_id, "Pro").unwrap();
        let second = registry.open(visitor_id, "Business").unwrap();

        assert!(first.is_discarded());
        assert_eq!(first.phase(), CheckoutPhase::Closed);
        assert_eq!(registry.len(), 1);
        assert!(matches!(registry.get(first.id()), Err(CheckoutError::NotFound(_))));
        assert_eq!(registry.get(second.id()).unwrap().id(), second.id());
    }

    #[test]
    fn test_dismiss_forgets_checkout() {
        let registry = registry();
        let checkout = registry.open(Uuid::new_v4(), "Free").unwrap();

        registry.dismiss(checkout.id()).unwrap();

        assert!(checkout.is_discarded());
        assert!(registry.is_empty());
        assert_eq!(
            registry.dismiss(checkout.id()).unwrap_err(),
            CheckoutError::NotFound(checkout.id())
        );
    }

    #[test]
    fn test_open_prunes_closed_checkouts_of_other_visitors() {
        let registry = registry();
        let idle_visitor = Uuid::new_v4();

        let closed = registry.open(idle_visitor, "Pro").unwrap();
        closed.dismiss();
        let current = registry.open(Uuid::new_v4(), "Business").unwrap();

        let state = registry.state.read();
        assert_eq!(state.checkouts.len(), 1);
        assert_eq!(state.by_visitor.len(), 1);
        assert!(!state.by_visitor.contains_key(&idle_visitor));
        assert_eq!(
            state.by_visitor.get(&current.visitor_id()),
            Some(&current.id())
        );
    }

    #[test]
    fn test_open_creates_anonymous_session() {
        let registry = registry();
        let visitor_id = Uuid::new_v4();

        registry.open(visitor_id, "Pro").unwrap();

        let session = registry.sessions().get(visitor_id).expect("session should exist");
        assert!(session.identity.is_none());
    }
}
