//! In-process fakes for the checkout collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use checkout_service::models::{
    BillingDetails, BillingPeriod, CardInput, PaymentMethodRef, PromoOutcome, Session,
    SubscriptionResult,
};
use checkout_service::services::{
    CheckoutDeps, CheckoutRegistry, CreateSubscriptionError, PaymentTokenizer,
    PromoValidationError, PromoValidator, PlanCatalog, SessionStore, SubscriptionCreator,
    TokenizeError,
};

pub fn test_card() -> CardInput {
    CardInput {
        number: "4242424242424242".to_string(),
        exp_month: 12,
        exp_year: 2030,
        cvc: "123".to_string(),
    }
}

pub fn pro_result(period: BillingPeriod) -> SubscriptionResult {
    SubscriptionResult {
        tier: "Pro".to_string(),
        billing_period: period,
        effective_date: "2026-10-15".to_string(),
    }
}

/// Promo validator answering from a fixed table of codes.
#[derive(Default)]
pub struct FakePromo {
    prices: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    fail_with: Option<PromoValidationError>,
    pub calls: AtomicUsize,
}

impl FakePromo {
    pub fn with_code(mut self, code: &str, discounted_price: &str) -> Self {
        self.prices
            .insert(code.to_string(), discounted_price.to_string());
        self
    }

    pub fn with_delay(mut self, code: &str, delay: Duration) -> Self {
        self.delays.insert(code.to_string(), delay);
        self
    }

    pub fn failing(mut self, err: PromoValidationError) -> Self {
        self.fail_with = Some(err);
        self
    }
}

#[async_trait]
impl PromoValidator for FakePromo {
    async fn validate(&self, code: &str, _plan: &str) -> Result<PromoOutcome, PromoValidationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(code) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }

        let discounted_price = self.prices.get(code).cloned();
        Ok(PromoOutcome {
            code: code.to_string(),
            valid: discounted_price.is_some(),
            discounted_price,
        })
    }
}

/// Tokenizer returning a fixed outcome after an optional delay.
pub struct FakeTokenizer {
    outcome: Result<PaymentMethodRef, TokenizeError>,
    delay: Duration,
    pub calls: AtomicUsize,
    pub last_billing: Mutex<Option<BillingDetails>>,
}

impl FakeTokenizer {
    pub fn ok() -> Self {
        Self::with_outcome(Ok(PaymentMethodRef("pm_test_123".to_string())))
    }

    pub fn declining(reason: &str) -> Self {
        Self::with_outcome(Err(TokenizeError::Card {
            reason: reason.to_string(),
        }))
    }

    pub fn with_outcome(outcome: Result<PaymentMethodRef, TokenizeError>) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_billing: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PaymentTokenizer for FakeTokenizer {
    async fn tokenize(
        &self,
        _card: CardInput,
        billing: &BillingDetails,
    ) -> Result<PaymentMethodRef, TokenizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_billing.lock().unwrap() = Some(billing.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

/// Subscription creator returning a fixed outcome after an optional delay.
pub struct FakeCreator {
    outcome: Result<SubscriptionResult, CreateSubscriptionError>,
    delay: Duration,
    pub calls: AtomicUsize,
    pub last_promo_code: Mutex<Option<String>>,
    pub last_period: Mutex<Option<BillingPeriod>>,
}

impl FakeCreator {
    pub fn ok(result: SubscriptionResult) -> Self {
        Self::with_outcome(Ok(result))
    }

    pub fn with_outcome(outcome: Result<SubscriptionResult, CreateSubscriptionError>) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_promo_code: Mutex::new(None),
            last_period: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl SubscriptionCreator for FakeCreator {
    async fn create_subscription(
        &self,
        _payment_method: &PaymentMethodRef,
        _plan: &str,
        billing_period: BillingPeriod,
        promo_code: Option<&str>,
    ) -> Result<SubscriptionResult, CreateSubscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_promo_code.lock().unwrap() = promo_code.map(str::to_string);
        *self.last_period.lock().unwrap() = Some(billing_period);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

pub struct Harness {
    pub promo: Arc<FakePromo>,
    pub tokenizer: Arc<FakeTokenizer>,
    pub creator: Arc<FakeCreator>,
    pub sessions: SessionStore,
    pub registry: CheckoutRegistry,
}

impl Harness {
    pub fn new(promo: FakePromo, tokenizer: FakeTokenizer, creator: FakeCreator) -> Self {
        let promo = Arc::new(promo);
        let tokenizer = Arc::new(tokenizer);
        let creator = Arc::new(creator);
        let sessions = SessionStore::new();

        let deps = CheckoutDeps {
            promo: promo.clone(),
            tokenizer: tokenizer.clone(),
            creator: creator.clone(),
            sessions: sessions.clone(),
            success_delay: Duration::from_secs(3),
        };

        Self {
            promo,
            tokenizer,
            creator,
            sessions,
            registry: CheckoutRegistry::new(Arc::new(PlanCatalog::default()), deps),
        }
    }

    /// Happy-path harness: every collaborator succeeds.
    pub fn happy() -> Self {
        Self::new(
            FakePromo::default().with_code("SAVE20", "$7.20"),
            FakeTokenizer::ok(),
            FakeCreator::ok(pro_result(BillingPeriod::Monthly)),
        )
    }

    /// Register a signed-in visitor and return their id.
    pub fn signed_in_visitor(&self) -> Uuid {
        let visitor_id = Uuid::new_v4();
        self.sessions.insert(Session::with_identity(
            visitor_id,
            "Ada Lovelace".to_string(),
            "ada@example.com".to_string(),
        ));
        visitor_id
    }
}
