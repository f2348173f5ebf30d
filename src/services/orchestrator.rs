//! Checkout orchestrator.
//!
//! One [`CheckoutOrchestrator`] drives one open checkout through its phases:
//!
//! ```text
//! Idle -> ValidatingPromo -> Idle
//! Idle | Failed -> Submitting -> Success -> Closed
//!                            \-> Failed
//! any -> Closed (dismiss)
//! ```
//!
//! State transitions are serialized by a mutex that is released before every
//! gateway call. Gateway calls run on spawned tasks that own the checkout, so
//! every transition out of `ValidatingPromo` or `Submitting` lands even when
//! the request that started it is dropped. Results that arrive after the
//! checkout was superseded or dismissed are dropped.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::contracts::{
    CreateSubscriptionError, PaymentTokenizer, PromoValidationError, PromoValidator,
    SubscriptionCreator, TokenizeError,
};
use super::reconciler::{ReconcileError, SessionStore};
use crate::models::{
    BillingDetails, BillingPeriod, CardInput, CheckoutPhase, CheckoutSession, CheckoutView,
    Identity, PricingTier,
};

/// Default time a successful checkout stays open before closing itself.
pub const DEFAULT_SUCCESS_DELAY: Duration = Duration::from_secs(3);

/// Errors surfaced by checkout operations.
///
/// The display text of each variant is the message shown to the visitor.
/// Transport details are kept in the variant payload for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid promo code")]
    InvalidPromo,

    #[error("Error applying promo code")]
    PromoUnavailable(String),

    #[error("Your card was declined: {reason}")]
    Card { reason: String },

    #[error("Payment service is unavailable. Please try again.")]
    GatewayUnavailable(String),

    #[error("Network error. Please check your connection and try again.")]
    Network(String),

    #[error("{message}")]
    Billing {
        code: Option<String>,
        message: String,
    },

    #[error("Your subscription could not be confirmed. Please contact support.")]
    Reconcile(ReconcileError),

    #[error("Cannot {action} while checkout is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: CheckoutPhase,
    },

    #[error("A submission is already in progress")]
    AlreadySubmitting,

    #[error("Promo validation was superseded by a newer request")]
    Superseded,

    #[error("Checkout has been closed")]
    Discarded,

    #[error("Checkout not found")]
    NotFound(Uuid),

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),
}

impl CheckoutError {
    /// Message rendered on the checkout for this error.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<TokenizeError> for CheckoutError {
    fn from(err: TokenizeError) -> Self {
        match err {
            TokenizeError::Card { reason } => CheckoutError::Card { reason },
            TokenizeError::GatewayUnavailable(detail) => CheckoutError::GatewayUnavailable(detail),
        }
    }
}

impl From<CreateSubscriptionError> for CheckoutError {
    fn from(err: CreateSubscriptionError) -> Self {
        match err {
            CreateSubscriptionError::Billing { code, message } => {
                CheckoutError::Billing { code, message }
            }
            CreateSubscriptionError::Network(detail) => CheckoutError::Network(detail),
        }
    }
}

impl From<PromoValidationError> for CheckoutError {
    fn from(err: PromoValidationError) -> Self {
        CheckoutError::PromoUnavailable(err.to_string())
    }
}

impl From<ReconcileError> for CheckoutError {
    fn from(err: ReconcileError) -> Self {
        CheckoutError::Reconcile(err)
    }
}

/// Collaborators shared by every checkout.
#[derive(Clone)]
pub struct CheckoutDeps {
    pub promo: Arc<dyn PromoValidator>,
    pub tokenizer: Arc<dyn PaymentTokenizer>,
    pub creator: Arc<dyn SubscriptionCreator>,
    pub sessions: SessionStore,
    pub success_delay: Duration,
}

struct Inner {
    checkout: CheckoutSession,
    /// Bumped on every promo request; a reply for an older generation is stale
    promo_generation: u64,
    discarded: bool,
    close_timer: Option<JoinHandle<()>>,
}

/// State machine for a single open checkout.
pub struct CheckoutOrchestrator {
    inner: Mutex<Inner>,
    deps: CheckoutDeps,
}

impl std::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator").finish_non_exhaustive()
    }
}

fn first_validation_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    ["name", "email"]
        .iter()
        .filter_map(|field| fields.get(field))
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid input".to_string())
}

/// Validate the submitter's contact details, returning them trimmed.
pub fn validate_billing_details(name: &str, email: &str) -> Result<BillingDetails, CheckoutError> {
    let details = BillingDetails {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
    };
    details
        .validate()
        .map_err(|e| CheckoutError::Validation(first_validation_message(&e)))?;
    Ok(details)
}

impl CheckoutOrchestrator {
    /// Open a checkout for `tier` in the `Idle` phase.
    pub fn open(
        id: Uuid,
        visitor_id: Uuid,
        tier: PricingTier,
        identity: Option<&Identity>,
        deps: CheckoutDeps,
    ) -> Arc<Self> {
        tracing::info!(checkout_id = %id, visitor_id = %visitor_id, plan = %tier.name, "Checkout opened");
        Arc::new(Self {
            inner: Mutex::new(Inner {
                checkout: CheckoutSession::new(id, visitor_id, tier, identity),
                promo_generation: 0,
                discarded: false,
                close_timer: None,
            }),
            deps,
        })
    }

    pub fn id(&self) -> Uuid {
        self.inner.lock().checkout.id
    }

    pub fn visitor_id(&self) -> Uuid {
        self.inner.lock().checkout.visitor_id
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.inner.lock().checkout.phase
    }

    pub fn is_discarded(&self) -> bool {
        self.inner.lock().discarded
    }

    pub fn view(&self) -> CheckoutView {
        self.inner.lock().checkout.view()
    }

    /// Switch between monthly and yearly billing.
    ///
    /// Clears any applied promo and supersedes a pending promo validation,
    /// since both were quoted for the previous period.
    pub fn set_billing_period(&self, period: BillingPeriod) -> Result<CheckoutView, CheckoutError> {
        let mut inner = self.inner.lock();
        if inner.discarded {
            return Err(CheckoutError::Discarded);
        }

        let phase = inner.checkout.phase;
        if phase == CheckoutPhase::Submitting || phase.is_terminal() {
            return Err(CheckoutError::InvalidTransition {
                action: "change billing period",
                phase,
            });
        }

        if inner.checkout.billing_period != period {
            inner.checkout.billing_period = period;
            inner.checkout.applied_promo = None;
            if phase == CheckoutPhase::ValidatingPromo {
                inner.promo_generation += 1;
                inner.checkout.phase = CheckoutPhase::Idle;
            }
        }

        Ok(inner.checkout.view())
    }

    /// Validate `code` and apply it to the checkout when the backend accepts it.
    pub async fn apply_promo(self: &Arc<Self>, code: &str) -> Result<CheckoutView, CheckoutError> {
        let code = code.trim().to_string();

        let (generation, plan) = {
            let mut inner = self.inner.lock();
            if inner.discarded {
                return Err(CheckoutError::Discarded);
            }

            let phase = inner.checkout.phase;
            if !phase.accepts_input() && phase != CheckoutPhase::ValidatingPromo {
                return Err(CheckoutError::InvalidTransition {
                    action: "apply a promo code",
                    phase,
                });
            }

            if code.is_empty() {
                let err = CheckoutError::Validation("Promo code is required".to_string());
                inner.promo_generation += 1;
                inner.checkout.error = Some(err.user_message());
                inner.checkout.phase = CheckoutPhase::Idle;
                return Err(err);
            }

            inner.promo_generation += 1;
            inner.checkout.phase = CheckoutPhase::ValidatingPromo;
            inner.checkout.error = None;
            (inner.promo_generation, inner.checkout.tier.name.clone())
        };

        let this = Arc::clone(self);
        let task = tokio::spawn(async move { this.finish_promo(code, plan, generation).await });
        match task.await {
            Ok(result) => result,
            Err(e) => {
                let err = CheckoutError::PromoUnavailable(e.to_string());
                let mut inner = self.inner.lock();
                if inner.discarded {
                    return Err(CheckoutError::Discarded);
                }
                if inner.promo_generation == generation {
                    tracing::error!(checkout_id = %inner.checkout.id, "Promo validation task failed: {}", e);
                    inner.checkout.phase = CheckoutPhase::Idle;
                    inner.checkout.error = Some(err.user_message());
                }
                Err(err)
            }
        }
    }

    async fn finish_promo(
        &self,
        code: String,
        plan: String,
        generation: u64,
    ) -> Result<CheckoutView, CheckoutError> {
        let outcome = self.deps.promo.validate(&code, &plan).await;

        let mut inner = self.inner.lock();
        let checkout_id = inner.checkout.id;
        if inner.discarded {
            tracing::info!(checkout_id = %checkout_id, "Dropping promo result for closed checkout");
            return Err(CheckoutError::Discarded);
        }
        if inner.promo_generation != generation {
            tracing::debug!(checkout_id = %checkout_id, generation, "Dropping superseded promo result");
            return Err(CheckoutError::Superseded);
        }

        inner.checkout.phase = CheckoutPhase::Idle;
        match outcome {
            Ok(outcome) if outcome.valid => {
                tracing::info!(checkout_id = %checkout_id, plan = %plan, "Promo code applied");
                inner.checkout.applied_promo = Some(outcome);
                inner.checkout.error = None;
                Ok(inner.checkout.view())
            }
            Ok(_) => {
                let err = CheckoutError::InvalidPromo;
                inner.checkout.error = Some(err.user_message());
                Err(err)
            }
            Err(e) => {
                tracing::warn!(checkout_id = %checkout_id, "Promo validation failed: {}", e);
                let err = CheckoutError::from(e);
                inner.checkout.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Tokenize the card, create the subscription and merge it into the
    /// visitor's session.
    ///
    /// A second call while one is in flight is rejected, never queued. The
    /// gateway calls run on their own task, so the checkout still reaches
    /// `Success` or `Failed` if the caller stops waiting.
    pub async fn submit(
        self: &Arc<Self>,
        name: &str,
        email: &str,
        card: CardInput,
    ) -> Result<CheckoutView, CheckoutError> {
        let (details, plan, period, promo_code) = {
            let mut inner = self.inner.lock();
            if inner.discarded {
                return Err(CheckoutError::Discarded);
            }

            match inner.checkout.phase {
                CheckoutPhase::Submitting => return Err(CheckoutError::AlreadySubmitting),
                phase if !phase.accepts_input() => {
                    return Err(CheckoutError::InvalidTransition {
                        action: "submit",
                        phase,
                    })
                }
                _ => {}
            }

            inner.checkout.name = name.trim().to_string();
            inner.checkout.email = email.trim().to_string();

            let details = match validate_billing_details(name, email) {
                Ok(details) => details,
                Err(err) => {
                    inner.checkout.error = Some(err.user_message());
                    return Err(err);
                }
            };

            inner.checkout.phase = CheckoutPhase::Submitting;
            inner.checkout.error = None;
            inner.checkout.payment_method = None;

            let promo_code = inner
                .checkout
                .applied_promo
                .as_ref()
                .filter(|p| p.valid)
                .map(|p| p.code.clone());

            (
                details,
                inner.checkout.tier.name.clone(),
                inner.checkout.billing_period,
                promo_code,
            )
        };

        tracing::info!(
            checkout_id = %self.id(),
            plan = %plan,
            billing_period = %period,
            last4 = %card.last4(),
            "Checkout submission started"
        );

        let task = tokio::spawn(Arc::clone(self).run_submission(
            card, details, plan, period, promo_code,
        ));
        match task.await {
            Ok(result) => result,
            Err(e) => Err(self.fail(CheckoutError::Network(format!(
                "submission task failed: {}",
                e
            )))),
        }
    }

    async fn run_submission(
        self: Arc<Self>,
        card: CardInput,
        details: BillingDetails,
        plan: String,
        period: BillingPeriod,
        promo_code: Option<String>,
    ) -> Result<CheckoutView, CheckoutError> {
        let payment_method = match self.deps.tokenizer.tokenize(card, &details).await {
            Ok(pm) => pm,
            Err(e) => return Err(self.fail(e.into())),
        };

        {
            let mut inner = self.inner.lock();
            if inner.discarded {
                tracing::info!(checkout_id = %inner.checkout.id, "Checkout closed after tokenization, stopping");
                return Err(CheckoutError::Discarded);
            }
            inner.checkout.payment_method = Some(payment_method.clone());
        }

        let result = match self
            .deps
            .creator
            .create_subscription(&payment_method, &plan, period, promo_code.as_deref())
            .await
        {
            Ok(result) => result,
            Err(e) => return Err(self.fail(e.into())),
        };

        let mut inner = self.inner.lock();
        let checkout_id = inner.checkout.id;
        if inner.discarded {
            tracing::warn!(
                checkout_id = %checkout_id,
                tier = %result.tier,
                "Dropping subscription result for closed checkout"
            );
            return Err(CheckoutError::Discarded);
        }

        if let Err(e) = self.deps.sessions.reconcile(inner.checkout.visitor_id, &result) {
            drop(inner);
            tracing::error!(checkout_id = %checkout_id, "Failed to reconcile subscription: {}", e);
            return Err(self.fail(e.into()));
        }

        inner.checkout.phase = CheckoutPhase::Success;
        inner.checkout.result = Some(result);
        inner.close_timer = Some(self.schedule_close());

        tracing::info!(checkout_id = %checkout_id, plan = %plan, "Checkout succeeded");
        Ok(inner.checkout.view())
    }

    /// Close the checkout. Returns false if it was already closed.
    pub fn dismiss(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.discarded {
            return false;
        }

        inner.discarded = true;
        inner.checkout.phase = CheckoutPhase::Closed;
        if let Some(timer) = inner.close_timer.take() {
            timer.abort();
        }

        tracing::info!(checkout_id = %inner.checkout.id, "Checkout dismissed");
        true
    }

    fn fail(&self, err: CheckoutError) -> CheckoutError {
        let mut inner = self.inner.lock();
        if inner.discarded {
            tracing::info!(checkout_id = %inner.checkout.id, "Dropping failure for closed checkout: {:?}", err);
            return CheckoutError::Discarded;
        }

        tracing::warn!(checkout_id = %inner.checkout.id, error = ?err, "Checkout submission failed");
        inner.checkout.phase = CheckoutPhase::Failed;
        inner.checkout.error = Some(err.user_message());
        inner.checkout.payment_method = None;
        err
    }

    fn schedule_close(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let delay = self.deps.success_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(this) = weak.upgrade() {
                let mut inner = this.inner.lock();
                if !inner.discarded && inner.checkout.phase == CheckoutPhase::Success {
                    inner.discarded = true;
                    inner.checkout.phase = CheckoutPhase::Closed;
                    inner.close_timer = None;
                    tracing::debug!(checkout_id = %inner.checkout.id, "Checkout closed after success");
                }
            }
        })
    }
}
