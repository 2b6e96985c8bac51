//! Shared harness for integration tests.
//!
//! Wires the full router over the in-memory adapters and a mock session
//! validator, the same graph `main.rs` builds over Postgres.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use gym_pass::adapters::auth::MockSessionValidator;
use gym_pass::adapters::http::{build_router, AppState, RouterOptions};
use gym_pass::adapters::memory::{
    InMemoryGymRepository, InMemoryPassRepository, InMemorySubscriptionLedger,
    InMemoryUserRepository, InMemoryWebhookEventRepository, RecordingNotifier,
    StaticBillingClient, StaticGeocoder,
};
use gym_pass::application::handlers::{
    BillingEventProcessor, BillingWebhookHandler, IssuePassHandler, NearestGymsService,
    NotificationDispatcher, ResolveIdentityHandler,
};
use gym_pass::domain::billing::{sign_payload, StripeWebhookVerifier};
use gym_pass::domain::foundation::{GymId, Timestamp, UserId};
use gym_pass::domain::geo::Coordinate;
use gym_pass::domain::gym::Gym;
use gym_pass::domain::subscription::{
    BillingPeriod, NewSubscription, Subscription, SubscriptionTier, TierLimits,
};
use gym_pass::domain::user::User;
use gym_pass::ports::{SubscriptionLedger, UserRepository};

pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const HOME_ZIP: &str = "10001";

pub fn gym(id: i64, lat: f64) -> Gym {
    Gym {
        id: GymId::new(id),
        name: format!("Gym {}", id),
        address: format!("{} Main St", id),
        city: Some("New York".to_string()),
        postal_code: None,
        chain: None,
        coordinate: Some(Coordinate::new(lat, -74.0)),
        is_active: true,
    }
}

pub struct Harness {
    pub users: Arc<InMemoryUserRepository>,
    pub ledger: Arc<InMemorySubscriptionLedger>,
    pub passes: Arc<InMemoryPassRepository>,
    pub events: Arc<InMemoryWebhookEventRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub sessions: Arc<MockSessionValidator>,
    pub identity: Arc<ResolveIdentityHandler>,
    pub issue_pass: Arc<IssuePassHandler>,
    pub processor: Arc<BillingEventProcessor>,
    pub router: Router,
}

pub struct HarnessBuilder {
    billing: StaticBillingClient,
    geocoder: StaticGeocoder,
    gyms: Vec<Gym>,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            billing: StaticBillingClient::with_default_prices(),
            geocoder: StaticGeocoder::new().with(HOME_ZIP, Coordinate::new(40.0, -74.0)),
            gyms: vec![gym(1, 45.0), gym(2, 40.1), gym(3, 42.0), gym(4, 40.2)],
        }
    }
}

impl HarnessBuilder {
    pub fn billing(mut self, billing: StaticBillingClient) -> Self {
        self.billing = billing;
        self
    }

    pub fn geocoder(mut self, geocoder: StaticGeocoder) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn build(self) -> Harness {
        let users = Arc::new(InMemoryUserRepository::new());
        let ledger = Arc::new(InMemorySubscriptionLedger::new());
        let passes = Arc::new(InMemoryPassRepository::new());
        let events = Arc::new(InMemoryWebhookEventRepository::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let gyms = Arc::new(InMemoryGymRepository::with_gyms(self.gyms));
        let billing = Arc::new(self.billing);
        let sessions = Arc::new(MockSessionValidator::new());

        let identity = Arc::new(ResolveIdentityHandler::new(users.clone()));
        let issue_pass = Arc::new(IssuePassHandler::new(
            identity.clone(),
            ledger.clone(),
            gyms.clone(),
            passes.clone(),
            billing.clone(),
        ));
        let processor = Arc::new(BillingEventProcessor::new(
            users.clone(),
            ledger.clone(),
            billing,
            Arc::new(self.geocoder),
            Arc::new(NearestGymsService::new(gyms)),
            Arc::new(NotificationDispatcher::new(notifier.clone())),
            events.clone(),
        ));
        let webhooks = Arc::new(BillingWebhookHandler::new(
            StripeWebhookVerifier::new(WEBHOOK_SECRET),
            processor.clone(),
        ));

        let router = build_router(
            AppState {
                issue_pass: issue_pass.clone(),
                webhooks,
                sessions: sessions.clone(),
            },
            &RouterOptions::default(),
        );

        Harness {
            users,
            ledger,
            passes,
            events,
            notifier,
            sessions,
            identity,
            issue_pass,
            processor,
            router,
        }
    }
}

impl Harness {
    pub fn new() -> Self {
        HarnessBuilder::default().build()
    }

    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// Registers `token` for `external_id` and returns the resolved user.
    pub async fn member(&self, token: &str, external_id: &str) -> User {
        let sessions = self.sessions.clone();
        let caller = gym_pass::domain::foundation::AuthenticatedUser::new(
            gym_pass::domain::foundation::ExternalIdentity::new(external_id).unwrap(),
            Some(format!("{}@example.com", token)),
            Some("Ana Silva".to_string()),
        );
        sessions.add_token(token, caller.clone());
        self.identity.handle((&caller).into()).await.unwrap()
    }

    /// Activates a subscription with `visits_used` already consumed.
    pub async fn subscribe(
        &self,
        user_id: UserId,
        tier: SubscriptionTier,
        visits_used: i32,
    ) -> Subscription {
        let sub = self
            .ledger
            .replace_active(NewSubscription {
                user_id,
                limits: TierLimits::for_tier(tier),
                period: BillingPeriod::one_month_from(Timestamp::now().date()),
                external_subscription_id: Some(format!("sub_{}", user_id)),
                external_customer_id: Some("cus_1".to_string()),
            })
            .await
            .unwrap();
        for _ in 0..visits_used {
            self.ledger
                .debit(&sub.id, gym_pass::domain::subscription::UsageCounter::Visits)
                .await
                .unwrap();
        }
        sub
    }

    pub async fn user(&self, user_id: &UserId) -> User {
        self.users.find_by_id(user_id).await.unwrap().unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn pass_request(token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/passes")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A webhook delivery signed now with the harness secret.
pub fn signed_webhook(payload: &serde_json::Value) -> Request<Body> {
    let body = payload.to_string();
    let signature = sign_payload(WEBHOOK_SECRET, Timestamp::now().as_unix_secs(), body.as_bytes());
    Request::builder()
        .method("POST")
        .uri("/billing/webhook")
        .header("Stripe-Signature", signature)
        .body(Body::from(body))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
