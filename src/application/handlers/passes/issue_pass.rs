//! IssuePassHandler - quota-gated admission control.
//!
//! The debit is the admission decision: it is a single conditional increment
//! in the ledger, so concurrent requests for the last slot cannot both win.
//! Everything after the debit that fails gives the slot back before the
//! error is returned.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::foundation::{AuthenticatedUser, GymId, Timestamp};
use crate::domain::gym::Gym;
use crate::domain::pass::{GymPass, PassError, PassKind};
use crate::domain::subscription::{DebitOutcome, Subscription};
use crate::ports::{BillingClient, GymRepository, PassRepository, SubscriptionLedger};

use crate::application::handlers::identity::{ResolveIdentityCommand, ResolveIdentityHandler};

/// Command to issue a pass for the authenticated caller.
#[derive(Debug, Clone)]
pub struct IssuePassCommand {
    pub caller: AuthenticatedUser,
    pub gym_id: GymId,
    pub kind: PassKind,
}

#[derive(Debug, Clone)]
pub struct IssuePassResult {
    pub pass: GymPass,
    pub gym: Gym,
    /// Counter value after the debit.
    pub used: i32,
    pub limit: i32,
}

pub struct IssuePassHandler {
    identity: Arc<ResolveIdentityHandler>,
    ledger: Arc<dyn SubscriptionLedger>,
    gyms: Arc<dyn GymRepository>,
    passes: Arc<dyn PassRepository>,
    billing: Arc<dyn BillingClient>,
}

impl IssuePassHandler {
    pub fn new(
        identity: Arc<ResolveIdentityHandler>,
        ledger: Arc<dyn SubscriptionLedger>,
        gyms: Arc<dyn GymRepository>,
        passes: Arc<dyn PassRepository>,
        billing: Arc<dyn BillingClient>,
    ) -> Self {
        Self {
            identity,
            ledger,
            gyms,
            passes,
            billing,
        }
    }

    pub async fn handle(&self, cmd: IssuePassCommand) -> Result<IssuePassResult, PassError> {
        // 1. Resolve identity
        let user = self
            .identity
            .handle(ResolveIdentityCommand::from(&cmd.caller))
            .await?;

        // 2. Gym must exist and be open for business
        let gym = self
            .gyms
            .find_by_id(cmd.gym_id)
            .await?
            .filter(|g| g.is_active)
            .ok_or(PassError::GymNotFound(cmd.gym_id))?;

        // 3. Active subscription
        let subscription = self
            .ledger
            .current_active(&user.id)
            .await?
            .ok_or_else(|| PassError::quota_exceeded("no active subscription"))?;

        // 4. Atomic debit
        let counter = cmd.kind.counter();
        let (used, limit) = match self.ledger.debit(&subscription.id, counter).await? {
            DebitOutcome::Debited { used, limit } => (used, limit),
            DebitOutcome::LimitReached => {
                info!(
                    user_id = %user.id,
                    subscription_id = %subscription.id,
                    kind = cmd.kind.as_str(),
                    "Pass refused, quota exhausted"
                );
                return Err(PassError::quota_exceeded(match cmd.kind {
                    PassKind::Member => "monthly visit limit reached",
                    PassKind::Guest => "guest pass limit reached",
                }));
            }
        };

        // 5. Snapshot price and persist, refunding the debit on failure
        match self.create_pass(&subscription, &cmd).await {
            Ok(pass) => {
                info!(
                    pass_id = %pass.id,
                    code = %pass.code,
                    user_id = %user.id,
                    gym_id = %gym.id,
                    used,
                    limit,
                    "Issued gym pass"
                );
                Ok(IssuePassResult {
                    pass,
                    gym,
                    used,
                    limit,
                })
            }
            Err(err) => {
                self.refund(&subscription, &cmd).await;
                Err(err)
            }
        }
    }

    async fn create_pass(
        &self,
        subscription: &Subscription,
        cmd: &IssuePassCommand,
    ) -> Result<GymPass, PassError> {
        let price = self
            .billing
            .tier_price(subscription.tier)
            .await
            .map_err(|e| PassError::upstream(e.to_string()))?;

        let pass = GymPass::issue(
            subscription.user_id,
            subscription.id,
            cmd.gym_id,
            cmd.kind,
            subscription.tier,
            price,
            Timestamp::now(),
        );

        match self.passes.insert(&pass).await {
            Ok(()) => Ok(pass),
            Err(err) if err.is_unique_violation() => {
                warn!(code = %pass.code, "Pass code collision, retrying once");
                let retry = pass.with_new_code();
                self.passes.insert(&retry).await?;
                Ok(retry)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn refund(&self, subscription: &Subscription, cmd: &IssuePassCommand) {
        match self.ledger.refund(&subscription.id, cmd.kind.counter()).await {
            Ok(_) => warn!(
                subscription_id = %subscription.id,
                kind = cmd.kind.as_str(),
                "Refunded debit after failed pass creation"
            ),
            Err(err) => error!(
                subscription_id = %subscription.id,
                error = %err,
                "Failed to refund debit after failed pass creation"
            ),
        }
    }
}
