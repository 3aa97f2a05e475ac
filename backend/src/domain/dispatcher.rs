//! In-process fan-out of committed domain events to side-effect handlers.
//!
//! Routing is fixed when the dispatcher is built: each event type owns one
//! [`HandlerSet`] inside the [`HandlerRegistry`], selected at compile time
//! through [`DispatchedEvent`]. Publishing runs every handler of the event's
//! type in registration order and isolates them from one another. A handler
//! returning an error, or panicking, is logged and skipped; the publisher only
//! ever sees a [`PublishReport`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{debug, error, warn};

use super::events::{
    BanAutoExpired, DomainEvent, PriceProposalEvaluated, ProposalAutoExpired, UserBanned,
    UserRegistered, UserUnlocked,
};
use super::ports::{
    AccountRepositoryError, CacheStoreError, ReportRepositoryError, StatisticsRepositoryError,
};

/// Failure of one handler invocation. Never escapes [`EventDispatcher`].
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Cache(#[from] CacheStoreError),
    #[error(transparent)]
    Accounts(#[from] AccountRepositoryError),
    #[error(transparent)]
    Reports(#[from] ReportRepositoryError),
    #[error(transparent)]
    Statistics(#[from] StatisticsRepositoryError),
    #[error("{message}")]
    Other { message: String },
}

impl HandlerError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Single-purpose subscriber to one event type.
///
/// Implementations must tolerate running more than once for the same event,
/// must not rely on sibling handlers, and must not mutate the event.
#[async_trait]
pub trait EventHandler<E>: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &E) -> Result<(), HandlerError>;
}

/// Outcome of one publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub event: &'static str,
    pub invoked: usize,
    pub failed: usize,
}

/// Ordered handlers for one event type.
pub struct HandlerSet<E> {
    handlers: Vec<Arc<dyn EventHandler<E>>>,
}

impl<E> Default for HandlerSet<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<E: Send + Sync> HandlerSet<E> {
    fn push(&mut self, handler: Arc<dyn EventHandler<E>>) {
        self.handlers.push(handler);
    }

    fn len(&self) -> usize {
        self.handlers.len()
    }

    async fn run(&self, event_name: &'static str, event: &E) -> PublishReport {
        let mut failed = 0;
        for handler in &self.handlers {
            let outcome = AssertUnwindSafe(handler.handle(event))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(())) => {
                    debug!(event = event_name, handler = handler.name(), "handler completed");
                }
                Ok(Err(err)) => {
                    failed += 1;
                    warn!(
                        event = event_name,
                        handler = handler.name(),
                        error = %err,
                        "handler failed; effect not applied"
                    );
                }
                Err(_) => {
                    failed += 1;
                    error!(
                        event = event_name,
                        handler = handler.name(),
                        "handler panicked; effect not applied"
                    );
                }
            }
        }
        PublishReport {
            event: event_name,
            invoked: self.handlers.len(),
            failed,
        }
    }
}

/// Compile-time routing from an event type to its handler set.
pub trait DispatchedEvent: Send + Sync + Sized + 'static {
    const NAME: &'static str;

    fn handlers(registry: &HandlerRegistry) -> &HandlerSet<Self>;

    fn handlers_mut(registry: &mut HandlerRegistry) -> &mut HandlerSet<Self>;
}

macro_rules! handler_registry {
    ($($field:ident: $event:ident => $name:literal),* $(,)?) => {
        /// One handler set per routed event type.
        #[derive(Default)]
        pub struct HandlerRegistry {
            $($field: HandlerSet<$event>,)*
        }

        $(
            impl DispatchedEvent for $event {
                const NAME: &'static str = $name;

                fn handlers(registry: &HandlerRegistry) -> &HandlerSet<Self> {
                    &registry.$field
                }

                fn handlers_mut(registry: &mut HandlerRegistry) -> &mut HandlerSet<Self> {
                    &mut registry.$field
                }
            }
        )*
    };
}

handler_registry! {
    user_banned: UserBanned => "user_banned",
    user_unlocked: UserUnlocked => "user_unlocked",
    user_registered: UserRegistered => "user_registered",
    proposal_evaluated: PriceProposalEvaluated => "price_proposal_evaluated",
    ban_auto_expired: BanAutoExpired => "ban_auto_expired",
    proposal_auto_expired: ProposalAutoExpired => "proposal_auto_expired",
}

/// Publish/subscribe bus with a handler set fixed at construction.
pub struct EventDispatcher {
    registry: HandlerRegistry,
}

impl EventDispatcher {
    pub fn builder() -> EventDispatcherBuilder {
        EventDispatcherBuilder {
            registry: HandlerRegistry::default(),
        }
    }

    /// Run every handler registered for the event's type.
    ///
    /// Returns once all handlers have run. Handlers that only enqueue work
    /// (notifications) return once the work is queued, not delivered.
    pub async fn publish(&self, event: impl Into<DomainEvent>) -> PublishReport {
        match event.into() {
            DomainEvent::UserBanned(event) => self.dispatch(&event).await,
            DomainEvent::UserUnlocked(event) => self.dispatch(&event).await,
            DomainEvent::UserRegistered(event) => self.dispatch(&event).await,
            DomainEvent::PriceProposalEvaluated(event) => self.dispatch(&event).await,
            DomainEvent::BanAutoExpired(event) => self.dispatch(&event).await,
            DomainEvent::ProposalAutoExpired(event) => self.dispatch(&event).await,
        }
    }

    /// Typed variant of [`EventDispatcher::publish`] that borrows the event.
    pub async fn dispatch<E: DispatchedEvent>(&self, event: &E) -> PublishReport {
        E::handlers(&self.registry).run(E::NAME, event).await
    }

    /// Number of handlers registered for `E`.
    pub fn handler_count<E: DispatchedEvent>(&self) -> usize {
        E::handlers(&self.registry).len()
    }
}

/// Static wiring of handlers before the dispatcher is shared.
pub struct EventDispatcherBuilder {
    registry: HandlerRegistry,
}

impl EventDispatcherBuilder {
    /// Append a handler for events of type `E`.
    #[must_use]
    pub fn subscribe<E: DispatchedEvent>(mut self, handler: Arc<dyn EventHandler<E>>) -> Self {
        E::handlers_mut(&mut self.registry).push(handler);
        self
    }

    pub fn build(self) -> EventDispatcher {
        EventDispatcher {
            registry: self.registry,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Fan-out and failure isolation.
    use super::*;
    use crate::domain::{AdminSummary, Email, UserId, UserSummary};
    use rstest::{fixture, rstest};
    use std::sync::Mutex;

    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed,
        Fail,
        Panic,
    }

    struct Recording {
        name: &'static str,
        behaviour: Behaviour,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl<E: Send + Sync + 'static> EventHandler<E> for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn handle(&self, _event: &E) -> Result<(), HandlerError> {
            self.calls.lock().expect("calls mutex").push(self.name);
            match self.behaviour {
                Behaviour::Succeed => Ok(()),
                Behaviour::Fail => Err(HandlerError::other("cache unreachable")),
                Behaviour::Panic => panic!("handler bug"),
            }
        }
    }

    fn recording(
        name: &'static str,
        behaviour: Behaviour,
        calls: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<Recording> {
        Arc::new(Recording {
            name,
            behaviour,
            calls: Arc::clone(calls),
        })
    }

    #[fixture]
    fn banned() -> UserBanned {
        UserBanned {
            user: UserSummary::new(
                UserId::random(),
                Email::new("banned@example.com").expect("valid email"),
                "Banned",
            ),
            admin: AdminSummary {
                id: UserId::random(),
                display_name: "Admin".to_owned(),
            },
            reason: "spam".to_owned(),
            duration_days: Some(3),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn failing_and_panicking_handlers_do_not_stop_siblings(banned: UserBanned) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = EventDispatcher::builder()
            .subscribe::<UserBanned>(recording("first", Behaviour::Fail, &calls))
            .subscribe::<UserBanned>(recording("second", Behaviour::Panic, &calls))
            .subscribe::<UserBanned>(recording("third", Behaviour::Succeed, &calls))
            .build();

        let report = dispatcher.publish(banned).await;

        assert_eq!(
            report,
            PublishReport {
                event: "user_banned",
                invoked: 3,
                failed: 2
            }
        );
        assert_eq!(
            *calls.lock().expect("calls mutex"),
            ["first", "second", "third"]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn events_reach_only_their_own_handlers(banned: UserBanned) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = EventDispatcher::builder()
            .subscribe::<UserBanned>(recording("ban", Behaviour::Succeed, &calls))
            .subscribe::<UserUnlocked>(recording("unlock", Behaviour::Succeed, &calls))
            .build();

        let unlocked = UserUnlocked {
            user: banned.user.clone(),
            admin: banned.admin.clone(),
        };
        dispatcher.publish(unlocked).await;

        assert_eq!(*calls.lock().expect("calls mutex"), ["unlock"]);
        assert_eq!(dispatcher.handler_count::<UserBanned>(), 1);
        assert_eq!(dispatcher.handler_count::<UserRegistered>(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn publishing_without_handlers_is_a_no_op(banned: UserBanned) {
        let dispatcher = EventDispatcher::builder().build();
        let report = dispatcher.dispatch(&banned).await;
        assert_eq!(report.invoked, 0);
        assert_eq!(report.failed, 0);
    }
}
