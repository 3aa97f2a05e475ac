//! Event-driven side effects and time-based reconciliation.
//!
//! Business code publishes a domain event through the [`EventDispatcher`]
//! after its transaction commits. Handlers invalidate cache entries, update
//! statistics, clear reports, and queue notifications; the
//! [`NotificationWorker`] delivers queued messages, and the reconciliation
//! sweeps revisit bans and proposals whose validity window has lapsed.
//!
//! Every collaborator outside this core is reached through a port in
//! [`ports`].

pub mod cache_aside;
pub mod cache_key;
pub mod dispatcher;
pub mod events;
pub mod handlers;
pub mod moderation;
pub mod notifications;
pub mod ports;
pub mod proposals;
pub mod reconciliation;
pub mod user;

pub use self::cache_aside::CacheAside;
pub use self::cache_key::{CacheKey, CacheKeyValidationError, CachePrefix};
pub use self::dispatcher::{
    EventDispatcher, EventDispatcherBuilder, EventHandler, HandlerError, PublishReport,
};
pub use self::events::{
    BanAutoExpired, DomainEvent, PriceProposalEvaluated, ProposalAutoExpired, UserBanned,
    UserRegistered, UserUnlocked,
};
pub use self::handlers::{SideEffectPorts, wire_dispatcher};
pub use self::moderation::{BanRecord, ReportStatus, UserReport};
pub use self::notifications::{
    DeliveryStats, NotificationQueue, NotificationQueueError, NotificationReceiver,
    NotificationWorker, OutboundMessage,
};
pub use self::proposals::{PriceProposal, ProposalStatistics, ProposalStatus, StationId};
pub use self::reconciliation::{
    BanExpirySweep, ProposalExpirySweep, ReconciliationError, Sweep, SweepItemError,
    SweepReport, run_periodic,
};
pub use self::user::{
    AdminSummary, Email, UserAccount, UserId, UserSummary, UserValidationError,
};
