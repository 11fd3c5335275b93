//! The rotation core: queues, confirmation workflow, membership, engine.

pub mod confirmation;
pub mod engine;
pub mod membership;
pub mod model;
pub mod queue;

pub use confirmation::ConfirmationWorkflow;
pub use engine::{Audience, EngineReply, Notification, RotationEngine};
pub use membership::MembershipTracker;
pub use model::{Participant, ParticipantId};
pub use queue::QueueRegistry;
