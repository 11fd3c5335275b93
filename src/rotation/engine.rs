//! Rotation engine — orchestrates queues, confirmations, and membership
//! behind one operation per external action.
//!
//! The engine owns all rotation state and the snapshot store. Every
//! successful mutating operation persists exactly one snapshot before its
//! reply is returned, so the on-disk state never lags a reply the user has
//! already seen. Operations are not deduplicated against retried transport
//! events; a retried action is simply processed again.

use crate::config::RotaConfig;
use crate::error::{Result, RotationError};
use crate::rotation::confirmation::ConfirmationWorkflow;
use crate::rotation::membership::MembershipTracker;
use crate::rotation::model::{Participant, ParticipantId};
use crate::rotation::queue::QueueRegistry;
use crate::store::{Snapshot, SnapshotStore};

/// Who a notification is for. The transport resolves these to chat ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// The participant whose action triggered the operation.
    Actor,
    /// The configured group chat.
    Group,
    /// A specific participant, addressed directly.
    Participant(ParticipantId),
}

/// One outbound message directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub audience: Audience,
    pub text: String,
}

/// The result of an engine operation: zero or more notifications to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineReply {
    pub notifications: Vec<Notification>,
}

impl EngineReply {
    fn tell(mut self, audience: Audience, text: impl Into<String>) -> Self {
        self.notifications.push(Notification {
            audience,
            text: text.into(),
        });
        self
    }

    fn actor(text: impl Into<String>) -> Self {
        Self::default().tell(Audience::Actor, text)
    }
}

/// The composition root: queue registry + confirmation workflow +
/// membership tracker + snapshot store.
pub struct RotationEngine {
    config: RotaConfig,
    queues: QueueRegistry,
    membership: MembershipTracker,
    confirmations: ConfirmationWorkflow,
    store: SnapshotStore,
}

impl RotationEngine {
    /// Load persisted state and build the engine.
    pub async fn load(config: RotaConfig, store: SnapshotStore) -> Self {
        let snapshot = store.load().await;
        let queues = QueueRegistry::from_snapshot(&config.categories, snapshot.queues);
        let membership = MembershipTracker::from_snapshot(snapshot.membership);
        // Drop pending claims whose claimant is no longer in the queue, or
        // whose category is no longer configured.
        let pending = snapshot
            .pending
            .into_iter()
            .filter(|(category, claimant)| {
                let keep = queues.contains(category, &claimant.id);
                if !keep {
                    tracing::warn!(
                        category,
                        claimant = %claimant.username,
                        "Dropping orphaned pending confirmation from snapshot"
                    );
                }
                keep
            })
            .collect();
        let confirmations = ConfirmationWorkflow::from_snapshot(pending);

        Self {
            config,
            queues,
            membership,
            confirmations,
            store,
        }
    }

    pub fn config(&self) -> &RotaConfig {
        &self.config
    }

    fn is_supervisor(&self, id: &ParticipantId) -> bool {
        *id == ParticipantId::Telegram(self.config.supervisor_id)
    }

    fn check_category(&self, category: &str) -> Result<()> {
        if self.config.has_category(category) {
            Ok(())
        } else {
            Err(RotationError::unknown_category(category).into())
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            queues: self.queues.snapshot().clone(),
            membership: self.membership.snapshot().clone(),
            pending: self.confirmations.snapshot().clone(),
        }
    }

    async fn persist(&self) -> Result<()> {
        self.store.save(&self.snapshot()).await?;
        Ok(())
    }

    /// Greeting for a participant's first contact; lists the categories they
    /// have not joined yet.
    pub fn on_start(&self, actor: &Participant) -> EngineReply {
        if self
            .membership
            .has_joined_all(&actor.id, &self.config.categories)
        {
            return EngineReply::actor(format!(
                "Welcome back, {}. You are enrolled in every rotation. /status shows the queues.",
                actor.username
            ));
        }
        let missing = self
            .membership
            .missing_categories(&actor.id, &self.config.categories);
        let greeting = if self.membership.has_joined_any(&actor.id) {
            format!("Hi {}.", actor.username)
        } else {
            format!("Hi {}, I run the duty rotations here.", actor.username)
        };
        EngineReply::actor(format!(
            "{greeting} You can still join: {}. Use /join <category>.",
            missing.join(", ")
        ))
    }

    /// A participant asks to join a category's rotation.
    pub async fn on_join_request(
        &mut self,
        category: &str,
        actor: &Participant,
    ) -> Result<EngineReply> {
        self.check_category(category)?;
        let inserted = self.queues.join(category, actor.clone())?;
        if !inserted {
            return Ok(EngineReply::actor(format!(
                "You are already in the {category} rotation."
            )));
        }
        self.membership.mark_joined(&actor.id, category);
        self.persist().await?;

        let mut reply = EngineReply::actor(format!("You joined the {category} rotation."))
            .tell(
                Audience::Group,
                format!("{} joined the {category} rotation.", actor.username),
            );
        let missing = self
            .membership
            .missing_categories(&actor.id, &self.config.categories);
        if !missing.is_empty() {
            reply = reply.tell(
                Audience::Actor,
                format!("You can also join: {}.", missing.join(", ")),
            );
        }
        Ok(reply)
    }

    /// A participant asks to leave a category's rotation.
    ///
    /// With `leave_requires_approval` set, only the supervisor may remove
    /// participants and self-service leave is refused.
    pub async fn on_leave_request(
        &mut self,
        category: &str,
        actor: &Participant,
    ) -> Result<EngineReply> {
        self.check_category(category)?;
        if self.config.leave_requires_approval && !self.is_supervisor(&actor.id) {
            return Err(RotationError::Forbidden.into());
        }
        let removed = self.queues.leave(category, &actor.id)?;
        let cleared = self.confirmations.clear_claimant(category, &removed.id);
        self.persist().await?;

        let mut reply = EngineReply::actor(format!("You left the {category} rotation."));
        if cleared {
            reply = reply.tell(
                Audience::Group,
                format!(
                    "{}'s pending completion claim for {category} was cancelled (left the rotation).",
                    removed.username
                ),
            );
        }
        Ok(reply)
    }

    /// The current head claims the duty is done; awaits supervisor approval.
    pub async fn on_completion_claim(
        &mut self,
        category: &str,
        actor: &Participant,
    ) -> Result<EngineReply> {
        self.check_category(category)?;
        let head = self.queues.head(category)?.clone();
        if head.id != actor.id {
            return Err(RotationError::NotYourTurn {
                category: category.to_string(),
                username: actor.username.clone(),
            }
            .into());
        }
        // Snapshot the claimant by value at claim time.
        self.confirmations.claim(category, head.clone())?;
        self.persist().await?;

        Ok(EngineReply::default()
            .tell(
                Audience::Group,
                format!(
                    "{} marked {category} as done. Waiting for supervisor confirmation.",
                    head.username
                ),
            )
            .tell(
                Audience::Participant(ParticipantId::Telegram(self.config.supervisor_id)),
                format!(
                    "{} marked {category} as done. Confirm with /confirm {category}.",
                    head.username
                ),
            ))
    }

    /// The supervisor confirms a pending claim; the rotation advances.
    pub async fn on_supervisor_approve(
        &mut self,
        category: &str,
        approver: &ParticipantId,
    ) -> Result<EngineReply> {
        self.check_category(category)?;
        if !self.is_supervisor(approver) {
            return Err(RotationError::Forbidden.into());
        }
        let claimant = self.confirmations.take(category)?;
        let done = match self.queues.advance(category) {
            Ok(done) => done,
            Err(e) => {
                // Put the claim back so a failed approval leaves state
                // unchanged.
                let _ = self.confirmations.claim(category, claimant);
                return Err(e.into());
            }
        };
        let new_head = self.queues.head(category).ok().cloned();
        self.persist().await?;

        let mut reply = EngineReply::default().tell(
            Audience::Group,
            format!(
                "{} completed {category}. The rotation has advanced.",
                done.username
            ),
        );
        if let Some(next) = new_head
            && next.id != done.id
        {
            reply = reply.tell(
                Audience::Participant(next.id.clone()),
                format!("It is your turn for {category} now."),
            );
        }
        Ok(reply)
    }

    /// The supervisor rejects a pending claim; no rotation change.
    ///
    /// Refused unless `allow_reject` is configured; without it a stuck claim
    /// can only be cleared by an eventual approval.
    pub async fn on_supervisor_reject(
        &mut self,
        category: &str,
        approver: &ParticipantId,
    ) -> Result<EngineReply> {
        self.check_category(category)?;
        if !self.is_supervisor(approver) || !self.config.allow_reject {
            return Err(RotationError::Forbidden.into());
        }
        let claimant = self.confirmations.take(category)?;
        self.persist().await?;

        Ok(EngineReply::default()
            .tell(
                Audience::Group,
                format!(
                    "The supervisor rejected {}'s completion claim for {category}.",
                    claimant.username
                ),
            )
            .tell(
                Audience::Participant(claimant.id.clone()),
                format!("Your {category} completion claim was rejected; the duty is still yours."),
            ))
    }

    /// The supervisor adds a placeholder participant by display name.
    pub async fn on_supervisor_add_participant(
        &mut self,
        category: &str,
        actor: &ParticipantId,
        username: &str,
    ) -> Result<EngineReply> {
        self.check_category(category)?;
        if !self.is_supervisor(actor) {
            return Err(RotationError::Forbidden.into());
        }
        // Name-level duplicate guard for the by-name command; id-level
        // uniqueness is the registry's invariant.
        let already = self
            .queues
            .members(category)?
            .iter()
            .any(|m| m.username == username);
        if already {
            return Ok(EngineReply::actor(format!(
                "{username} is already in the {category} rotation."
            )));
        }
        self.queues
            .join(category, Participant::placeholder(username))?;
        self.persist().await?;

        Ok(
            EngineReply::actor(format!("Added {username} to the {category} rotation."))
                .tell(
                    Audience::Group,
                    format!("{username} was added to the {category} rotation."),
                ),
        )
    }

    /// The supervisor removes a participant by display name.
    ///
    /// If several entries share the name, the first in queue order is
    /// removed. A pending claim held by the removed participant is cleared
    /// in the same operation.
    pub async fn on_supervisor_remove_participant(
        &mut self,
        category: &str,
        actor: &ParticipantId,
        username: &str,
    ) -> Result<EngineReply> {
        self.check_category(category)?;
        if !self.is_supervisor(actor) {
            return Err(RotationError::Forbidden.into());
        }
        let removed = self.queues.remove_by_display_name(category, username)?;
        let cleared = self.confirmations.clear_claimant(category, &removed.id);
        self.persist().await?;

        let mut reply = EngineReply::actor(format!(
            "Removed {} from the {category} rotation.",
            removed.username
        ));
        if cleared {
            reply = reply.tell(
                Audience::Group,
                format!(
                    "{}'s pending completion claim for {category} was cancelled (removed).",
                    removed.username
                ),
            );
        }
        Ok(reply)
    }

    /// Render every queue with its head and pending marker. Pure read.
    pub fn on_status_query(&self) -> EngineReply {
        let mut lines = Vec::new();
        for category in &self.config.categories {
            let members = self.queues.members(category).unwrap_or(&[]);
            if members.is_empty() {
                lines.push(format!("{category}: (empty)"));
                continue;
            }
            let roster = members
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    if i == 0 {
                        format!("*{}*", m.username)
                    } else {
                        m.username.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" → ");
            match self.confirmations.pending(category) {
                Some(claimant) => lines.push(format!(
                    "{category}: {roster} — {} awaiting confirmation",
                    claimant.username
                )),
                None => lines.push(format!("{category}: {roster}")),
            }
        }
        EngineReply::actor(lines.join("\n"))
    }

    /// Current duty-holder per category, for the reminder scheduler.
    /// Pure read; empty queues yield `None`.
    pub fn reminder_heads(&self) -> Vec<(String, Option<Participant>)> {
        self.config
            .categories
            .iter()
            .map(|c| (c.clone(), self.queues.head(c).ok().cloned()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::SnapshotStore;
    use tempfile::TempDir;

    const SUPERVISOR: i64 = 99;

    fn p(id: i64, name: &str) -> Participant {
        Participant::new(ParticipantId::Telegram(id), name)
    }

    fn supervisor_id() -> ParticipantId {
        ParticipantId::Telegram(SUPERVISOR)
    }

    async fn engine() -> (RotationEngine, TempDir) {
        engine_with(|_| {}).await
    }

    async fn engine_with(tweak: impl FnOnce(&mut RotaConfig)) -> (RotationEngine, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut config = RotaConfig {
            supervisor_id: SUPERVISOR,
            snapshot_path: dir.path().join("state.json"),
            ..RotaConfig::default()
        };
        tweak(&mut config);
        let store = SnapshotStore::new(config.snapshot_path.clone());
        (RotationEngine::load(config, store).await, dir)
    }

    fn rotation_err(result: Result<EngineReply>) -> RotationError {
        match result.unwrap_err() {
            Error::Rotation(e) => e,
            other => panic!("expected rotation error, got {other}"),
        }
    }

    fn texts_for(reply: &EngineReply, audience: &Audience) -> Vec<String> {
        reply
            .notifications
            .iter()
            .filter(|n| &n.audience == audience)
            .map(|n| n.text.clone())
            .collect()
    }

    #[tokio::test]
    async fn join_then_rejoin_is_noop() {
        let (mut engine, _dir) = engine().await;
        let reply = engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        assert!(!texts_for(&reply, &Audience::Group).is_empty());

        let reply = engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        assert!(texts_for(&reply, &Audience::Group).is_empty());
        assert_eq!(engine.queues.members("Trash").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn join_unknown_category_is_not_found() {
        let (mut engine, _dir) = engine().await;
        let err = rotation_err(engine.on_join_request("Laundry", &p(1, "a")).await);
        assert!(matches!(err, RotationError::NotFound { entity: "category", .. }));
    }

    #[tokio::test]
    async fn join_prompts_for_remaining_categories() {
        let (mut engine, _dir) = engine().await;
        let reply = engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        let actor_msgs = texts_for(&reply, &Audience::Actor);
        assert!(actor_msgs.iter().any(|t| t.contains("Dishes")));
    }

    #[tokio::test]
    async fn claim_and_approve_rotates_and_notifies_new_head() {
        let (mut engine, _dir) = engine().await;
        for (id, name) in [(1, "a"), (2, "b"), (3, "c")] {
            engine.on_join_request("Trash", &p(id, name)).await.unwrap();
        }

        let reply = engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();
        assert!(!texts_for(&reply, &Audience::Group).is_empty());
        assert!(!texts_for(&reply, &Audience::Participant(supervisor_id())).is_empty());

        let reply = engine
            .on_supervisor_approve("Trash", &supervisor_id())
            .await
            .unwrap();
        let names: Vec<&str> = engine
            .queues
            .members("Trash")
            .unwrap()
            .iter()
            .map(|m| m.username.as_str())
            .collect();
        assert_eq!(names, vec!["b", "c", "a"]);
        assert!(engine.confirmations.pending("Trash").is_none());
        // b is told it is their turn
        let direct = texts_for(&reply, &Audience::Participant(ParticipantId::Telegram(2)));
        assert_eq!(direct.len(), 1);
    }

    #[tokio::test]
    async fn single_member_approval_skips_new_head_notice() {
        let (mut engine, _dir) = engine().await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();
        let reply = engine
            .on_supervisor_approve("Trash", &supervisor_id())
            .await
            .unwrap();
        assert_eq!(engine.queues.head("Trash").unwrap().username, "a");
        assert!(
            reply
                .notifications
                .iter()
                .all(|n| !matches!(n.audience, Audience::Participant(_))),
            "no direct new-head notice for a self-rotation"
        );
    }

    #[tokio::test]
    async fn claim_by_non_head_is_not_your_turn() {
        let (mut engine, _dir) = engine().await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        engine.on_join_request("Trash", &p(2, "b")).await.unwrap();
        let err = rotation_err(engine.on_completion_claim("Trash", &p(2, "b")).await);
        assert!(matches!(err, RotationError::NotYourTurn { .. }));
        // State unchanged
        assert_eq!(engine.queues.head("Trash").unwrap().username, "a");
        assert!(engine.confirmations.pending("Trash").is_none());
    }

    #[tokio::test]
    async fn claim_on_empty_queue_is_empty() {
        let (mut engine, _dir) = engine().await;
        let err = rotation_err(engine.on_completion_claim("Trash", &p(1, "a")).await);
        assert!(matches!(err, RotationError::Empty { .. }));
    }

    #[tokio::test]
    async fn duplicate_claim_is_already_pending() {
        let (mut engine, _dir) = engine().await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();
        let err = rotation_err(engine.on_completion_claim("Trash", &p(1, "a")).await);
        assert!(matches!(err, RotationError::AlreadyPending { .. }));
    }

    #[tokio::test]
    async fn approve_without_claim_is_no_pending_claim() {
        let (mut engine, _dir) = engine().await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        let err = rotation_err(engine.on_supervisor_approve("Trash", &supervisor_id()).await);
        assert!(matches!(err, RotationError::NoPendingClaim { .. }));
    }

    #[tokio::test]
    async fn approve_by_non_supervisor_is_forbidden() {
        let (mut engine, _dir) = engine().await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();
        let err = rotation_err(
            engine
                .on_supervisor_approve("Trash", &ParticipantId::Telegram(1))
                .await,
        );
        assert_eq!(err, RotationError::Forbidden);
        // Claim still outstanding
        assert!(engine.confirmations.pending("Trash").is_some());
    }

    #[tokio::test]
    async fn leave_clears_own_pending_claim() {
        let (mut engine, _dir) = engine().await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        engine.on_join_request("Trash", &p(2, "b")).await.unwrap();
        engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();

        let reply = engine.on_leave_request("Trash", &p(1, "a")).await.unwrap();
        assert!(engine.confirmations.pending("Trash").is_none());
        assert!(!texts_for(&reply, &Audience::Group).is_empty());
        assert_eq!(engine.queues.head("Trash").unwrap().username, "b");
    }

    #[tokio::test]
    async fn leave_requires_approval_refuses_self_service() {
        let (mut engine, _dir) =
            engine_with(|c| c.leave_requires_approval = true).await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        let err = rotation_err(engine.on_leave_request("Trash", &p(1, "a")).await);
        assert_eq!(err, RotationError::Forbidden);
        assert!(engine.queues.contains("Trash", &ParticipantId::Telegram(1)));
    }

    #[tokio::test]
    async fn reject_disabled_by_default() {
        let (mut engine, _dir) = engine().await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();
        let err = rotation_err(engine.on_supervisor_reject("Trash", &supervisor_id()).await);
        assert_eq!(err, RotationError::Forbidden);
        assert!(engine.confirmations.pending("Trash").is_some());
    }

    #[tokio::test]
    async fn reject_clears_claim_without_advancing() {
        let (mut engine, _dir) = engine_with(|c| c.allow_reject = true).await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        engine.on_join_request("Trash", &p(2, "b")).await.unwrap();
        engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();

        let reply = engine
            .on_supervisor_reject("Trash", &supervisor_id())
            .await
            .unwrap();
        assert!(engine.confirmations.pending("Trash").is_none());
        assert_eq!(engine.queues.head("Trash").unwrap().username, "a");
        let direct = texts_for(&reply, &Audience::Participant(ParticipantId::Telegram(1)));
        assert_eq!(direct.len(), 1);
    }

    #[tokio::test]
    async fn supervisor_add_and_remove_by_name() {
        let (mut engine, _dir) = engine().await;
        engine
            .on_supervisor_add_participant("Trash", &supervisor_id(), "guest")
            .await
            .unwrap();
        assert_eq!(engine.queues.members("Trash").unwrap().len(), 1);

        // Adding the same name again is a no-op
        engine
            .on_supervisor_add_participant("Trash", &supervisor_id(), "guest")
            .await
            .unwrap();
        assert_eq!(engine.queues.members("Trash").unwrap().len(), 1);

        engine
            .on_supervisor_remove_participant("Trash", &supervisor_id(), "guest")
            .await
            .unwrap();
        assert!(engine.queues.members("Trash").unwrap().is_empty());
    }

    #[tokio::test]
    async fn supervisor_remove_clears_claimants_pending() {
        let (mut engine, _dir) = engine().await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        engine.on_join_request("Trash", &p(2, "b")).await.unwrap();
        engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();

        engine
            .on_supervisor_remove_participant("Trash", &supervisor_id(), "a")
            .await
            .unwrap();
        assert!(engine.confirmations.pending("Trash").is_none());
    }

    #[tokio::test]
    async fn add_remove_by_non_supervisor_is_forbidden() {
        let (mut engine, _dir) = engine().await;
        let user = ParticipantId::Telegram(1);
        let err = rotation_err(
            engine
                .on_supervisor_add_participant("Trash", &user, "guest")
                .await,
        );
        assert_eq!(err, RotationError::Forbidden);
        let err = rotation_err(
            engine
                .on_supervisor_remove_participant("Trash", &user, "guest")
                .await,
        );
        assert_eq!(err, RotationError::Forbidden);
    }

    #[tokio::test]
    async fn status_marks_head_and_pending() {
        let (mut engine, _dir) = engine().await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        engine.on_join_request("Trash", &p(2, "b")).await.unwrap();
        engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();

        let reply = engine.on_status_query();
        let text = &reply.notifications[0].text;
        assert!(text.contains("*a*"));
        assert!(text.contains("awaiting confirmation"));
        assert!(text.contains("Dishes: (empty)"));
    }

    #[tokio::test]
    async fn start_prompt_tracks_onboarding() {
        let (mut engine, _dir) = engine().await;
        let alice = p(1, "alice");
        let reply = engine.on_start(&alice);
        assert!(reply.notifications[0].text.contains("Trash"));

        engine.on_join_request("Trash", &alice).await.unwrap();
        let reply = engine.on_start(&alice);
        assert!(!reply.notifications[0].text.contains("Trash,"));
        assert!(reply.notifications[0].text.contains("Dishes"));

        engine.on_join_request("Dishes", &alice).await.unwrap();
        engine.on_join_request("Cleaning", &alice).await.unwrap();
        let reply = engine.on_start(&alice);
        assert!(reply.notifications[0].text.contains("Welcome back"));
    }

    #[tokio::test]
    async fn reminder_heads_reads_all_categories() {
        let (mut engine, _dir) = engine().await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        let heads = engine.reminder_heads();
        assert_eq!(heads.len(), engine.config().categories.len());
        let trash = heads.iter().find(|(c, _)| c == "Trash").unwrap();
        assert_eq!(trash.1.as_ref().unwrap().username, "a");
        let dishes = heads.iter().find(|(c, _)| c == "Dishes").unwrap();
        assert!(dishes.1.is_none());
    }

    #[tokio::test]
    async fn state_survives_reload() {
        let dir = TempDir::new().unwrap();
        let config = RotaConfig {
            supervisor_id: SUPERVISOR,
            snapshot_path: dir.path().join("state.json"),
            ..RotaConfig::default()
        };

        {
            let store = SnapshotStore::new(config.snapshot_path.clone());
            let mut engine = RotationEngine::load(config.clone(), store).await;
            engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
            engine.on_join_request("Trash", &p(2, "b")).await.unwrap();
            engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();
        }

        let store = SnapshotStore::new(config.snapshot_path.clone());
        let engine = RotationEngine::load(config, store).await;
        assert_eq!(engine.queues.head("Trash").unwrap().username, "a");
        assert_eq!(engine.confirmations.pending("Trash").unwrap().username, "a");
        assert!(engine.membership.has_joined_any(&ParticipantId::Telegram(1)));
    }

    #[tokio::test]
    async fn orphaned_pending_is_dropped_at_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        // Pending claimant 9 is not in the queue.
        tokio::fs::write(
            &path,
            r#"{
                "queues": {"Trash": [{"id": 1, "username": "a"}]},
                "pending": {"Trash": {"id": 9, "username": "ghost"}}
            }"#,
        )
        .await
        .unwrap();

        let config = RotaConfig {
            supervisor_id: SUPERVISOR,
            snapshot_path: path.clone(),
            ..RotaConfig::default()
        };
        let engine = RotationEngine::load(config, SnapshotStore::new(path)).await;
        assert!(engine.confirmations.pending("Trash").is_none());
        assert_eq!(engine.queues.head("Trash").unwrap().username, "a");
    }
}
