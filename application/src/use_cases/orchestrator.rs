//! Story turn orchestration.
//!
//! [`StoryOrchestrator`] drives one story session through its lifecycle:
//! it validates user actions against the [`StoryState`] machine, issues the
//! provider round-trip for each turn, and commits the outcome atomically.
//!
//! # Concurrency
//!
//! At most one turn is in flight. The state lock is never held across an
//! await: a turn moves the narrator session *out* of the slot, runs the
//! round-trip, and moves it back in when committing. Each turn carries the
//! slot's epoch and a cancellation token; `reset()` bumps the epoch and
//! cancels the token, so a late result is dropped instead of being committed
//! into a session that no longer exists.
//!
//! Snapshots go out on the watch channel while the slot is locked. Observer
//! events are tagged with the epoch they were produced under and dropped if
//! a reset has moved past it.

use crate::config::BehaviorConfig;
use crate::ports::story_gateway::{
    GatewayError, IllustrationGateway, NarrativeGateway, NarrativeSession, SessionBrief,
};
use crate::ports::story_logger::{NoStoryLogger, StoryLogEvent, StoryLogger};
use crate::ports::story_observer::{CompositeObserver, StoryEvent, StoryObserver};
use crate::use_cases::round_trip::{TurnError, TurnResult, run_round_trip};
use serde_json::json;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use weaver_domain::core::string::preview;
use weaver_domain::{
    OpeningScene, StoryPrompt, StorySegment, StorySnapshot, StoryState, TurnKind,
};

/// Mutable session data guarded by the orchestrator's lock
struct SessionSlot {
    state: StoryState,
    /// Provider conversational context; `None` while idle or while a turn owns it
    narrator: Option<Box<dyn NarrativeSession>>,
    epoch: u64,
    cancel: CancellationToken,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            state: StoryState::new(),
            narrator: None,
            epoch: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// Tie the turn being started to the current session epoch.
    ///
    /// Only `revoke()` advances the epoch, so a ticket stays valid until
    /// the next reset.
    fn issue_ticket(&mut self) -> TurnTicket {
        self.cancel = CancellationToken::new();
        TurnTicket {
            epoch: self.epoch,
            cancel: self.cancel.clone(),
        }
    }

    /// Invalidate whatever turn is in flight
    fn revoke(&mut self) {
        self.cancel.cancel();
        self.epoch += 1;
    }
}

/// Identity of one in-flight turn
struct TurnTicket {
    epoch: u64,
    cancel: CancellationToken,
}

/// What came back from a round-trip, including the narrator session it used
struct TurnOutcome {
    narrator: Option<Box<dyn NarrativeSession>>,
    result: Result<TurnResult, TurnError>,
}

/// Use case driving an interactive story session
pub struct StoryOrchestrator {
    narrator_gateway: Arc<dyn NarrativeGateway>,
    illustrator: Arc<dyn IllustrationGateway>,
    behavior: BehaviorConfig,
    observers: CompositeObserver,
    logger: Arc<dyn StoryLogger>,
    slot: Mutex<SessionSlot>,
    /// Serializes observer notification against `reset()`
    announcements: Mutex<()>,
    snapshots: watch::Sender<StorySnapshot>,
}

impl StoryOrchestrator {
    pub fn new(
        narrator_gateway: Arc<dyn NarrativeGateway>,
        illustrator: Arc<dyn IllustrationGateway>,
    ) -> Self {
        let (snapshots, _) = watch::channel(StorySnapshot::default());
        Self {
            narrator_gateway,
            illustrator,
            behavior: BehaviorConfig::default(),
            observers: CompositeObserver::new(),
            logger: Arc::new(NoStoryLogger),
            slot: Mutex::new(SessionSlot::new()),
            announcements: Mutex::new(()),
            snapshots,
        }
    }

    /// Set provider-call limits.
    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }

    /// Register a transition observer.
    pub fn with_observer(mut self, observer: Arc<dyn StoryObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Create with a transcript logger.
    pub fn with_logger(mut self, logger: Arc<dyn StoryLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Current state, copied
    pub fn snapshot(&self) -> StorySnapshot {
        self.lock_slot().state.snapshot()
    }

    /// Receive a fresh snapshot after every transition
    pub fn subscribe(&self) -> watch::Receiver<StorySnapshot> {
        self.snapshots.subscribe()
    }

    /// Whether a provider conversational context is currently held.
    ///
    /// False while idle, after a failed opening, and while a turn has the
    /// context checked out.
    pub fn has_narrator_session(&self) -> bool {
        self.lock_slot().narrator.is_some()
    }

    /// Begin a new story from an opening scene.
    ///
    /// Blank input is refused locally without contacting any provider.
    pub async fn start(&self, opening: &str) -> Result<StorySegment, TurnError> {
        let (scene, ticket) = {
            let mut slot = self.lock_slot();
            slot.state.check_start()?;

            let scene = match OpeningScene::try_new(opening) {
                Ok(scene) => scene,
                Err(error) => {
                    slot.state.reject_opening(&error)?;
                    let epoch = self.broadcast(&slot);
                    drop(slot);

                    warn!("Opening scene rejected: {}", error.detail());
                    self.announce(
                        epoch,
                        &[StoryEvent::OpeningRejected {
                            message: error.to_string(),
                        }],
                    );
                    return Err(error.into());
                }
            };

            slot.state.begin_opening()?;
            slot.narrator = None;
            let ticket = slot.issue_ticket();
            self.broadcast(&slot);
            (scene, ticket)
        };

        info!(scene = %preview(scene.content(), 80), "Starting new story");
        self.log_turn_started(TurnKind::Opening, scene.content());
        self.announce(
            ticket.epoch,
            &[
                StoryEvent::SessionStarted,
                StoryEvent::TurnStarted {
                    kind: TurnKind::Opening,
                },
            ],
        );

        let message = StoryPrompt::opening_message(&scene);
        let turn = async {
            let brief = SessionBrief::story();
            let mut narrator = match self
                .behavior
                .bound(self.narrator_gateway.create_session(&brief))
                .await
            {
                Ok(narrator) => narrator,
                Err(error) => {
                    return TurnOutcome {
                        narrator: None,
                        result: Err(error.into()),
                    };
                }
            };
            debug!("Narrator session created");

            let result = run_round_trip(
                narrator.as_mut(),
                self.illustrator.as_ref(),
                &self.behavior,
                &message,
            )
            .await;
            TurnOutcome {
                narrator: Some(narrator),
                result,
            }
        };

        let outcome = Self::unless_cancelled(&ticket.cancel, turn).await;
        self.finish(ticket, TurnKind::Opening, outcome)
    }

    /// Continue the story with the reader's choice.
    ///
    /// Any text is accepted; membership in the offered choices is the
    /// caller's concern.
    pub async fn choose(&self, choice: &str) -> Result<StorySegment, TurnError> {
        let (mut narrator, ticket) = {
            let mut slot = self.lock_slot();
            slot.state.begin_choice()?;

            let Some(narrator) = slot.narrator.take() else {
                let error = GatewayError::SessionError("no active narrator session".to_string());
                slot.state.fail(error.to_string())?;
                let epoch = self.broadcast(&slot);
                drop(slot);
                self.announce_failure(epoch, TurnKind::Choice, &TurnError::Provider(error.clone()));
                return Err(error.into());
            };

            let ticket = slot.issue_ticket();
            self.broadcast(&slot);
            (narrator, ticket)
        };

        info!(choice = %preview(choice, 80), "Continuing story");
        self.log_turn_started(TurnKind::Choice, choice);
        self.announce(
            ticket.epoch,
            &[
                StoryEvent::ChoiceSelected {
                    choice: choice.to_string(),
                },
                StoryEvent::TurnStarted {
                    kind: TurnKind::Choice,
                },
            ],
        );

        let turn = async move {
            let result = run_round_trip(
                narrator.as_mut(),
                self.illustrator.as_ref(),
                &self.behavior,
                choice,
            )
            .await;
            TurnOutcome {
                narrator: Some(narrator),
                result,
            }
        };

        let outcome = Self::unless_cancelled(&ticket.cancel, turn).await;
        self.finish(ticket, TurnKind::Choice, outcome)
    }

    /// Discard the session entirely and return to `Idle`. Valid from every state.
    ///
    /// A turn still in flight is abandoned: its provider calls are dropped at
    /// their next suspension point and its result is never committed.
    pub fn reset(&self) {
        {
            let mut slot = self.lock_slot();
            slot.revoke();
            slot.narrator = None;
            slot.state.reset();
            self.broadcast(&slot);
        }

        info!("Story session reset");
        self.logger
            .log(StoryLogEvent::new("session_reset", json!({})));

        let _order = self.lock_announcements();
        self.observers.on_event(&StoryEvent::SessionEnded);
    }

    /// Await `turn` unless the ticket is cancelled first
    async fn unless_cancelled<F>(cancel: &CancellationToken, turn: F) -> Option<TurnOutcome>
    where
        F: Future<Output = TurnOutcome>,
    {
        tokio::select! {
            _ = cancel.cancelled() => None,
            outcome = turn => Some(outcome),
        }
    }

    /// Commit or fail the turn identified by `ticket`
    fn finish(
        &self,
        ticket: TurnTicket,
        kind: TurnKind,
        outcome: Option<TurnOutcome>,
    ) -> Result<StorySegment, TurnError> {
        let mut slot = self.lock_slot();

        let outcome = match outcome {
            Some(outcome) if slot.epoch == ticket.epoch => outcome,
            _ => {
                drop(slot);
                info!(kind = %kind, "Discarding result of abandoned turn");
                return Err(TurnError::Abandoned);
            }
        };

        match outcome.result {
            Ok(turn) => {
                let segment = slot.state.commit(turn.beat, turn.image)?;
                slot.narrator = outcome.narrator;
                self.broadcast(&slot);
                let choices = slot.state.snapshot().choices;
                drop(slot);

                info!(
                    position = segment.position(),
                    kind = %kind,
                    "Story segment committed"
                );
                self.logger.log(StoryLogEvent::new(
                    "segment_committed",
                    json!({
                        "position": segment.position(),
                        "text": segment.text(),
                        "choices": choices,
                        "image_bytes": segment.image().as_str().len(),
                    }),
                ));
                self.announce(
                    ticket.epoch,
                    &[StoryEvent::SegmentArrived {
                        segment: segment.clone(),
                        choices,
                    }],
                );
                Ok(segment)
            }
            Err(error) => {
                slot.state.fail(error.to_string())?;
                // A failed opening discards its session; a failed choice keeps
                // the context so the started story still owns one.
                slot.narrator = match kind {
                    TurnKind::Opening => None,
                    TurnKind::Choice => outcome.narrator,
                };
                self.broadcast(&slot);
                drop(slot);

                warn!(kind = %kind, "Turn failed: {}", error);
                self.announce_failure(ticket.epoch, kind, &error);
                Err(error)
            }
        }
    }

    fn announce_failure(&self, epoch: u64, kind: TurnKind, error: &TurnError) {
        let Some(category) = error.category() else {
            return;
        };
        self.logger.log(StoryLogEvent::new(
            "turn_failed",
            json!({
                "kind": kind,
                "category": category,
                "message": error.to_string(),
            }),
        ));
        self.announce(
            epoch,
            &[StoryEvent::TurnFailed {
                kind,
                category,
                message: error.to_string(),
            }],
        );
    }

    fn log_turn_started(&self, kind: TurnKind, input: &str) {
        self.logger.log(StoryLogEvent::new(
            "turn_started",
            json!({ "kind": kind, "input": input }),
        ));
    }

    /// Publish the slot's state on the watch channel. Called with the slot
    /// locked, so subscribers see transitions in commit order.
    fn broadcast(&self, slot: &SessionSlot) -> u64 {
        self.snapshots.send_replace(slot.state.snapshot());
        slot.epoch
    }

    /// Notify observers of events produced under `epoch`.
    ///
    /// Events are dropped when a reset has moved the slot to a newer epoch.
    /// Observers run outside the slot lock but must not call back into
    /// `reset()`.
    fn announce(&self, epoch: u64, events: &[StoryEvent]) {
        let _order = self.lock_announcements();
        if self.lock_slot().epoch != epoch {
            debug!(count = events.len(), "Dropping events of a superseded session");
            return;
        }
        for event in events {
            self.observers.on_event(event);
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_announcements(&self) -> MutexGuard<'_, ()> {
        self.announcements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::story_observer::ErrorCategory;
    use crate::use_cases::testing::{
        GatedNarrator, RecordingObserver, ScriptedIllustrator, ScriptedNarrator, reply,
    };
    use std::time::Duration;
    use weaver_domain::{DomainError, StoryStatus, TransitionError};

    fn orchestrator(
        narrator: &Arc<ScriptedNarrator>,
        illustrator: ScriptedIllustrator,
    ) -> StoryOrchestrator {
        StoryOrchestrator::new(narrator.clone(), Arc::new(illustrator))
    }

    fn transport_failure() -> GatewayError {
        GatewayError::ConnectionError("connection reset by peer".to_string())
    }

    #[tokio::test]
    async fn test_lighthouse_scenario() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![
            reply("The keeper climbs the tower.", ["c1", "c2", "c3"]),
            reply("The lens reveals a ship.", ["c4", "c5", "c6"]),
            Err(transport_failure()),
        ]));
        let story = orchestrator(&narrator, ScriptedIllustrator::new());

        let first = story.start("A lighthouse keeper...").await.unwrap();
        assert_eq!(first.position(), 1);
        assert_eq!(first.image().as_str(), "img1");
        let snapshot = story.snapshot();
        assert_eq!(snapshot.status, StoryStatus::AwaitingChoice);
        assert_eq!(snapshot.choices, vec!["c1", "c2", "c3"]);

        let second = story.choose("c2").await.unwrap();
        assert_eq!(second.position(), 2);
        assert_eq!(second.image().as_str(), "img2");
        let snapshot = story.snapshot();
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.choices, vec!["c4", "c5", "c6"]);

        let error = story.choose("c5").await.unwrap_err();
        assert_eq!(error, TurnError::Provider(transport_failure()));
        let snapshot = story.snapshot();
        assert_eq!(snapshot.status, StoryStatus::Errored);
        assert_eq!(snapshot.history.len(), 2);
        assert!(snapshot.choices.is_empty());
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Connection error: connection reset by peer")
        );
    }

    #[tokio::test]
    async fn test_one_session_carries_every_turn() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![
            reply("One.", ["a", "b", "c"]),
            reply("Two.", ["d", "e", "f"]),
        ]));
        let story = orchestrator(&narrator, ScriptedIllustrator::new());

        story.start("A quiet harbor").await.unwrap();
        story.choose("b").await.unwrap();

        assert_eq!(narrator.sessions_created(), 1);
        assert_eq!(
            narrator.received(),
            vec![
                "Start the story with this scene: A quiet harbor".to_string(),
                "b".to_string()
            ]
        );
        assert_eq!(narrator.briefs(), vec![SessionBrief::story()]);
        assert!(story.has_narrator_session());
    }

    #[tokio::test]
    async fn test_blank_opening_never_contacts_providers() {
        for opening in ["", "   "] {
            let narrator = Arc::new(ScriptedNarrator::new(vec![]));
            let observer = Arc::new(RecordingObserver::default());
            let story = orchestrator(&narrator, ScriptedIllustrator::new())
                .with_observer(observer.clone());

            let error = story.start(opening).await.unwrap_err();

            assert_eq!(error, TurnError::Validation(DomainError::EmptyOpeningScene));
            assert_eq!(narrator.sessions_created(), 0);
            let snapshot = story.snapshot();
            assert_eq!(snapshot.status, StoryStatus::Idle);
            assert_eq!(
                snapshot.error.as_deref(),
                Some("Please describe an opening scene to begin your story.")
            );
            assert!(matches!(
                observer.events().as_slice(),
                [StoryEvent::OpeningRejected { .. }]
            ));
        }
    }

    #[tokio::test]
    async fn test_wrong_choice_count_is_validation_error() {
        for n in [0usize, 1, 2, 4] {
            let choices: Vec<String> = (0..n).map(|i| format!("choice {}", i)).collect();
            let raw = serde_json::json!({ "story": "Valid text.", "choices": choices });
            let narrator = Arc::new(ScriptedNarrator::new(vec![Ok(raw.to_string())]));
            let illustrator = ScriptedIllustrator::new();
            let story = orchestrator(&narrator, illustrator);

            let error = story.start("A desert of glass").await.unwrap_err();

            assert!(error.is_validation(), "choice count {}", n);
            assert_eq!(error.category(), Some(ErrorCategory::Validation));
            let snapshot = story.snapshot();
            assert_eq!(snapshot.status, StoryStatus::Errored);
            assert!(snapshot.choices.is_empty());
            assert!(snapshot.history.is_empty());
        }
    }

    #[tokio::test]
    async fn test_image_failure_appends_nothing() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![reply(
            "Narrative fine.",
            ["a", "b", "c"],
        )]));
        let story = orchestrator(
            &narrator,
            ScriptedIllustrator::failing(GatewayError::AuthFailed("bad key".into())),
        );

        let error = story.start("A frozen city").await.unwrap_err();

        assert!(error.is_provider());
        let snapshot = story.snapshot();
        assert_eq!(snapshot.status, StoryStatus::Errored);
        assert!(snapshot.history.is_empty());
        assert!(!snapshot.started);
        assert!(!story.has_narrator_session());
    }

    #[tokio::test]
    async fn test_failed_choice_image_keeps_history() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![
            reply("One.", ["a", "b", "c"]),
            reply("Two.", ["d", "e", "f"]),
        ]));
        let illustrator = ScriptedIllustrator::with_plan(vec![
            None,
            Some(GatewayError::Http {
                status: 429,
                message: "quota".into(),
            }),
        ]);
        let story = orchestrator(&narrator, illustrator);

        story.start("A jungle temple").await.unwrap();
        let error = story.choose("a").await.unwrap_err();

        assert!(error.is_provider());
        let snapshot = story.snapshot();
        assert_eq!(snapshot.status, StoryStatus::Errored);
        assert_eq!(snapshot.history.len(), 1);
        assert!(snapshot.choices.is_empty());
        assert!(snapshot.started);
    }

    #[tokio::test]
    async fn test_session_creation_failure_is_provider_error() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![]));
        narrator.fail_next_create(GatewayError::AuthFailed("API key not valid".into()));
        let story = orchestrator(&narrator, ScriptedIllustrator::new());

        let error = story.start("An orbital garden").await.unwrap_err();

        assert_eq!(
            error,
            TurnError::Provider(GatewayError::AuthFailed("API key not valid".into()))
        );
        assert_eq!(story.snapshot().status, StoryStatus::Errored);
    }

    #[tokio::test]
    async fn test_restart_after_failed_opening_creates_new_session() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![
            Ok("garbage".to_string()),
            reply("Second try works.", ["a", "b", "c"]),
        ]));
        let story = orchestrator(&narrator, ScriptedIllustrator::new());

        assert!(story.start("A cave").await.unwrap_err().is_validation());
        let segment = story.start("A cave").await.unwrap();

        assert_eq!(segment.position(), 1);
        assert_eq!(narrator.sessions_created(), 2);
        assert_eq!(story.snapshot().status, StoryStatus::AwaitingChoice);
    }

    #[tokio::test]
    async fn test_choose_not_reentrant_after_failure() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![
            reply("One.", ["a", "b", "c"]),
            Err(transport_failure()),
        ]));
        let story = orchestrator(&narrator, ScriptedIllustrator::new());

        story.start("A train at midnight").await.unwrap();
        story.choose("a").await.unwrap_err();

        let error = story.choose("a").await.unwrap_err();
        assert!(matches!(
            error,
            TurnError::Rejected(TransitionError::NotAllowed { .. })
        ));
        let error = story.start("Another train").await.unwrap_err();
        assert!(matches!(error, TurnError::Rejected(_)));
        assert_eq!(narrator.received().len(), 2);
    }

    #[tokio::test]
    async fn test_choose_from_idle_is_rejected() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![]));
        let story = orchestrator(&narrator, ScriptedIllustrator::new());

        let error = story.choose("anything").await.unwrap_err();

        assert!(matches!(error, TurnError::Rejected(_)));
        assert_eq!(error.category(), None);
        assert_eq!(story.snapshot(), StorySnapshot::default());
    }

    #[tokio::test]
    async fn test_reset_from_every_settled_state() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![
            reply("One.", ["a", "b", "c"]),
            Err(transport_failure()),
        ]));
        let story = orchestrator(&narrator, ScriptedIllustrator::new());

        story.reset();
        assert_eq!(story.snapshot(), StorySnapshot::default());

        story.start("A canyon").await.unwrap();
        story.reset();
        assert_eq!(story.snapshot(), StorySnapshot::default());
        assert!(!story.has_narrator_session());

        let narrator = Arc::new(ScriptedNarrator::new(vec![
            reply("One.", ["a", "b", "c"]),
            Err(transport_failure()),
        ]));
        let story = orchestrator(&narrator, ScriptedIllustrator::new());
        story.start("A canyon").await.unwrap();
        story.choose("a").await.unwrap_err();
        assert_eq!(story.snapshot().status, StoryStatus::Errored);
        story.reset();
        assert_eq!(story.snapshot(), StorySnapshot::default());
        assert!(!story.has_narrator_session());
    }

    #[tokio::test]
    async fn test_reset_during_turn_discards_late_result() {
        let narrator = Arc::new(GatedNarrator::new(reply("Too late.", ["a", "b", "c"])));
        let entered = narrator.entered.clone();
        let release = narrator.release.clone();
        let observer = Arc::new(RecordingObserver::default());
        let story = Arc::new(
            StoryOrchestrator::new(narrator, Arc::new(ScriptedIllustrator::new()))
                .with_observer(observer.clone()),
        );

        let turn = {
            let story = Arc::clone(&story);
            tokio::spawn(async move { story.start("A haunted mill").await })
        };

        entered.notified().await;
        assert_eq!(story.snapshot().status, StoryStatus::TurnInFlight);

        story.reset();
        release.notify_one();

        assert_eq!(turn.await.unwrap(), Err(TurnError::Abandoned));
        assert_eq!(story.snapshot(), StorySnapshot::default());
        assert!(!story.has_narrator_session());
        assert!(
            !observer
                .events()
                .iter()
                .any(|e| matches!(e, StoryEvent::SegmentArrived { .. }))
        );
        assert_eq!(observer.events().last(), Some(&StoryEvent::SessionEnded));
    }

    /// Transcript sink that holds the turn on `turn_started` until released
    struct PausingLogger {
        reached: Mutex<std::sync::mpsc::Sender<()>>,
        resume: Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl StoryLogger for PausingLogger {
        fn log(&self, event: StoryLogEvent) {
            if event.event_type == "turn_started" {
                self.reached.lock().unwrap().send(()).unwrap();
                self.resume.lock().unwrap().recv().unwrap();
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reset_before_turn_announcement_leaves_subscribers_idle() {
        let (reached_tx, reached_rx) = std::sync::mpsc::channel();
        let (resume_tx, resume_rx) = std::sync::mpsc::channel();
        let narrator = Arc::new(ScriptedNarrator::new(vec![reply(
            "A bell tolls underwater.",
            ["a", "b", "c"],
        )]));
        let observer = Arc::new(RecordingObserver::default());
        let story = Arc::new(
            orchestrator(&narrator, ScriptedIllustrator::new())
                .with_logger(Arc::new(PausingLogger {
                    reached: Mutex::new(reached_tx),
                    resume: Mutex::new(resume_rx),
                }))
                .with_observer(observer.clone()),
        );
        let updates = story.subscribe();

        let turn = {
            let story = Arc::clone(&story);
            tokio::spawn(async move { story.start("A drowned cathedral").await })
        };
        tokio::task::spawn_blocking(move || reached_rx.recv())
            .await
            .unwrap()
            .unwrap();

        story.reset();
        resume_tx.send(()).unwrap();

        assert_eq!(turn.await.unwrap(), Err(TurnError::Abandoned));
        assert_eq!(story.snapshot().status, StoryStatus::Idle);
        assert_eq!(updates.borrow().status, story.snapshot().status);
        assert_eq!(*updates.borrow(), StorySnapshot::default());

        let events = observer.events();
        assert_eq!(events, vec![StoryEvent::SessionEnded]);
    }

    #[tokio::test]
    async fn test_duplicate_action_while_in_flight_is_rejected() {
        let narrator = Arc::new(GatedNarrator::new(reply("Done.", ["a", "b", "c"])));
        let entered = narrator.entered.clone();
        let release = narrator.release.clone();
        let story = Arc::new(StoryOrchestrator::new(
            narrator,
            Arc::new(ScriptedIllustrator::new()),
        ));

        let turn = {
            let story = Arc::clone(&story);
            tokio::spawn(async move { story.start("A floating market").await })
        };
        entered.notified().await;

        assert_eq!(
            story.start("A second story").await,
            Err(TurnError::Rejected(TransitionError::TurnInFlight))
        );
        assert_eq!(
            story.choose("a").await,
            Err(TurnError::Rejected(TransitionError::TurnInFlight))
        );
        assert!(story.snapshot().choices.is_empty());

        release.notify_one();
        let segment = turn.await.unwrap().unwrap();
        assert_eq!(segment.position(), 1);
        assert_eq!(story.snapshot().status, StoryStatus::AwaitingChoice);
    }

    #[tokio::test]
    async fn test_concurrent_starts_admit_exactly_one() {
        let narrator = Arc::new(GatedNarrator::new(reply("Only one.", ["a", "b", "c"])));
        let entered = narrator.entered.clone();
        let release = narrator.release.clone();
        let story = StoryOrchestrator::new(narrator, Arc::new(ScriptedIllustrator::new()));

        let (first, second) = futures::future::join(story.start("A salt marsh"), async {
            entered.notified().await;
            let second = story.start("A glass forest").await;
            release.notify_one();
            second
        })
        .await;

        assert_eq!(first.unwrap().text(), "Only one.");
        assert_eq!(second, Err(TurnError::Rejected(TransitionError::TurnInFlight)));
        assert_eq!(story.snapshot().history.len(), 1);
    }

    #[tokio::test]
    async fn test_choices_cleared_while_choice_in_flight() {
        let narrator = Arc::new(GatedNarrator::new(reply("Again.", ["a", "b", "c"])));
        let entered = narrator.entered.clone();
        let release = narrator.release.clone();
        let story = Arc::new(StoryOrchestrator::new(
            narrator,
            Arc::new(ScriptedIllustrator::new()),
        ));

        release.notify_one();
        story.start("A library").await.unwrap();
        entered.notified().await;
        assert_eq!(story.snapshot().choices.len(), 3);

        let turn = {
            let story = Arc::clone(&story);
            tokio::spawn(async move { story.choose("a").await })
        };
        entered.notified().await;

        let snapshot = story.snapshot();
        assert_eq!(snapshot.status, StoryStatus::TurnInFlight);
        assert!(snapshot.choices.is_empty());
        assert_eq!(snapshot.history.len(), 1);

        release.notify_one();
        assert_eq!(turn.await.unwrap().unwrap().position(), 2);
    }

    #[tokio::test]
    async fn test_observer_event_sequence() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![
            reply("One.", ["a", "b", "c"]),
            reply("Two.", ["d", "e", "f"]),
            Ok("{}".to_string()),
        ]));
        let observer = Arc::new(RecordingObserver::default());
        let story =
            orchestrator(&narrator, ScriptedIllustrator::new()).with_observer(observer.clone());

        story.start("A mountain pass").await.unwrap();
        story.choose("b").await.unwrap();
        story.choose("e").await.unwrap_err();
        story.reset();

        let names: Vec<&str> = observer
            .events()
            .iter()
            .map(|event| match event {
                StoryEvent::SessionStarted => "session_started",
                StoryEvent::TurnStarted { .. } => "turn_started",
                StoryEvent::ChoiceSelected { .. } => "choice_selected",
                StoryEvent::SegmentArrived { .. } => "segment_arrived",
                StoryEvent::TurnFailed { .. } => "turn_failed",
                StoryEvent::OpeningRejected { .. } => "opening_rejected",
                StoryEvent::SessionEnded => "session_ended",
            })
            .collect();

        assert_eq!(
            names,
            vec![
                "session_started",
                "turn_started",
                "segment_arrived",
                "choice_selected",
                "turn_started",
                "segment_arrived",
                "choice_selected",
                "turn_started",
                "turn_failed",
                "session_ended",
            ]
        );

        let failure = observer
            .events()
            .into_iter()
            .find_map(|event| match event {
                StoryEvent::TurnFailed { category, kind, .. } => Some((category, kind)),
                _ => None,
            });
        assert_eq!(
            failure,
            Some((ErrorCategory::Validation, TurnKind::Choice))
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_committed_snapshot() {
        let narrator = Arc::new(ScriptedNarrator::new(vec![reply("One.", ["a", "b", "c"])]));
        let story = orchestrator(&narrator, ScriptedIllustrator::new());
        let receiver = story.subscribe();

        story.start("A rooftop garden").await.unwrap();

        let snapshot = receiver.borrow().clone();
        assert_eq!(snapshot.status, StoryStatus::AwaitingChoice);
        assert_eq!(snapshot.history[0].text(), "One.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_turn_as_provider_error() {
        struct SilentNarrator;

        struct SilentSession;

        #[async_trait::async_trait]
        impl NarrativeSession for SilentSession {
            async fn advance(&mut self, _text: &str) -> Result<String, GatewayError> {
                std::future::pending().await
            }
        }

        #[async_trait::async_trait]
        impl NarrativeGateway for SilentNarrator {
            async fn create_session(
                &self,
                _brief: &SessionBrief,
            ) -> Result<Box<dyn NarrativeSession>, GatewayError> {
                Ok(Box::new(SilentSession))
            }
        }

        let story = StoryOrchestrator::new(
            Arc::new(SilentNarrator),
            Arc::new(ScriptedIllustrator::new()),
        )
        .with_behavior(BehaviorConfig {
            timeout: Some(Duration::from_secs(30)),
        });

        let error = story.start("A silent valley").await.unwrap_err();

        assert_eq!(error, TurnError::Provider(GatewayError::Timeout));
        assert_eq!(story.snapshot().status, StoryStatus::Errored);
    }
}
