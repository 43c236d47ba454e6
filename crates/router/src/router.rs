//! The interaction router.
//!
//! Owns all mutable game state: the active panel, the selected animal, the
//! running quiz, habitat meters and overlays. World events are handled
//! synchronously; remote calls are spawned and report back through a
//! [`Completion`] channel that only the router reads, so state is never
//! touched from another task.

use std::collections::HashMap;
use std::sync::Arc;

use reefwarden_core::{
    AnimalProfile, Command, CommitRequest, Cue, EntityCategory, EntityGraph, EntityId,
    GameConfig, GateVerdict, HabitatName, MarkerId, Panel, QuizDefinition, SubjectId,
    TrackingState, UiAction, WorldEvent,
};
use reefwarden_progress::{CompletionGate, ProgressError, ProgressSync, RemoteHandle};
use reefwarden_session::{AnswerOutcome, HabitatState, HealthChange, QuizSession, QuizState, SessionToken};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::completion::Completion;
use crate::error::{Result, RouterError};
use crate::overlay::OverlayTracker;
use crate::sink::CommandSink;

/// Delay before cleaned trash is removed.
const TRASH_DESPAWN_MS: u64 = 100;
/// Delay before a used sponge is removed.
const SPONGE_DESPAWN_MS: u64 = 0;
/// Delay before a consumed feedbag is removed.
const FEEDBAG_DESPAWN_MS: u64 = 300;

#[derive(Debug)]
struct Selection {
    entity: EntityId,
    animal: AnimalProfile,
    token: SessionToken,
    verdict: Option<GateVerdict>,
}

/// Routes world events to game state and emits commands to a sink.
///
/// [`handle`](Self::handle) spawns remote work and must be called from
/// inside a Tokio runtime.
pub struct InteractionRouter<S: CommandSink> {
    habitats: HashMap<HabitatName, HabitatState>,
    entities: EntityGraph,
    quizzes: HashMap<SubjectId, Arc<QuizDefinition>>,
    panel: Panel,
    selection: Option<Selection>,
    quiz: Option<QuizSession>,
    start_enabled: bool,
    overlays: OverlayTracker,
    gate: CompletionGate,
    sync: ProgressSync,
    clock: Arc<dyn Clock>,
    sink: S,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<S: CommandSink> InteractionRouter<S> {
    /// Build a router over a validated configuration.
    pub fn new(config: &GameConfig, handle: RemoteHandle, sink: S) -> Self {
        let habitats = config
            .habitats
            .iter()
            .map(|h| (h.name.clone(), HabitatState::from_config(h)))
            .collect();
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            habitats,
            entities: config.entities.clone(),
            quizzes: config.quizzes.clone(),
            panel: Panel::None,
            selection: None,
            quiz: None,
            start_enabled: config.engine.start_enabled_initially,
            overlays: OverlayTracker::new(config.markers.clone()),
            gate: CompletionGate::new(handle.clone()),
            sync: ProgressSync::with_config(handle, &config.engine),
            clock: Arc::new(SystemClock),
            sink,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Active panel.
    pub fn panel(&self) -> Panel {
        self.panel
    }

    /// Whether the quiz-start affordance is enabled.
    pub fn start_enabled(&self) -> bool {
        self.start_enabled
    }

    /// Health of a habitat.
    pub fn health(&self, habitat: &HabitatName) -> Option<u32> {
        self.habitats.get(habitat).map(HabitatState::health)
    }

    /// State of the running quiz, if any.
    pub fn quiz_state(&self) -> Option<QuizState> {
        self.quiz.as_ref().map(QuizSession::state)
    }

    /// Subject of the selected animal.
    pub fn selected_subject(&self) -> Option<&SubjectId> {
        self.selection.as_ref().map(|s| &s.animal.subject)
    }

    /// Marker overlays.
    pub fn overlays(&self) -> &OverlayTracker {
        &self.overlays
    }

    /// Remote calls whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Command sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Command sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Emit the initial presentation state: every health meter, no panel
    /// and the initial quiz-start affordance.
    pub fn announce(&mut self) {
        let mut habitats: Vec<&HabitatState> = self.habitats.values().collect();
        habitats.sort_by(|a, b| a.name().cmp(b.name()));
        for h in habitats {
            self.sink.emit(Command::HealthMeter {
                habitat: h.name().clone(),
                value: h.health(),
                max: h.max_health(),
            });
        }
        self.sink.emit(Command::ShowPanel { panel: self.panel });
        self.sink.emit(Command::SetQuizStartEnabled { enabled: self.start_enabled });
    }

    /// Handle one world event.
    ///
    /// A refused event is logged and returned; router state is unchanged by
    /// it.
    pub fn handle(&mut self, event: WorldEvent) -> Result<()> {
        let result = match event {
            WorldEvent::Tap { entity } => self.on_tap(&entity),
            WorldEvent::TriggerOverlap { a, b } => self.on_overlap(&a, &b),
            WorldEvent::Recognition { marker, state } => {
                self.on_recognition(&marker, state);
                Ok(())
            }
            WorldEvent::Ui { action } => self.on_ui(action),
        };

        if let Err(err) = &result {
            match err {
                RouterError::MissingSessionContext(_) | RouterError::NothingSelectable(_) => {
                    debug!("Ignored event: {}", err)
                }
                RouterError::Habitat(_)
                | RouterError::Quiz(_)
                | RouterError::GateUnresolved(_)
                | RouterError::QuizInProgress(_) => info!("Refused: {}", err),
                _ => warn!("Event not handled: {}", err),
            }
        }
        result
    }

    /// Apply a finished remote call.
    ///
    /// Gate results for a selection that has since been replaced or closed
    /// are dropped. A failed gate check leaves the affordance as it was.
    pub fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match completion {
            Completion::Gate { token, habitat, subject, result } => {
                let Some(selection) = self
                    .selection
                    .as_mut()
                    .filter(|s| s.token.same_session(&token) && token.is_live())
                else {
                    debug!("Dropping stale gate result for {}/{} (session {})", habitat, subject, token.id());
                    return;
                };

                let verdict = match result {
                    Ok(verdict) => verdict,
                    Err(ProgressError::Inert) => {
                        debug!("No store bound; quiz start for {} stays unresolved", subject);
                        return;
                    }
                    Err(e) => {
                        warn!(
                            "Completion check for {}/{} failed: {}; quiz start left {}",
                            habitat,
                            subject,
                            e,
                            if self.start_enabled { "enabled" } else { "disabled" }
                        );
                        return;
                    }
                };
                selection.verdict = Some(verdict);

                self.start_enabled = verdict.is_open();
                self.sink.emit(Command::SetQuizStartEnabled { enabled: self.start_enabled });
            }
            Completion::Commit { subject, result } => match result {
                Ok(()) => debug!("Commit for {} applied", subject),
                Err(e) => debug!("Commit for {} dropped: {}", subject, e),
            },
        }
    }

    /// Wait for every in-flight remote call and apply its result.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(completion) => self.apply(completion),
                None => break,
            }
        }
    }

    /// Consume events until the channel closes, interleaving remote
    /// completions as they arrive, then settle outstanding calls.
    pub async fn run(&mut self, mut events: mpsc::Receiver<WorldEvent>) {
        self.announce();
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        let _ = self.handle(event);
                    }
                    None => break,
                },
                Some(completion) = self.rx.recv() => self.apply(completion),
            }
        }
        self.settle().await;
        info!("Event stream closed");
    }

    /// Replay a fixed script. Each event's remote calls are settled before
    /// the next event is handled, so a replay is deterministic.
    pub async fn run_script(&mut self, events: impl IntoIterator<Item = WorldEvent>) {
        self.announce();
        for event in events {
            let _ = self.handle(event);
            self.settle().await;
        }
        info!("Script finished");
    }

    fn on_tap(&mut self, entity: &EntityId) -> Result<()> {
        let (owner, animal) = self
            .entities
            .nearest_animal(entity)
            .map(|(e, profile)| (e.id.clone(), profile.clone()))
            .ok_or_else(|| RouterError::NothingSelectable(entity.clone()))?;

        if let Some(mut quiz) = self.quiz.take() {
            info!("Quiz for {} abandoned by tap on {}", quiz.subject(), owner);
            quiz.cancel();
        }
        self.clear_selection();

        debug!("Selected {} ({})", animal.name, owner);
        let token = SessionToken::new();
        let habitat = animal.habitat.clone();
        let subject = animal.subject.clone();
        self.selection = Some(Selection {
            entity: owner,
            animal,
            token: token.clone(),
            verdict: None,
        });
        self.set_panel(Panel::Options);
        self.spawn_gate_check(token, habitat, subject);
        Ok(())
    }

    fn on_ui(&mut self, action: UiAction) -> Result<()> {
        match action {
            UiAction::OpenInfo => {
                if let Some(quiz) = self.quiz.as_ref().filter(|q| q.is_active()) {
                    return Err(RouterError::QuizInProgress(quiz.subject().clone()));
                }
                let animal = &self
                    .selection
                    .as_ref()
                    .ok_or(RouterError::MissingSessionContext("info requested without a selection"))?
                    .animal;
                let command = Command::ShowAnimalInfo {
                    name: animal.name.clone(),
                    description: animal.description.clone(),
                    image: animal.image.clone(),
                };
                self.sink.emit(command);
                self.set_panel(Panel::Info);
                Ok(())
            }
            UiAction::StartQuiz => self.start_quiz(),
            UiAction::Answer(selected) => self.on_answer(selected),
            UiAction::CloseAll => {
                if let Some(mut quiz) = self.quiz.take() {
                    quiz.cancel();
                }
                self.clear_selection();
                self.set_panel(Panel::None);
                Ok(())
            }
        }
    }

    fn start_quiz(&mut self) -> Result<()> {
        if let Some(quiz) = self.quiz.as_ref().filter(|q| q.is_active()) {
            return Err(RouterError::QuizInProgress(quiz.subject().clone()));
        }
        if self.panel != Panel::Options {
            return Err(RouterError::MissingSessionContext("quiz start outside the options panel"));
        }
        let selection = self
            .selection
            .as_ref()
            .ok_or(RouterError::MissingSessionContext("quiz start without a selection"))?;
        let subject = selection.animal.subject.clone();
        let verdict = selection
            .verdict
            .ok_or_else(|| RouterError::GateUnresolved(subject.clone()))?;
        let definition = self
            .quizzes
            .get(&subject)
            .cloned()
            .ok_or_else(|| RouterError::NoQuiz(subject.clone()))?;

        let session = QuizSession::start(definition, verdict, self.clock.now())?;
        info!("Quiz started for {} ({})", subject, selection.entity);
        self.quiz = Some(session);
        self.set_panel(Panel::Quiz);
        self.show_current_question();
        Ok(())
    }

    fn on_answer(&mut self, selected: usize) -> Result<()> {
        if self.panel != Panel::Quiz {
            return Err(RouterError::MissingSessionContext("answer outside the quiz panel"));
        }
        let now = self.clock.now();
        let quiz = self
            .quiz
            .as_mut()
            .filter(|q| q.is_active())
            .ok_or(RouterError::MissingSessionContext("answer without an active quiz"))?;
        let outcome = quiz.answer(selected, now);
        let points = quiz.points();

        match outcome {
            AnswerOutcome::Ignored => Err(RouterError::MissingSessionContext("answer without an active quiz")),
            AnswerOutcome::Next { correct, .. } => {
                self.sink.emit(Command::AnswerMarked { correct, points });
                self.show_current_question();
                Ok(())
            }
            AnswerOutcome::Finished { correct, commit } => {
                self.sink.emit(Command::AnswerMarked { correct, points });
                self.sink.emit(Command::QuizFinished {
                    subject: commit.subject.clone(),
                    points: commit.points,
                    duration_secs: commit.duration_secs,
                });
                self.quiz = None;
                self.clear_selection();
                self.set_panel(Panel::None);
                self.spawn_commit(commit);
                Ok(())
            }
        }
    }

    fn show_current_question(&mut self) {
        let Some(quiz) = &self.quiz else {
            return;
        };
        let Some((index, question)) = quiz.current_question() else {
            return;
        };
        let command = Command::ShowQuestion {
            subject: quiz.subject().clone(),
            index,
            total: quiz.total(),
            prompt: question.prompt.clone(),
            options: question.options.clone(),
        };
        self.sink.emit(command);
    }

    fn on_overlap(&mut self, a: &EntityId, b: &EntityId) -> Result<()> {
        use EntityCategory::{Feedbag, Habitat, Sponge, Trash};

        match (self.entities.category(a), self.entities.category(b)) {
            (Trash, Sponge) => self.clean(a, b),
            (Sponge, Trash) => self.clean(b, a),
            (Habitat, Feedbag) => self.feed(a, b),
            (Feedbag, Habitat) => self.feed(b, a),
            (x, y) => {
                debug!("No interaction between {} ({:?}) and {} ({:?})", a, x, b, y);
                Ok(())
            }
        }
    }

    fn clean(&mut self, trash: &EntityId, sponge: &EntityId) -> Result<()> {
        let name = self.owner_of(trash)?;
        let change = self
            .habitats
            .get_mut(&name)
            .ok_or_else(|| RouterError::UnknownHabitat(name.clone()))?
            .clean();

        self.sink.emit(Command::PlayCue { cue: Cue::Clean });
        self.emit_health(change);
        self.sink.emit(Command::Despawn { entity: trash.clone(), delay_ms: TRASH_DESPAWN_MS });
        self.sink.emit(Command::Despawn { entity: sponge.clone(), delay_ms: SPONGE_DESPAWN_MS });
        Ok(())
    }

    fn feed(&mut self, habitat: &EntityId, feedbag: &EntityId) -> Result<()> {
        let name = self.owner_of(habitat)?;
        let change = self
            .habitats
            .get_mut(&name)
            .ok_or_else(|| RouterError::UnknownHabitat(name.clone()))?
            .feed()?;

        self.sink.emit(Command::PlayCue { cue: Cue::Feed });
        self.emit_health(change);
        self.sink.emit(Command::Despawn { entity: feedbag.clone(), delay_ms: FEEDBAG_DESPAWN_MS });
        Ok(())
    }

    fn owner_of(&self, entity: &EntityId) -> Result<HabitatName> {
        self.entities
            .owning_habitat(entity)
            .cloned()
            .ok_or_else(|| RouterError::Unowned(entity.clone()))
    }

    fn emit_health(&mut self, change: HealthChange) {
        let unlocked = change.unlocked();
        self.sink.emit(Command::HealthMeter {
            habitat: change.habitat,
            value: change.health,
            max: change.max,
        });
        if unlocked {
            self.sink.emit(Command::Activate { entities: change.unlock });
        }
    }

    fn on_recognition(&mut self, marker: &MarkerId, state: TrackingState) {
        for command in self.overlays.update(marker, state) {
            self.sink.emit(command);
        }
    }

    fn set_panel(&mut self, panel: Panel) {
        self.panel = panel;
        self.sink.emit(Command::ShowPanel { panel });
    }

    fn clear_selection(&mut self) {
        if let Some(old) = self.selection.take() {
            old.token.revoke();
        }
    }

    fn spawn_gate_check(&mut self, token: SessionToken, habitat: HabitatName, subject: SubjectId) {
        let gate = self.gate.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = gate.is_completed(&habitat, &subject).await;
            let _ = tx.send(Completion::Gate { token, habitat, subject, result });
        });
    }

    fn spawn_commit(&mut self, request: CommitRequest) {
        let sync = self.sync.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = sync.commit(&request).await;
            let _ = tx.send(Completion::Commit { subject: request.subject, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use reefwarden_core::{OverlayId, PlayerId, Time};
    use reefwarden_session::{HabitatError, QuizError};
    use reefwarden_storage::{MemoryStore, RemoteStore, StoreError};
    use serde_json::{json, Map, Value};
    use tokio::sync::Semaphore;

    const CONFIG: &str = r#"{
        "habitats": [
            { "name": "Arctic", "unlocks": ["arctic-fish"] },
            { "name": "Ocean" }
        ],
        "quizzes": [
            { "subject": "Penguin", "habitat": "Arctic",
              "questions": ["Q1", "Q2", "Q3"],
              "answer_sets": [["a","b","c"], ["a","b","c"], ["a","b","c"]],
              "correct_indexes": [1, 0, 2] },
            { "subject": "Polarbear", "habitat": "Arctic",
              "questions": ["Q1"],
              "answer_sets": [["a","b","c"]],
              "correct_indexes": [0] }
        ],
        "entities": [
            { "id": "arctic", "tag": "Habitat", "habitat": "Arctic" },
            { "id": "penguin", "parent": "arctic", "tag": "Animal",
              "animal": { "name": "Penguin", "description": "Flightless bird",
                          "habitat": "Arctic", "subject": "Penguin" } },
            { "id": "penguin-flipper", "parent": "penguin" },
            { "id": "polarbear", "parent": "arctic", "tag": "Animal",
              "animal": { "name": "Polar Bear", "habitat": "Arctic", "subject": "Polarbear" } },
            { "id": "rock", "parent": "arctic" },
            { "id": "trash-1", "parent": "arctic", "tag": "Trash" },
            { "id": "sponge-1", "tag": "Sponge" },
            { "id": "feedbag-1", "tag": "Feedbag" },
            { "id": "arctic-fish", "parent": "arctic", "tag": "Content" }
        ],
        "markers": [
            { "id": "arctic-card", "overlay": "arctic-canvas", "content": "arctic-fish" }
        ]
    }"#;

    const PENGUIN_PATH: &str = "players/p1/habitats/Arctic/Penguin";

    fn t0() -> Time {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn router(handle: RemoteHandle) -> (InteractionRouter<Vec<Command>>, Arc<ManualClock>) {
        let config = GameConfig::from_json(CONFIG).unwrap();
        let clock = Arc::new(ManualClock::new(t0()));
        let router = InteractionRouter::new(&config, handle, Vec::new()).with_clock(clock.clone());
        (router, clock)
    }

    fn bound(store: Arc<dyn RemoteStore>) -> RemoteHandle {
        RemoteHandle::bound(PlayerId::new("p1"), store)
    }

    fn tap(id: &str) -> WorldEvent {
        WorldEvent::Tap { entity: EntityId::new(id) }
    }

    fn ui(action: UiAction) -> WorldEvent {
        WorldEvent::Ui { action }
    }

    fn overlap(a: &str, b: &str) -> WorldEvent {
        WorldEvent::TriggerOverlap { a: EntityId::new(a), b: EntityId::new(b) }
    }

    fn start_toggles(commands: &[Command]) -> Vec<bool> {
        commands
            .iter()
            .filter_map(|c| match c {
                Command::SetQuizStartEnabled { enabled } => Some(*enabled),
                _ => None,
            })
            .collect()
    }

    /// Holds every read until the test hands out permits.
    struct HeldStore {
        inner: MemoryStore,
        permits: Arc<Semaphore>,
    }

    #[async_trait]
    impl RemoteStore for HeldStore {
        async fn get(&self, path: &str) -> reefwarden_storage::Result<Option<Value>> {
            self.permits.acquire().await.unwrap().forget();
            self.inner.get(path).await
        }

        async fn set(&self, path: &str, value: Value) -> reefwarden_storage::Result<()> {
            self.inner.set(path, value).await
        }

        async fn update(&self, path: &str, fields: Map<String, Value>) -> reefwarden_storage::Result<()> {
            self.inner.update(path, fields).await
        }
    }

    struct DownStore;

    #[async_trait]
    impl RemoteStore for DownStore {
        async fn get(&self, _path: &str) -> reefwarden_storage::Result<Option<Value>> {
            Err(StoreError::Unavailable("offline".into()))
        }

        async fn set(&self, _path: &str, _value: Value) -> reefwarden_storage::Result<()> {
            Err(StoreError::Unavailable("offline".into()))
        }

        async fn update(&self, _path: &str, _fields: Map<String, Value>) -> reefwarden_storage::Result<()> {
            Err(StoreError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_scenario_habitat_restoration_via_triggers() {
        let (mut r, _) = router(RemoteHandle::new());
        let arctic = HabitatName::new("Arctic");

        let err = r.handle(overlap("arctic", "feedbag-1")).unwrap_err();
        assert_eq!(err, RouterError::Habitat(HabitatError::FeedDenied { health: 0, required: 50 }));
        assert_eq!(r.health(&arctic), Some(0));
        assert!(r.sink().is_empty());

        for _ in 0..5 {
            r.handle(overlap("sponge-1", "trash-1")).unwrap();
        }
        assert_eq!(r.health(&arctic), Some(50));
        assert_eq!(
            &r.sink()[..4],
            &[
                Command::PlayCue { cue: Cue::Clean },
                Command::HealthMeter { habitat: arctic.clone(), value: 10, max: 100 },
                Command::Despawn { entity: EntityId::new("trash-1"), delay_ms: 100 },
                Command::Despawn { entity: EntityId::new("sponge-1"), delay_ms: 0 },
            ]
        );
        r.sink_mut().clear();

        r.handle(overlap("feedbag-1", "arctic")).unwrap();
        assert_eq!(r.health(&arctic), Some(100));
        assert_eq!(
            r.sink().as_slice(),
            &[
                Command::PlayCue { cue: Cue::Feed },
                Command::HealthMeter { habitat: arctic.clone(), value: 100, max: 100 },
                Command::Activate { entities: vec![EntityId::new("arctic-fish")] },
                Command::Despawn { entity: EntityId::new("feedbag-1"), delay_ms: 300 },
            ]
        );
    }

    #[test]
    fn test_unrelated_overlap_is_ignored() {
        let (mut r, _) = router(RemoteHandle::new());
        r.handle(overlap("rock", "sponge-1")).unwrap();
        r.handle(overlap("trash-1", "feedbag-1")).unwrap();
        assert!(r.sink().is_empty());
        assert_eq!(r.health(&HabitatName::new("Arctic")), Some(0));
    }

    #[test]
    fn test_tap_on_nothing_selectable() {
        let (mut r, _) = router(RemoteHandle::new());
        let err = r.handle(tap("rock")).unwrap_err();
        assert_eq!(err, RouterError::NothingSelectable(EntityId::new("rock")));
        assert_eq!(r.panel(), Panel::None);
        assert_eq!(r.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_tap_on_child_selects_animal() {
        let store = Arc::new(MemoryStore::new());
        let (mut r, _) = router(bound(store));

        r.handle(tap("penguin-flipper")).unwrap();
        assert_eq!(r.panel(), Panel::Options);
        assert_eq!(r.selected_subject(), Some(&SubjectId::new("Penguin")));

        r.settle().await;
        assert_eq!(start_toggles(r.sink()), vec![true]);
        assert!(r.start_enabled());
    }

    #[tokio::test]
    async fn test_open_info_shows_selected_animal() {
        let (mut r, _) = router(RemoteHandle::new());
        let err = r.handle(ui(UiAction::OpenInfo)).unwrap_err();
        assert!(matches!(err, RouterError::MissingSessionContext(_)));

        r.handle(tap("penguin")).unwrap();
        r.handle(ui(UiAction::OpenInfo)).unwrap();
        assert_eq!(r.panel(), Panel::Info);
        assert!(r.sink().contains(&Command::ShowAnimalInfo {
            name: "Penguin".into(),
            description: "Flightless bird".into(),
            image: None,
        }));
        r.settle().await;
    }

    #[tokio::test]
    async fn test_full_quiz_commits_once() {
        let store = Arc::new(MemoryStore::new());
        let handle = bound(store.clone());
        let (mut r, clock) = router(handle.clone());

        r.handle(tap("penguin")).unwrap();
        r.settle().await;
        r.handle(ui(UiAction::StartQuiz)).unwrap();
        assert_eq!(r.panel(), Panel::Quiz);
        assert_eq!(r.quiz_state(), Some(QuizState::Active { question: 0 }));

        clock.advance(Duration::seconds(30));
        for selected in [1, 1, 2] {
            r.handle(ui(UiAction::Answer(selected))).unwrap();
        }
        assert_eq!(r.panel(), Panel::None);
        assert!(r.quiz_state().is_none());
        assert!(r.selected_subject().is_none());
        assert!(r.sink().contains(&Command::QuizFinished {
            subject: SubjectId::new("Penguin"),
            points: 20,
            duration_secs: 30.0,
        }));

        r.settle().await;
        let record = ProgressSync::new(handle)
            .load(&HabitatName::new("Arctic"), &SubjectId::new("Penguin"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.points_earned, 20);
        assert_eq!(record.time_taken, 30.0);
        assert!(record.is_completed);

        // Further answers go nowhere
        let err = r.handle(ui(UiAction::Answer(0))).unwrap_err();
        assert!(matches!(err, RouterError::MissingSessionContext(_)));
    }

    #[tokio::test]
    async fn test_questions_are_shown_in_order() {
        let (mut r, _) = router(bound(Arc::new(MemoryStore::new())));
        r.handle(tap("penguin")).unwrap();
        r.settle().await;
        r.handle(ui(UiAction::StartQuiz)).unwrap();
        r.handle(ui(UiAction::Answer(1))).unwrap();

        let shown: Vec<(usize, String)> = r
            .sink()
            .iter()
            .filter_map(|c| match c {
                Command::ShowQuestion { index, prompt, total, .. } => {
                    assert_eq!(*total, 3);
                    Some((*index, prompt.clone()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec![(0, "Q1".to_string()), (1, "Q2".to_string())]);
        assert!(r.sink().contains(&Command::AnswerMarked { correct: true, points: 10 }));
    }

    #[tokio::test]
    async fn test_completed_subject_refuses_retake() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(PENGUIN_PATH, json!({ "timeTaken": 12.0, "pointsEarned": 30, "isCompleted": true }))
            .await
            .unwrap();
        let (mut r, _) = router(bound(store));

        r.handle(tap("penguin")).unwrap();
        r.settle().await;
        assert_eq!(start_toggles(r.sink()), vec![false]);
        assert!(!r.start_enabled());

        let err = r.handle(ui(UiAction::StartQuiz)).unwrap_err();
        assert_eq!(err, RouterError::Quiz(QuizError::AlreadyCompleted(SubjectId::new("Penguin"))));
        assert!(r.quiz_state().is_none());
        assert_eq!(r.panel(), Panel::Options);
    }

    #[tokio::test]
    async fn test_close_mid_quiz_never_commits() {
        let store = Arc::new(MemoryStore::new());
        let (mut r, _) = router(bound(store.clone()));

        r.handle(tap("penguin")).unwrap();
        r.settle().await;
        r.handle(ui(UiAction::StartQuiz)).unwrap();
        r.handle(ui(UiAction::Answer(1))).unwrap();
        r.handle(ui(UiAction::CloseAll)).unwrap();

        assert_eq!(r.panel(), Panel::None);
        assert!(r.quiz_state().is_none());
        r.settle().await;
        assert_eq!(store.get(PENGUIN_PATH).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tap_during_quiz_cancels_it() {
        let store = Arc::new(MemoryStore::new());
        let (mut r, _) = router(bound(store.clone()));

        r.handle(tap("penguin")).unwrap();
        r.settle().await;
        r.handle(ui(UiAction::StartQuiz)).unwrap();
        r.handle(ui(UiAction::Answer(1))).unwrap();

        r.handle(tap("polarbear")).unwrap();
        assert!(r.quiz_state().is_none());
        assert_eq!(r.panel(), Panel::Options);
        assert_eq!(r.selected_subject(), Some(&SubjectId::new("Polarbear")));

        r.settle().await;
        assert_eq!(store.get(PENGUIN_PATH).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_start_quiz_twice_is_refused() {
        let (mut r, _) = router(bound(Arc::new(MemoryStore::new())));
        r.handle(tap("penguin")).unwrap();
        r.settle().await;
        r.handle(ui(UiAction::StartQuiz)).unwrap();
        let err = r.handle(ui(UiAction::StartQuiz)).unwrap_err();
        assert_eq!(err, RouterError::QuizInProgress(SubjectId::new("Penguin")));
        assert_eq!(r.quiz_state(), Some(QuizState::Active { question: 0 }));
    }

    #[tokio::test]
    async fn test_stale_gate_result_after_retap_is_dropped() {
        let inner = MemoryStore::new();
        inner
            .set(PENGUIN_PATH, json!({ "timeTaken": 5.0, "pointsEarned": 10, "isCompleted": true }))
            .await
            .unwrap();
        let permits = Arc::new(Semaphore::new(0));
        let store = Arc::new(HeldStore { inner, permits: permits.clone() });
        let (mut r, _) = router(bound(store));

        // Penguin's check is still pending when the player moves on
        r.handle(tap("penguin")).unwrap();
        r.handle(tap("polarbear")).unwrap();
        assert_eq!(r.in_flight(), 2);

        permits.add_permits(2);
        r.settle().await;

        assert_eq!(start_toggles(r.sink()), vec![true]);
        assert!(r.start_enabled());
        r.handle(ui(UiAction::StartQuiz)).unwrap();
        assert_eq!(r.quiz_state(), Some(QuizState::Active { question: 0 }));
    }

    #[tokio::test]
    async fn test_gate_result_after_close_is_dropped() {
        let permits = Arc::new(Semaphore::new(0));
        let store = Arc::new(HeldStore { inner: MemoryStore::new(), permits: permits.clone() });
        let (mut r, _) = router(bound(store));

        r.handle(tap("penguin")).unwrap();
        r.handle(ui(UiAction::CloseAll)).unwrap();
        permits.add_permits(1);
        r.settle().await;

        assert!(start_toggles(r.sink()).is_empty());
        assert_eq!(r.panel(), Panel::None);
    }

    #[tokio::test]
    async fn test_gate_failure_leaves_affordance_unchanged() {
        let (mut r, _) = router(bound(Arc::new(DownStore)));
        assert!(r.start_enabled());

        r.handle(tap("penguin")).unwrap();
        r.settle().await;
        assert!(start_toggles(r.sink()).is_empty());
        assert!(r.start_enabled());

        let err = r.handle(ui(UiAction::StartQuiz)).unwrap_err();
        assert_eq!(err, RouterError::GateUnresolved(SubjectId::new("Penguin")));
    }

    #[tokio::test]
    async fn test_unbound_engine_stays_inert() {
        let (mut r, _) = router(RemoteHandle::new());

        r.handle(tap("penguin")).unwrap();
        r.settle().await;
        assert_eq!(r.in_flight(), 0);
        assert!(start_toggles(r.sink()).is_empty());

        let err = r.handle(ui(UiAction::StartQuiz)).unwrap_err();
        assert_eq!(err, RouterError::GateUnresolved(SubjectId::new("Penguin")));
    }

    #[tokio::test]
    async fn test_info_refused_while_quiz_active() {
        let store = Arc::new(MemoryStore::new());
        let (mut r, _) = router(bound(store.clone()));

        r.handle(tap("penguin")).unwrap();
        r.settle().await;
        r.handle(ui(UiAction::StartQuiz)).unwrap();

        let err = r.handle(ui(UiAction::OpenInfo)).unwrap_err();
        assert_eq!(err, RouterError::QuizInProgress(SubjectId::new("Penguin")));
        assert_eq!(r.panel(), Panel::Quiz);

        // The quiz is still answerable from its own panel
        r.handle(ui(UiAction::Answer(1))).unwrap();
        assert_eq!(r.quiz_state(), Some(QuizState::Active { question: 1 }));
        r.settle().await;
        assert_eq!(store.get(PENGUIN_PATH).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quiz_starts_only_from_options_panel() {
        let (mut r, _) = router(bound(Arc::new(MemoryStore::new())));
        r.handle(tap("penguin")).unwrap();
        r.settle().await;
        r.handle(ui(UiAction::OpenInfo)).unwrap();

        let err = r.handle(ui(UiAction::StartQuiz)).unwrap_err();
        assert!(matches!(err, RouterError::MissingSessionContext(_)));
        assert!(r.quiz_state().is_none());
        assert_eq!(r.panel(), Panel::Info);

        let err = r.handle(ui(UiAction::Answer(1))).unwrap_err();
        assert!(matches!(err, RouterError::MissingSessionContext(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_script_replay_commits_every_time() {
        for _ in 0..20 {
            let store = Arc::new(MemoryStore::new());
            let handle = bound(store.clone());
            let (mut r, _) = router(handle.clone());

            r.run_script(vec![
                tap("penguin"),
                ui(UiAction::StartQuiz),
                ui(UiAction::Answer(1)),
                ui(UiAction::Answer(0)),
                ui(UiAction::Answer(2)),
            ])
            .await;

            assert_eq!(r.in_flight(), 0);
            let record = ProgressSync::new(handle)
                .load(&HabitatName::new("Arctic"), &SubjectId::new("Penguin"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(record.points_earned, 30);
            assert!(record.is_completed);
        }
    }

    #[tokio::test]
    async fn test_run_processes_script_until_closed() {
        let store = Arc::new(MemoryStore::new());
        let (mut r, _) = router(bound(store.clone()));
        let (tx, rx) = mpsc::channel(16);

        let events = vec![
            WorldEvent::Recognition { marker: MarkerId::new("arctic-card"), state: TrackingState::Tracking },
            tap("polarbear"),
        ];
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        r.run(rx).await;
        assert_eq!(r.in_flight(), 0);
        assert_eq!(r.overlays().visible(), Some(&OverlayId::new("arctic-canvas")));

        let sink = r.sink();
        assert_eq!(
            &sink[..4],
            &[
                Command::HealthMeter { habitat: HabitatName::new("Arctic"), value: 0, max: 100 },
                Command::HealthMeter { habitat: HabitatName::new("Ocean"), value: 0, max: 100 },
                Command::ShowPanel { panel: Panel::None },
                Command::SetQuizStartEnabled { enabled: true },
            ]
        );
        assert!(sink.contains(&Command::Activate { entities: vec![EntityId::new("arctic-fish")] }));
        assert!(sink.contains(&Command::ShowOverlay { overlay: OverlayId::new("arctic-canvas") }));
        assert_eq!(r.panel(), Panel::Options);
    }
}
