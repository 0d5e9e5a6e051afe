//! Run Council use case
//!
//! Orchestrates one deliberation session: creates the session and one
//! response unit per persona, fans out one streaming task per unit, and
//! forwards ordered events to the caller while deriving session status
//! after every unit transition.
//!
//! Unit state is owned by the orchestrator's single event loop; executors
//! only report over a channel. That gives every status derivation a
//! consistent snapshot without any cross-task locking.

use crate::ports::llm_gateway::{LlmGateway, ModelStreamEvent};
use crate::ports::memory_gateway::MemoryGateway;
use crate::ports::session_store::{SessionStore, StoreError};
use crate::preference::PreferenceLearner;
use crate::resolver::ModelResolver;
use council_domain::{
    CouncilEvent, DeliberationSession, ModelId, Persona, PromptTemplate, Query, ResponseUnit,
    SessionStatus, TokenUsage, UserId, derive_session_status,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How many memory notes to fold into a persona's system prompt.
const MEMORY_SEARCH_LIMIT: usize = 3;

/// Budget for the best-effort memory retrieval per unit.
const MEMORY_TIMEOUT: Duration = Duration::from_secs(2);

/// Caller-facing event channel capacity.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Errors that can occur while starting a deliberation
#[derive(Error, Debug)]
pub enum RunCouncilError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Executor -> orchestrator progress messages for one unit
#[derive(Debug)]
enum UnitEvent {
    Streaming,
    Resolved(ModelId),
    Chunk(String),
    Completed { usage: TokenUsage, latency_ms: u64 },
    Failed(String),
    Cancelled,
}

/// Handle to a running deliberation session
///
/// Consume [`next_event`](Self::next_event) until it returns `None`, or
/// call [`wait`](Self::wait) to discard events and just collect the final
/// units. Dropping the handle cancels nothing by itself; use
/// [`cancel`](Self::cancel) for that.
#[derive(Debug)]
pub struct CouncilHandle {
    pub session: DeliberationSession,
    events: mpsc::Receiver<CouncilEvent>,
    cancellation: CancellationToken,
    unit_tokens: HashMap<Persona, CancellationToken>,
    outcome: JoinHandle<Vec<ResponseUnit>>,
}

impl CouncilHandle {
    /// Next caller-facing event; `None` once the session has settled.
    pub async fn next_event(&mut self) -> Option<CouncilEvent> {
        self.events.recv().await
    }

    /// Signal every still-running executor to stop between chunks.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Cancel a single persona's unit; siblings are unaffected.
    pub fn cancel_unit(&self, persona: Persona) {
        if let Some(token) = self.unit_tokens.get(&persona) {
            token.cancel();
        }
    }

    /// Token that trips when [`cancel`](Self::cancel) is called.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Wait for all units to settle, discarding any unread events.
    pub async fn wait(self) -> Vec<ResponseUnit> {
        drop(self.events);
        match self.outcome.await {
            Ok(units) => units,
            Err(e) => {
                warn!(error = %e, "Council orchestrator task failed to join");
                Vec::new()
            }
        }
    }
}

/// Use case for running one council deliberation end to end
pub struct RunCouncilUseCase {
    gateway: Arc<dyn LlmGateway>,
    store: Arc<dyn SessionStore>,
    memory: Arc<dyn MemoryGateway>,
    resolver: Arc<ModelResolver>,
    learner: PreferenceLearner,
}

impl RunCouncilUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        store: Arc<dyn SessionStore>,
        memory: Arc<dyn MemoryGateway>,
        resolver: Arc<ModelResolver>,
    ) -> Self {
        let learner = PreferenceLearner::new(Arc::clone(&store));
        Self {
            gateway,
            store,
            memory,
            resolver,
            learner,
        }
    }

    /// Create a session for the query and fan out one streaming task per
    /// persona. Returns as soon as the session and units are persisted;
    /// streaming progress arrives through the returned handle.
    pub async fn execute(
        &self,
        user: UserId,
        query_text: &str,
    ) -> Result<CouncilHandle, RunCouncilError> {
        let query =
            Query::new(query_text).map_err(|e| RunCouncilError::InvalidQuery(e.to_string()))?;

        let ordering = self.learner.ordering_for(&user).await;
        let session = DeliberationSession::new(user.clone(), query.clone());
        let units: Vec<ResponseUnit> = ordering
            .iter()
            .map(|persona| ResponseUnit::new(session.id.clone(), *persona))
            .collect();

        self.store.create_session(&session).await?;
        self.store.insert_units(&units).await?;
        info!(session = %session.id, personas = units.len(), "Council session created");

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (unit_tx, unit_rx) = mpsc::channel::<(Persona, UnitEvent)>(64);
        let cancellation = CancellationToken::new();

        let mut executors = JoinSet::new();
        let mut unit_tokens = HashMap::new();
        for persona in &ordering {
            // Child tokens trip on session-wide cancel and allow cancelling
            // one unit without touching its siblings.
            let unit_token = cancellation.child_token();
            unit_tokens.insert(*persona, unit_token.clone());
            executors.spawn(run_unit(
                Arc::clone(&self.gateway),
                Arc::clone(&self.memory),
                Arc::clone(&self.resolver),
                unit_token,
                user.clone(),
                query.clone(),
                *persona,
                unit_tx.clone(),
            ));
        }
        // The orchestrator loop ends when every executor has dropped its sender.
        drop(unit_tx);

        let outcome = tokio::spawn(orchestrate(
            Arc::clone(&self.store),
            units,
            unit_rx,
            event_tx,
            executors,
        ));

        Ok(CouncilHandle {
            session,
            events: event_rx,
            cancellation,
            unit_tokens,
            outcome,
        })
    }
}

/// Single event loop owning the units: applies executor transitions,
/// persists them, and forwards caller-facing events in order.
async fn orchestrate(
    store: Arc<dyn SessionStore>,
    mut units: Vec<ResponseUnit>,
    mut unit_rx: mpsc::Receiver<(Persona, UnitEvent)>,
    event_tx: mpsc::Sender<CouncilEvent>,
    mut executors: JoinSet<()>,
) -> Vec<ResponseUnit> {
    let mut session_status = derive_session_status(units.iter().map(|u| u.status));

    while let Some((persona, event)) = unit_rx.recv().await {
        let Some(unit) = units.iter_mut().find(|u| u.persona == persona) else {
            continue;
        };

        match event {
            UnitEvent::Streaming => {
                unit.begin_streaming();
                emit(
                    &event_tx,
                    CouncilEvent::UnitStatusChanged {
                        persona,
                        status: unit.status,
                    },
                )
                .await;
            }
            UnitEvent::Resolved(model) => {
                unit.set_resolved_model(model);
                persist(&store, unit).await;
            }
            UnitEvent::Chunk(text) => {
                unit.append_chunk(&text);
                emit(&event_tx, CouncilEvent::ChunkAppended { persona, text }).await;
            }
            UnitEvent::Completed { usage, latency_ms } => {
                unit.complete(usage, latency_ms);
                persist(&store, unit).await;
                emit(
                    &event_tx,
                    CouncilEvent::UnitStatusChanged {
                        persona,
                        status: unit.status,
                    },
                )
                .await;
                emit(
                    &event_tx,
                    CouncilEvent::UnitCompleted {
                        persona,
                        latency_ms,
                        usage,
                    },
                )
                .await;
            }
            UnitEvent::Failed(reason) => {
                unit.fail(reason.clone());
                persist(&store, unit).await;
                emit(
                    &event_tx,
                    CouncilEvent::UnitStatusChanged {
                        persona,
                        status: unit.status,
                    },
                )
                .await;
                emit(&event_tx, CouncilEvent::UnitFailed { persona, reason }).await;
            }
            UnitEvent::Cancelled => {
                unit.cancel();
                persist(&store, unit).await;
                emit(
                    &event_tx,
                    CouncilEvent::UnitStatusChanged {
                        persona,
                        status: unit.status,
                    },
                )
                .await;
                emit(
                    &event_tx,
                    CouncilEvent::UnitFailed {
                        persona,
                        reason: "cancelled".to_string(),
                    },
                )
                .await;
            }
        }

        // Derived, never stored: recompute from the current snapshot.
        let derived = derive_session_status(units.iter().map(|u| u.status));
        if derived != session_status {
            session_status = derived;
            emit(
                &event_tx,
                CouncilEvent::SessionStatusChanged { status: derived },
            )
            .await;
        }
    }

    // Reap executor tasks; their results already arrived over the channel.
    while let Some(result) = executors.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "Executor task join error");
        }
    }

    debug!(status = ?session_status, "Council session settled");
    units
}

async fn emit(tx: &mpsc::Sender<CouncilEvent>, event: CouncilEvent) {
    // The caller may have stopped listening; that's not our problem.
    let _ = tx.send(event).await;
}

async fn persist(store: &Arc<dyn SessionStore>, unit: &ResponseUnit) {
    if let Err(e) = store.update_unit(unit).await {
        warn!(persona = %unit.persona, error = %e, "Failed to persist unit update");
    }
}

/// Streaming executor: drives exactly one response unit from `Pending` to
/// a terminal state. Failures here are scoped to this unit; sibling
/// executors continue unaffected.
#[allow(clippy::too_many_arguments)]
async fn run_unit(
    gateway: Arc<dyn LlmGateway>,
    memory: Arc<dyn MemoryGateway>,
    resolver: Arc<ModelResolver>,
    cancellation: CancellationToken,
    user: UserId,
    query: Query,
    persona: Persona,
    tx: mpsc::Sender<(Persona, UnitEvent)>,
) {
    let started = std::time::Instant::now();
    let send = |event: UnitEvent| {
        let tx = tx.clone();
        async move {
            let _ = tx.send((persona, event)).await;
        }
    };

    send(UnitEvent::Streaming).await;

    let definition = persona.definition();
    let resolved = match resolver.resolve(definition.nominal_model, Some(query.content())) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(persona = %persona, error = %e, "Model resolution failed");
            send(UnitEvent::Failed(e.to_string())).await;
            return;
        }
    };
    if resolved.fell_back {
        info!(persona = %persona, model = %resolved.model, "Persona running on fallback model");
    }
    send(UnitEvent::Resolved(resolved.model.clone())).await;

    // Best-effort enrichment: augmentation failures are logged and ignored.
    let system_prompt = match timeout(
        MEMORY_TIMEOUT,
        memory.search(query.content(), &user, MEMORY_SEARCH_LIMIT),
    )
    .await
    {
        Ok(Ok(notes)) if !notes.is_empty() => {
            let texts: Vec<String> = notes.into_iter().map(|n| n.text).collect();
            debug!(persona = %persona, notes = texts.len(), "Augmenting prompt with memory context");
            PromptTemplate::with_memory_context(definition.system_prompt, &texts)
        }
        Ok(Ok(_)) => definition.system_prompt.to_string(),
        Ok(Err(e)) => {
            warn!(persona = %persona, error = %e, "Memory retrieval failed, proceeding without context");
            definition.system_prompt.to_string()
        }
        Err(_) => {
            warn!(persona = %persona, "Memory retrieval timed out, proceeding without context");
            definition.system_prompt.to_string()
        }
    };

    let model_session = match gateway.create_session(&resolved.model, &system_prompt).await {
        Ok(session) => session,
        Err(e) => {
            send(UnitEvent::Failed(e.to_string())).await;
            return;
        }
    };

    let mut stream = match model_session.send_streaming(query.content()).await {
        Ok(handle) => handle,
        Err(e) => {
            send(UnitEvent::Failed(e.to_string())).await;
            return;
        }
    };

    loop {
        tokio::select! {
            // Checked first on every iteration: once cancelled, no
            // further chunks are relayed even if the stream has more
            // buffered.
            biased;
            _ = cancellation.cancelled() => {
                info!(persona = %persona, "Unit cancelled mid-stream");
                send(UnitEvent::Cancelled).await;
                return;
            }
            event = stream.receiver.recv() => match event {
                Some(ModelStreamEvent::Delta(chunk)) => {
                    send(UnitEvent::Chunk(chunk)).await;
                }
                Some(ModelStreamEvent::Completed { usage }) => {
                    send(UnitEvent::Completed {
                        usage,
                        latency_ms: started.elapsed().as_millis() as u64,
                    })
                    .await;
                    return;
                }
                Some(ModelStreamEvent::Error(e)) => {
                    send(UnitEvent::Failed(e)).await;
                    return;
                }
                None => {
                    send(UnitEvent::Failed("stream ended without completion".to_string())).await;
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::breaker_state::NoBreakers;
    use crate::use_cases::support::{FixedBreakers, MemStore, Script, ScriptedGateway, StubMemory};
    use council_domain::{FAILED_CONTENT_PLACEHOLDER, FallbackChains, ProviderKey, UnitStatus};

    struct Harness {
        store: Arc<MemStore>,
        memory: Arc<StubMemory>,
        gateway: Arc<ScriptedGateway>,
        use_case: RunCouncilUseCase,
    }

    fn harness(gateway: ScriptedGateway, memory: StubMemory, store: MemStore) -> Harness {
        let store = Arc::new(store);
        let memory = Arc::new(memory);
        let gateway = Arc::new(gateway);
        let resolver = Arc::new(ModelResolver::new(
            Arc::new(NoBreakers),
            FallbackChains::standard(),
        ));
        let use_case = RunCouncilUseCase::new(
            Arc::clone(&gateway) as Arc<dyn LlmGateway>,
            Arc::clone(&store) as Arc<dyn SessionStore>,
            Arc::clone(&memory) as Arc<dyn MemoryGateway>,
            resolver,
        );
        Harness {
            store,
            memory,
            gateway,
            use_case,
        }
    }

    fn user() -> UserId {
        UserId::new("user-1")
    }

    const QUERY: &str = "Should we expand into the European market next year?";

    async fn drain(handle: &mut CouncilHandle) -> Vec<CouncilEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn blank_query_is_rejected_before_any_persistence() {
        let h = harness(
            ScriptedGateway::all_personas_complete(),
            StubMemory::empty(),
            MemStore::new(),
        );
        let err = h.use_case.execute(user(), "   ").await.unwrap_err();
        assert!(matches!(err, RunCouncilError::InvalidQuery(_)));
        assert!(h.store.sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn all_personas_stream_to_completion() {
        let h = harness(
            ScriptedGateway::all_personas_complete(),
            StubMemory::empty(),
            MemStore::new(),
        );
        let mut handle = h.use_case.execute(user(), QUERY).await.unwrap();
        let session_id = handle.session.id.clone();
        let events = drain(&mut handle).await;
        let units = handle.wait().await;

        assert_eq!(units.len(), 4);
        for unit in &units {
            assert_eq!(unit.status, UnitStatus::Completed);
            assert_eq!(
                unit.content,
                format!("response from {}", unit.persona.as_str())
            );
            assert_eq!(unit.usage, Some(TokenUsage::new(10, 20)));
            assert!(unit.resolved_model.is_some());
        }

        // The final event is the session settling as Completed.
        assert_eq!(
            events.last(),
            Some(&CouncilEvent::SessionStatusChanged {
                status: SessionStatus::Completed
            })
        );
        // Exactly one terminal session transition, no Failed ever emitted.
        assert!(!events.iter().any(|e| matches!(
            e,
            CouncilEvent::SessionStatusChanged {
                status: SessionStatus::Failed
            }
        )));

        // Store saw every unit settle too.
        for persona in Persona::default_order() {
            assert_eq!(
                h.store.unit(&session_id, persona).status,
                UnitStatus::Completed
            );
        }
    }

    #[tokio::test]
    async fn per_persona_events_arrive_in_lifecycle_order() {
        let h = harness(
            ScriptedGateway::all_personas_complete(),
            StubMemory::empty(),
            MemStore::new(),
        );
        let mut handle = h.use_case.execute(user(), QUERY).await.unwrap();
        let events = drain(&mut handle).await;

        for persona in Persona::default_order() {
            let per_unit: Vec<&CouncilEvent> = events
                .iter()
                .filter(|e| e.persona() == Some(persona))
                .collect();
            assert!(matches!(
                per_unit.first(),
                Some(CouncilEvent::UnitStatusChanged {
                    status: UnitStatus::Streaming,
                    ..
                })
            ));
            assert!(matches!(
                per_unit.last(),
                Some(CouncilEvent::UnitCompleted { .. })
            ));
            // The terminal status change lands right before UnitCompleted,
            // with nothing but chunks in between.
            assert!(matches!(
                per_unit[per_unit.len() - 2],
                CouncilEvent::UnitStatusChanged {
                    status: UnitStatus::Completed,
                    ..
                }
            ));
            assert!(per_unit[1..per_unit.len() - 2]
                .iter()
                .all(|e| matches!(e, CouncilEvent::ChunkAppended { .. })));
        }
    }

    #[tokio::test]
    async fn one_failed_unit_fails_the_session_but_not_its_siblings() {
        let gateway = ScriptedGateway::all_personas_complete().script(
            Persona::Creative.nominal_model().as_str(),
            Script::ErrorMidStream {
                chunks: vec!["half an "],
                error: "upstream reset",
            },
        );
        let h = harness(gateway, StubMemory::empty(), MemStore::new());
        let mut handle = h.use_case.execute(user(), QUERY).await.unwrap();
        let events = drain(&mut handle).await;
        let units = handle.wait().await;

        let creative = units
            .iter()
            .find(|u| u.persona == Persona::Creative)
            .unwrap();
        assert_eq!(creative.status, UnitStatus::Failed);
        // Partial content survives the failure.
        assert_eq!(creative.content, "half an ");
        assert_eq!(creative.error.as_deref(), Some("upstream reset"));

        for unit in units.iter().filter(|u| u.persona != Persona::Creative) {
            assert_eq!(unit.status, UnitStatus::Completed);
        }

        // 3/4 completed + 1 failed settles the session as Failed.
        assert_eq!(
            events.last(),
            Some(&CouncilEvent::SessionStatusChanged {
                status: SessionStatus::Failed
            })
        );
        assert!(events.iter().any(|e| matches!(
            e,
            CouncilEvent::UnitFailed {
                persona: Persona::Creative,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn resolver_exhaustion_fails_only_the_affected_unit() {
        // Google open with no fallback chain: the strategist has nowhere
        // to go; everyone else resolves normally.
        let use_case = RunCouncilUseCase::new(
            Arc::new(ScriptedGateway::all_personas_complete()),
            Arc::new(MemStore::new()),
            Arc::new(StubMemory::empty()),
            Arc::new(ModelResolver::new(
                Arc::new(FixedBreakers::open(ProviderKey::Google)),
                FallbackChains::empty(),
            )),
        );
        let mut handle = use_case.execute(user(), QUERY).await.unwrap();
        drain(&mut handle).await;
        let units = handle.wait().await;

        let strategist = units
            .iter()
            .find(|u| u.persona == Persona::Strategist)
            .unwrap();
        assert_eq!(strategist.status, UnitStatus::Failed);
        assert_eq!(strategist.content, FAILED_CONTENT_PLACEHOLDER);
        assert!(strategist.resolved_model.is_none());

        for unit in units.iter().filter(|u| u.persona != Persona::Strategist) {
            assert_eq!(unit.status, UnitStatus::Completed);
        }
    }

    #[tokio::test]
    async fn refused_connection_fails_the_unit() {
        let gateway = ScriptedGateway::all_personas_complete().script(
            Persona::Empath.nominal_model().as_str(),
            Script::FailToConnect,
        );
        let h = harness(gateway, StubMemory::empty(), MemStore::new());
        let mut handle = h.use_case.execute(user(), QUERY).await.unwrap();
        drain(&mut handle).await;
        let units = handle.wait().await;

        let empath = units.iter().find(|u| u.persona == Persona::Empath).unwrap();
        assert_eq!(empath.status, UnitStatus::Failed);
        assert!(empath.error.as_deref().unwrap().contains("Connection error"));
    }

    #[tokio::test]
    async fn cancelling_one_unit_leaves_its_siblings_running() {
        let gateway = ScriptedGateway::all_personas_complete().script(
            Persona::Analyst.nominal_model().as_str(),
            Script::Stall {
                chunks: vec!["thinking"],
            },
        );
        let h = harness(gateway, StubMemory::empty(), MemStore::new());
        let mut handle = h.use_case.execute(user(), QUERY).await.unwrap();

        // Wait for the analyst's first chunk, then cancel just that unit.
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            let is_analyst_chunk = matches!(
                &event,
                CouncilEvent::ChunkAppended {
                    persona: Persona::Analyst,
                    ..
                }
            );
            events.push(event);
            if is_analyst_chunk {
                handle.cancel_unit(Persona::Analyst);
                break;
            }
        }
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
        let units = handle.wait().await;

        let analyst = units.iter().find(|u| u.persona == Persona::Analyst).unwrap();
        assert_eq!(analyst.status, UnitStatus::Cancelled);
        assert_eq!(analyst.content, "thinking");
        for unit in units.iter().filter(|u| u.persona != Persona::Analyst) {
            assert_eq!(unit.status, UnitStatus::Completed);
        }

        // A cancelled unit surfaces as a failure to the caller and taints
        // the session outcome.
        assert!(events.iter().any(|e| matches!(
            e,
            CouncilEvent::UnitFailed {
                persona: Persona::Analyst,
                ..
            }
        )));
        assert_eq!(
            events.last(),
            Some(&CouncilEvent::SessionStatusChanged {
                status: SessionStatus::Failed
            })
        );
    }

    #[tokio::test]
    async fn session_cancel_stops_every_stalled_unit() {
        let gateway = Persona::default_order()
            .iter()
            .fold(ScriptedGateway::new(), |g, persona| {
                g.script(
                    persona.nominal_model().as_str(),
                    Script::Stall { chunks: vec![". "] },
                )
            });
        let h = harness(gateway, StubMemory::empty(), MemStore::new());
        let mut handle = h.use_case.execute(user(), QUERY).await.unwrap();

        // All four have started streaming once each has sent a chunk.
        let mut chunks_seen = 0;
        while chunks_seen < 4 {
            match handle.next_event().await {
                Some(CouncilEvent::ChunkAppended { .. }) => chunks_seen += 1,
                Some(_) => {}
                None => panic!("stream ended before every unit chunked"),
            }
        }
        handle.cancel();
        drain(&mut handle).await;
        let units = handle.wait().await;

        for unit in &units {
            assert_eq!(unit.status, UnitStatus::Cancelled);
            assert_eq!(unit.error.as_deref(), Some("cancelled"));
        }
    }

    #[tokio::test]
    async fn cancellation_wins_over_buffered_chunks() {
        let gateway = Persona::default_order()
            .iter()
            .fold(ScriptedGateway::new(), |g, persona| {
                g.script(
                    persona.nominal_model().as_str(),
                    Script::Stall {
                        chunks: vec!["already ", "buffered ", "text"],
                    },
                )
            });
        let h = harness(gateway, StubMemory::empty(), MemStore::new());
        let mut handle = h.use_case.execute(user(), QUERY).await.unwrap();

        // Cancel before yielding to the executors. Their streams fill with
        // chunks anyway, but the first thing each executor observes at its
        // select point must be the cancelled token, never a chunk.
        handle.cancel();
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
        let units = handle.wait().await;

        assert!(
            events
                .iter()
                .all(|e| !matches!(e, CouncilEvent::ChunkAppended { .. })),
            "chunk relayed after cancellation: {events:?}"
        );
        for unit in &units {
            assert_eq!(unit.status, UnitStatus::Cancelled);
            assert_eq!(unit.content, FAILED_CONTENT_PLACEHOLDER);
        }
    }

    #[tokio::test]
    async fn memory_notes_augment_every_persona_prompt() {
        let h = harness(
            ScriptedGateway::all_personas_complete(),
            StubMemory::with_notes(vec!["User prefers concise answers"]),
            MemStore::new(),
        );
        let mut handle = h.use_case.execute(user(), QUERY).await.unwrap();
        drain(&mut handle).await;
        handle.wait().await;

        let prompts = h.gateway.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 4);
        for (_, system_prompt) in prompts.iter() {
            assert!(system_prompt.contains("User prefers concise answers"));
        }
    }

    #[tokio::test]
    async fn memory_outage_does_not_stop_deliberation() {
        let memory = StubMemory {
            fail_search: true,
            ..StubMemory::default()
        };
        let h = harness(
            ScriptedGateway::all_personas_complete(),
            memory,
            MemStore::new(),
        );
        let mut handle = h.use_case.execute(user(), QUERY).await.unwrap();
        drain(&mut handle).await;
        let units = handle.wait().await;

        assert!(units.iter().all(|u| u.status == UnitStatus::Completed));
        assert!(h.memory.added.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn units_are_created_in_preference_order() {
        let owner = user();
        let store = MemStore::with_counts(&owner, &[(Persona::Empath, 5), (Persona::Creative, 2)]);
        let h = harness(
            ScriptedGateway::all_personas_complete(),
            StubMemory::empty(),
            store,
        );
        let mut handle = h.use_case.execute(owner, QUERY).await.unwrap();
        let session_id = handle.session.id.clone();
        drain(&mut handle).await;
        handle.wait().await;

        let stored = h.store.units.lock().unwrap()[&session_id].clone();
        let order: Vec<Persona> = stored.iter().map(|u| u.persona).collect();
        assert_eq!(
            order,
            vec![
                Persona::Empath,
                Persona::Creative,
                Persona::Analyst,
                Persona::Strategist
            ]
        );
    }
}
