//! Turn controller: the send/receive protocol of the chat panel.
//!
//! The controller owns the [`ConversationStore`] and the pending input. A
//! submission appends the user message immediately and schedules a deferred
//! reply; [`TurnController::next_event`] later appends that reply.
//!
//! # Deferred replies
//! Simulated replies are entries in an ordered queue keyed by
//! `(deadline, turn)`, so equal delays fire in submission order. Service
//! replies run in a [`JoinSet`] and are consumed in completion order. Both are
//! cancelled by [`TurnController::teardown`] and on drop; nothing is ever
//! appended after teardown.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError, ReplyConfig, ReplyMode};
use crate::message::{Message, MessageId};
use crate::quick_action::{invest_prompt, QuickAction, QuickActionTarget};
use crate::service::{ConversationService, ServiceError, ServiceMessage, ServiceRequest};
use crate::store::ConversationStore;

/// Sequence number of a submission within a controller's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(u64);

impl TurnId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where assistant replies come from.
pub enum ReplyBackend {
    /// Fixed acknowledgment after a fixed delay.
    Simulated {
        delay: Duration,
        acknowledgment: String,
    },
    /// External conversation service.
    Service(Arc<dyn ConversationService>),
}

impl ReplyBackend {
    /// Simulated backend from reply settings.
    pub fn simulated(reply: &ReplyConfig) -> Self {
        Self::Simulated {
            delay: reply.delay(),
            acknowledgment: reply.acknowledgment.clone(),
        }
    }

    /// Select the backend named by `reply.mode`.
    ///
    /// Service mode requires a service implementation.
    pub fn from_config(
        reply: &ReplyConfig,
        service: Option<Arc<dyn ConversationService>>,
    ) -> Result<Self, ControllerError> {
        match reply.mode {
            ReplyMode::Simulated => Ok(Self::simulated(reply)),
            ReplyMode::Service => service
                .map(Self::Service)
                .ok_or(ControllerError::ServiceNotConfigured),
        }
    }

    pub fn mode(&self) -> ReplyMode {
        match self {
            Self::Simulated { .. } => ReplyMode::Simulated,
            Self::Service(_) => ReplyMode::Service,
        }
    }
}

impl fmt::Debug for ReplyBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated { delay, .. } => f
                .debug_struct("Simulated")
                .field("delay", delay)
                .finish_non_exhaustive(),
            Self::Service(_) => f.write_str("Service"),
        }
    }
}

/// Outcome of a deferred reply, reported by [`TurnController::next_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// Assistant messages were appended for a turn.
    ReplyAppended {
        turn: TurnId,
        message_ids: Vec<MessageId>,
    },
    /// The reply failed; an assistant error message was appended instead.
    ///
    /// `turn` is `None` when the failing task could not be attributed.
    ReplyFailed {
        turn: Option<TurnId>,
        message_id: MessageId,
        error: String,
    },
}

type ServiceOutcome = (TurnId, Result<Vec<ServiceMessage>, ServiceError>);

/// Drives submissions, deferred replies and quick actions for one chat panel.
#[derive(Debug)]
pub struct TurnController {
    store: ConversationStore,
    pending_input: String,
    input_revision: watch::Sender<u64>,
    property_name: String,
    failure_prefix: String,
    backend: ReplyBackend,
    /// Simulated replies due at a deadline, with their content.
    deferred: BTreeMap<(Instant, TurnId), String>,
    /// Service calls in flight.
    in_flight: JoinSet<ServiceOutcome>,
    /// Ids the conversation service has already delivered.
    service_ids: HashSet<MessageId>,
    next_turn: u64,
}

impl TurnController {
    /// Create a controller whose reply path is selected by `config.reply.mode`.
    pub fn from_config(
        config: &Config,
        service: Option<Arc<dyn ConversationService>>,
    ) -> Result<Self, ControllerError> {
        config.validate()?;
        let backend = ReplyBackend::from_config(&config.reply, service)?;
        Ok(Self::with_backend(config, backend))
    }

    /// Create a controller with an explicit reply backend.
    pub fn with_backend(config: &Config, backend: ReplyBackend) -> Self {
        let (input_revision, _) = watch::channel(0);
        Self {
            store: ConversationStore::initialize(config.welcome_message.clone()),
            pending_input: String::new(),
            input_revision,
            property_name: config.property.name.clone(),
            failure_prefix: config.reply.failure_prefix.clone(),
            backend,
            deferred: BTreeMap::new(),
            in_flight: JoinSet::new(),
            service_ids: HashSet::new(),
            next_turn: 1,
        }
    }

    /// The conversation being driven.
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn reply_mode(&self) -> ReplyMode {
        self.backend.mode()
    }

    /// Subscribe to pending-input changes (revision counter).
    pub fn subscribe_input(&self) -> watch::Receiver<u64> {
        self.input_revision.subscribe()
    }

    /// Replace the pending input verbatim.
    pub fn update_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
        self.notify_input();
    }

    /// Submit the pending input as a user message.
    ///
    /// Blank input (after trimming) is ignored and `None` is returned. On
    /// success the untrimmed text is appended, the input is cleared, a reply
    /// is scheduled, and the new turn is returned without waiting for it.
    pub fn submit(&mut self) -> Option<TurnId> {
        if self.pending_input.trim().is_empty() {
            debug!("Ignoring blank submission");
            return None;
        }

        let content = std::mem::take(&mut self.pending_input);
        self.notify_input();

        let turn = TurnId(self.next_turn);
        self.next_turn += 1;

        let id = self.store.next_id();
        let message = Message::user(id, content, Utc::now());
        info!(
            turn = %turn,
            message_id = %message.id(),
            mode = %self.backend.mode(),
            "Submitted user message"
        );
        self.store.append(message.clone());
        self.schedule_reply(turn, message);

        Some(turn)
    }

    /// Pre-fill the input with the canned investment sentence.
    pub fn quick_invest(&mut self, amount_label: &str) {
        let prompt = invest_prompt(amount_label, &self.property_name);
        self.update_pending_input(prompt);
    }

    /// Pre-fill the input for one of the fixed quick actions.
    pub fn apply_quick_action(&mut self, action: QuickAction) {
        match action.target() {
            QuickActionTarget::Invest(amount) => self.quick_invest(amount),
            QuickActionTarget::Prompt(prompt) => self.update_pending_input(prompt),
        }
    }

    /// Number of replies scheduled or in flight.
    pub fn pending_replies(&self) -> usize {
        self.deferred.len() + self.in_flight.len()
    }

    pub fn has_pending_replies(&self) -> bool {
        self.pending_replies() > 0
    }

    /// Wait for the next deferred reply and append it.
    ///
    /// Returns `None` when no reply is pending. Cancel-safe: dropping the
    /// future before it completes leaves every pending reply in place.
    pub async fn next_event(&mut self) -> Option<TurnEvent> {
        loop {
            let next_due = self.deferred.keys().next().map(|(due, _)| *due);
            if next_due.is_none() && self.in_flight.is_empty() {
                return None;
            }

            tokio::select! {
                () = sleep_until_due(next_due) => {
                    if let Some(((_, turn), content)) = self.deferred.pop_first() {
                        return Some(self.append_acknowledgment(turn, content));
                    }
                }
                Some(joined) = self.in_flight.join_next() => {
                    match joined {
                        Ok((turn, outcome)) => return Some(self.consume_service_reply(turn, outcome)),
                        Err(e) if e.is_cancelled() => {}
                        Err(e) => {
                            let error = format!("reply task failed: {e}");
                            warn!(error = %error, "Conversation service task panicked");
                            let message_id = self.append_failure(&error);
                            return Some(TurnEvent::ReplyFailed { turn: None, message_id, error });
                        }
                    }
                }
            }
        }
    }

    /// Drain deferred replies until none is pending.
    pub async fn run_until_idle(&mut self) -> Vec<TurnEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    /// Cancel every pending reply.
    ///
    /// Called when the chat panel goes away; also runs on drop.
    pub fn teardown(&mut self) {
        let cancelled = self.pending_replies();
        if cancelled > 0 {
            info!(cancelled, "Cancelling pending replies");
        }
        self.deferred.clear();
        // Dropping the set aborts its tasks.
        drop(std::mem::take(&mut self.in_flight));
    }

    /// Start a new conversation, discarding replies owed to the old one.
    pub fn clear_conversation(&mut self) {
        self.teardown();
        self.store.clear();
        self.service_ids.clear();
        info!(conversation_id = %self.store.conversation_id(), "Started new conversation");
    }

    fn schedule_reply(&mut self, turn: TurnId, message: Message) {
        match &self.backend {
            ReplyBackend::Simulated {
                delay,
                acknowledgment,
            } => {
                let due = Instant::now() + *delay;
                self.deferred.insert((due, turn), acknowledgment.clone());
            }
            ReplyBackend::Service(service) => {
                let service = Arc::clone(service);
                let Ok(runtime) = Handle::try_current() else {
                    warn!(turn = %turn, "No async runtime for conversation service");
                    self.append_failure("no async runtime available");
                    return;
                };
                let request = ServiceRequest {
                    conversation_id: self.store.conversation_id(),
                    turn,
                    message,
                };
                self.in_flight
                    .spawn_on(async move { (turn, service.send(request).await) }, &runtime);
            }
        }
    }

    fn append_acknowledgment(&mut self, turn: TurnId, content: String) -> TurnEvent {
        let id = self.store.next_id();
        self.store
            .append(Message::assistant(id.clone(), content, Utc::now()));
        info!(turn = %turn, message_id = %id, "Appended simulated reply");
        TurnEvent::ReplyAppended {
            turn,
            message_ids: vec![id],
        }
    }

    fn consume_service_reply(
        &mut self,
        turn: TurnId,
        outcome: Result<Vec<ServiceMessage>, ServiceError>,
    ) -> TurnEvent {
        match outcome {
            Ok(messages) => {
                let mut message_ids = Vec::with_capacity(messages.len());
                for inbound in messages {
                    let service_id = (!inbound.id.is_empty()).then(|| MessageId::new(inbound.id));
                    if let Some(service_id) = &service_id {
                        if !self.service_ids.insert(service_id.clone()) {
                            debug!(turn = %turn, message_id = %service_id, "Skipping duplicate service message");
                            continue;
                        }
                    }
                    // A service id that collides with a local one is re-keyed.
                    let id = match service_id {
                        Some(service_id) if !self.store.contains(&service_id) => service_id,
                        _ => self.store.next_id(),
                    };
                    self.store
                        .append(Message::assistant(id.clone(), inbound.content, Utc::now()));
                    message_ids.push(id);
                }
                info!(turn = %turn, count = message_ids.len(), "Appended service reply");
                TurnEvent::ReplyAppended { turn, message_ids }
            }
            Err(e) => {
                warn!(turn = %turn, error = %e, "Conversation service failed");
                let error = e.to_string();
                let message_id = self.append_failure(&error);
                TurnEvent::ReplyFailed {
                    turn: Some(turn),
                    message_id,
                    error,
                }
            }
        }
    }

    fn append_failure(&mut self, error: &str) -> MessageId {
        let id = self.store.next_id();
        let content = format!("{}: {error}", self.failure_prefix);
        self.store
            .append(Message::assistant(id.clone(), content, Utc::now()));
        id
    }

    fn notify_input(&self) {
        self.input_revision.send_modify(|rev| *rev += 1);
    }
}

impl Drop for TurnController {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn sleep_until_due(due: Option<Instant>) {
    match due {
        Some(due) => tokio::time::sleep_until(due).await,
        None => std::future::pending().await,
    }
}

/// Errors that can occur when building a controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Service mode selected without a service implementation.
    #[error("reply mode is 'service' but no conversation service is configured")]
    ServiceNotConfigured,

    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn simulated() -> TurnController {
        TurnController::from_config(&Config::default(), None).unwrap()
    }

    fn contents(controller: &TurnController) -> Vec<String> {
        controller
            .store()
            .messages()
            .iter()
            .map(|m| m.content().to_string())
            .collect()
    }

    fn acknowledgment() -> String {
        Config::default().reply.acknowledgment
    }

    #[test]
    fn test_starts_with_welcome_and_quick_actions() {
        let controller = simulated();
        let messages = controller.store().messages();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role(), Role::Assistant);
        assert_eq!(messages[0].quick_actions().len(), 4);
        assert_eq!(controller.pending_input(), "");
    }

    #[test]
    fn test_update_pending_input_is_verbatim() {
        let mut controller = simulated();
        controller.update_pending_input("  spaced out \n");
        assert_eq!(controller.pending_input(), "  spaced out \n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_appends_untrimmed_and_clears_input() {
        let mut controller = simulated();
        controller.update_pending_input("  How is the yield computed?  ");

        let turn = controller.submit();

        assert!(turn.is_some());
        assert_eq!(controller.pending_input(), "");
        assert_eq!(controller.store().len(), 2);
        let last = controller.store().last().unwrap();
        assert_eq!(last.role(), Role::User);
        assert_eq!(last.content(), "  How is the yield computed?  ");
        assert_eq!(controller.pending_replies(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submit_is_silent_noop() {
        let mut controller = simulated();
        for blank in ["", "   ", "\n\t  "] {
            controller.update_pending_input(blank);
            assert_eq!(controller.submit(), None);
            assert_eq!(controller.store().len(), 1);
            assert_eq!(controller.pending_input(), blank);
        }
        assert!(!controller.has_pending_replies());
        assert_eq!(controller.next_event().await, None);
    }

    #[test]
    fn test_quick_invest_uses_property_name() {
        let mut config = Config::default();
        config.property.name = "property".into();
        let mut controller = TurnController::from_config(&config, None).unwrap();

        controller.quick_invest("$1,000");

        assert_eq!(
            controller.pending_input(),
            "I'd like to invest $1,000 in the property"
        );
        assert_eq!(controller.store().len(), 1);
    }

    #[test]
    fn test_quick_actions_fill_input_without_submitting() {
        let mut controller = simulated();

        controller.apply_quick_action(QuickAction::BuyFiveHundredTokens);
        assert_eq!(
            controller.pending_input(),
            "I'd like to invest $5,000 in the Midtown Executive Tower"
        );

        controller.apply_quick_action(QuickAction::CustomAmount);
        assert_eq!(controller.pending_input(), "I'd like to invest a custom amount");

        controller.apply_quick_action(QuickAction::ViewAnalytics);
        assert_eq!(
            controller.pending_input(),
            "Show me detailed analytics for this property"
        );

        assert_eq!(controller.store().len(), 1);
        assert!(!controller.has_pending_replies());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_appears_after_delay() {
        let mut controller = simulated();
        controller.update_pending_input("Hello");
        let turn = controller.submit().unwrap();

        let early =
            tokio::time::timeout(Duration::from_millis(999), controller.next_event()).await;
        assert!(early.is_err(), "reply must not arrive before the delay");
        assert_eq!(controller.store().len(), 2);

        let event = controller.next_event().await.unwrap();
        let TurnEvent::ReplyAppended { turn: replied, message_ids } = event else {
            panic!("expected a reply");
        };
        assert_eq!(replied, turn);
        assert_eq!(message_ids.len(), 1);

        let messages = controller.store().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content(), "Hello");
        assert_eq!(messages[2].role(), Role::Assistant);
        assert_eq!(messages[2].content(), acknowledgment());
        assert_eq!(messages[2].id(), &message_ids[0]);
        assert_eq!(controller.next_event().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_submissions_interleave_deterministically() {
        let mut controller = simulated();
        controller.update_pending_input("first");
        let t1 = controller.submit().unwrap();
        controller.update_pending_input("second");
        let t2 = controller.submit().unwrap();
        assert_eq!(controller.pending_replies(), 2);

        let events = controller.run_until_idle().await;

        let turns: Vec<_> = events
            .iter()
            .map(|e| match e {
                TurnEvent::ReplyAppended { turn, .. } => *turn,
                TurnEvent::ReplyFailed { .. } => panic!("simulated replies cannot fail"),
            })
            .collect();
        assert_eq!(turns, vec![t1, t2]);

        let ack = acknowledgment();
        assert_eq!(
            contents(&controller)[1..],
            ["first".to_string(), "second".to_string(), ack.clone(), ack]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_ids_distinct_across_turns() {
        let mut controller = simulated();
        for i in 0..25 {
            controller.update_pending_input(format!("question {i}"));
            controller.submit();
        }
        controller.run_until_idle().await;

        let ids: HashSet<_> = controller.store().messages().iter().map(Message::id).collect();
        assert_eq!(controller.store().len(), 51);
        assert_eq!(ids.len(), 51);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_reply() {
        let mut controller = simulated();
        controller.update_pending_input("Hello");
        controller.submit();

        controller.teardown();
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(controller.next_event().await, None);
        assert_eq!(controller.store().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_reply() {
        let service = Arc::new(EchoService::new());
        let mut controller = service_controller(Arc::clone(&service));
        controller.update_pending_input("slow");
        controller.submit();
        tokio::task::yield_now().await;
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);

        drop(controller);
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        assert_eq!(service.completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_conversation_drops_owed_replies() {
        let mut controller = simulated();
        controller.update_pending_input("Hello");
        controller.submit();

        controller.clear_conversation();

        assert!(controller.store().is_fresh());
        assert_eq!(controller.next_event().await, None);
        assert!(controller.store().is_fresh());
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_changes_are_observable() {
        let mut controller = simulated();
        let mut rx = controller.subscribe_input();

        controller.apply_quick_action(QuickAction::BuyHundredTokens);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        controller.submit();
        assert!(rx.has_changed().unwrap());
    }

    /// Service double: echoes content, fails on "fail", sleeps on "slow".
    struct EchoService {
        calls: AtomicUsize,
        completed: AtomicUsize,
        fixed_id: Option<&'static str>,
    }

    impl EchoService {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
                fixed_id: None,
            }
        }
    }

    #[async_trait]
    impl ConversationService for EchoService {
        async fn send(
            &self,
            request: ServiceRequest,
        ) -> Result<Vec<ServiceMessage>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let content = request.message.content().to_string();
            match content.as_str() {
                "fail" => return Err(ServiceError::Unavailable("offline".into())),
                "slow" => tokio::time::sleep(Duration::from_millis(500)).await,
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
            self.completed.fetch_add(1, Ordering::SeqCst);
            let id = self
                .fixed_id
                .map_or_else(|| format!("svc-{}", request.turn), str::to_string);
            Ok(vec![ServiceMessage::new(id, format!("echo: {content}"))])
        }
    }

    fn service_controller<S: ConversationService + 'static>(service: Arc<S>) -> TurnController {
        let mut config = Config::default();
        config.reply.mode = ReplyMode::Service;
        TurnController::from_config(&config, Some(service)).unwrap()
    }

    /// Service double whose reply id is the user message id plus `offset`.
    struct OffsetIdService {
        offset: i64,
    }

    #[async_trait]
    impl ConversationService for OffsetIdService {
        async fn send(
            &self,
            request: ServiceRequest,
        ) -> Result<Vec<ServiceMessage>, ServiceError> {
            let user_id: i64 = request.message.id().as_str().parse().unwrap();
            Ok(vec![ServiceMessage::new(
                (user_id + self.offset).to_string(),
                "noted",
            )])
        }
    }

    fn assert_ids_distinct(controller: &TurnController) {
        let unique: HashSet<_> = controller.store().messages().iter().map(Message::id).collect();
        assert_eq!(unique.len(), controller.store().len());
    }

    #[test]
    fn test_service_mode_requires_service() {
        let mut config = Config::default();
        config.reply.mode = ReplyMode::Service;
        let err = TurnController::from_config(&config, None).unwrap_err();
        assert!(matches!(err, ControllerError::ServiceNotConfigured));
    }

    #[test]
    fn test_blank_welcome_rejected() {
        let mut config = Config::default();
        config.welcome_message = "  ".into();
        let err = TurnController::from_config(&config, None).unwrap_err();
        assert!(matches!(err, ControllerError::Config(ConfigError::Invalid(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_reply_appended_with_service_id() {
        let service = Arc::new(EchoService::new());
        let mut controller = service_controller(Arc::clone(&service));
        assert_eq!(controller.reply_mode(), ReplyMode::Service);

        controller.update_pending_input("What is the yield?");
        let turn = controller.submit().unwrap();
        let event = controller.next_event().await.unwrap();

        assert_eq!(
            event,
            TurnEvent::ReplyAppended {
                turn,
                message_ids: vec![MessageId::new(format!("svc-{turn}"))],
            }
        );
        assert_eq!(
            controller.store().last().unwrap().content(),
            "echo: What is the yield?"
        );
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_replies_consumed_in_arrival_order() {
        let service = Arc::new(EchoService::new());
        let mut controller = service_controller(service);

        controller.update_pending_input("slow");
        controller.submit();
        controller.update_pending_input("fast");
        controller.submit();

        controller.run_until_idle().await;

        assert_eq!(
            contents(&controller)[1..],
            ["slow", "fast", "echo: fast", "echo: slow"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_duplicate_ids_skipped() {
        let service = Arc::new(EchoService {
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            fixed_id: Some("svc-same"),
        });
        let mut controller = service_controller(service);

        controller.update_pending_input("one");
        controller.submit();
        controller.update_pending_input("two");
        controller.submit();
        let events = controller.run_until_idle().await;

        assert_eq!(events.len(), 2);
        assert_eq!(controller.store().len(), 4);
        assert!(matches!(
            &events[1],
            TurnEvent::ReplyAppended { message_ids, .. } if message_ids.is_empty()
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_id_matching_local_id_is_kept() {
        let mut controller = service_controller(Arc::new(OffsetIdService { offset: 0 }));

        controller.update_pending_input("Hello");
        let turn = controller.submit().unwrap();
        let user_id = controller.store().last().unwrap().id().clone();
        let event = controller.next_event().await.unwrap();

        let TurnEvent::ReplyAppended { turn: replied, message_ids } = event else {
            panic!("expected reply");
        };
        assert_eq!(replied, turn);
        assert_eq!(message_ids.len(), 1);
        assert_ne!(message_ids[0], user_id);
        assert_eq!(contents(&controller)[1..], ["Hello", "noted"]);
        assert_ids_distinct(&controller);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_ids_skip_service_ids() {
        let mut controller = service_controller(Arc::new(OffsetIdService { offset: 1 }));

        controller.update_pending_input("one");
        controller.submit();
        controller.run_until_idle().await;
        controller.update_pending_input("two");
        controller.submit();
        controller.run_until_idle().await;

        assert_eq!(controller.store().len(), 5);
        assert_ids_distinct(&controller);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_failure_becomes_assistant_message() {
        let service = Arc::new(EchoService::new());
        let mut controller = service_controller(service);

        controller.update_pending_input("fail");
        let turn = controller.submit().unwrap();
        let event = controller.next_event().await.unwrap();

        let TurnEvent::ReplyFailed { turn: failed, error, .. } = event else {
            panic!("expected failure");
        };
        assert_eq!(failed, Some(turn));
        assert_eq!(error, "service unavailable: offline");

        let last = controller.store().last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(
            last.content(),
            "Sorry, I couldn't reach the investment assistant: service unavailable: offline"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_aborts_service_calls() {
        let service = Arc::new(EchoService::new());
        let mut controller = service_controller(service);

        controller.update_pending_input("slow");
        controller.submit();
        controller.teardown();

        assert!(!controller.has_pending_replies());
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(controller.next_event().await, None);
        assert_eq!(controller.store().len(), 2);
    }
}
