//! EventCoalescer - merges bursts of domain events into one digest.
//!
//! A process-wide service holding a keyed map of pending batches. Each
//! document/folder event appends to the batch for its (client, kind) key
//! and resets that key's flush timer to the full quiet period, so a
//! steady stream of events never flushes until the stream pauses.
//!
//! The map is injected state on an explicitly constructed value, not a
//! hidden global: the service is constructible in tests and its teardown
//! (`shutdown`) drops pending batches deterministically. A process
//! restart likewise drops in-flight batches; that loss is accepted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::foundation::{ActorRole, ClientId, Timestamp};
use crate::domain::notification::{BatchKey, EventDescriptor, EventKind, PendingBatch};
use crate::ports::{NotificationSender, RecipientResolver};

/// Tuning for the coalescer.
#[derive(Debug, Clone)]
pub struct CoalescerConfig {
    /// Delay after the last event in a key before its batch flushes.
    pub quiet_period: Duration,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_secs(30),
        }
    }
}

/// A batch plus its scheduling state.
struct BatchSlot {
    batch: PendingBatch,
    /// Bumped on every append; a timer only flushes the generation it was
    /// scheduled for, so a late-aborting timer cannot steal a batch that
    /// has since grown.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Coalesces document and folder events into per-key digests.
///
/// Entry points are synchronous and infallible; they must be called from
/// within a tokio runtime (the flush timer is a spawned task). Different
/// keys are fully independent and may flush concurrently.
pub struct EventCoalescer {
    slots: Arc<Mutex<HashMap<BatchKey, BatchSlot>>>,
    sender: Arc<dyn NotificationSender>,
    resolver: Arc<dyn RecipientResolver>,
    quiet_period: Duration,
}

impl EventCoalescer {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        resolver: Arc<dyn RecipientResolver>,
        config: CoalescerConfig,
    ) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            sender,
            resolver,
            quiet_period: config.quiet_period,
        }
    }

    /// Queues a document-uploaded event. Fire-and-forget.
    pub fn queue_document_event(
        &self,
        client_id: ClientId,
        client_name: impl Into<String>,
        actor_name: impl Into<String>,
        actor_role: ActorRole,
        document_name: impl Into<String>,
        folder_path: Option<String>,
    ) {
        self.queue_event(
            BatchKey {
                client_id,
                kind: EventKind::Document,
            },
            client_name.into(),
            actor_name.into(),
            actor_role,
            EventDescriptor {
                name: document_name.into(),
                path: folder_path,
                occurred_at: Timestamp::now(),
            },
        );
    }

    /// Queues a folder-created event. Fire-and-forget.
    pub fn queue_folder_event(
        &self,
        client_id: ClientId,
        client_name: impl Into<String>,
        actor_name: impl Into<String>,
        actor_role: ActorRole,
        folder_name: impl Into<String>,
        parent_path: Option<String>,
    ) {
        self.queue_event(
            BatchKey {
                client_id,
                kind: EventKind::Folder,
            },
            client_name.into(),
            actor_name.into(),
            actor_role,
            EventDescriptor {
                name: folder_name.into(),
                path: parent_path,
                occurred_at: Timestamp::now(),
            },
        );
    }

    /// Number of keys with a batch currently accumulating.
    pub fn pending_batches(&self) -> usize {
        self.slots.lock().expect("coalescer map lock poisoned").len()
    }

    /// Aborts every pending timer and drops all accumulated batches.
    ///
    /// Returns the number of batches dropped. Nothing is flushed: the
    /// shutdown semantics match a process restart.
    pub fn shutdown(&self) -> usize {
        let mut slots = self.slots.lock().expect("coalescer map lock poisoned");
        let dropped = slots.len();
        for (_, slot) in slots.drain() {
            if let Some(timer) = slot.timer {
                timer.abort();
            }
        }
        dropped
    }

    fn queue_event(
        &self,
        key: BatchKey,
        client_name: String,
        actor_name: String,
        actor_role: ActorRole,
        event: EventDescriptor,
    ) {
        let mut slots = self.slots.lock().expect("coalescer map lock poisoned");

        let generation = match slots.get_mut(&key) {
            Some(slot) => {
                // Attribution stays with the first event of the window.
                slot.batch.push(event);
                slot.generation += 1;
                if let Some(timer) = slot.timer.take() {
                    timer.abort();
                }
                slot.generation
            }
            None => {
                slots.insert(
                    key,
                    BatchSlot {
                        batch: PendingBatch::opened_by(
                            key.client_id,
                            key.kind,
                            client_name,
                            actor_name,
                            actor_role,
                            event,
                        ),
                        generation: 0,
                        timer: None,
                    },
                );
                0
            }
        };

        let timer = self.spawn_flush_timer(key, generation);
        if let Some(slot) = slots.get_mut(&key) {
            slot.timer = Some(timer);
        }
    }

    fn spawn_flush_timer(&self, key: BatchKey, generation: u64) -> JoinHandle<()> {
        let slots = Arc::clone(&self.slots);
        let sender = Arc::clone(&self.sender);
        let resolver = Arc::clone(&self.resolver);
        let quiet_period = self.quiet_period;

        tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;

            // Remove-then-flush is atomic with respect to new events: the
            // batch leaves the map under the lock, so an event arriving
            // during the send below opens a fresh batch.
            let batch = {
                let mut slots = slots.lock().expect("coalescer map lock poisoned");
                let current = slots.get(&key).map(|slot| slot.generation);
                if current == Some(generation) {
                    slots.remove(&key).map(|slot| slot.batch)
                } else {
                    // A newer event rescheduled this key; its timer owns
                    // the batch now.
                    None
                }
            };

            if let Some(batch) = batch {
                dispatch(sender, resolver, batch).await;
            }
        })
    }
}

/// Routes a flushed batch to its recipients.
///
/// Admin activity goes to the client's contact; everyone else's goes to
/// the admins. Failed recipient resolution or delivery abandons the
/// flush; there are no retries.
async fn dispatch(
    sender: Arc<dyn NotificationSender>,
    resolver: Arc<dyn RecipientResolver>,
    batch: PendingBatch,
) {
    let client_id = *batch.client_id();

    if batch.actor_role().is_admin() {
        match resolver.resolve_client_contact(&client_id).await {
            Ok(Some(contact)) => {
                if let Err(err) = sender
                    .send_client_digest(&client_id, &contact, batch.actor_name(), batch.events())
                    .await
                {
                    tracing::warn!(
                        client_id = %client_id,
                        kind = %batch.kind(),
                        error = %err,
                        "client digest send failed"
                    );
                }
            }
            Ok(None) => {
                tracing::warn!(
                    client_id = %client_id,
                    kind = %batch.kind(),
                    "no contact on file, dropping digest"
                );
            }
            Err(err) => {
                tracing::warn!(
                    client_id = %client_id,
                    kind = %batch.kind(),
                    error = %err,
                    "contact lookup failed, dropping digest"
                );
            }
        }
    } else {
        match resolver.resolve_admins().await {
            Ok(admins) if !admins.is_empty() => {
                if let Err(err) = sender
                    .send_admin_digest(
                        &admins,
                        batch.actor_name(),
                        batch.actor_role(),
                        batch.client_name(),
                        batch.events(),
                    )
                    .await
                {
                    tracing::warn!(
                        client_id = %client_id,
                        kind = %batch.kind(),
                        error = %err,
                        "admin digest send failed"
                    );
                }
            }
            Ok(_) => {
                tracing::warn!(
                    client_id = %client_id,
                    kind = %batch.kind(),
                    "no admin recipients, dropping digest"
                );
            }
            Err(err) => {
                tracing::warn!(
                    client_id = %client_id,
                    kind = %batch.kind(),
                    error = %err,
                    "admin lookup failed, dropping digest"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainError;
    use crate::domain::plan::ResolvedStage;
    use crate::ports::Contact;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    // ─────────────────────────────────────────────────────────────────────
    // Mock implementations
    // ─────────────────────────────────────────────────────────────────────

    #[derive(Clone, Debug, PartialEq)]
    struct SentClientDigest {
        client_id: ClientId,
        actor_name: String,
        event_names: Vec<String>,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct SentAdminDigest {
        actor_name: String,
        actor_role: ActorRole,
        client_name: String,
        event_names: Vec<String>,
    }

    struct RecordingSender {
        client_digests: StdMutex<Vec<SentClientDigest>>,
        admin_digests: StdMutex<Vec<SentAdminDigest>>,
    }

    impl RecordingSender {
        fn new() -> Self {
            Self {
                client_digests: StdMutex::new(Vec::new()),
                admin_digests: StdMutex::new(Vec::new()),
            }
        }

        fn client_digests(&self) -> Vec<SentClientDigest> {
            self.client_digests.lock().unwrap().clone()
        }

        fn admin_digests(&self) -> Vec<SentAdminDigest> {
            self.admin_digests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSender for RecordingSender {
        async fn send_client_digest(
            &self,
            client_id: &ClientId,
            _contact: &Contact,
            actor_name: &str,
            events: &[EventDescriptor],
        ) -> Result<(), DomainError> {
            self.client_digests.lock().unwrap().push(SentClientDigest {
                client_id: *client_id,
                actor_name: actor_name.to_string(),
                event_names: events.iter().map(|e| e.name.clone()).collect(),
            });
            Ok(())
        }

        async fn send_admin_digest(
            &self,
            _admins: &[Contact],
            actor_name: &str,
            actor_role: ActorRole,
            client_name: &str,
            events: &[EventDescriptor],
        ) -> Result<(), DomainError> {
            self.admin_digests.lock().unwrap().push(SentAdminDigest {
                actor_name: actor_name.to_string(),
                actor_role,
                client_name: client_name.to_string(),
                event_names: events.iter().map(|e| e.name.clone()).collect(),
            });
            Ok(())
        }

        async fn send_plan_summary(
            &self,
            _client_id: &ClientId,
            _contact: &Contact,
            _stages: &[ResolvedStage],
        ) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct StaticResolver {
        contact: Option<Contact>,
        admins: Vec<Contact>,
    }

    impl StaticResolver {
        fn full() -> Self {
            Self {
                contact: Some(Contact {
                    name: "Avery Lane".to_string(),
                    email: "avery@acme.test".to_string(),
                }),
                admins: vec![Contact {
                    name: "Ops".to_string(),
                    email: "ops@portal.test".to_string(),
                }],
            }
        }

        fn without_contact() -> Self {
            Self {
                contact: None,
                ..Self::full()
            }
        }
    }

    #[async_trait]
    impl RecipientResolver for StaticResolver {
        async fn resolve_client_contact(
            &self,
            _client_id: &ClientId,
        ) -> Result<Option<Contact>, DomainError> {
            Ok(self.contact.clone())
        }

        async fn resolve_admins(&self) -> Result<Vec<Contact>, DomainError> {
            Ok(self.admins.clone())
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Test helpers
    // ─────────────────────────────────────────────────────────────────────

    const QUIET: Duration = Duration::from_secs(30);

    fn coalescer(
        sender: Arc<RecordingSender>,
        resolver: StaticResolver,
    ) -> EventCoalescer {
        EventCoalescer::new(
            sender,
            Arc::new(resolver),
            CoalescerConfig { quiet_period: QUIET },
        )
    }

    /// Lets spawned timer tasks run to completion after a time jump.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tests
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn burst_flushes_once_with_all_events_in_order() {
        let sender = Arc::new(RecordingSender::new());
        let c = coalescer(sender.clone(), StaticResolver::full());
        let client_id = ClientId::new();

        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            c.queue_document_event(client_id, "Acme", "Dana", ActorRole::Admin, name, None);
        }
        assert_eq!(c.pending_batches(), 1);

        tokio::time::sleep(QUIET + Duration::from_secs(1)).await;
        settle().await;

        let digests = sender.client_digests();
        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].event_names, vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert_eq!(c.pending_batches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn document_and_folder_events_never_merge() {
        let sender = Arc::new(RecordingSender::new());
        let c = coalescer(sender.clone(), StaticResolver::full());
        let client_id = ClientId::new();

        c.queue_document_event(client_id, "Acme", "Dana", ActorRole::Admin, "a.pdf", None);
        c.queue_folder_event(client_id, "Acme", "Dana", ActorRole::Admin, "Contracts", None);
        assert_eq!(c.pending_batches(), 2);

        tokio::time::sleep(QUIET + Duration::from_secs(1)).await;
        settle().await;

        let digests = sender.client_digests();
        assert_eq!(digests.len(), 2);
        assert!(digests.iter().any(|d| d.event_names == vec!["a.pdf"]));
        assert!(digests.iter().any(|d| d.event_names == vec!["Contracts"]));
    }

    #[tokio::test(start_paused = true)]
    async fn each_event_resets_the_quiet_period() {
        let sender = Arc::new(RecordingSender::new());
        let c = coalescer(sender.clone(), StaticResolver::full());
        let client_id = ClientId::new();

        c.queue_document_event(client_id, "Acme", "Dana", ActorRole::Admin, "a.pdf", None);
        tokio::time::sleep(Duration::from_secs(20)).await;
        c.queue_document_event(client_id, "Acme", "Dana", ActorRole::Admin, "b.pdf", None);
        tokio::time::sleep(Duration::from_secs(20)).await;
        settle().await;

        // 40s elapsed, but the window was reset at t=20s: nothing yet.
        assert!(sender.client_digests().is_empty());
        assert_eq!(c.pending_batches(), 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        settle().await;

        let digests = sender.client_digests();
        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].event_names, vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test(start_paused = true)]
    async fn client_actor_routes_to_admin_digest() {
        let sender = Arc::new(RecordingSender::new());
        let c = coalescer(sender.clone(), StaticResolver::full());

        c.queue_document_event(
            ClientId::new(),
            "Acme",
            "Robin",
            ActorRole::Client,
            "w9.pdf",
            Some("Tax".to_string()),
        );
        tokio::time::sleep(QUIET + Duration::from_secs(1)).await;
        settle().await;

        assert!(sender.client_digests().is_empty());
        let digests = sender.admin_digests();
        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].actor_name, "Robin");
        assert_eq!(digests[0].actor_role, ActorRole::Client);
        assert_eq!(digests[0].client_name, "Acme");
        assert_eq!(digests[0].event_names, vec!["w9.pdf"]);
    }

    #[tokio::test(start_paused = true)]
    async fn first_event_wins_actor_attribution() {
        let sender = Arc::new(RecordingSender::new());
        let c = coalescer(sender.clone(), StaticResolver::full());
        let client_id = ClientId::new();

        c.queue_document_event(client_id, "Acme", "Robin", ActorRole::Client, "a.pdf", None);
        c.queue_document_event(client_id, "Acme", "Dana", ActorRole::Admin, "b.pdf", None);

        tokio::time::sleep(QUIET + Duration::from_secs(1)).await;
        settle().await;

        // Routed and attributed to Robin, who opened the window.
        let digests = sender.admin_digests();
        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].actor_name, "Robin");
        assert_eq!(digests[0].event_names, vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_contact_abandons_flush_silently() {
        let sender = Arc::new(RecordingSender::new());
        let c = coalescer(sender.clone(), StaticResolver::without_contact());

        c.queue_document_event(
            ClientId::new(),
            "Acme",
            "Dana",
            ActorRole::Admin,
            "a.pdf",
            None,
        );
        tokio::time::sleep(QUIET + Duration::from_secs(1)).await;
        settle().await;

        assert!(sender.client_digests().is_empty());
        assert_eq!(c.pending_batches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_pending_batches_without_sending() {
        let sender = Arc::new(RecordingSender::new());
        let c = coalescer(sender.clone(), StaticResolver::full());

        c.queue_document_event(ClientId::new(), "Acme", "Dana", ActorRole::Admin, "a.pdf", None);
        c.queue_folder_event(ClientId::new(), "Beta", "Dana", ActorRole::Admin, "Legal", None);

        assert_eq!(c.shutdown(), 2);
        assert_eq!(c.pending_batches(), 0);

        tokio::time::sleep(QUIET + Duration::from_secs(1)).await;
        settle().await;

        assert!(sender.client_digests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn new_event_after_flush_opens_a_fresh_batch() {
        let sender = Arc::new(RecordingSender::new());
        let c = coalescer(sender.clone(), StaticResolver::full());
        let client_id = ClientId::new();

        c.queue_document_event(client_id, "Acme", "Dana", ActorRole::Admin, "a.pdf", None);
        tokio::time::sleep(QUIET + Duration::from_secs(1)).await;
        settle().await;

        c.queue_document_event(client_id, "Acme", "Dana", ActorRole::Admin, "b.pdf", None);
        tokio::time::sleep(QUIET + Duration::from_secs(1)).await;
        settle().await;

        let digests = sender.client_digests();
        assert_eq!(digests.len(), 2);
        assert_eq!(digests[0].event_names, vec!["a.pdf"]);
        assert_eq!(digests[1].event_names, vec!["b.pdf"]);
    }
}
