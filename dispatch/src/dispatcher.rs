//! Dispatcher: the per-event routing hot path.
//!
//! For each incoming event: snapshot the sender's state once, walk the handler groups in
//! ascending order, pick the first predicate match per group, build one shared command
//! context lazily on the first match, and invoke (or spawn) the matched handlers.

use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use promobot_core::{ConversationStore, Event, Transport};

use crate::context::{CommandContext, ContextBuild};
use crate::predicate::StateView;
use crate::registry::Registry;

/// Result of one dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Number of handlers invoked inline or spawned.
    Handled(usize),
    /// No group produced a match; the event was dropped.
    NoMatch,
    /// Context construction found no resolvable sender; the pass was dropped silently.
    Cancelled,
}

/// Routes events against a frozen [`Registry`].
///
/// Passes for different users are independent and may run on parallel tasks. Passes for
/// the *same* user are not serialized here: two concurrent events may both read the same
/// menu snapshot and both attempt a transition. Each state setter is a single atomic
/// update; cross-call sequencing is left to the store.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    store: Arc<dyn ConversationStore>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<Registry>,
        store: Arc<dyn ConversationStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            registry,
            store,
            transport,
        }
    }

    /// Runs one dispatch pass for an external event. Deterministic: the same event
    /// against the same state snapshot always selects the same handler set.
    #[instrument(skip(self, event), fields(chat_id = event.chat.id))]
    pub async fn dispatch(&self, event: Event) -> promobot_core::Result<DispatchOutcome> {
        let state = self.snapshot(&event).await?;
        info!(
            user_id = ?event.user.as_ref().map(|u| u.id),
            text_len = event.text.as_ref().map(|t| t.len()).unwrap_or(0),
            callback = ?event.callback,
            menu = ?state.menu,
            "step: dispatch started"
        );

        let mut context: Option<Arc<CommandContext>> = None;
        let mut invoked = 0usize;

        for (group, descriptors) in self.registry.groups() {
            let matched = descriptors
                .iter()
                .find(|descriptor| descriptor.predicate.eval(&event, &state));
            let Some(descriptor) = matched else {
                continue;
            };

            let ctx = match context.as_ref() {
                Some(existing) => Arc::clone(existing),
                None => match CommandContext::build(
                    &event,
                    Arc::clone(&self.registry),
                    Arc::clone(&self.store),
                    Arc::clone(&self.transport),
                )
                .await?
                {
                    ContextBuild::Cancelled => {
                        debug!(group, "step: dispatch cancelled, no resolvable sender");
                        return Ok(DispatchOutcome::Cancelled);
                    }
                    ContextBuild::Ready(fresh) => {
                        context = Some(Arc::clone(&fresh));
                        fresh
                    }
                },
            };

            invoked += 1;
            if descriptor.background {
                info!(
                    handler = descriptor.name,
                    plugin = descriptor.plugin,
                    group,
                    "step: spawning background handler"
                );
                let action = Arc::clone(&descriptor.action);
                let name = descriptor.name;
                let user_id = ctx.user().id;
                tokio::spawn(async move {
                    if let Err(error) = action(ctx).await {
                        error!(handler = name, user_id, %error, "Background handler failed");
                    }
                });
            } else {
                info!(
                    handler = descriptor.name,
                    plugin = descriptor.plugin,
                    group,
                    "step: invoking handler"
                );
                (descriptor.action)(ctx).await?;
            }
        }

        if invoked == 0 {
            debug!("step: no handler matched");
            return Ok(DispatchOutcome::NoMatch);
        }
        info!(invoked, "step: dispatch finished");
        Ok(DispatchOutcome::Handled(invoked))
    }

    /// Reads the sender's state once per pass. Every predicate of the pass evaluates
    /// against this snapshot; a handler's `set_menu` affects the next event only.
    async fn snapshot(&self, event: &Event) -> promobot_core::Result<StateView> {
        match &event.user {
            None => Ok(StateView::no_sender()),
            Some(user) => {
                let record = self.store.find_user(user.id).await?;
                Ok(StateView::for_record(record.as_ref()))
            }
        }
    }
}
