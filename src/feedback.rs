use crate::error::PrevizError;
use crate::model::SceneState;

/// Shown when a feedback call fails; the edit itself always stays applied.
pub const FALLBACK_MESSAGE: &str =
    "Feedback is unavailable for this change; the edit still applies.";

#[derive(Clone, Copy, Debug)]
pub struct FeedbackOpts {
    /// Quiet period after the last edit before a request goes out.
    pub debounce_secs: f64,
}

impl Default for FeedbackOpts {
    fn default() -> Self {
        Self { debounce_secs: 0.5 }
    }
}

/// One outgoing feedback call, tagged with its generation.
///
/// The shell encodes this as the collaborator's wire document; the summary
/// and entity fields carry their wire names.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeedbackRequest {
    pub generation: u64,
    #[serde(rename = "sceneSummaryText")]
    pub scene_summary: String,
    #[serde(rename = "changedEntityName")]
    pub entity_name: String,
}

/// Feedback collaborator response body.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeedbackReply {
    pub impact: String,
    pub suggestion: String,
}

/// Transient note the presentation layer shows after a burst resolves.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedbackNote {
    Reply(FeedbackReply),
    /// Render as [`FALLBACK_MESSAGE`].
    Fallback,
}

/// Outgoing boundary to the feedback collaborator.
///
/// `dispatch` is fire-and-forget: the engine never blocks on the call, the
/// shell delivers the outcome later through
/// [`EditFeedbackCoordinator::complete`].
pub trait FeedbackClient {
    fn dispatch(&mut self, request: FeedbackRequest);
}

/// Test double that records every dispatched request.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    pub requests: Vec<FeedbackRequest>,
}

impl FeedbackClient for RecordingFeedback {
    fn dispatch(&mut self, request: FeedbackRequest) {
        self.requests.push(request);
    }
}

#[derive(Clone, Debug)]
struct EditBurst {
    deadline: f64,
    entity_identity: String,
    entity_name: String,
    snapshot: SceneState,
}

/// Turns bursts of interactive edits into at most one outstanding feedback
/// request per quiet period.
///
/// Every edit replaces the pending burst (last edit wins, deadline reset);
/// the burst resolves into exactly one request once the deadline passes. An
/// in-flight request is never cancelled; instead each request carries a
/// generation and [`complete`](Self::complete) discards any reply that is not
/// for the newest dispatched generation, so a slow early reply can never
/// overwrite the note for a later edit.
#[derive(Debug)]
pub struct EditFeedbackCoordinator {
    opts: FeedbackOpts,
    pending: Option<EditBurst>,
    next_generation: u64,
    outstanding: Option<u64>,
    note: Option<FeedbackNote>,
}

impl EditFeedbackCoordinator {
    pub fn new(opts: FeedbackOpts) -> Self {
        Self {
            opts,
            pending: None,
            next_generation: 1,
            outstanding: None,
            note: None,
        }
    }

    /// Record an edit at wall-clock `now`, replacing any pending burst.
    ///
    /// The snapshot is captured here, not at dispatch: the request describes
    /// the scene as it stood when the user last touched it.
    pub fn record_edit(&mut self, state: &SceneState, identity: &str, now: f64) {
        let entity_name = state
            .find(identity)
            .map(|e| e.name().to_string())
            .unwrap_or_else(|| identity.to_string());
        self.pending = Some(EditBurst {
            deadline: now + self.opts.debounce_secs,
            entity_identity: identity.to_string(),
            entity_name,
            snapshot: state.clone(),
        });
    }

    /// Poll the debounce deadline; dispatches at most one request per burst.
    pub fn tick(&mut self, now: f64, client: &mut dyn FeedbackClient) {
        let Some(burst) = self.pending.take_if(|b| now >= b.deadline) else {
            return;
        };
        let generation = self.next_generation;
        self.next_generation += 1;
        self.outstanding = Some(generation);
        tracing::debug!(
            "dispatching feedback request {generation} for '{}'",
            burst.entity_identity
        );
        client.dispatch(FeedbackRequest {
            generation,
            scene_summary: burst.snapshot.summary(),
            entity_name: burst.entity_name,
        });
    }

    /// Deliver the outcome of a dispatched request.
    ///
    /// Replies for anything but the newest dispatched generation are
    /// discarded. Accepted failures attach the fallback note; neither outcome
    /// touches scene state. Returns whether the reply was accepted.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<FeedbackReply, PrevizError>,
    ) -> bool {
        if self.outstanding != Some(generation) {
            tracing::debug!("discarding stale feedback reply {generation}");
            return false;
        }
        self.outstanding = None;
        self.note = Some(match outcome {
            Ok(reply) => FeedbackNote::Reply(reply),
            Err(err) => {
                tracing::warn!("feedback request {generation} failed: {err}");
                FeedbackNote::Fallback
            }
        });
        true
    }

    pub fn in_flight(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn note(&self) -> Option<&FeedbackNote> {
        self.note.as_ref()
    }

    pub fn take_note(&mut self) -> Option<FeedbackNote> {
        self.note.take()
    }
}
