// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle manager.
//!
//! Owns the transition rules. Every read and explicit transition first runs
//! the timeout policy over the sessions it touches, so callers never observe
//! a session that should already have lapsed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use tutorlink_config::model::{LifecycleConfig, UnknownHelperPolicy};
use tutorlink_core::types::{
    Actor, Role, Session, SessionId, SessionQuery, SessionStatus, SessionTransition,
    TransitionAction, TransitionReason, UserId,
};
use tutorlink_core::{Clock, ProfileDirectory, SessionStore, TutorlinkError};

use crate::listing::{SessionFilter, SessionListing, SessionScope, SessionView, SweepReport};
use crate::policy::TimeoutPolicy;

const MAX_TOPIC_CHARS: usize = 200;
const MAX_TEXT_CHARS: usize = 2000;

/// Input to [`SessionManager::create_session`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSession {
    /// Requested volunteer. `None` leaves the session open for any volunteer.
    pub helper_id: Option<UserId>,
    pub topic: String,
    pub description: Option<String>,
    /// Defaults to `lifecycle.default_duration_minutes`.
    pub duration_minutes: Option<u32>,
}

impl NewSession {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    pub fn with_helper(mut self, helper: impl Into<String>) -> Self {
        self.helper_id = Some(UserId(helper.into()));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }
}

/// Result of running the policy over one session on a read path.
enum Enforced {
    Current(Session),
    /// The write failed; the session holds the projected state.
    Projected(Session),
}

/// Owns session records and their transition rules.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    profiles: Arc<dyn ProfileDirectory>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
    policy: TimeoutPolicy,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        profiles: Arc<dyn ProfileDirectory>,
        clock: Arc<dyn Clock>,
        config: LifecycleConfig,
    ) -> Self {
        let policy = TimeoutPolicy::from_config(&config);
        Self {
            store,
            profiles,
            clock,
            config,
            policy,
        }
    }

    pub fn policy(&self) -> &TimeoutPolicy {
        &self.policy
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileDirectory> {
        &self.profiles
    }

    /// Creates a `scheduled` session owned by `requester`.
    pub async fn create_session(
        &self,
        requester: &Actor,
        request: NewSession,
    ) -> Result<Session, TutorlinkError> {
        let topic = request.topic.trim().to_string();
        if topic.is_empty() {
            return Err(TutorlinkError::Validation("topic is required".into()));
        }
        if topic.chars().count() > MAX_TOPIC_CHARS {
            return Err(TutorlinkError::Validation(format!(
                "topic exceeds {MAX_TOPIC_CHARS} characters"
            )));
        }
        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_TEXT_CHARS)
        {
            return Err(TutorlinkError::Validation(format!(
                "description exceeds {MAX_TEXT_CHARS} characters"
            )));
        }
        let duration_minutes = request
            .duration_minutes
            .unwrap_or(self.config.default_duration_minutes);
        if duration_minutes == 0 || duration_minutes > self.config.max_duration_minutes {
            return Err(TutorlinkError::Validation(format!(
                "duration_minutes must be between 1 and {}",
                self.config.max_duration_minutes
            )));
        }
        if request.helper_id.as_ref() == Some(&requester.id) {
            return Err(TutorlinkError::Validation(
                "requester cannot be their own helper".into(),
            ));
        }

        let helper_id = match request.helper_id {
            Some(helper) => self.resolve_helper(helper).await?,
            None => None,
        };

        let now = self.clock.now();
        let session = Session {
            id: SessionId::generate(),
            status: SessionStatus::Scheduled,
            requester_id: requester.id.clone(),
            helper_id,
            topic,
            description,
            duration_minutes,
            created_at: now,
            scheduled_at: now,
            last_transition_at: now,
            transition_reason: None,
            transition_note: None,
        };
        self.store.insert_session(&session).await?;
        info!(
            session_id = %session.id,
            requester = %session.requester_id,
            helper = session.helper_id.as_ref().map(|h| h.as_str()),
            "session created"
        );
        Ok(session)
    }

    async fn resolve_helper(&self, helper: UserId) -> Result<Option<UserId>, TutorlinkError> {
        let resolved = self
            .profiles
            .get_profile(&helper)
            .await?
            .filter(|p| p.role == Role::Volunteer);
        if resolved.is_some() {
            return Ok(Some(helper));
        }
        match self.config.unknown_helper {
            UnknownHelperPolicy::Reject => Err(TutorlinkError::profile_not_found(helper.0)),
            UnknownHelperPolicy::Unassigned => {
                warn!(helper = %helper, "requested helper is not a volunteer; creating session unmatched");
                Ok(None)
            }
        }
    }

    /// Moves a `scheduled` session to `in_progress`.
    pub async fn start_session(
        &self,
        id: &SessionId,
        actor: &Actor,
    ) -> Result<Session, TutorlinkError> {
        self.transition(id, actor, TransitionAction::Start, None).await
    }

    /// Moves an `in_progress` session to `completed`.
    pub async fn complete_session(
        &self,
        id: &SessionId,
        actor: &Actor,
        note: Option<String>,
    ) -> Result<Session, TutorlinkError> {
        self.transition(id, actor, TransitionAction::Complete, note)
            .await
    }

    /// Moves a non-terminal session to `cancelled`.
    pub async fn cancel_session(
        &self,
        id: &SessionId,
        actor: &Actor,
        note: Option<String>,
    ) -> Result<Session, TutorlinkError> {
        self.transition(id, actor, TransitionAction::Cancel, note)
            .await
    }

    /// Applies a caller-initiated action.
    pub async fn transition(
        &self,
        id: &SessionId,
        actor: &Actor,
        action: TransitionAction,
        note: Option<String>,
    ) -> Result<Session, TutorlinkError> {
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        if note
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_TEXT_CHARS)
        {
            return Err(TutorlinkError::Validation(format!(
                "note exceeds {MAX_TEXT_CHARS} characters"
            )));
        }

        let now = self.clock.now();
        let session = self.load(id).await?;
        let session = self.enforce_strict(session, now).await?;

        authorize(&session, actor, action)?;
        let target = action.target();
        if !session.status.can_transition_to(target) {
            return Err(TutorlinkError::InvalidTransition {
                session_id: session.id,
                from: session.status,
                action,
            });
        }

        let (reason, note, helper_id) = match action {
            TransitionAction::Start => (
                TransitionReason::Started,
                None,
                session.helper_id.is_none().then(|| actor.id.clone()),
            ),
            TransitionAction::Complete => (TransitionReason::CompletedByParticipant, note, None),
            TransitionAction::Cancel => (TransitionReason::CancelledByParticipant, note, None),
        };
        let transition = SessionTransition {
            session_id: session.id.clone(),
            expected: session.status,
            status: target,
            at: now.max(session.last_transition_at),
            reason,
            note,
            helper_id,
        };

        if self.store.transition_session(&transition).await? {
            let mut session = session;
            session.apply(&transition);
            info!(
                session_id = %session.id,
                actor = %actor.id,
                from = %transition.expected,
                to = %transition.status,
                "session transitioned"
            );
            return Ok(session);
        }

        // Lost the compare-and-set to a concurrent writer.
        let current = self.load(id).await?;
        if action != TransitionAction::Start && current.status == target {
            debug!(session_id = %current.id, %action, "concurrent transition reached the same state");
            return Ok(current);
        }
        Err(TutorlinkError::InvalidTransition {
            session_id: current.id,
            from: current.status,
            action,
        })
    }

    /// Reads one session on behalf of a participant or admin.
    ///
    /// A failed timeout write does not fail the read; the view carries the
    /// projected state and `possibly_stale`.
    pub async fn get_session(
        &self,
        id: &SessionId,
        actor: &Actor,
    ) -> Result<SessionView, TutorlinkError> {
        let session = self.load(id).await?;
        if !actor.is_admin() && !session.is_participant(&actor.id) {
            return Err(TutorlinkError::unauthorized(format!(
                "{} is not a participant of session {id}",
                actor.id
            )));
        }
        let view = match self.enforce_lenient(session, self.clock.now()).await {
            Enforced::Current(session) => SessionView {
                session,
                possibly_stale: false,
            },
            Enforced::Projected(session) => SessionView {
                session,
                possibly_stale: true,
            },
        };
        Ok(view)
    }

    /// Checks that `actor` may exchange signals on `id`.
    ///
    /// Admins always may. For a known session the actor must be one of its
    /// participants. Unknown ids pass, since the relay does not depend on
    /// session records. Reads the stored row without applying the timeout
    /// policy.
    pub async fn authorize_signaling(
        &self,
        id: &SessionId,
        actor: &Actor,
    ) -> Result<(), TutorlinkError> {
        if actor.is_admin() {
            return Ok(());
        }
        match self.store.get_session(id).await? {
            Some(session) if !session.is_participant(&actor.id) => {
                Err(TutorlinkError::unauthorized(format!(
                    "{} may not signal on session {id}",
                    actor.id
                )))
            }
            _ => Ok(()),
        }
    }

    /// Runs the timeout policy over every non-terminal session in `scope`.
    ///
    /// Idempotent: a second pass at the same instant changes nothing.
    pub async fn apply_timeout_policy(
        &self,
        scope: SessionScope,
    ) -> Result<SweepReport, TutorlinkError> {
        let mut query = SessionQuery::open();
        if let SessionScope::Participant(user) = scope {
            query.participant = Some(user);
        }
        let candidates = self.store.query_sessions(&query).await?;
        let now = self.clock.now();

        let mut report = SweepReport {
            examined: candidates.len(),
            ..SweepReport::default()
        };
        for session in &candidates {
            let Some(transition) = self.policy.evaluate(session, now) else {
                continue;
            };
            match self.store.transition_session(&transition).await {
                Ok(true) => {
                    log_auto_transition(&transition);
                    match transition.status {
                        SessionStatus::Completed => report.completed += 1,
                        _ => report.cancelled += 1,
                    }
                }
                Ok(false) => {
                    debug!(session_id = %session.id, "session changed during sweep; skipped");
                }
                Err(e) => {
                    warn!(session_id = %session.id, error = %e, "timeout transition failed");
                    report.failed += 1;
                }
            }
        }
        info!(
            examined = report.examined,
            completed = report.completed,
            cancelled = report.cancelled,
            failed = report.failed,
            "timeout policy applied"
        );
        Ok(report)
    }

    /// Lists sessions after running the timeout policy over the candidates.
    ///
    /// Status filtering happens after the policy, so a session that just
    /// lapsed is listed under its new status. A failed cleanup write never
    /// fails the listing; it sets [`SessionListing::possibly_stale`] instead.
    pub async fn list_sessions(
        &self,
        filter: SessionFilter,
    ) -> Result<SessionListing, TutorlinkError> {
        let limit = match filter.limit {
            Some(0) => return Err(TutorlinkError::Validation("limit must be positive".into())),
            Some(n) => n.min(self.config.max_list_limit),
            None => self.config.max_list_limit,
        };

        let candidates = self
            .store
            .query_sessions(&SessionQuery {
                participant: filter.participant.clone(),
                statuses: None,
                created_after: filter.created_after,
            })
            .await?;

        let now = self.clock.now();
        let mut possibly_stale = false;
        let mut sessions = Vec::with_capacity(candidates.len());
        for session in candidates {
            match self.enforce_lenient(session, now).await {
                Enforced::Current(session) => sessions.push(session),
                Enforced::Projected(session) => {
                    possibly_stale = true;
                    sessions.push(session);
                }
            }
        }
        if possibly_stale {
            warn!("timeout cleanup incomplete; listing may be stale");
        }

        sessions.retain(|s| filter.keeps(s));
        filter.sort(&mut sessions);
        sessions.truncate(limit);
        Ok(SessionListing::new(sessions, possibly_stale))
    }

    async fn load(&self, id: &SessionId) -> Result<Session, TutorlinkError> {
        self.store
            .get_session(id)
            .await?
            .ok_or_else(|| TutorlinkError::session_not_found(id))
    }

    /// Policy pass for explicit transitions: every failure surfaces.
    async fn enforce_strict(
        &self,
        session: Session,
        now: DateTime<Utc>,
    ) -> Result<Session, TutorlinkError> {
        let Some(transition) = self.policy.evaluate(&session, now) else {
            return Ok(session);
        };
        if self.store.transition_session(&transition).await? {
            log_auto_transition(&transition);
            let mut session = session;
            session.apply(&transition);
            Ok(session)
        } else {
            self.load(&session.id).await
        }
    }

    /// Policy pass for reads: write failures degrade to the projected state.
    async fn enforce_lenient(&self, mut session: Session, now: DateTime<Utc>) -> Enforced {
        let Some(transition) = self.policy.evaluate(&session, now) else {
            return Enforced::Current(session);
        };
        match self.store.transition_session(&transition).await {
            Ok(true) => {
                log_auto_transition(&transition);
                session.apply(&transition);
                Enforced::Current(session)
            }
            Ok(false) => match self.store.get_session(&session.id).await {
                Ok(Some(current)) => Enforced::Current(current),
                Ok(None) | Err(_) => {
                    session.apply(&transition);
                    Enforced::Projected(session)
                }
            },
            Err(e) => {
                warn!(
                    session_id = %session.id,
                    error = %e,
                    "could not persist timeout transition; serving projected state"
                );
                session.apply(&transition);
                Enforced::Projected(session)
            }
        }
    }
}

fn log_auto_transition(transition: &SessionTransition) {
    info!(
        session_id = %transition.session_id,
        from = %transition.expected,
        to = %transition.status,
        reason = %transition.reason,
        "timeout policy transitioned session"
    );
}

fn authorize(
    session: &Session,
    actor: &Actor,
    action: TransitionAction,
) -> Result<(), TutorlinkError> {
    let allowed = match action {
        TransitionAction::Start => match &session.helper_id {
            Some(helper) => helper == &actor.id || actor.is_admin(),
            None => actor.role == Role::Volunteer && actor.id != session.requester_id,
        },
        TransitionAction::Complete | TransitionAction::Cancel => {
            actor.is_admin() || session.is_participant(&actor.id)
        }
    };
    if allowed {
        Ok(())
    } else {
        Err(TutorlinkError::unauthorized(format!(
            "{} may not {action} session {}",
            actor.id, session.id
        )))
    }
}
