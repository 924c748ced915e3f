//! Scanner actions wired to the gateway, history store and session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shield_analysis_contract::{normalize_advice, normalize_analysis, normalize_safer_version};
use shield_auth::{AuthStateMachine, SessionToken};
use shield_core::ScanRecord;
use shield_gateway::Gateway;
use shield_history::{
    DASHBOARD_WINDOW, DashboardStats, HistoryStore, dashboard_stats, new_record_from_analysis,
};
use shield_settings::{MemorySettingsStore, SettingsStore, SettingsUpdate, UserSettings};
use shield_ui::{Notification, PendingRequest, ScannerState, UiAuthState};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::AppError;

/// Result of one scanner action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Preconditions failed; no request was sent.
    Skipped,
    /// The reply was applied to view state.
    Applied,
    /// The request failed and an error notification was recorded.
    Failed,
    /// A newer request superseded this one; its outcome was dropped.
    Superseded,
}

impl ActionOutcome {
    fn settled(applied: bool, ok: bool) -> Self {
        match (applied, ok) {
            (false, _) => ActionOutcome::Superseded,
            (true, true) => ActionOutcome::Applied,
            (true, false) => ActionOutcome::Failed,
        }
    }
}

/// Owns the scanner view state and runs its actions.
pub struct ScannerController {
    gateway: Arc<Gateway>,
    history: Arc<dyn HistoryStore>,
    settings: Arc<dyn SettingsStore>,
    state: Mutex<ScannerState>,
    auth: Mutex<AuthStateMachine>,
}

impl ScannerController {
    /// Creates a controller with empty view state.
    ///
    /// Settings live in memory until [`Self::with_settings_store`] replaces
    /// the store.
    pub fn new(gateway: Arc<Gateway>, history: Arc<dyn HistoryStore>, version: &str) -> Self {
        Self {
            gateway,
            history,
            settings: Arc::new(MemorySettingsStore::new()),
            state: Mutex::new(ScannerState::new(version)),
            auth: Mutex::new(AuthStateMachine::new()),
        }
    }

    /// Uses `store` for per-user settings.
    pub fn with_settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings = store;
        self
    }

    /// Runs `f` against the view state under a short-lived lock.
    pub fn with_state<T>(&self, f: impl FnOnce(&mut ScannerState) -> T) -> T {
        f(&mut self.lock_state())
    }

    /// Returns a copy of the current view state.
    pub fn snapshot(&self) -> ScannerState {
        self.lock_state().clone()
    }

    /// Installs an authenticated session.
    pub fn sign_in(&self, session: SessionToken) {
        self.gateway
            .set_access_token(Some(session.access_token.clone()));
        self.lock_auth().on_login_success(session);
        self.with_state(|state| state.auth = UiAuthState::Authenticated);
        info!("scanner session attached");
    }

    /// Drops the current session.
    pub fn sign_out(&self) {
        self.gateway.set_access_token(None);
        self.lock_auth().logout();
        self.with_state(|state| state.auth = UiAuthState::Unauthenticated);
    }

    /// Returns the session when it is still valid at `now_ms`.
    pub fn session(&self, now_ms: u64) -> Option<SessionToken> {
        let mut auth = self.lock_auth();
        auth.on_tick(now_ms);
        let session = auth.active_session(now_ms).cloned();
        drop(auth);

        if session.is_none() {
            self.with_state(|state| {
                if state.auth == UiAuthState::Authenticated {
                    state.auth = UiAuthState::ReauthRequired;
                }
            });
        }
        session
    }

    /// Analyzes the current text and stores the normalized result.
    pub async fn analyze(&self) -> ActionOutcome {
        let Some(pending) = self.with_state(ScannerState::begin_analysis) else {
            return ActionOutcome::Skipped;
        };

        let reply = self
            .gateway
            .analyze_toxicity(&pending.text, Some(&pending.model))
            .await;

        match reply {
            Ok(raw) => {
                let analysis = normalize_analysis(&raw, &pending.model);
                info!(
                    score = analysis.toxicity_score,
                    severity = %analysis.severity,
                    categories = analysis.categories.len(),
                    "analysis complete"
                );
                let applied =
                    self.with_state(|state| state.complete_analysis(pending.ticket, analysis));
                self.settled(&pending, applied, true)
            }
            Err(error) => self.failed(&pending, error.message()),
        }
    }

    /// Requests a safer rewrite of the current text.
    pub async fn rewrite_safely(&self) -> ActionOutcome {
        let Some(pending) = self.with_state(ScannerState::begin_safer_version) else {
            return ActionOutcome::Skipped;
        };

        let reply = self
            .gateway
            .generate_safer_version(&pending.text, Some(&pending.model))
            .await;

        match reply {
            Ok(raw) => {
                let safer = normalize_safer_version(&raw);
                let applied =
                    self.with_state(|state| state.complete_safer_version(pending.ticket, safer));
                self.settled(&pending, applied, true)
            }
            Err(error) => self.failed(&pending, error.message()),
        }
    }

    /// Requests advice for the current analysis.
    pub async fn get_advice(&self) -> ActionOutcome {
        let Some(pending) = self.with_state(ScannerState::begin_advice) else {
            return ActionOutcome::Skipped;
        };

        let reply = self
            .gateway
            .generate_advice(
                &pending.text,
                &pending.categories,
                &pending.severity,
                Some(&pending.model),
            )
            .await;

        match reply {
            Ok(raw) => {
                let advice = normalize_advice(&raw);
                let applied =
                    self.with_state(|state| state.complete_advice(pending.ticket, advice));
                self.settled(&pending, applied, true)
            }
            Err(error) => self.failed(&pending, error.message()),
        }
    }

    /// Saves the current analysis, rewrite and advice to history.
    ///
    /// # Errors
    /// Returns [`AppError::NothingToSave`] without an analysis,
    /// [`AppError::LoginRequired`] without a session and
    /// [`AppError::History`] when the store fails.
    pub async fn save_to_history(&self, now_ms: u64) -> Result<ScanRecord, AppError> {
        let draft = self.with_state(|state| {
            state.analysis.as_ref().map(|analysis| {
                (
                    state.text.clone(),
                    analysis.clone(),
                    state.safer_version.clone(),
                    state.advice.clone(),
                    state.model.clone(),
                )
            })
        });
        let Some((text, analysis, safer, advice, model)) = draft else {
            return Err(AppError::NothingToSave);
        };

        let Some(session) = self.session(now_ms) else {
            self.with_state(|state| {
                state.notify(Notification::error(
                    "Please log in",
                    AppError::LoginRequired.to_string(),
                ))
            });
            return Err(AppError::LoginRequired);
        };

        let record = new_record_from_analysis(
            &session.user_id,
            &text,
            &analysis,
            &safer,
            &advice,
            &model,
        );
        match self.history.insert(record).await {
            Ok(saved) => {
                info!(record_id = %saved.id, "scan saved to history");
                self.with_state(|state| {
                    state.notify(Notification::success(
                        "Saved to history",
                        "You can view this analysis in your history page",
                    ))
                });
                Ok(saved)
            }
            Err(error) => {
                warn!(error = %error, "history save failed");
                self.with_state(|state| {
                    state.notify(Notification::error("Failed to save", error.to_string()))
                });
                Err(error.into())
            }
        }
    }

    /// Lists the signed-in user's history, newest first.
    ///
    /// # Errors
    /// Returns [`AppError::LoginRequired`] without a session.
    pub async fn history(
        &self,
        now_ms: u64,
        limit: Option<usize>,
    ) -> Result<Vec<ScanRecord>, AppError> {
        let session = self.session(now_ms).ok_or(AppError::LoginRequired)?;
        Ok(self.history.list_for_user(&session.user_id, limit).await?)
    }

    /// Deletes one of the signed-in user's records.
    ///
    /// # Errors
    /// Returns [`AppError::LoginRequired`] without a session and
    /// [`AppError::History`] when the record does not exist.
    pub async fn delete_scan(&self, now_ms: u64, id: &str) -> Result<(), AppError> {
        let session = self.session(now_ms).ok_or(AppError::LoginRequired)?;
        self.history.delete(&session.user_id, id).await?;
        info!(record_id = %id, "scan deleted");
        Ok(())
    }

    /// Summarizes the newest records for the dashboard.
    ///
    /// # Errors
    /// Returns [`AppError::LoginRequired`] without a session.
    pub async fn dashboard(
        &self,
        now_ms: u64,
        now: OffsetDateTime,
    ) -> Result<(DashboardStats, Vec<ScanRecord>), AppError> {
        let recent = self.history(now_ms, Some(DASHBOARD_WINDOW)).await?;
        Ok((dashboard_stats(&recent, now), recent))
    }

    /// Loads the signed-in user's settings into view state.
    ///
    /// # Errors
    /// Returns [`AppError::LoginRequired`] without a session and
    /// [`AppError::Settings`] when the store fails.
    pub async fn load_settings(&self, now_ms: u64) -> Result<UserSettings, AppError> {
        let session = self.session(now_ms).ok_or(AppError::LoginRequired)?;
        let settings = self.settings.load(&session.user_id).await?;
        self.with_state(|state| state.settings = settings);
        debug!(language = %settings.language, theme = %settings.theme, "settings loaded");
        Ok(settings)
    }

    /// Applies `update` to view state and persists it for the signed-in user.
    ///
    /// Without a session the change stays in view state only.
    ///
    /// # Errors
    /// Returns [`AppError::Settings`] when the store fails; view state is
    /// left unchanged in that case.
    pub async fn update_settings(
        &self,
        now_ms: u64,
        update: SettingsUpdate,
    ) -> Result<UserSettings, AppError> {
        let settings = match self.session(now_ms) {
            Some(session) => self.settings.update(&session.user_id, update).await?,
            None => {
                debug!("no session; settings kept in view state only");
                self.with_state(|state| state.settings.with(update))
            }
        };

        self.with_state(|state| {
            state.settings = settings;
            if update.theme.is_some() {
                state.notify(Notification::success("Theme updated", settings.theme.to_string()));
            }
        });
        Ok(settings)
    }

    fn settled(&self, pending: &PendingRequest, applied: bool, ok: bool) -> ActionOutcome {
        if !applied {
            debug!(kind = ?pending.ticket.kind(), "stale reply dropped");
        }
        ActionOutcome::settled(applied, ok)
    }

    fn failed(&self, pending: &PendingRequest, message: &str) -> ActionOutcome {
        warn!(kind = ?pending.ticket.kind(), error = %message, "scanner action failed");
        let applied = self.with_state(|state| state.fail(pending.ticket, message));
        self.settled(pending, applied, false)
    }

    fn lock_state(&self) -> MutexGuard<'_, ScannerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_auth(&self) -> MutexGuard<'_, AuthStateMachine> {
        self.auth.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
