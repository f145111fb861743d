use std::sync::{Mutex, MutexGuard};

use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};

use super::dto::{Credentials, Field, Route};
use super::error::{SignUpError, SignUpFailure};
use super::form::FormState;
use super::schema::{FieldErrors, ValidationSchema};
use crate::backend::{UserCredential, UserRecord, USERS_COLLECTION};
use crate::session;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
    Succeeded,
    Failed(SignUpFailure),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// A submission is already in flight; this trigger was ignored.
    AlreadySubmitting,
    /// This form already created its account; nothing was sent.
    AlreadySignedUp,
    /// Client-side validation failed; nothing was sent.
    Invalid(FieldErrors),
    SignedUp(UserCredential),
    Failed(SignUpFailure),
}

#[derive(Debug)]
struct Inner {
    form: FormState,
    phase: Phase,
}

/// Drives one mounted sign-up form: field edits, validation, account
/// creation and the hand-off to the next screen.
///
/// Field edits never wait on a pending submission: the form lock is only
/// held for synchronous updates.
pub struct SignUpController {
    state: AppState,
    schema: ValidationSchema,
    inner: Mutex<Inner>,
}

impl SignUpController {
    pub fn new(state: AppState) -> Self {
        let schema = ValidationSchema::sign_up(state.config.password_min_len);
        Self::with_schema(state, schema)
    }

    pub fn with_schema(state: AppState, schema: ValidationSchema) -> Self {
        Self {
            state,
            schema,
            inner: Mutex::new(Inner {
                form: FormState::default(),
                phase: Phase::Editing,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn phase(&self) -> Phase {
        self.inner().phase
    }

    pub fn snapshot(&self) -> FormState {
        self.inner().form.clone()
    }

    pub fn visible_error(&self, field: Field) -> Option<String> {
        self.inner().form.visible_error(field).map(str::to_string)
    }

    pub fn change(&self, field: Field, value: impl Into<String>) {
        let mut inner = self.inner();
        inner.form.on_change(&self.schema, field, value);
        leave_failed(&mut inner);
    }

    pub fn blur(&self, field: Field) {
        let mut inner = self.inner();
        inner.form.on_blur(&self.schema, field);
        leave_failed(&mut inner);
    }

    #[instrument(skip(self))]
    pub async fn submit(&self) -> SubmitOutcome {
        let creds = {
            let mut inner = self.inner();
            match inner.phase {
                Phase::Submitting => {
                    debug!("submit ignored: already submitting");
                    return SubmitOutcome::AlreadySubmitting;
                }
                Phase::Succeeded => {
                    debug!("submit ignored: already signed up");
                    return SubmitOutcome::AlreadySignedUp;
                }
                Phase::Editing | Phase::Failed(_) => {}
            }
            if !inner.form.validate_for_submit(&self.schema) {
                inner.phase = Phase::Editing;
                debug!(fields = ?inner.form.errors.keys().collect::<Vec<_>>(), "validation failed");
                return SubmitOutcome::Invalid(inner.form.errors.clone());
            }
            inner.phase = Phase::Submitting;
            inner.form.values.clone()
        };

        let mut in_flight = InFlight {
            inner: &self.inner,
            settled: false,
        };

        match self.sign_up(&creds).await {
            Ok(credential) => {
                self.state.navigator.push(Route::SignIn).await;
                info!(uid = %credential.uid, "sign-up complete");
                in_flight.settle(Phase::Succeeded);
                SubmitOutcome::SignedUp(credential)
            }
            Err(e) => {
                let failure = e.classify();
                error!(error = ?e, code = e.code(), "error while signing up");
                self.state.alerter.alert(&failure.alert()).await;
                in_flight.settle(Phase::Failed(failure));
                SubmitOutcome::Failed(failure)
            }
        }
    }

    /// Account, then profile document, then session flags. Each step only
    /// runs once the previous one succeeded.
    async fn sign_up(&self, creds: &Credentials) -> Result<UserCredential, SignUpError> {
        let credential = self
            .state
            .accounts
            .create_account(&creds.email, &creds.password)
            .await?;

        let record = UserRecord {
            email: creds.email.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        let body = serde_json::to_value(&record).map_err(|e| SignUpError::ProfileWrite(e.into()))?;
        self.state
            .documents
            .set_document(USERS_COLLECTION, &credential.uid.to_string(), body)
            .await
            .map_err(SignUpError::ProfileWrite)?;

        session::mark_signed_up(self.state.storage.as_ref(), &creds.email)
            .await
            .map_err(SignUpError::SessionWrite)?;

        Ok(credential)
    }

    /// Skips validation and the backend entirely.
    #[instrument(skip(self))]
    pub async fn continue_as_guest(&self) {
        if let Err(e) = session::mark_guest(self.state.storage.as_ref()).await {
            warn!(error = %e, "persisting guest flag failed");
        }
        self.state.navigator.push(Route::Home).await;
    }

    pub async fn go_to_sign_in(&self) {
        self.state.navigator.push(Route::SignIn).await;
    }
}

fn leave_failed(inner: &mut Inner) {
    if let Phase::Failed(_) = inner.phase {
        inner.phase = Phase::Editing;
    }
}

/// Puts the form back into `Editing` if a submission future is dropped
/// before it settles.
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(&mut self, phase: Phase) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).phase = phase;
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.phase == Phase::Submitting {
            inner.phase = Phase::Editing;
        }
    }
}
