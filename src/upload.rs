//! Upload decision flow
//!
//! The decision over whether a candidate file gets written to storage is a
//! small state machine, kept pure so it can be tested without a network:
//!
//! ```text
//! Idle -> Checking -> { DirectWrite, AwaitingConfirmation }
//!                  -> { Uploaded, Canceled, Failed }
//! ```
//!
//! [`Decision::apply`] consumes inputs and emits the next effect to run
//! ([`Action::CheckExistence`] or [`Action::Transfer`]); [`UploadFlow`]
//! executes those effects against a [`StorageSink`] and feeds the results
//! back in. Once a terminal state is reached the machine absorbs all
//! further input; a new attempt always builds a new machine.

use std::fmt;

use bytes::Bytes;

use crate::storage::StorageSink;

/// A file selected for upload, prior to any decision
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    /// Original file name; becomes the object key verbatim
    pub name: String,
    /// Media type declared at intake (or guessed from the name)
    pub declared_media_type: String,
    /// The full file content, buffered for the probe-then-write flow
    pub content: Bytes,
}

/// Where the candidate is headed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRef {
    pub bucket_name: String,
    pub object_key: String,
}

/// Why a flow ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// No storage client handle at entry; checked before anything else
    CredentialsNotLoaded,
    /// Destination bucket name was empty at entry
    NoDestination,
    /// The existence probe itself failed (network/auth)
    ExistenceCheck(String),
    /// The write failed (network/auth)
    Transfer(String),
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::CredentialsNotLoaded => write!(f, "credentials not loaded"),
            FailReason::NoDestination => write!(f, "destination bucket not set"),
            FailReason::ExistenceCheck(e) => write!(f, "existence check failed: {e}"),
            FailReason::Transfer(e) => write!(f, "transfer failed: {e}"),
        }
    }
}

/// Decision machine states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Idle,
    Checking,
    DirectWrite,
    AwaitingConfirmation,
    Uploaded,
    Canceled,
    Failed(FailReason),
}

impl State {
    /// Terminal states absorb all further input
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Uploaded | State::Canceled | State::Failed(_))
    }
}

/// The user's answer when the destination object already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Replace,
    Cancel,
}

/// Inputs the machine reacts to
#[derive(Debug)]
pub enum Input {
    /// Start the flow; entry preconditions travel with the input
    Begin { client_ready: bool, bucket_set: bool },
    /// Result of the existence probe
    Exists(bool),
    /// The existence probe itself failed
    CheckFailed(String),
    /// The user resolved a collision
    Confirmed(Confirmation),
    /// The write completed
    TransferDone,
    /// The write failed
    TransferFailed(String),
}

/// Effects the machine asks its driver to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CheckExistence,
    Transfer,
}

/// Pure decision machine; one instance per candidate
#[derive(Debug)]
pub struct Decision {
    state: State,
}

impl Decision {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Advance the machine by one input, returning the effect to run next.
    ///
    /// Inputs that do not apply to the current state are no-ops, which also
    /// makes every terminal state absorbing.
    pub fn apply(&mut self, input: Input) -> Option<Action> {
        if self.state.is_terminal() {
            return None;
        }
        let (next, action) = match (&self.state, input) {
            // The credential check precedes everything, including the probe
            (State::Idle, Input::Begin { client_ready: false, .. }) => {
                (State::Failed(FailReason::CredentialsNotLoaded), None)
            }
            (State::Idle, Input::Begin { bucket_set: false, .. }) => {
                (State::Failed(FailReason::NoDestination), None)
            }
            (State::Idle, Input::Begin { .. }) => (State::Checking, Some(Action::CheckExistence)),

            (State::Checking, Input::Exists(false)) => (State::DirectWrite, Some(Action::Transfer)),
            (State::Checking, Input::Exists(true)) => (State::AwaitingConfirmation, None),
            (State::Checking, Input::CheckFailed(e)) => {
                (State::Failed(FailReason::ExistenceCheck(e)), None)
            }

            (State::DirectWrite, Input::TransferDone) => (State::Uploaded, None),
            (State::DirectWrite, Input::TransferFailed(e)) => {
                (State::Failed(FailReason::Transfer(e)), None)
            }

            (State::AwaitingConfirmation, Input::Confirmed(Confirmation::Replace)) => {
                (State::DirectWrite, Some(Action::Transfer))
            }
            (State::AwaitingConfirmation, Input::Confirmed(Confirmation::Cancel)) => {
                (State::Canceled, None)
            }

            (state, _) => (state.clone(), None),
        };
        self.state = next;
        action
    }
}

impl Default for Decision {
    fn default() -> Self {
        Self::new()
    }
}

/// A decision machine bound to its candidate and destination.
///
/// The flow owns the buffered candidate bytes for the lifetime of the
/// machine; dropping the flow (which happens as soon as a terminal state is
/// observed by the caller) releases them.
#[derive(Debug)]
pub struct UploadFlow {
    decision: Decision,
    candidate: UploadCandidate,
    dest: DestinationRef,
}

impl UploadFlow {
    pub fn new(candidate: UploadCandidate, bucket_name: &str) -> Self {
        let dest = DestinationRef {
            bucket_name: bucket_name.to_string(),
            object_key: candidate.name.clone(),
        };
        Self {
            decision: Decision::new(),
            candidate,
            dest,
        }
    }

    pub fn state(&self) -> &State {
        self.decision.state()
    }

    pub fn destination(&self) -> &DestinationRef {
        &self.dest
    }

    /// Run the flow from `Idle` until it settles: terminal, or suspended in
    /// `AwaitingConfirmation` pending a user choice.
    pub async fn start(&mut self, sink: Option<&dyn StorageSink>) -> &State {
        let begin = Input::Begin {
            client_ready: sink.is_some(),
            bucket_set: !self.dest.bucket_name.is_empty(),
        };
        let action = self.decision.apply(begin);
        self.run(action, sink).await
    }

    /// Resume a flow suspended in `AwaitingConfirmation`.
    pub async fn confirm(&mut self, choice: Confirmation, sink: Option<&dyn StorageSink>) -> &State {
        let action = self.decision.apply(Input::Confirmed(choice));
        self.run(action, sink).await
    }

    async fn run(&mut self, mut action: Option<Action>, sink: Option<&dyn StorageSink>) -> &State {
        while let Some(step) = action {
            let input = match (step, sink) {
                (Action::CheckExistence, None) => {
                    Input::CheckFailed("storage client not available".to_string())
                }
                (Action::Transfer, None) => {
                    Input::TransferFailed("storage client not available".to_string())
                }
                (Action::CheckExistence, Some(sink)) => {
                    match sink.exists(&self.dest.object_key).await {
                        Ok(found) => Input::Exists(found),
                        Err(e) => Input::CheckFailed(e.to_string()),
                    }
                }
                (Action::Transfer, Some(sink)) => {
                    match sink.put(&self.dest.object_key, self.candidate.content.clone()).await {
                        Ok(()) => Input::TransferDone,
                        Err(e) => Input::TransferFailed(e.to_string()),
                    }
                }
            };
            action = self.decision.apply(input);
        }
        self.decision.state()
    }
}
