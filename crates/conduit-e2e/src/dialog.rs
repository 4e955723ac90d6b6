//! Native dialog handling (alert, confirm, prompt, beforeunload).
//!
//! A native dialog blocks the page's script thread until it is answered, so
//! the answer must be in place before the action that opens it. The protocol
//! is arm, act, await-resolution:
//!
//! ```ignore
//! let armed = client.arm_dialog(DialogAction::Accept).await?;
//! delete_button.click().await?;
//! let dialog = armed.resolved(Duration::from_secs(5)).await?;
//! ```
//!
//! An [`ArmedDialog`] answers exactly one dialog. Dropping it disarms the
//! driver side.

use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::oneshot;

/// Type of browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogType {
    /// Alert dialog (OK button only)
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl std::fmt::Display for DialogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

/// How an armed dialog is answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogAction {
    /// Dialog is accepted (OK/Yes/Leave)
    Accept,
    /// Dialog is accepted with input text (for prompts)
    AcceptWith(String),
    /// Dialog is dismissed (Cancel/No/Stay)
    Dismiss,
}

impl DialogAction {
    /// Whether this action presses the affirmative button
    #[must_use]
    pub const fn accepts(&self) -> bool {
        matches!(self, Self::Accept | Self::AcceptWith(_))
    }

    /// Prompt text to submit, if any
    #[must_use]
    pub fn prompt_text(&self) -> Option<&str> {
        match self {
            Self::AcceptWith(text) => Some(text),
            Self::Accept | Self::Dismiss => None,
        }
    }
}

/// A dialog the page opened, with the answer it received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    dialog_type: DialogType,
    message: String,
    action: Option<DialogAction>,
}

impl Dialog {
    /// Create a new, unanswered dialog
    #[must_use]
    pub fn new(dialog_type: DialogType, message: impl Into<String>) -> Self {
        Self {
            dialog_type,
            message: message.into(),
            action: None,
        }
    }

    /// Create a confirm dialog
    #[must_use]
    pub fn confirm(message: impl Into<String>) -> Self {
        Self::new(DialogType::Confirm, message)
    }

    /// Record the answer given to this dialog
    #[must_use]
    pub fn answered(mut self, action: DialogAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Get dialog type
    #[must_use]
    pub const fn dialog_type(&self) -> DialogType {
        self.dialog_type
    }

    /// Get dialog message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Answer given, if the dialog was handled
    #[must_use]
    pub const fn action(&self) -> Option<&DialogAction> {
        self.action.as_ref()
    }
}

/// Create a linked armed handle and driver-side responder
#[must_use]
pub fn arm(action: DialogAction) -> (ArmedDialog, DialogResponder) {
    let (sender, receiver) = oneshot::channel();
    (
        ArmedDialog {
            action: action.clone(),
            receiver,
        },
        DialogResponder { action, sender },
    )
}

/// Caller-side handle: "the next dialog will be answered thus"
#[derive(Debug)]
pub struct ArmedDialog {
    action: DialogAction,
    receiver: oneshot::Receiver<E2eResult<Dialog>>,
}

impl ArmedDialog {
    /// The answer this handle will give
    #[must_use]
    pub const fn action(&self) -> &DialogAction {
        &self.action
    }

    /// Wait for the armed dialog to be answered, consuming the handle
    pub async fn resolved(self, timeout: Duration) -> E2eResult<Dialog> {
        match tokio::time::timeout(timeout, self.receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(E2eError::Dialog {
                message: "driver dropped the dialog handler before a dialog opened".to_string(),
            }),
            Err(_) => Err(E2eError::timeout("armed dialog to open", timeout)),
        }
    }
}

/// Driver-side half: answers one dialog and reports back
#[derive(Debug)]
pub struct DialogResponder {
    action: DialogAction,
    sender: oneshot::Sender<E2eResult<Dialog>>,
}

impl DialogResponder {
    /// The answer to give
    #[must_use]
    pub const fn action(&self) -> &DialogAction {
        &self.action
    }

    /// Whether the caller dropped its handle
    #[must_use]
    pub fn is_disarmed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once the caller drops its handle
    pub async fn disarmed(&mut self) {
        self.sender.closed().await;
    }

    /// Report the outcome of answering the dialog
    pub fn resolve(self, outcome: E2eResult<Dialog>) {
        // Receiver may already be gone; nothing left to notify.
        let _ = self.sender.send(outcome);
    }
}
