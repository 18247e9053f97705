//! Confirmation dialogs as explicit state machines.
//!
//! A dialog starts [Idle](DialogFlow::Idle), asks for confirmation of an action, and after the
//! action succeeds shows a success notice until it is acknowledged.

use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransactionAction {
    Add,
    Edit(i32),
    Delete(i32),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CategoryAction {
    Add,
    Edit(i32),
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum DialogFlow<A> {
    #[default]
    Idle,
    Confirming(A),
    Succeeded(A),
}

#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
pub enum FlowError {
    #[error("Cannot {transition} while {state}")]
    InvalidTransition {
        transition: &'static str,
        state: &'static str,
    },
}

impl<A: Clone> DialogFlow<A> {
    fn state_name(&self) -> &'static str {
        match self {
            DialogFlow::Idle => "idle",
            DialogFlow::Confirming(_) => "confirming",
            DialogFlow::Succeeded(_) => "succeeded",
        }
    }

    fn reject(&self, transition: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            transition,
            state: self.state_name(),
        }
    }

    /// The action being confirmed or that just succeeded.
    pub fn action(&self) -> Option<&A> {
        match self {
            DialogFlow::Idle => None,
            DialogFlow::Confirming(action) | DialogFlow::Succeeded(action) => Some(action),
        }
    }

    pub fn request(&mut self, action: A) -> Result<(), FlowError> {
        match self {
            DialogFlow::Idle => {
                *self = DialogFlow::Confirming(action);
                Ok(())
            }
            _ => Err(self.reject("request")),
        }
    }

    /// Returns the confirmed action so the caller can carry it out.
    pub fn confirm(&mut self) -> Result<A, FlowError> {
        match self {
            DialogFlow::Confirming(action) => {
                let action = action.clone();
                *self = DialogFlow::Succeeded(action.clone());
                Ok(action)
            }
            _ => Err(self.reject("confirm")),
        }
    }

    pub fn cancel(&mut self) -> Result<(), FlowError> {
        match self {
            DialogFlow::Confirming(_) => {
                *self = DialogFlow::Idle;
                Ok(())
            }
            _ => Err(self.reject("cancel")),
        }
    }

    pub fn acknowledge(&mut self) -> Result<(), FlowError> {
        match self {
            DialogFlow::Succeeded(_) => {
                *self = DialogFlow::Idle;
                Ok(())
            }
            _ => Err(self.reject("acknowledge")),
        }
    }
}
