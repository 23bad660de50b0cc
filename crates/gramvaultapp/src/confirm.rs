//! Confirmation gates for irreversible bulk operations.
//!
//! Library code never prompts. Operations that need a yes/no answer (emptying the
//! recycle bin, merging a backup) build a [`Prompt`] describing what is about to happen
//! and hand it to a [`Confirm`] implementation supplied by the UI. Single-item delete,
//! restore and purge deliberately take no gate.

/// What the user is being asked to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub details: Vec<String>,
}

impl Prompt {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

pub trait Confirm {
    fn confirm(&mut self, prompt: &Prompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Prompt) -> bool,
{
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        self(prompt)
    }
}

/// Approves everything, for `--yes` style invocations.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &Prompt) -> bool {
        true
    }
}
