use crate::model::{Gender, NewName};
use crate::store::{NameStore, StoreError};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Outcome banner under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Error(String),
}

/// State behind the add-name form: the three field buffers, the in-flight
/// flag, and the last outcome. Fields survive a failed insert.
pub struct AddNameForm {
    store: NameStore,
    handle: Handle,
    tx: mpsc::Sender<Result<(), StoreError>>,
    rx: mpsc::Receiver<Result<(), StoreError>>,
    pub name: String,
    pub meaning: String,
    pub gender: Gender,
    submitting: bool,
    feedback: Option<Feedback>,
}

impl AddNameForm {
    pub fn new(store: NameStore, handle: Handle) -> Self {
        let (tx, rx) = mpsc::channel(4);
        AddNameForm {
            store,
            handle,
            tx,
            rx,
            name: String::new(),
            meaning: String::new(),
            gender: Gender::Boy,
            submitting: false,
            feedback: None,
        }
    }

    /// Validate locally and kick off the insert.
    pub fn submit(&mut self) {
        if self.submitting {
            return;
        }

        let name = self.name.trim().to_string();
        let meaning = self.meaning.trim().to_string();
        if name.is_empty() || meaning.is_empty() {
            self.feedback = Some(Feedback::Error("Name and meaning are required.".to_string()));
            return;
        }

        self.submitting = true;
        self.feedback = None;
        let entry = NewName { name, meaning, gender: self.gender };
        let store = self.store.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = store.insert_name(&entry).await;
            let _ = tx.send(result).await;
        });
    }

    /// Apply any finished insert. Call once per frame.
    pub fn poll(&mut self) {
        while let Ok(result) = self.rx.try_recv() {
            self.submitting = false;
            match result {
                Ok(()) => {
                    info!("added name: {}", self.name.trim());
                    self.name.clear();
                    self.meaning.clear();
                    self.gender = Gender::Boy;
                    self.feedback =
                        Some(Feedback::Success("Name added successfully!".to_string()));
                }
                Err(e) => {
                    error!("failed to add name: {}", e);
                    self.feedback =
                        Some(Feedback::Error("Failed to add name. Please try again.".to_string()));
                }
            }
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }
}
