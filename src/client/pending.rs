use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Key the cached form is stored under in a session file.
pub const PENDING_SUBMISSION_KEY: &str = "pendingSubmission";

/// The registration form held between submitting it and confirming the code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingSubmission {
    form: Option<Value>,
}

impl PendingSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(form: Value) -> Self {
        Self { form: Some(form) }
    }

    pub fn store(&mut self, form: Value) {
        self.form = Some(form);
    }

    pub fn get(&self) -> Option<&Value> {
        self.form.as_ref()
    }

    pub fn clear(&mut self) {
        self.form = None;
    }

    pub fn is_empty(&self) -> bool {
        self.form.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A JSON object on disk that keeps the pending submission across runs of
/// the terminal client. Other keys in the file are preserved.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_object(&self) -> Result<Map<String, Value>, SessionError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub fn load(&self) -> Result<PendingSubmission, SessionError> {
        let form = self
            .read_object()?
            .remove(PENDING_SUBMISSION_KEY)
            .filter(|v| !v.is_null());
        Ok(PendingSubmission { form })
    }

    pub fn save(&self, pending: &PendingSubmission) -> Result<(), SessionError> {
        let mut object = self.read_object()?;
        match pending.get() {
            Some(form) => {
                object.insert(PENDING_SUBMISSION_KEY.to_string(), form.clone());
            }
            None => {
                object.remove(PENDING_SUBMISSION_KEY);
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&Value::Object(object))?)?;
        Ok(())
    }
}
