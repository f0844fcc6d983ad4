use std::fmt;

use super::SessionId;

/// Locator of a staged document within the staging store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn new(session_id: &SessionId, upload_id: &uuid::Uuid, filename: &str) -> Self {
        Self(format!("{}/{}/{}", session_id.as_uuid(), upload_id, filename))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
