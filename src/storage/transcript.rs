use super::CHAT_DATA_KEY;
use super::models::PersistedChat;
use super::session_storage::{SessionStorage, StorageError};

/// Persists the transcript and bot session id as JSON text.
///
/// Failures never reach the caller: a chat that cannot be saved or
/// restored keeps working in memory.
pub struct TranscriptStore {
    storage: Option<SessionStorage>,
}

impl TranscriptStore {
    pub fn new(storage: SessionStorage) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    /// A store with nowhere to write; every call is a no-op.
    pub fn detached() -> Self {
        Self { storage: None }
    }

    pub fn load(&self) -> Option<PersistedChat> {
        let storage = self.storage.as_ref()?;
        match Self::read(storage) {
            Ok(data) => data,
            Err(err) => {
                log::error!("Error loading chat from storage: {err}");
                None
            }
        }
    }

    fn read(storage: &SessionStorage) -> Result<Option<PersistedChat>, StorageError> {
        match storage.get_item(CHAT_DATA_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, data: &PersistedChat) {
        let Some(storage) = &self.storage else {
            return;
        };
        let result = serde_json::to_string(data)
            .map_err(StorageError::from)
            .and_then(|json| storage.set_item(CHAT_DATA_KEY, &json));
        if let Err(err) = result {
            log::error!("Error saving chat to storage: {err}");
        }
    }

    pub fn clear(&self) {
        if let Some(storage) = &self.storage {
            if let Err(err) = storage.remove_item(CHAT_DATA_KEY) {
                log::error!("Error clearing chat storage: {err}");
            }
        }
    }

    #[cfg(test)]
    pub fn raw(&self) -> Option<String> {
        self.storage
            .as_ref()
            .and_then(|storage| storage.get_item(CHAT_DATA_KEY).ok().flatten())
    }

    #[cfg(test)]
    pub fn write_raw(&self, value: &str) {
        if let Some(storage) = &self.storage {
            storage.set_item(CHAT_DATA_KEY, value).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ChatMessage;

    fn store() -> TranscriptStore {
        TranscriptStore::new(SessionStorage::in_memory().unwrap())
    }

    #[test]
    fn round_trips_messages_and_session_id() {
        let store = store();
        let data = PersistedChat {
            messages: vec![ChatMessage::user("hi"), ChatMessage::bot("hello")],
            session_id: "web-ui-1-abc".into(),
        };

        store.save(&data);
        assert_eq!(store.load(), Some(data));
    }

    #[test]
    fn malformed_payload_restores_nothing() {
        let store = store();
        store.write_raw("{\"messages\": [oops");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn clear_removes_entry() {
        let store = store();
        store.save(&PersistedChat {
            messages: Vec::new(),
            session_id: "s".into(),
        });
        store.clear();
        assert_eq!(store.raw(), None);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn detached_store_is_inert() {
        let store = TranscriptStore::detached();
        store.save(&PersistedChat {
            messages: Vec::new(),
            session_id: "s".into(),
        });
        assert_eq!(store.load(), None);
    }
}
