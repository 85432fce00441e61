//! Cart slot storage backed by the visitor session.
//!
//! `SlotStorage` is synchronous while tower-sessions is async, so the slot is
//! read once when a request starts, mutated in memory by the cart store, and
//! written back with [`SessionSlot::flush`] before the response is built.

use serde_json::Value;
use strivo_core::{SlotStorage, StorageError};
use tower_sessions::Session;

/// One session key, buffered for the duration of a request.
#[derive(Debug)]
pub struct SessionSlot {
    session: Session,
    key: String,
    value: Option<String>,
    dirty: bool,
}

impl SessionSlot {
    /// Read `key` from the session.
    ///
    /// A value that is not a JSON string is handed to the cart as its JSON
    /// text, so the cart decoder decides whether it is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(session: Session, key: &str) -> Result<Self, tower_sessions::session::Error> {
        let value = session.get_value(key).await?.map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        });

        Ok(Self {
            session,
            key: key.to_string(),
            value,
            dirty: false,
        })
    }

    /// Write the buffered value back to the session if it changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn flush(self) -> Result<(), tower_sessions::session::Error> {
        if !self.dirty {
            return Ok(());
        }
        match self.value {
            Some(value) => self.session.insert(&self.key, value).await,
            None => self.session.remove_value(&self.key).await.map(|_| ()),
        }
    }

    fn check_key(&self, key: &str) -> Result<(), StorageError> {
        if key == self.key {
            Ok(())
        } else {
            Err(StorageError::Backend(format!(
                "session slot holds '{}', not '{key}'",
                self.key
            )))
        }
    }
}

impl SlotStorage for SessionSlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_key(key)?;
        Ok(self.value.clone())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_key(key)?;
        self.value = Some(value.to_string());
        self.dirty = true;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_key(key)?;
        self.value = None;
        self.dirty = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_write_is_buffered_until_flush() {
        let session = session();
        let mut slot = SessionSlot::load(session.clone(), "cart").await.unwrap();
        assert_eq!(slot.read("cart").unwrap(), None);

        slot.write("cart", "{\"version\":1}").unwrap();
        assert_eq!(session.get::<String>("cart").await.unwrap(), None);

        slot.flush().await.unwrap();
        assert_eq!(
            session.get::<String>("cart").await.unwrap().as_deref(),
            Some("{\"version\":1}")
        );
    }

    #[tokio::test]
    async fn test_non_string_value_is_passed_as_json() {
        let session = session();
        session
            .insert("cart", serde_json::json!([{"quantity": 1}]))
            .await
            .unwrap();

        let slot = SessionSlot::load(session, "cart").await.unwrap();
        assert_eq!(
            slot.read("cart").unwrap().as_deref(),
            Some("[{\"quantity\":1}]")
        );
    }

    #[tokio::test]
    async fn test_remove_and_other_keys() {
        let session = session();
        session.insert("cart", "[]").await.unwrap();

        let mut slot = SessionSlot::load(session.clone(), "cart").await.unwrap();
        assert!(matches!(
            slot.read("wishlist"),
            Err(StorageError::Backend(_))
        ));

        slot.remove("cart").unwrap();
        slot.flush().await.unwrap();
        assert_eq!(session.get::<String>("cart").await.unwrap(), None);
    }
}
