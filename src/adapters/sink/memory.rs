//! In-memory object sink

use super::key::ObjectKey;
use super::ObjectSink;
use crate::domain::{KeyFedError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Keeps objects in a map; counts every write, overwrites included
#[derive(Debug, Default)]
pub struct InMemorySink {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<ObjectKey, Vec<u8>>,
    puts: usize,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .ok()?
            .objects
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v.clone())
    }

    /// Stored keys in lexical order
    pub fn keys(&self) -> Vec<String> {
        self.lock()
            .map(|i| i.objects.keys().map(|k| k.as_str().to_string()).collect())
            .unwrap_or_default()
    }

    /// Number of `put_object` calls that succeeded
    pub fn put_count(&self) -> usize {
        self.lock().map(|i| i.puts).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| KeyFedError::Sink("In-memory sink is poisoned".to_string()))
    }
}

#[async_trait]
impl ObjectSink for InMemorySink {
    async fn put_object(&self, key: &ObjectKey, body: Vec<u8>) -> Result<()> {
        let mut inner = self.lock()?;
        inner.objects.insert(key.clone(), body);
        inner.puts += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BatchTag;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_overwrite_keeps_one_object() {
        let sink = InMemorySink::new();
        let key = ObjectKey::for_batch(
            "p",
            NaiveDate::from_ymd_opt(2021, 3, 4).unwrap(),
            &BatchTag::new("t").unwrap(),
        );

        sink.put_object(&key, b"a".to_vec()).await.unwrap();
        sink.put_object(&key, b"b".to_vec()).await.unwrap();

        assert_eq!(sink.keys(), ["p/2021-03-04/t"]);
        assert_eq!(sink.get("p/2021-03-04/t").unwrap(), b"b");
        assert_eq!(sink.put_count(), 2);
    }
}
