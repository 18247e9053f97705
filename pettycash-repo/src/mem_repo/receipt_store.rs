use crate::receipt_store::{new_receipt_path, ReceiptStore, ReceiptStoreError};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct MemReceiptStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemReceiptStore {
    pub fn new() -> MemReceiptStore {
        MemReceiptStore {
            files: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.files.read().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemReceiptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReceiptStore for MemReceiptStore {
    async fn store(&self, image: &[u8], extension: &str) -> Result<String, ReceiptStoreError> {
        let path = new_receipt_path(extension);
        self.files
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))?
            .insert(path.clone(), image.to_vec());
        Ok(path)
    }

    async fn load(&self, path: &str) -> Result<Vec<u8>, ReceiptStoreError> {
        self.files
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))?
            .get(path)
            .cloned()
            .ok_or_else(|| ReceiptStoreError::ReceiptNotFound(path.to_owned()))
    }

    async fn delete(&self, path: &str) -> Result<bool, ReceiptStoreError> {
        let removed = self
            .files
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))?
            .remove(path)
            .is_some();
        Ok(removed)
    }
}
