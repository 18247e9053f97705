use actix_web::web;
use anyhow::Context;
use async_trait::async_trait;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

/// Directory, relative to the store root, that receipt paths are allocated under.
pub const RECEIPTS_DIR: &str = "receipts";

#[async_trait]
pub trait ReceiptStore: Sync + Send {
    /// Stores the image and returns the relative path it can be loaded from.
    async fn store(&self, image: &[u8], extension: &str) -> Result<String, ReceiptStoreError>;
    async fn load(&self, path: &str) -> Result<Vec<u8>, ReceiptStoreError>;
    /// Removes the receipt. Returns `false` if nothing was stored at `path`.
    async fn delete(&self, path: &str) -> Result<bool, ReceiptStoreError>;
}

#[derive(Error, Debug)]
pub enum ReceiptStoreError {
    #[error("Receipt {0} not found")]
    ReceiptNotFound(String),
    #[error("Invalid receipt path {0}")]
    InvalidPath(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub(crate) fn new_receipt_path(extension: &str) -> String {
    format!("{}/{}.{}", RECEIPTS_DIR, Uuid::new_v4(), extension)
}

/// Stores receipts as files below a root directory.
pub struct FsReceiptStore {
    root: PathBuf,
}

impl FsReceiptStore {
    pub fn new(root: PathBuf) -> FsReceiptStore {
        FsReceiptStore { root }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ReceiptStoreError> {
        let relative = Path::new(path);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !is_plain {
            return Err(ReceiptStoreError::InvalidPath(path.to_owned()));
        }
        Ok(self.root.join(relative))
    }
}

async fn run_blocking<F, R>(f: F) -> Result<R, ReceiptStoreError>
where
    F: FnOnce() -> Result<R, ReceiptStoreError> + Send + 'static,
    R: Send + 'static,
{
    web::block(f).await.context("Blocking error")?
}

#[async_trait]
impl ReceiptStore for FsReceiptStore {
    #[instrument(skip(self, image))]
    async fn store(&self, image: &[u8], extension: &str) -> Result<String, ReceiptStoreError> {
        let path = new_receipt_path(extension);
        let file_path = self.resolve(&path)?;
        let image = image.to_vec();
        let size = image.len();
        run_blocking(move || {
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Unable to create directory {}", parent.display()))?;
            }
            fs::write(&file_path, image)
                .with_context(|| format!("Unable to write receipt {}", file_path.display()))?;
            Ok(())
        })
        .await?;
        info!(%path, size, "Stored receipt");
        Ok(path)
    }

    #[instrument(skip(self))]
    async fn load(&self, path: &str) -> Result<Vec<u8>, ReceiptStoreError> {
        let file_path = self.resolve(path)?;
        let path = path.to_owned();
        run_blocking(move || match fs::read(&file_path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ReceiptStoreError::ReceiptNotFound(path))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Unable to read receipt {}", file_path.display()))
                .into()),
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> Result<bool, ReceiptStoreError> {
        let file_path = self.resolve(path)?;
        let deleted = run_blocking(move || match fs::remove_file(&file_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Unable to delete receipt {}", file_path.display()))
                .into()),
        })
        .await?;
        if deleted {
            info!(%path, "Deleted receipt");
        }
        Ok(deleted)
    }
}
