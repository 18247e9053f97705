use pettycash_repo::mem_repo::MemReceiptStore;
use pettycash_repo::receipt_store::{FsReceiptStore, ReceiptStore, ReceiptStoreError};
use rstest::rstest;
use std::sync::Arc;
use tempfile::TempDir;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

pub enum StoreType {
    Fs,
    Mem,
}

fn build_store(store_type: StoreType) -> (Arc<dyn ReceiptStore>, Option<TempDir>) {
    match store_type {
        StoreType::Fs => {
            let dir = TempDir::new().unwrap();
            let store = FsReceiptStore::new(dir.path().to_path_buf());
            (Arc::new(store), Some(dir))
        }
        StoreType::Mem => (Arc::new(MemReceiptStore::new()), None),
    }
}

#[rstest]
#[case::fs(StoreType::Fs)]
#[case::mem(StoreType::Mem)]
#[actix_rt::test]
async fn test_store_and_load(#[case] store_type: StoreType) {
    let (store, _dir) = build_store(store_type);

    let path = store.store(PNG_BYTES, "png").await.unwrap();
    assert!(path.starts_with("receipts/"));
    assert!(path.ends_with(".png"));

    assert_eq!(store.load(&path).await.unwrap(), PNG_BYTES);
}

#[rstest]
#[case::fs(StoreType::Fs)]
#[case::mem(StoreType::Mem)]
#[actix_rt::test]
async fn test_paths_are_unique(#[case] store_type: StoreType) {
    let (store, _dir) = build_store(store_type);

    let first = store.store(PNG_BYTES, "png").await.unwrap();
    let second = store.store(PNG_BYTES, "png").await.unwrap();
    assert_ne!(first, second);
}

#[rstest]
#[case::fs(StoreType::Fs)]
#[case::mem(StoreType::Mem)]
#[actix_rt::test]
async fn test_delete(#[case] store_type: StoreType) {
    let (store, _dir) = build_store(store_type);

    let path = store.store(PNG_BYTES, "png").await.unwrap();
    assert!(store.delete(&path).await.unwrap());
    assert!(!store.delete(&path).await.unwrap());
    assert!(matches!(
        store.load(&path).await,
        Err(ReceiptStoreError::ReceiptNotFound(_))
    ));
}

#[rstest]
#[case("../secrets.txt")]
#[case("/etc/passwd")]
#[case("receipts/../../outside.png")]
#[case("")]
#[actix_rt::test]
async fn test_fs_rejects_escaping_paths(#[case] path: &str) {
    let (store, _dir) = build_store(StoreType::Fs);

    assert!(matches!(
        store.load(path).await,
        Err(ReceiptStoreError::InvalidPath(_))
    ));
    assert!(matches!(
        store.delete(path).await,
        Err(ReceiptStoreError::InvalidPath(_))
    ));
}

#[rstest]
#[case::fs(StoreType::Fs)]
#[case::mem(StoreType::Mem)]
#[actix_rt::test]
async fn test_concurrent_stores(#[case] store_type: StoreType) {
    let (store, _dir) = build_store(store_type);

    let uploads = (0..8u8).map(|i| {
        let store = store.clone();
        actix_rt::spawn(async move {
            let image = [PNG_BYTES, &[i][..]].concat();
            let path = store.store(&image, "png").await.unwrap();
            (path, image)
        })
    });
    let mut stored = Vec::new();
    for upload in uploads.collect::<Vec<_>>() {
        stored.push(upload.await.unwrap());
    }

    for (path, image) in stored {
        assert_eq!(store.load(&path).await.unwrap(), image);
    }
}
