use crate::error::StoreError;
use crate::store::KeyValueStore;
use web_sys::{Storage, Window};

/// `window.localStorage`. Opening fails in some private modes; every access
/// may still throw later (quota, revoked permission).
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    pub fn open(window: &Window) -> Result<Self, StoreError> {
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            _ => Err(StoreError::Unavailable),
        }
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(|err| StoreError::Access {
            key: key.to_string(),
            message: format!("{:?}", err),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(|err| StoreError::Access {
            key: key.to_string(),
            message: format!("{:?}", err),
        })
    }
}
