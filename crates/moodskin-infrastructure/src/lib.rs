pub mod config_service;
pub mod directory_camera;
pub mod file_record_store;
pub mod kv_cache;
pub mod local_identity;
pub mod paths;
pub mod session_cache;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::directory_camera::DirectoryCamera;
pub use crate::file_record_store::FileUserRecordStore;
pub use crate::kv_cache::{FileKeyValueCache, MemoryKeyValueCache};
pub use crate::local_identity::LocalIdentityProvider;
pub use crate::paths::MoodskinPaths;
pub use crate::storage::SecretStorage;
