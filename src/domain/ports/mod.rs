mod object_storage_port;
mod settings_store_port;

pub use object_storage_port::ObjectStoragePort;
pub use settings_store_port::SettingsStorePort;
