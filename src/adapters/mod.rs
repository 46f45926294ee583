// Adapters layer: concrete implementations for external systems (storage, http, tabular files)

pub mod http;
pub mod storage;
pub mod tabular;
