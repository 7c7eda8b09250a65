pub mod cache;
pub mod provider;

pub use cache::KeySetCache;
pub use provider::{KeyFetchError, KeyProvider, RemoteKeyProvider, StaticKeyProvider};
