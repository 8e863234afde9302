//! Store adapters implementing [`webcache::KeyValueStore`].

mod moka_store;
mod redis_store;

pub use moka_store::MokaStore;
pub use redis_store::RedisStore;
