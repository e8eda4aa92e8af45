pub mod credential_hasher;
pub mod repository;
pub mod store;
