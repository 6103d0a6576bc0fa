// Application layer - Use cases and the ports they depend on
pub mod clock;
pub mod data_store;
pub mod error;
pub mod sample_repository;
pub mod simplify;
