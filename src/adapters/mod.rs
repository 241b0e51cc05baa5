// Adapters layer: concrete implementations of the domain ports (provider, storage, randomness).

pub mod memory;
pub mod provider;
pub mod random;
