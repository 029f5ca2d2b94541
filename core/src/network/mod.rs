//! # Network Module
//!
//! The set of EVM chains the wallet supports, each tagged with the fee
//! model that decides how we price and buffer gas on it. Pure data plus a
//! single mutable "active network" selector.

pub mod registry;

pub use registry::{builtin_networks, FeeModel, Network, NetworkRegistry, RegistryError};
