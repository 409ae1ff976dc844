//! Infrastructure layer: persistence collaborators and startup provisioning.

pub mod bootstrap;
pub mod store;

pub use bootstrap::{SeedAccount, seed_identities};
pub use store::{
    IdentityStore, InMemoryIdentityStore, InMemoryRevenueStore, RevenueStore, StoreError,
};
