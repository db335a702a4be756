pub mod bunny;
pub mod dood;
pub mod lulu;
pub mod mixdrop;
pub mod streamwish;
pub mod vidmoly;

pub mod manager;
pub mod plugin;
pub mod scan;
pub mod unpacker;

pub use manager::{AdapterRegistry, DIRECT_HOST_FRAGMENTS};
pub use plugin::ProviderAdapter;
