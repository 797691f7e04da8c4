//! Memory Infrastructure - 内存实现

mod cancellation_registry;

pub use cancellation_registry::InMemoryCancellationRegistry;
