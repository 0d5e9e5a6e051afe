//! Long-term memory backends

mod in_memory;

pub use in_memory::InMemoryMemoryGateway;
