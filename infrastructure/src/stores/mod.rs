//! Session store backends

mod in_memory;

pub use in_memory::InMemorySessionStore;
