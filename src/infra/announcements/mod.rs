pub mod in_memory_channels;

pub use in_memory_channels::InMemoryChannelStore;
