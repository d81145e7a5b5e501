//! Concurrency primitives: the per-idea serializer and the task spawner

mod serializer;
mod spawner;

pub use serializer::{Serializer, SerializerError, Ticket};
pub use spawner::{ManualSpawner, TaskSpawner, TokioSpawner};
