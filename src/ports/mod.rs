//! Ports (trait boundaries) for participants, observers and storage.
//!
//! The learning core owns these traits; adapters and pipeline components
//! implement them.

pub mod agent;
pub mod observer;
pub mod repository;

pub use agent::Agent;
pub use observer::Observer;
pub use repository::KnowledgeRepository;
