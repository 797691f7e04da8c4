//! Persistence Infrastructure - 持久化实现

pub mod sqlite;
