//! Background Tasks Module
//!
//! Contains the background scheduler each cache runs its timers on.
//!
//! # Tasks
//! - TTL Expiry: one delayed task per cache entry
//! - Statistics Report: fixed-rate task per cache

mod scheduler;

pub use scheduler::CacheScheduler;
