//! Integration tests for the settings persistence system

mod corruption_recovery;
mod crash_safety;
