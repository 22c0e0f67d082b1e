//! Testing utilities for capture-bridge
//!
//! Provides a recording mock of the native capture session so controller
//! behavior can be checked without camera hardware or a video engine.

pub mod mock_session;

pub use mock_session::{MockSession, MockSessionFactory};
