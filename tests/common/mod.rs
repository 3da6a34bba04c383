//! Integration test common infrastructure.
//!
//! Provides a fake upstream, a daemon launcher and a command client.

pub mod client;
pub mod mock;
pub mod server;

#[allow(unused_imports)]
pub use client::CommandClient;
#[allow(unused_imports)]
pub use mock::MockUpstream;
#[allow(unused_imports)]
pub use server::TestServer;
