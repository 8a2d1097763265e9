//! Remote I/O library.
//!
//! Exposes the protocol, transport, device and controller modules for
//! integration testing and for the auxiliary binaries. All Raspberry
//! Pi hardware code is guarded by the `rpi` feature within each
//! module; everything else builds and tests on the host.

#![deny(unused_must_use)]

pub mod attitude;
pub mod audio;
pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod protocol;
pub mod scheduler;
pub mod server;
pub mod trafficlight;
pub mod transport;
