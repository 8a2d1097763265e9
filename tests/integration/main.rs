//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a subsystem against
//! mock ports. All tests run on the host with no real hardware and no
//! network sockets; the in-memory channel pair stands in for TLS.

mod estimator_tests;
mod mock_device;
mod session_tests;
mod traffic_tests;
