//! Infrastructure layer: OS-facing adapters.
//!
//! Contains the BlueZ and mock Bluetooth stacks, configuration and service
//! record loading, the root check, and the stdin reader.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `btkbd_core`, but MUST NOT be imported by the `application` layer outside
//! of tests.

pub mod bluetooth;
pub mod config;
pub mod input;
pub mod privilege;
pub mod service_record;
