//! AUTOSAR Port driver for the TM4C123GH6PM.
//!
//! [`Port`] owns a register backend and a DET sink. On target the backend is
//! [`Mmio`]; the `sim` feature adds a simulated register file and a DET that
//! records reports, for exercising the driver on a host.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod sdk;

pub use sdk::det::{Det, DetReport, LogDet};
pub use sdk::drivers::port::Port;
pub use sdk::mcu::clock::PollPolicy;
pub use sdk::mcu::register::{Mmio, RegisterAccess};

#[cfg(any(test, feature = "sim"))]
pub use sdk::det::RecordingDet;
#[cfg(any(test, feature = "sim"))]
pub use sdk::mcu::sim::SimRegisters;
