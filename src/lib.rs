//! `tg3spm` drives the single phase modules found on the Tesla GEN3 Battery
//! Charger Board (BCB), retrofitted here as a standalone EV supply. The crate
//! is completely hardware agnostic: it decodes the modules'
//! reverse-engineered CAN telemetry, encodes the periodic command frames,
//! sequences the power and charge-enable outputs, and recovers from
//! communication or module faults. A wrapping layer maps the logical IO to
//! real pins and a real bus, shuttles frames in and out, and calls `step`
//! once per loop with the elapsed milliseconds.
#![no_std]
//==================================================================================
/// Phase module state machine: configuration validation, power sequencing,
/// fault detection and automatic recovery.
pub mod controller;
/// Shared data types: operator configuration, decoded telemetry, and the
/// protocol timing constants.
pub mod core;
/// Fixed-width text report of a controller's externally visible state.
pub mod diag;
/// Error definitions for the log replay tokenizer.
pub mod error;
/// Wire-facing layer: raw frame representation, the GEN3 module codec, and
/// the bounded IO buffers.
pub mod protocol;
/// Offline replay of CANARY-format CAN log captures.
pub mod replay;
/// Elapsed-time bookkeeping for callers driving the controller from a raw
/// platform clock.
pub mod time;
//==================================================================================
