//! Device drivers for the pedon field node firmware.
//!
//! This crate provides the drivers for everything attached to the
//! node's controller:
//!
//! - SDI-12 sensor bus measurement sessions ([`sdi12`])
//! - Satellite modem link: commands, telemetry, time sync ([`tile`])
//! - Battery voltage monitoring through an ADC divider ([`battery`])
//! - Switched sensor bus power rail ([`power`])
//!
//! The protocol drivers are generic over the capability traits in
//! pedon-core, so every state machine here also runs on the host
//! against in-memory fakes.

#![no_std]
#![deny(unsafe_code)]

pub mod battery;
pub mod power;
pub mod sdi12;
pub mod tile;
