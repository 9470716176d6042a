//! Real-time feedback-delay-network reverb core.
//!
//! This crate implements the signal-processing chain a vocal-effects host
//! embeds: cross-feed stereo widening, a pre-delay, early-reflection and
//! diffusion all-pass chains, and an 8-line orthogonal Householder FDN with
//! frequency-dependent damping, calibrated to a target RT60. The public
//! surface is [`engine::ReverbEngine`]; everything else is exposed so a
//! host can build a custom topology or drive the individual DSP primitives
//! directly (tests, benches, offline RT60 measurement).
//!
//! Builds `no_std` by default features off; enable the `std` feature
//! (the crate default) for an allocator-backed, `std::error::Error`-capable
//! build. Enable `tracing` to get structured diagnostic events from the
//! control plane: engine initialization, Householder matrix (re)generation,
//! buffer flushes, and sample-rate changes. These only fire on infrequent
//! structural changes (never once per sample), so they're safe to enable on
//! a real-time audio thread.
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

pub mod allpass;
pub mod biquad;
pub mod crossfeed;
pub mod damping;
pub mod delay;
pub mod engine;
pub mod error;
pub mod fdn;
pub mod math;
pub mod matrix;
pub mod params;
pub mod rt60;
pub mod smoothing;

pub use crossfeed::CrossFeedProcessor;
pub use engine::{ChannelMode, ReverbEngine};
pub use error::EngineError;
pub use fdn::FdnCore;
pub use params::{EngineParameters, Preset, PresetValues};
