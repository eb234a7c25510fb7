//! Platform-agnostic button debouncing, report encoding, and scheduling.
//!
//! This crate provides the core pipeline for arcade-style control panels
//! without any platform-specific dependencies. It can be used both in
//! embedded `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! The crate is organized into several modules:
//!
//! - [`button`]: Per-input state and role bindings ([`LogicalButton`], [`Role`])
//! - [`debounce`]: The bounce filter ([`debounce::update`], [`DebounceThresholds`])
//! - [`profile`]: Report configuration ([`DeviceProfile`], [`ReportGeometry`])
//! - [`report`]: Report buffers and encoding ([`Report`], [`report::encode`])
//! - [`scheduler`]: Change/idle-rate driven report delivery ([`ReportScheduler`])
//! - [`input`]: Raw sampling trait ([`InputSource`])
//! - [`transport`]: Report handoff trait ([`Transport`])
//!
//! # Pipeline
//!
//! Once per scheduling tick, [`ReportScheduler::tick`] samples every
//! configured button through an [`InputSource`], debounces the raw readings,
//! and hands freshly encoded reports to a [`Transport`] for any device whose
//! state changed or whose idle-rate refresh came due.
//!
//! # Example
//!
//! ```rust
//! use panel_core::{
//!     DebounceThresholds, DeviceProfile, LogicalButton, ReportGeometry, Role, SourceId,
//! };
//!
//! // An 8-button bit-packed gamepad: one report byte, one bit per button.
//! let thresholds = DebounceThresholds::symmetric(5);
//! let profile = DeviceProfile::new(
//!     ReportGeometry::BitVector { bits: 8 },
//!     None,
//!     (0..8).map(|i| LogicalButton::new(SourceId(i), Role::GamepadBit(i as u8), thresholds)),
//! )
//! .unwrap();
//! assert_eq!(profile.report_len(), 1);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod button;
pub mod debounce;
pub mod input;
pub mod profile;
pub mod report;
pub mod scheduler;
pub mod transport;

// Re-export main types at crate root
pub use button::{Axis, LogicalButton, Role};
pub use debounce::DebounceThresholds;
pub use input::{InputSource, SourceId};
pub use profile::{ConfigError, DeviceProfile, ReportGeometry, MAX_BUTTONS, MAX_REPORT_LEN};
pub use report::{encode, Report};
pub use scheduler::{ReportScheduler, MAX_DEVICES};
pub use transport::{Transport, TransportError};
