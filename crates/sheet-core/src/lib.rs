#![forbid(unsafe_code)]

//! Core: positioning engine for a vertically draggable bottom sheet.
//!
//! # Role
//! `sheet-core` decides where a sheet sits inside its container. It owns
//! the offset, the declared detent positions, the spring settle animation,
//! and the arbitration between direct drags, linked scroll content, and
//! programmatic requests. It draws nothing and owns no timer: the host
//! feeds it geometry, gesture samples, and frame ticks, and renders the
//! offset it reports.
//!
//! # Primary responsibilities
//! - **SheetEngine**: the single writer of the offset and the only place
//!   animations are started, cancelled, or retargeted.
//! - **Position / Detents**: declarative stops resolved against geometry.
//! - **Selector**: picks a resting anchor from a release offset and velocity.
//! - **Rubber band**: resistance past the first and last anchor.
//! - **ScrollLink**: hands scroll motion to the sheet until it is expanded.
//! - **SheetSubscriber**: ordered, re-entrant notifications.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use sheet_core::{Geometry, InterruptTrigger, Position, SheetConfig, SheetEngine};
//!
//! let mut sheet = SheetEngine::new(SheetConfig::default())
//!     .with_positions(vec![Position::top(), Position::middle(), Position::hidden()])
//!     .with_initial_position(Position::middle());
//! sheet.layout(Geometry::from_height(800.0));
//! assert_eq!(sheet.offset(), 400.0);
//!
//! sheet.move_to(Position::top(), true, InterruptTrigger::all(), None);
//! while sheet.tick(Duration::from_millis(16)) {}
//! assert_eq!(sheet.offset(), 0.0);
//! ```

pub mod animation;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod interrupt;
pub mod logging;
pub mod metrics;
pub mod position;
pub mod rubber;
pub mod scroll_link;
pub mod selector;
pub mod subscriber;

pub use animation::spring::{SpringParameters, SpringRegime};
pub use animation::{AnimationHandle, AnimationId, FrameClock};
pub use config::{AnimationParameters, BottomBarConfig, SheetConfig};
pub use engine::{Completion, SheetEngine};
pub use error::{ConfigError, Result};
pub use geometry::{Geometry, Insets};
pub use gesture::{DragEvent, DragPhase, DragSource, SourceId};
pub use interrupt::InterruptTrigger;
pub use metrics::SheetMetrics;
pub use position::{Detents, Edge, Position};
pub use scroll_link::ScrollContent;
pub use subscriber::{ChangeSource, SheetSubscriber, SubscriberId};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
