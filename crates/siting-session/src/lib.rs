//! # siting-session
//!
//! Session state for the siting engine, shared by the CLI and any interactive
//! front-end.
//!
//! ## Architecture
//!
//! ```text
//! front-end ──► Session ──► AnalysisContext::recompute ──► siting-algo
//!                  │
//!                  └──► Debouncer (parameter changes)
//! ```
//!
//! ## Core Components
//!
//! - [`AnalysisContext`]: immutable inputs to a recompute (params, reference,
//!   metric, legend lock)
//! - [`AnalysisSnapshot`]: results, legend and events of one recompute
//! - [`Session`]: owns the dataset and drives recomputes
//! - [`Debouncer`]: schedule/cancel contract for bursty parameter changes
//! - [`SitingConfig`]: TOML configuration
//!
//! ## Usage
//!
//! ```
//! use siting_core::{Diagnostics, LcoeParams, LocationId, SimulationRow};
//! use siting_session::{Session, SitingConfig};
//!
//! let rows = vec![
//!     SimulationRow::new(LocationId::new(1), 30.0, -110.0, 5.0, 8.0, 0.92),
//!     SimulationRow::new(LocationId::new(2), 32.0, -111.0, 5.0, 8.0, 0.95),
//! ];
//! let mut diagnostics = Diagnostics::new();
//! let mut session = Session::new(rows, SitingConfig::default(), &mut diagnostics);
//!
//! session.select_reference(LocationId::new(1)).unwrap();
//! session.set_params(0, LcoeParams { solar_capex_per_kw: 500.0, ..LcoeParams::default() }).unwrap();
//! assert!(session.tick(100).unwrap().is_none());
//! assert!(session.tick(150).unwrap().is_some());
//! ```

pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod events;
pub mod session;

// Re-exports for convenience
pub use config::{RecomputeConfig, SitingConfig, ViewportConfig};
pub use context::{AnalysisContext, AnalysisSnapshot};
pub use debounce::{Clock, Debouncer, SystemClock, Token};
pub use error::{Error, Result};
pub use events::{ComparisonMode, RecomputeTrigger, SessionEvent};
pub use session::{Session, Tessellation};
