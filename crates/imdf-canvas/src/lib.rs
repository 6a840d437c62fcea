// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IMDF Canvas
//!
//! The interactive side of IMDF authoring: drawing new shapes with taps,
//! selecting and dragging features, measuring distances, and deciding how
//! every overlay is styled.
//!
//! ## Architecture
//!
//! - [`ShapeAssembler`] - state machine turning taps into valid geometry
//! - [`CanvasController`] - owns the open [`Project`](imdf_archive::Project),
//!   the active tool and the selection; reacts to map events
//! - [`MapWidget`] - trait implemented by the host map view
//! - [`style_for`] - pure render-state policy
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use imdf_canvas::{CanvasConfig, CanvasController, ScreenPoint, Tool};
//! use imdf_model::{UnitCategory, UnitProperties};
//!
//! let mut canvas = CanvasController::new(project, map_view, CanvasConfig::default());
//! canvas.switch_tool(Tool::PolygonDrawer);
//! for tap in taps {
//!     canvas.on_tap(tap)?;
//! }
//! canvas.close_shape()?;
//! let id = canvas.commit_shape(UnitProperties::new(UnitCategory::Office))?;
//! canvas.save()?;
//! ```

pub mod assembler;
pub mod config;
pub mod controller;
pub mod error;
pub mod picking;
pub mod style;
pub mod widget;

pub use assembler::{AssemblerState, ShapeAssembler};
pub use config::{CanvasConfig, StyleColors, StylePalette};
pub use controller::{CanvasController, TapOutcome, Tool, ToolSwitch};
pub use error::{CanvasError, Result};
pub use picking::{candidates, hit_test, tolerance_in_metres, Hit, SelectionState};
pub use style::{style_for, StyleDescriptor, StyleTarget};
pub use widget::{MapWidget, OverlayId, ScreenPoint};
