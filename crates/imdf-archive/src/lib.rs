// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IMDF Archive
//!
//! Storage for IMDF datasets. A dataset directory holds one
//! `<category>.geojson` FeatureCollection per feature category; a project
//! directory adds a `manifest.json`.
//!
//! - [`Archive`] - all features of a dataset, ids unique across categories
//! - [`Project`] - manifest plus archive, opened and saved together
//! - [`list_projects`] - project directories in a workspace, newest first
//!
//! ```rust,no_run
//! use imdf_archive::Project;
//!
//! let mut project = Project::open("projects/terminal-2")?;
//! println!("{} features", project.archive().len());
//! project.touch();
//! project.save()?;
//! # Ok::<(), imdf_model::ImdfError>(())
//! ```

pub mod archive;
mod io;
pub mod project;

pub use archive::Archive;
pub use project::{list_projects, Project, ProjectEntry, MANIFEST_FILE};
