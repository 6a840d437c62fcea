// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Project - manifest plus archive of one project directory

use crate::archive::Archive;
use crate::io::{read_text, write_atomic};
use imdf_model::{ImdfError, MapRegion, MappingSession, ProjectManifest, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name inside a project directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// An open project
///
/// Owns the archive; there is no process-wide "current project", callers
/// pass the handle to whatever needs it.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    manifest: ProjectManifest,
    archive: Archive,
    manifest_dirty: bool,
}

fn read_manifest(root: &Path) -> Result<ProjectManifest> {
    let path = root.join(MANIFEST_FILE);
    if !path.exists() {
        return Err(ImdfError::manifest(format!(
            "no {} in {}",
            MANIFEST_FILE,
            root.display()
        )));
    }
    ProjectManifest::from_json(&read_text(&path)?)
}

impl Project {
    /// Create a new project directory with an empty dataset
    pub fn create(root: impl Into<PathBuf>, title: impl Into<String>) -> Result<Self> {
        let root = root.into();
        if root.join(MANIFEST_FILE).exists() {
            return Err(ImdfError::manifest(format!(
                "a project already exists in {}",
                root.display()
            )));
        }
        fs::create_dir_all(&root).map_err(|e| ImdfError::io(&root, e))?;

        let mut project = Self {
            archive: Archive::new(&root),
            manifest: ProjectManifest::new(title),
            root,
            manifest_dirty: true,
        };
        project.write_manifest()?;
        project.archive.save(None)?;
        log::info!(
            "Created project '{}' in {}",
            project.manifest.title,
            project.root.display()
        );
        Ok(project)
    }

    /// Open an existing project: manifest first, then every feature file
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let manifest = read_manifest(&root)?;
        let archive = Archive::load(&root)?;
        log::info!("Opened project '{}'", manifest.title);
        Ok(Self {
            root,
            manifest,
            archive,
            manifest_dirty: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    /// Mutable manifest; it is rewritten on the next [`save`](Self::save)
    pub fn manifest_mut(&mut self) -> &mut ProjectManifest {
        self.manifest_dirty = true;
        &mut self.manifest
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub fn archive_mut(&mut self) -> &mut Archive {
        &mut self.archive
    }

    /// Whether anything needs saving
    pub fn is_dirty(&self) -> bool {
        self.manifest_dirty || self.archive.is_dirty()
    }

    /// Bump `updated_at`
    pub fn touch(&mut self) {
        self.manifest.touch();
        self.manifest_dirty = true;
    }

    /// Remember the visible map viewport
    pub fn set_session(&mut self, region: MapRegion) {
        self.manifest.session = Some(MappingSession::from(region));
        self.manifest_dirty = true;
    }

    /// Viewport saved by the last session, if any
    pub fn session_region(&self) -> Option<MapRegion> {
        self.manifest.session.as_ref().map(MappingSession::region)
    }

    /// Write changed feature files and the manifest
    pub fn save(&mut self) -> Result<()> {
        if self.archive.is_dirty() {
            self.archive.save_dirty()?;
            self.manifest.touch();
            self.manifest_dirty = true;
        }
        if self.manifest_dirty {
            self.write_manifest()?;
        }
        Ok(())
    }

    fn write_manifest(&mut self) -> Result<()> {
        let text = self.manifest.to_json()?;
        write_atomic(&self.root.join(MANIFEST_FILE), text.as_bytes())?;
        self.manifest_dirty = false;
        Ok(())
    }

    /// Remove the project directory and everything in it
    pub fn delete(self) -> Result<()> {
        remove_project(&self.root, &self.manifest)
    }

    /// Remove the project directory at `root` without loading its dataset
    ///
    /// Only the manifest is read, so projects whose feature files no longer
    /// decode can still be deleted. Directories without a manifest are left
    /// alone.
    pub fn delete_at(root: impl AsRef<Path>) -> Result<()> {
        let root = root.as_ref();
        let manifest = read_manifest(root)?;
        remove_project(root, &manifest)
    }
}

fn remove_project(root: &Path, manifest: &ProjectManifest) -> Result<()> {
    fs::remove_dir_all(root).map_err(|e| ImdfError::io(root, e))?;
    log::info!("Deleted project '{}'", manifest.title);
    Ok(())
}

/// A project found by [`list_projects`]
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectEntry {
    pub root: PathBuf,
    pub manifest: ProjectManifest,
}

/// Every subdirectory of `workspace` with a readable manifest, most
/// recently updated first
pub fn list_projects(workspace: impl AsRef<Path>) -> Result<Vec<ProjectEntry>> {
    let workspace = workspace.as_ref();
    let entries = fs::read_dir(workspace).map_err(|e| ImdfError::io(workspace, e))?;

    let mut projects = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ImdfError::io(workspace, e))?;
        let root = entry.path();
        if !root.is_dir() {
            continue;
        }
        match read_manifest(&root) {
            Ok(manifest) => projects.push(ProjectEntry { root, manifest }),
            Err(e) => log::warn!("Skipping {}: {}", root.display(), e),
        }
    }

    projects.sort_by(|a, b| b.manifest.updated_at.cmp(&a.manifest.updated_at));
    Ok(projects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdf_model::Point;

    #[test]
    fn test_create_writes_manifest_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("mall");
        let project = Project::create(&root, "Mall").unwrap();

        assert!(root.join(MANIFEST_FILE).exists());
        assert!(root.join("unit.geojson").exists());
        assert!(!project.is_dirty());
        assert_eq!(project.manifest().imdf_version, "1.0.0");
    }

    #[test]
    fn test_create_refuses_existing_project() {
        let dir = tempfile::tempdir().unwrap();
        Project::create(dir.path(), "First").unwrap();
        assert!(matches!(
            Project::create(dir.path(), "Second"),
            Err(ImdfError::Manifest(_))
        ));
    }

    #[test]
    fn test_open_without_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Project::open(dir.path()),
            Err(ImdfError::Manifest(_))
        ));
    }

    #[test]
    fn test_session_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = Project::create(dir.path(), "Station").unwrap();
        let region = MapRegion::new(Point::new(51.53, -0.12), 0.004, 0.006);
        project.set_session(region);
        assert!(project.is_dirty());
        project.save().unwrap();

        let reopened = Project::open(dir.path()).unwrap();
        assert_eq!(reopened.session_region(), Some(region));
    }

    #[test]
    fn test_delete_removes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("gone");
        let project = Project::create(&root, "Gone").unwrap();
        project.delete().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_delete_at_ignores_broken_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("broken");
        Project::create(&root, "Broken").unwrap();
        fs::write(root.join("unit.geojson"), "{not json").unwrap();
        assert!(matches!(
            Project::open(&root),
            Err(ImdfError::ArchiveLoad { .. })
        ));

        Project::delete_at(&root).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_delete_at_requires_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("plain");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("notes.txt"), "keep me").unwrap();

        assert!(matches!(
            Project::delete_at(&root),
            Err(ImdfError::Manifest(_))
        ));
        assert!(root.join("notes.txt").exists());
    }
}
