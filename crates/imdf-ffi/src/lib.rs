// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IMDF FFI - UniFFI bindings for the Swift host application
//!
//! The host owns the map view and implements [`MapSurface`]; everything else
//! (archive, shape drawing, selection, styling) runs behind a
//! [`CanvasSession`]. Geometry crosses the boundary as GeoJSON text and
//! identifiers as lowercase UUID strings.

use imdf_archive::{Project, ProjectEntry};
use imdf_canvas::{
    AssemblerState, CanvasConfig, CanvasController, CanvasError, MapWidget, OverlayId,
    ScreenPoint, StyleDescriptor, TapOutcome, Tool,
};
use imdf_model::{
    FeatureCategory, FeatureId, FeatureProperties, Geometry, ImdfError, MapRegion, Point,
    ProjectManifest, UnitCategory,
};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

// Export UniFFI scaffolding
uniffi::setup_scaffolding!();

/// Library version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version
#[uniffi::export]
pub fn get_version() -> String {
    VERSION.to_string()
}

/// Error type for FFI operations
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ImdfFfiError {
    #[error("Malformed data: {msg}")]
    Malformed { msg: String },
    #[error("Archive error: {msg}")]
    Archive { msg: String },
    #[error("Drawing error: {msg}")]
    Drawing { msg: String },
    #[error("IO error: {msg}")]
    Io { msg: String },
    #[error("Invalid input: {msg}")]
    InvalidInput { msg: String },
    #[error("Feature not found: {id}")]
    NotFound { id: String },
}

impl From<ImdfError> for ImdfFfiError {
    fn from(e: ImdfError) -> Self {
        let msg = e.to_string();
        match e {
            ImdfError::MalformedGeometry(_)
            | ImdfError::MalformedFeatureData(_)
            | ImdfError::Json(_)
            | ImdfError::Manifest(_) => ImdfFfiError::Malformed { msg },
            ImdfError::Io { .. } => ImdfFfiError::Io { msg },
            ImdfError::FeatureNotFound(id) => ImdfFfiError::NotFound { id: id.to_string() },
            ImdfError::ArchiveLoad { .. } | ImdfError::DuplicateIdentifier(_) => {
                ImdfFfiError::Archive { msg }
            }
        }
    }
}

impl From<CanvasError> for ImdfFfiError {
    fn from(e: CanvasError) -> Self {
        match e {
            CanvasError::Imdf(inner) => inner.into(),
            CanvasError::FeatureNotFound(id) => ImdfFfiError::NotFound { id: id.to_string() },
            other => ImdfFfiError::Drawing {
                msg: other.to_string(),
            },
        }
    }
}

fn invalid(msg: impl Into<String>) -> ImdfFfiError {
    ImdfFfiError::InvalidInput { msg: msg.into() }
}

fn parse_id(text: &str) -> Result<FeatureId, ImdfFfiError> {
    text.parse()
        .map_err(|_| invalid(format!("'{}' is not a feature id", text)))
}

fn parse_category(name: &str) -> Result<FeatureCategory, ImdfFfiError> {
    FeatureCategory::parse(name).ok_or_else(|| invalid(format!("unknown category '{}'", name)))
}

// ============================================================================
// Records
// ============================================================================

/// Geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, uniffi::Record)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinate> for Point {
    fn from(c: Coordinate) -> Self {
        Point::new(c.latitude, c.longitude)
    }
}

impl From<Point> for Coordinate {
    fn from(p: Point) -> Self {
        Coordinate {
            latitude: p.latitude,
            longitude: p.longitude,
        }
    }
}

/// Visible map region
#[derive(Debug, Clone, Copy, PartialEq, uniffi::Record)]
pub struct Region {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub span_latitude: f64,
    pub span_longitude: f64,
}

impl From<Region> for MapRegion {
    fn from(r: Region) -> Self {
        MapRegion::new(
            Point::new(r.center_latitude, r.center_longitude),
            r.span_latitude,
            r.span_longitude,
        )
    }
}

impl From<MapRegion> for Region {
    fn from(r: MapRegion) -> Self {
        Region {
            center_latitude: r.center.latitude,
            center_longitude: r.center.longitude,
            span_latitude: r.span_latitude,
            span_longitude: r.span_longitude,
        }
    }
}

/// Overlay style
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct OverlayStyle {
    /// RGBA
    pub stroke_color: Vec<f32>,
    /// RGBA
    pub fill_color: Vec<f32>,
    pub line_width: f32,
    pub closes_path: bool,
    pub marks_endpoint: bool,
}

impl From<&StyleDescriptor> for OverlayStyle {
    fn from(s: &StyleDescriptor) -> Self {
        OverlayStyle {
            stroke_color: s.stroke_color.to_vec(),
            fill_color: s.fill_color.to_vec(),
            line_width: s.line_width,
            closes_path: s.closes_path,
            marks_endpoint: s.marks_endpoint,
        }
    }
}

/// Project summary for project pickers
#[derive(Debug, Clone, uniffi::Record)]
pub struct ProjectInfo {
    pub uuid: String,
    pub title: String,
    pub description: Option<String>,
    pub client: Option<String>,
    pub path: String,
    /// RFC 3339
    pub updated_at: String,
    /// `None` when the dataset was not loaded
    pub feature_count: Option<u64>,
}

impl ProjectInfo {
    fn new(root: &Path, manifest: &ProjectManifest, feature_count: Option<usize>) -> Self {
        ProjectInfo {
            uuid: manifest.uuid.to_string(),
            title: manifest.title.clone(),
            description: manifest.description.clone(),
            client: manifest.client.clone(),
            path: root.display().to_string(),
            updated_at: manifest.updated_at.to_rfc3339(),
            feature_count: feature_count.map(|n| n as u64),
        }
    }
}

impl From<&ProjectEntry> for ProjectInfo {
    fn from(entry: &ProjectEntry) -> Self {
        ProjectInfo::new(&entry.root, &entry.manifest, None)
    }
}

/// Canvas tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum CanvasTool {
    Selector,
    PointPlacer,
    PolylineDrawer,
    PolygonDrawer,
    Measurement,
}

impl From<CanvasTool> for Tool {
    fn from(t: CanvasTool) -> Self {
        match t {
            CanvasTool::Selector => Tool::Selector,
            CanvasTool::PointPlacer => Tool::PointPlacer,
            CanvasTool::PolylineDrawer => Tool::PolylineDrawer,
            CanvasTool::PolygonDrawer => Tool::PolygonDrawer,
            CanvasTool::Measurement => Tool::Measurement,
        }
    }
}

/// Result of a tap
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum TapResult {
    Selected { feature_id: String },
    SelectionCleared,
    VertexAdded { vertex_count: u32, ready: bool },
    Measured { total_metres: f64 },
}

impl From<TapOutcome> for TapResult {
    fn from(outcome: TapOutcome) -> Self {
        match outcome {
            TapOutcome::Selected(id) => TapResult::Selected {
                feature_id: id.to_string(),
            },
            TapOutcome::SelectionCleared => TapResult::SelectionCleared,
            TapOutcome::VertexAdded {
                state,
                vertex_count,
            } => TapResult::VertexAdded {
                vertex_count: vertex_count as u32,
                ready: state == AssemblerState::Ready,
            },
            TapOutcome::Measured { total_metres } => TapResult::Measured { total_metres },
        }
    }
}

// ============================================================================
// Host map view
// ============================================================================

/// Map view implemented by the host
///
/// Overlay keys are `feature:<uuid>`, `preview` or `measurement`.
#[uniffi::export(callback_interface)]
pub trait MapSurface: Send + Sync {
    fn convert_screen_point(&self, x: f64, y: f64) -> Coordinate;
    fn add_overlay(&self, overlay_key: String, geometry_json: String, style: OverlayStyle);
    fn remove_overlay(&self, overlay_key: String);
    fn add_annotation(&self, feature_id: String, coordinate: Coordinate, draggable: bool);
    fn remove_annotation(&self, feature_id: String);
    fn set_visible_region(&self, region: Region);
}

fn overlay_key(id: OverlayId) -> String {
    match id {
        OverlayId::Feature(id) => format!("feature:{}", id),
        OverlayId::Preview => "preview".to_string(),
        OverlayId::Measurement => "measurement".to_string(),
    }
}

struct SurfaceWidget {
    surface: Box<dyn MapSurface>,
}

impl MapWidget for SurfaceWidget {
    fn convert_screen_point_to_coordinate(&self, point: ScreenPoint) -> Point {
        self.surface.convert_screen_point(point.x, point.y).into()
    }

    fn add_overlay(&mut self, id: OverlayId, geometry: &Geometry, style: &StyleDescriptor) {
        self.surface.add_overlay(
            overlay_key(id),
            geometry.to_geojson().to_string(),
            style.into(),
        );
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        self.surface.remove_overlay(overlay_key(id));
    }

    fn add_annotation(&mut self, id: FeatureId, coordinate: Point, draggable: bool) {
        self.surface
            .add_annotation(id.to_string(), coordinate.into(), draggable);
    }

    fn remove_annotation(&mut self, id: FeatureId) {
        self.surface.remove_annotation(id.to_string());
    }

    fn set_visible_region(&mut self, region: &MapRegion) {
        self.surface.set_visible_region((*region).into());
    }
}

fn parse_config(config_json: Option<String>) -> Result<CanvasConfig, ImdfFfiError> {
    match config_json {
        Some(text) => CanvasConfig::from_json(&text)
            .map_err(|e| invalid(format!("canvas config: {}", e))),
        None => Ok(CanvasConfig::default()),
    }
}

// ============================================================================
// Canvas session
// ============================================================================

/// An open project bound to a host map view - thread-safe
#[derive(uniffi::Object)]
pub struct CanvasSession {
    controller: Mutex<CanvasController<SurfaceWidget>>,
}

impl CanvasSession {
    fn with_project(
        project: Project,
        surface: Box<dyn MapSurface>,
        config_json: Option<String>,
    ) -> Result<Arc<Self>, ImdfFfiError> {
        let config = parse_config(config_json)?;
        log::debug!(
            "Binding canvas session to {} ({} features)",
            project.root().display(),
            project.archive().len()
        );
        let mut controller = CanvasController::new(project, SurfaceWidget { surface }, config);
        controller.render_features();
        controller.frame_initial_region();
        Ok(Arc::new(Self {
            controller: Mutex::new(controller),
        }))
    }
}

#[uniffi::export]
impl CanvasSession {
    /// Open an existing project directory
    #[uniffi::constructor]
    pub fn open(
        project_path: String,
        surface: Box<dyn MapSurface>,
        config_json: Option<String>,
    ) -> Result<Arc<Self>, ImdfFfiError> {
        let project = Project::open(project_path)?;
        Self::with_project(project, surface, config_json)
    }

    /// Create a new project directory and open it
    #[uniffi::constructor]
    pub fn create(
        project_path: String,
        title: String,
        surface: Box<dyn MapSurface>,
        config_json: Option<String>,
    ) -> Result<Arc<Self>, ImdfFfiError> {
        let project = Project::create(project_path, title)?;
        Self::with_project(project, surface, config_json)
    }

    pub fn project_info(&self) -> ProjectInfo {
        let controller = self.controller.lock();
        let project = controller.project();
        ProjectInfo::new(
            project.root(),
            project.manifest(),
            Some(project.archive().len()),
        )
    }

    /// Switch tools; returns the number of discarded vertices
    pub fn switch_tool(&self, tool: CanvasTool) -> u32 {
        self.controller.lock().switch_tool(tool.into()).discarded_vertices as u32
    }

    pub fn on_tap(&self, x: f64, y: f64) -> Result<TapResult, ImdfFfiError> {
        let outcome = self.controller.lock().on_tap(ScreenPoint::new(x, y))?;
        Ok(outcome.into())
    }

    pub fn close_shape(&self) -> Result<(), ImdfFfiError> {
        self.controller.lock().close_shape()?;
        Ok(())
    }

    pub fn undo_vertex(&self) -> Result<(), ImdfFfiError> {
        self.controller.lock().undo_vertex()?;
        Ok(())
    }

    /// Cancel the shape being drawn; returns the number of discarded vertices
    pub fn cancel_shape(&self) -> u32 {
        self.controller.lock().cancel_shape() as u32
    }

    /// Store the finished shape; `properties_json` follows the category schema
    pub fn commit_shape(
        &self,
        category: String,
        properties_json: String,
    ) -> Result<String, ImdfFfiError> {
        let category = parse_category(&category)?;
        let raw: serde_json::Value = serde_json::from_str(&properties_json)
            .map_err(|e| invalid(format!("properties: {}", e)))?;
        let properties = FeatureProperties::decode(category, &raw)?;
        let id = self.controller.lock().commit_shape(properties)?;
        Ok(id.to_string())
    }

    pub fn update_properties(
        &self,
        feature_id: String,
        properties_json: String,
    ) -> Result<(), ImdfFfiError> {
        let id = parse_id(&feature_id)?;
        let mut controller = self.controller.lock();
        let category = controller
            .project()
            .archive()
            .find(id)
            .map(|f| f.category())
            .ok_or(ImdfFfiError::NotFound { id: feature_id })?;
        let raw: serde_json::Value = serde_json::from_str(&properties_json)
            .map_err(|e| invalid(format!("properties: {}", e)))?;
        let properties = FeatureProperties::decode(category, &raw)?;
        controller.update_properties(id, properties)?;
        Ok(())
    }

    pub fn on_drag_end(
        &self,
        feature_id: String,
        coordinate: Coordinate,
    ) -> Result<(), ImdfFfiError> {
        let id = parse_id(&feature_id)?;
        self.controller.lock().on_drag_end(id, coordinate.into())?;
        Ok(())
    }

    pub fn on_region_changed(&self, region: Region) {
        self.controller.lock().on_region_changed(region.into());
    }

    pub fn set_category_visible(&self, category: String, visible: bool) -> Result<(), ImdfFfiError> {
        let category = parse_category(&category)?;
        self.controller
            .lock()
            .set_category_visible(category, visible);
        Ok(())
    }

    pub fn render_features(&self) {
        self.controller.lock().render_features();
    }

    pub fn frame_initial_region(&self) -> Option<Region> {
        self.controller
            .lock()
            .frame_initial_region()
            .map(Region::from)
    }

    pub fn remove_feature(&self, feature_id: String) -> Result<(), ImdfFfiError> {
        let id = parse_id(&feature_id)?;
        self.controller.lock().remove_feature(id)?;
        Ok(())
    }

    /// Encoded GeoJSON feature record
    pub fn feature_json(&self, feature_id: String) -> Result<String, ImdfFfiError> {
        let id = parse_id(&feature_id)?;
        let controller = self.controller.lock();
        let feature = controller
            .project()
            .archive()
            .find(id)
            .ok_or(ImdfFfiError::NotFound { id: feature_id })?;
        Ok(feature.encode()?.to_string())
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.controller
            .lock()
            .selection()
            .ids()
            .map(|id| id.to_string())
            .collect()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.controller.lock().project().is_dirty()
    }

    pub fn save(&self) -> Result<(), ImdfFfiError> {
        self.controller.lock().save()?;
        Ok(())
    }
}

// ============================================================================
// Project management
// ============================================================================

/// Projects in a workspace directory, most recently updated first
#[uniffi::export]
pub fn list_projects(workspace_path: String) -> Result<Vec<ProjectInfo>, ImdfFfiError> {
    let entries = imdf_archive::list_projects(workspace_path)?;
    Ok(entries.iter().map(ProjectInfo::from).collect())
}

/// Delete a project directory; the dataset does not need to load
#[uniffi::export]
pub fn delete_project(project_path: String) -> Result<(), ImdfFfiError> {
    Project::delete_at(project_path)?;
    Ok(())
}

/// Wire names of every feature category
#[uniffi::export]
pub fn feature_categories() -> Vec<String> {
    FeatureCategory::ALL
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}

/// Wire values of the unit category vocabulary, for pickers
#[uniffi::export]
pub fn unit_categories() -> Vec<String> {
    UnitCategory::ALL
        .iter()
        .map(|c| c.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Clone)]
    struct FakeSurface {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MapSurface for FakeSurface {
        fn convert_screen_point(&self, x: f64, y: f64) -> Coordinate {
            Coordinate {
                latitude: y * 1e-6,
                longitude: x * 1e-6,
            }
        }

        fn add_overlay(&self, overlay_key: String, _geometry_json: String, _style: OverlayStyle) {
            self.calls.lock().push(format!("add {}", overlay_key));
        }

        fn remove_overlay(&self, overlay_key: String) {
            self.calls.lock().push(format!("remove {}", overlay_key));
        }

        fn add_annotation(&self, feature_id: String, _coordinate: Coordinate, _draggable: bool) {
            self.calls.lock().push(format!("pin {}", feature_id));
        }

        fn remove_annotation(&self, feature_id: String) {
            self.calls.lock().push(format!("unpin {}", feature_id));
        }

        fn set_visible_region(&self, _region: Region) {
            self.calls.lock().push("region".to_string());
        }
    }

    #[test]
    fn test_draw_commit_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let surface = FakeSurface::default();
        let path = dir.path().join("hotel").display().to_string();
        let session =
            CanvasSession::create(path, "Hotel".into(), Box::new(surface.clone()), None).unwrap();

        session.switch_tool(CanvasTool::PolygonDrawer);
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            session.on_tap(x, y).unwrap();
        }
        session.close_shape().unwrap();
        let id = session
            .commit_shape("unit".into(), r#"{"category": "office"}"#.into())
            .unwrap();

        assert!(surface
            .calls
            .lock()
            .contains(&format!("add feature:{}", id)));
        let record: serde_json::Value =
            serde_json::from_str(&session.feature_json(id.clone()).unwrap()).unwrap();
        assert_eq!(record["properties"]["category"], "office");

        assert!(session.has_unsaved_changes());
        session.save().unwrap();
        assert!(!session.has_unsaved_changes());

        let projects = list_projects(dir.path().display().to_string()).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].title, "Hotel");
        assert_eq!(session.project_info().feature_count, Some(1));
    }

    #[test]
    fn test_bad_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p").display().to_string();
        let session =
            CanvasSession::create(path, "P".into(), Box::new(FakeSurface::default()), None)
                .unwrap();

        assert!(matches!(
            session.commit_shape("kiosk".into(), "{}".into()),
            Err(ImdfFfiError::InvalidInput { .. })
        ));
        assert!(matches!(
            session.commit_shape("unit".into(), r#"{"category": "office"}"#.into()),
            Err(ImdfFfiError::Drawing { .. })
        ));
        assert!(matches!(
            session.remove_feature("nope".into()),
            Err(ImdfFfiError::InvalidInput { .. })
        ));
        assert!(matches!(
            session.remove_feature(FeatureId::new_random().to_string()),
            Err(ImdfFfiError::NotFound { .. })
        ));
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p").display().to_string();
        let result = CanvasSession::create(
            path,
            "P".into(),
            Box::new(FakeSurface::default()),
            Some("{\"hit_tolerance_points\": \"wide\"}".into()),
        );
        assert!(matches!(result, Err(ImdfFfiError::InvalidInput { .. })));
    }

    #[test]
    fn test_list_and_delete_projects() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().display().to_string();
        Project::create(dir.path().join("kept"), "Kept").unwrap();
        let broken = dir.path().join("broken");
        Project::create(&broken, "Broken").unwrap();
        std::fs::write(broken.join("unit.geojson"), "{not json").unwrap();

        let mut titles: Vec<String> = list_projects(workspace.clone())
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["Broken".to_string(), "Kept".to_string()]);

        delete_project(broken.display().to_string()).unwrap();
        assert!(!broken.exists());

        let projects = list_projects(workspace).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].title, "Kept");
        assert_eq!(projects[0].feature_count, None);
    }

    #[test]
    fn test_delete_project_requires_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain");
        std::fs::create_dir(&plain).unwrap();
        assert!(matches!(
            delete_project(plain.display().to_string()),
            Err(ImdfFfiError::Malformed { .. })
        ));
        assert!(plain.exists());
    }

    #[test]
    fn test_overlay_keys() {
        let id = FeatureId::new_random();
        assert_eq!(overlay_key(OverlayId::Feature(id)), format!("feature:{}", id));
        assert_eq!(overlay_key(OverlayId::Preview), "preview");
    }

    #[test]
    fn test_vocabulary_lists() {
        assert_eq!(feature_categories().len(), 9);
        assert!(unit_categories().contains(&"restroom.female".to_string()));
    }
}
