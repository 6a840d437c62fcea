// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canvas interaction controller
//!
//! Receives map events (taps, drags, region changes, tool switches) and
//! turns them into archive edits and overlay updates on the [`MapWidget`].

use crate::assembler::{AssemblerState, ShapeAssembler};
use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};
use crate::picking::{hit_test, tolerance_in_metres, SelectionState};
use crate::style::{style_for, StyleTarget};
use crate::widget::{MapWidget, OverlayId, ScreenPoint};
use imdf_archive::Project;
use imdf_geometry::polyline_length;
use imdf_model::{
    Feature, FeatureCategory, FeatureId, FeatureProperties, Geometry, GeometryKind, MapRegion,
    Point, Polyline,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Active canvas tool
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Selector,
    PointPlacer,
    PolylineDrawer,
    PolygonDrawer,
    Measurement,
}

impl Tool {
    /// Shape drawn by this tool, if it draws one
    pub fn shape_kind(&self) -> Option<GeometryKind> {
        match self {
            Tool::PointPlacer => Some(GeometryKind::Point),
            Tool::PolylineDrawer => Some(GeometryKind::Polyline),
            Tool::PolygonDrawer => Some(GeometryKind::Polygon),
            Tool::Selector | Tool::Measurement => None,
        }
    }
}

/// Result of a tap
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TapOutcome {
    Selected(FeatureId),
    SelectionCleared,
    VertexAdded {
        state: AssemblerState,
        vertex_count: usize,
    },
    /// Cumulative length of the measurement path in metres
    Measured { total_metres: f64 },
}

/// Result of a tool switch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolSwitch {
    pub previous: Tool,
    /// Vertices thrown away with the cancelled shape; the host should warn
    /// when this is non-zero
    pub discarded_vertices: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rendered {
    Overlay,
    Annotation,
}

/// Owns the open project and drives the map widget
pub struct CanvasController<W: MapWidget> {
    project: Project,
    widget: W,
    config: CanvasConfig,
    tool: Tool,
    session: Option<ShapeAssembler>,
    selection: SelectionState,
    measurement: Vec<Point>,
    hidden: FxHashSet<FeatureCategory>,
    rendered: FxHashMap<FeatureId, Rendered>,
}

/// Show one feature on the widget, replacing whatever it showed before
fn draw_feature<W: MapWidget>(
    widget: &mut W,
    rendered: &mut FxHashMap<FeatureId, Rendered>,
    config: &CanvasConfig,
    hidden: &FxHashSet<FeatureCategory>,
    feature: &Feature,
) {
    erase_feature(widget, rendered, feature.id());
    if hidden.contains(&feature.category()) {
        return;
    }
    match feature.geometry() {
        None => {}
        Some(Geometry::Point(point)) => {
            let draggable = config.is_draggable(feature.category());
            widget.add_annotation(feature.id(), *point, draggable);
            rendered.insert(feature.id(), Rendered::Annotation);
        }
        Some(geometry) => {
            let style = style_for(
                StyleTarget::Feature(feature.properties()),
                false,
                &config.palette,
            );
            widget.add_overlay(OverlayId::Feature(feature.id()), geometry, &style);
            rendered.insert(feature.id(), Rendered::Overlay);
        }
    }
}

fn erase_feature<W: MapWidget>(
    widget: &mut W,
    rendered: &mut FxHashMap<FeatureId, Rendered>,
    id: FeatureId,
) {
    match rendered.remove(&id) {
        Some(Rendered::Overlay) => widget.remove_overlay(OverlayId::Feature(id)),
        Some(Rendered::Annotation) => widget.remove_annotation(id),
        None => {}
    }
}

impl<W: MapWidget> CanvasController<W> {
    pub fn new(project: Project, widget: W, config: CanvasConfig) -> Self {
        Self {
            project,
            widget,
            config,
            tool: Tool::default(),
            session: None,
            selection: SelectionState::default(),
            measurement: Vec::new(),
            hidden: FxHashSet::default(),
            rendered: FxHashMap::default(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Shape being drawn, if any
    pub fn session(&self) -> Option<&ShapeAssembler> {
        self.session.as_ref()
    }

    pub fn measurement_path(&self) -> &[Point] {
        &self.measurement
    }

    /// Hand back the project and widget
    pub fn into_parts(self) -> (Project, W) {
        (self.project, self.widget)
    }

    // ------------------------------------------------------------------
    // Tools and shape sessions
    // ------------------------------------------------------------------

    /// Switch tools, cancelling any shape and measurement in progress
    pub fn switch_tool(&mut self, tool: Tool) -> ToolSwitch {
        let previous = self.tool;
        let discarded_vertices = self.cancel_shape();
        if discarded_vertices > 0 {
            log::warn!(
                "Switching from {:?} to {:?} discarded {} vertices",
                previous,
                tool,
                discarded_vertices
            );
        }
        self.clear_measurement();
        self.tool = tool;
        log::debug!("Tool {:?} -> {:?}", previous, tool);
        ToolSwitch {
            previous,
            discarded_vertices,
        }
    }

    /// Start drawing a shape of `kind`; the active tool must draw that kind
    pub fn begin_session(&mut self, kind: GeometryKind) -> Result<()> {
        if self.session.is_some() {
            return Err(CanvasError::SessionAlreadyActive);
        }
        if self.tool.shape_kind() != Some(kind) {
            return Err(CanvasError::unsupported(format!(
                "{:?} cannot draw a {}",
                self.tool, kind
            )));
        }
        self.session = Some(ShapeAssembler::new(kind));
        log::debug!("Began {} session", kind);
        Ok(())
    }

    /// Close the polygon being drawn
    pub fn close_shape(&mut self) -> Result<AssemblerState> {
        let session = self.session.as_mut().ok_or(CanvasError::NoActiveSession)?;
        session.close()?;
        let state = session.state();
        self.render_preview();
        Ok(state)
    }

    /// Remove the last vertex of the shape being drawn
    pub fn undo_vertex(&mut self) -> Result<Option<Point>> {
        let session = self.session.as_mut().ok_or(CanvasError::NoActiveSession)?;
        let removed = session.remove_last_vertex();
        self.render_preview();
        Ok(removed)
    }

    /// Store the finished shape as a feature with `properties`
    pub fn commit_shape(&mut self, properties: impl Into<FeatureProperties>) -> Result<FeatureId> {
        let session = self.session.as_ref().ok_or(CanvasError::NoActiveSession)?;
        let id = session.commit(properties, self.project.archive_mut())?;
        self.session = None;
        self.widget.remove_overlay(OverlayId::Preview);
        self.redraw(id);
        Ok(id)
    }

    /// Drop the shape being drawn; returns how many vertices it had
    pub fn cancel_shape(&mut self) -> usize {
        match self.session.take() {
            Some(session) => {
                self.widget.remove_overlay(OverlayId::Preview);
                session.vertex_count()
            }
            None => 0,
        }
    }

    fn render_preview(&mut self) {
        let preview = self.session.as_ref().and_then(ShapeAssembler::preview);
        match preview {
            Some(geometry) => {
                let style = style_for(StyleTarget::Sketch, true, &self.config.palette);
                self.widget
                    .add_overlay(OverlayId::Preview, &geometry, &style);
            }
            None => self.widget.remove_overlay(OverlayId::Preview),
        }
    }

    fn clear_measurement(&mut self) {
        if !self.measurement.is_empty() {
            self.measurement.clear();
            self.widget.remove_overlay(OverlayId::Measurement);
        }
    }

    // ------------------------------------------------------------------
    // Map events
    // ------------------------------------------------------------------

    /// Handle a tap at a view position
    pub fn on_tap(&mut self, at: ScreenPoint) -> Result<TapOutcome> {
        let coordinate = self.widget.convert_screen_point_to_coordinate(at);

        match self.tool {
            Tool::Selector => {
                let tolerance =
                    tolerance_in_metres(&self.widget, at, self.config.hit_tolerance_points);
                let hidden = &self.hidden;
                let visible = self
                    .project
                    .archive()
                    .iter()
                    .filter(|f| !hidden.contains(&f.category()));
                match hit_test(visible, coordinate, tolerance) {
                    Some(id) => {
                        self.selection.select(id);
                        log::debug!("Selected {}", id);
                        Ok(TapOutcome::Selected(id))
                    }
                    None => {
                        self.selection.clear();
                        Ok(TapOutcome::SelectionCleared)
                    }
                }
            }
            Tool::Measurement => {
                self.measurement.push(coordinate);
                let total_metres = polyline_length(&self.measurement);
                let geometry = match self.measurement.as_slice() {
                    [single] => Geometry::Point(*single),
                    path => Geometry::Polyline(Polyline::new(path.to_vec())),
                };
                let style = style_for(StyleTarget::Sketch, true, &self.config.palette);
                self.widget
                    .add_overlay(OverlayId::Measurement, &geometry, &style);
                Ok(TapOutcome::Measured { total_metres })
            }
            drawing => {
                let kind = drawing
                    .shape_kind()
                    .ok_or_else(|| CanvasError::unsupported("tool does not draw"))?;
                let fresh = self.session.is_none();
                let session = self
                    .session
                    .get_or_insert_with(|| ShapeAssembler::new(kind));
                if let Err(e) = session.add_vertex(coordinate) {
                    // A rejected first tap must not leave an empty session behind
                    if fresh {
                        self.session = None;
                    }
                    return Err(e);
                }
                if fresh {
                    log::debug!("Began {} session", kind);
                }
                let outcome = TapOutcome::VertexAdded {
                    state: session.state(),
                    vertex_count: session.vertex_count(),
                };
                self.render_preview();
                Ok(outcome)
            }
        }
    }

    /// Toggle a feature in the selection (multi-select)
    pub fn toggle_selection(&mut self, id: FeatureId) -> Result<()> {
        if !self.project.archive().contains(id) {
            return Err(CanvasError::FeatureNotFound(id));
        }
        self.selection.toggle(id);
        Ok(())
    }

    /// A dragged point feature was dropped at `coordinate`
    pub fn on_drag_end(&mut self, id: FeatureId, coordinate: Point) -> Result<()> {
        if self.tool != Tool::Selector {
            return Err(CanvasError::unsupported("features can only be moved with the selector"));
        }
        let feature = self
            .project
            .archive()
            .find(id)
            .ok_or(CanvasError::FeatureNotFound(id))?;
        if !self.config.is_draggable(feature.category()) {
            return Err(CanvasError::unsupported(format!(
                "{} features are not draggable",
                feature.category()
            )));
        }
        if !matches!(feature.geometry(), Some(Geometry::Point(_))) {
            return Err(CanvasError::unsupported("only point features can be dragged"));
        }

        self.project
            .archive_mut()
            .update_geometry(id, Some(Geometry::Point(coordinate)))?;
        self.redraw(id);
        log::debug!("Moved {} to {:?}", id, coordinate);
        Ok(())
    }

    /// The visible map region changed; remember it for the next session
    pub fn on_region_changed(&mut self, region: MapRegion) {
        self.project.set_session(region);
    }

    // ------------------------------------------------------------------
    // Features
    // ------------------------------------------------------------------

    fn redraw(&mut self, id: FeatureId) {
        match self.project.archive().find(id) {
            Some(feature) => draw_feature(
                &mut self.widget,
                &mut self.rendered,
                &self.config,
                &self.hidden,
                feature,
            ),
            None => erase_feature(&mut self.widget, &mut self.rendered, id),
        }
    }

    /// Redraw every feature from the archive
    pub fn render_features(&mut self) {
        let ids: Vec<FeatureId> = self.rendered.keys().copied().collect();
        for id in ids {
            erase_feature(&mut self.widget, &mut self.rendered, id);
        }
        for feature in self.project.archive().iter() {
            draw_feature(
                &mut self.widget,
                &mut self.rendered,
                &self.config,
                &self.hidden,
                feature,
            );
        }
        log::debug!("Rendered {} features", self.rendered.len());
    }

    /// Show or hide a category; hidden features cannot be selected
    pub fn set_category_visible(&mut self, category: FeatureCategory, visible: bool) {
        let changed = if visible {
            self.hidden.remove(&category)
        } else {
            self.hidden.insert(category)
        };
        if !changed {
            return;
        }
        for feature in self.project.archive().features(category) {
            if !visible {
                self.selection.remove(feature.id());
            }
            draw_feature(
                &mut self.widget,
                &mut self.rendered,
                &self.config,
                &self.hidden,
                feature,
            );
        }
    }

    pub fn is_category_visible(&self, category: FeatureCategory) -> bool {
        !self.hidden.contains(&category)
    }

    /// Replace a feature's properties and restyle it
    pub fn update_properties(&mut self, id: FeatureId, properties: FeatureProperties) -> Result<()> {
        if !self.project.archive().contains(id) {
            return Err(CanvasError::FeatureNotFound(id));
        }
        self.project
            .archive_mut()
            .update_properties(id, properties)?;
        self.redraw(id);
        Ok(())
    }

    /// Delete a feature from the archive and the map
    pub fn remove_feature(&mut self, id: FeatureId) -> Result<Feature> {
        let feature = self
            .project
            .archive_mut()
            .remove_feature(id)
            .ok_or(CanvasError::FeatureNotFound(id))?;
        self.selection.remove(id);
        erase_feature(&mut self.widget, &mut self.rendered, id);
        Ok(feature)
    }

    // ------------------------------------------------------------------
    // Viewport and persistence
    // ------------------------------------------------------------------

    /// Move the map to the saved session viewport, else to the data bounds
    pub fn frame_initial_region(&mut self) -> Option<MapRegion> {
        let region = self.project.session_region().or_else(|| {
            self.project
                .archive()
                .bounding_region()
                .map(|bounds| bounds.to_map_region(self.config.region_padding))
        })?;
        self.widget.set_visible_region(&region);
        Some(region)
    }

    /// Save dirty feature files and the manifest
    pub fn save(&mut self) -> Result<()> {
        self.project.save()?;
        Ok(())
    }
}
