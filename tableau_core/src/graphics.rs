// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vector drawing surface and the render node it produces.
//!
//! A [`Graphics`] accumulates drawing commands into a [`RenderNode`]: an
//! ordered list of filled and/or stroked paths plus a local offset. The
//! offset shifts the whole content relative to the owning shape's origin;
//! it is folded into the shape's transform rather than into the path
//! coordinates, so the same path data can be drawn wherever the shape sits.
//!
//! Drawing follows the familiar fill/stroke state machine:
//!
//! ```
//! use tableau_core::graphics::Graphics;
//!
//! let mut g = Graphics::new();
//! g.begin_fill(0xff_00_00, 1.0);
//! g.draw_rect(0.0, 0.0, 10.0, 10.0);
//! g.end_fill();
//! assert_eq!(g.render_node().commands().len(), 1);
//! ```

use alloc::vec::Vec;

use kurbo::{
    BezPath, Circle, Ellipse, ParamCurveNearest, PathEl, Point, RoundedRect, Shape as _, Vec2,
};

use crate::display::NodeId;
use crate::rect::Rectangle;
use crate::resource::ResourceKey;

/// Tolerance used when flattening primitives into path elements.
const PATH_TOLERANCE: f64 = 0.1;

/// Accuracy of nearest-point queries for stroke hit testing.
const NEAREST_ACCURACY: f64 = 1e-3;

/// Solid fill parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillStyle {
    /// Color as `0xRRGGBB`.
    pub color: u32,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f32,
}

/// Stroke parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Line width in local units.
    pub width: f64,
    /// Color as `0xRRGGBB`.
    pub color: u32,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f32,
}

/// One path with the styles it was drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct PathCommand {
    /// Path geometry in content coordinates.
    pub path: BezPath,
    /// Fill, if the path is filled.
    pub fill: Option<FillStyle>,
    /// Stroke, if the path is stroked.
    pub stroke: Option<StrokeStyle>,
}

/// Backend-agnostic description of what a shape draws.
///
/// Content coordinates are shifted by `(x, y)` relative to the owning
/// object's origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderNode {
    commands: Vec<PathCommand>,
    x: f64,
    y: f64,
}

impl RenderNode {
    /// Path commands in draw order.
    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Horizontal content offset.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical content offset.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Content offset as a vector.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Returns `true` if nothing has been drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.iter().all(|c| c.path.elements().is_empty())
    }
}

/// Drawing surface owned by a shape.
///
/// Path-building calls issued while neither a fill nor a line style is
/// active are ignored. A filled subpath is closed when a new subpath starts
/// or the command ends (`begin_fill`, `line_style`, `end_fill`).
#[derive(Debug, Default)]
pub struct Graphics {
    node: RenderNode,
    target: Option<NodeId>,
    fill: Option<FillStyle>,
    stroke: Option<StrokeStyle>,
    /// Whether the last command in `node` still receives path elements.
    open: bool,
    subpath_open: bool,
    pen: Point,
    resource: Option<ResourceKey>,
}

impl Graphics {
    /// Creates an empty surface with zero offset and no target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds this surface to the shape that owns it.
    pub fn set_target(&mut self, target: NodeId) {
        self.target = Some(target);
    }

    /// The owning shape, once bound.
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Read access to the accumulated content.
    #[must_use]
    pub fn render_node(&self) -> &RenderNode {
        &self.node
    }

    /// Moves the content by `(x, y)` relative to the owner's origin.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.node.x = x;
        self.node.y = y;
    }

    /// Current content offset.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.node.offset()
    }

    // -- Style state --

    /// Starts a solid fill for subsequent drawing.
    pub fn begin_fill(&mut self, color: u32, alpha: f32) {
        self.finish_command();
        self.fill = Some(FillStyle { color, alpha });
    }

    /// Ends the current fill; later drawing is stroked only (if a line style
    /// is active).
    pub fn end_fill(&mut self) {
        self.finish_command();
        self.fill = None;
    }

    /// Sets the stroke for subsequent drawing. A width of zero or less
    /// disables stroking.
    pub fn line_style(&mut self, width: f64, color: u32, alpha: f32) {
        self.finish_command();
        self.stroke = (width > 0.0).then_some(StrokeStyle {
            width,
            color,
            alpha,
        });
    }

    /// Discards all content and style state. The offset and any attached
    /// resource are kept.
    pub fn clear(&mut self) {
        self.node.commands.clear();
        self.fill = None;
        self.stroke = None;
        self.open = false;
        self.subpath_open = false;
        self.pen = Point::ZERO;
    }

    // -- Path building --

    /// Starts a new subpath at `(x, y)`.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = Point::new(x, y);
        self.pen = p;
        if let Some(path) = self.close_fill_subpath() {
            path.move_to(p);
            self.subpath_open = true;
        }
    }

    /// Draws a straight line from the pen to `(x, y)`.
    pub fn line_to(&mut self, x: f64, y: f64) {
        let p = Point::new(x, y);
        if let Some(path) = self.subpath() {
            path.line_to(p);
        }
        self.pen = p;
    }

    /// Draws a quadratic curve through control point `(cx, cy)` to
    /// `(ax, ay)`.
    pub fn curve_to(&mut self, cx: f64, cy: f64, ax: f64, ay: f64) {
        let p = Point::new(ax, ay);
        if let Some(path) = self.subpath() {
            path.quad_to(Point::new(cx, cy), p);
        }
        self.pen = p;
    }

    /// Draws a cubic curve through two control points to `(ax, ay)`.
    pub fn cubic_curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, ax: f64, ay: f64) {
        let p = Point::new(ax, ay);
        if let Some(path) = self.subpath() {
            path.curve_to(Point::new(c1x, c1y), Point::new(c2x, c2y), p);
        }
        self.pen = p;
    }

    /// Draws an axis-aligned rectangle.
    pub fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let rect = kurbo::Rect::new(x, y, x + width, y + height);
        self.append_closed(rect.path_elements(PATH_TOLERANCE));
    }

    /// Draws a rectangle with uniformly rounded corners.
    pub fn draw_round_rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64) {
        let rect = RoundedRect::new(x, y, x + width, y + height, radius);
        self.append_closed(rect.path_elements(PATH_TOLERANCE));
    }

    /// Draws a circle centered on `(x, y)`.
    pub fn draw_circle(&mut self, x: f64, y: f64, radius: f64) {
        let circle = Circle::new((x, y), radius);
        self.append_closed(circle.path_elements(PATH_TOLERANCE));
    }

    /// Draws the ellipse inscribed in the given rectangle.
    pub fn draw_ellipse(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let ellipse = Ellipse::new(
            (x + width / 2.0, y + height / 2.0),
            (width / 2.0, height / 2.0),
            0.0,
        );
        self.append_closed(ellipse.path_elements(PATH_TOLERANCE));
    }

    // -- Queries --

    /// Writes the tight content bounds, offset included, into `bounds`.
    ///
    /// Strokes extend the bounds by half their width. Empty content yields
    /// [`Rectangle::EMPTY`].
    pub fn measure_content_bounds(&self, bounds: &mut Rectangle) {
        bounds.set_empty();
        for cmd in &self.node.commands {
            if cmd.path.elements().is_empty() {
                continue;
            }
            let mut r = cmd.path.bounding_box();
            if let Some(stroke) = cmd.stroke {
                r = r.inflate(stroke.width / 2.0, stroke.width / 2.0);
            }
            bounds.union_with(&Rectangle::from(r));
        }
        if !bounds.is_empty() {
            bounds.x += self.node.x;
            bounds.y += self.node.y;
        }
    }

    /// Exact containment test for a point in the owner's local space.
    ///
    /// Filled paths use the non-zero winding rule, with every open subpath
    /// treated as closed back to its start; stroked paths hit within
    /// half the line width of any segment. Returns the bound target on a
    /// hit.
    #[must_use]
    pub fn hit_test(&self, local: Point) -> Option<NodeId> {
        let p = local - self.node.offset();
        let hit = self.node.commands.iter().rev().any(|cmd| {
            if cmd.fill.is_some() && fill_winding(&cmd.path, p) != 0 {
                return true;
            }
            cmd.stroke.is_some_and(|stroke| {
                let half = stroke.width / 2.0;
                cmd.path
                    .segments()
                    .any(|seg| seg.nearest(p, NEAREST_ACCURACY).distance_sq <= half * half)
            })
        });
        if hit { self.target } else { None }
    }

    // -- Backend resources --

    /// Attaches a backend resource, returning the one it replaces.
    pub fn attach_resource(&mut self, key: ResourceKey) -> Option<ResourceKey> {
        self.resource.replace(key)
    }

    /// The attached backend resource, if any.
    #[must_use]
    pub fn resource(&self) -> Option<ResourceKey> {
        self.resource
    }

    /// Teardown hook run when the owner leaves the stage.
    ///
    /// Detaches and returns the backend resource so the caller can hand it
    /// back to the backend. Drawn content is kept; the owner may be added
    /// to the stage again.
    pub fn on_remove_from_stage(&mut self) -> Option<ResourceKey> {
        self.resource.take()
    }

    // -- Internal helpers --

    /// Returns the path receiving elements, opening a new command with the
    /// current styles if needed. `None` when no style is active.
    fn current_path(&mut self) -> Option<&mut BezPath> {
        if self.fill.is_none() && self.stroke.is_none() {
            return None;
        }
        if !self.open {
            self.node.commands.push(PathCommand {
                path: BezPath::new(),
                fill: self.fill,
                stroke: self.stroke,
            });
            self.open = true;
            self.subpath_open = false;
        }
        self.node.commands.last_mut().map(|c| &mut c.path)
    }

    /// Like [`current_path`](Self::current_path), but guarantees an open
    /// subpath starting at the pen.
    fn subpath(&mut self) -> Option<&mut BezPath> {
        let pen = self.pen;
        let needs_move = !self.subpath_open;
        let path = self.current_path()?;
        if needs_move {
            path.move_to(pen);
        }
        self.subpath_open = true;
        self.node.commands.last_mut().map(|c| &mut c.path)
    }

    /// Closes the open subpath of a filled command and returns the current
    /// path.
    fn close_fill_subpath(&mut self) -> Option<&mut BezPath> {
        let close = self.subpath_open && self.fill.is_some();
        self.subpath_open = false;
        let path = self.current_path()?;
        if close {
            path.close_path();
        }
        Some(path)
    }

    /// Appends a closed primitive. The pen moves to the primitive's start
    /// point, so a following `line_to` continues from there.
    fn append_closed(&mut self, elements: impl Iterator<Item = PathEl>) {
        let mut elements = elements.peekable();
        if let Some(&PathEl::MoveTo(start)) = elements.peek() {
            self.pen = start;
        }
        if let Some(path) = self.close_fill_subpath() {
            path.extend(elements);
        }
    }

    fn finish_command(&mut self) {
        if self.open && self.subpath_open && self.fill.is_some() {
            if let Some(cmd) = self.node.commands.last_mut() {
                cmd.path.close_path();
            }
        }
        self.open = false;
        self.subpath_open = false;
    }
}

/// Non-zero winding number of `path` around `p`, closing any subpath the
/// caller left open.
fn fill_winding(path: &BezPath, p: Point) -> i32 {
    if !has_open_subpath(path) {
        return path.winding(p);
    }
    let mut closed = BezPath::new();
    let mut open = false;
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(_) if open => {
                closed.close_path();
                open = false;
            }
            PathEl::MoveTo(_) | PathEl::ClosePath => open = false,
            _ => open = true,
        }
        closed.push(el);
    }
    if open {
        closed.close_path();
    }
    closed.winding(p)
}

fn has_open_subpath(path: &BezPath) -> bool {
    let mut open = false;
    for el in path.elements() {
        match el {
            PathEl::MoveTo(_) if open => return true,
            PathEl::MoveTo(_) | PathEl::ClosePath => open = false,
            _ => open = true,
        }
    }
    open
}
