//! Drawing surface the pointer allocates its paths from.

use crate::color::Fill;
use crate::geometry::Rect;

/// Creates and edits vector paths. Every handle returned by
/// [`create_path`](PathFactory::create_path) is owned by the caller until it
/// is passed back to [`release`](PathFactory::release).
pub trait PathFactory {
    type Path: Copy + Eq + std::fmt::Debug;

    fn create_path(&mut self, z_index: i32) -> Self::Path;
    fn clear(&mut self, path: Self::Path);
    fn move_to(&mut self, path: Self::Path, x: f64, y: f64);
    fn line_to(&mut self, path: Self::Path, x: f64, y: f64);
    fn set_fill(&mut self, path: Self::Path, fill: Fill);
    fn set_stroke_none(&mut self, path: Self::Path);
    fn release(&mut self, path: Self::Path);

    /// Appends the closed outline of `rect`.
    fn rect(&mut self, path: Self::Path, rect: &Rect) {
        let (left, top, right, bottom) = (rect.left, rect.top, rect.right(), rect.bottom());
        self.move_to(path, left, top);
        self.line_to(path, right, top);
        self.line_to(path, right, bottom);
        self.line_to(path, left, bottom);
        self.line_to(path, left, top);
    }
}
