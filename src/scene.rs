// ============================================================================
// RETAINED MODE SCENE
// ============================================================================

use crate::color::{Color, Fill};
use crate::geometry::Rect;
use crate::surface::PathFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenePath {
    pub z_index: i32,
    pub commands: Vec<PathCommand>,
    pub fill: Fill,
    pub stroked: bool,
}

impl ScenePath {
    fn new(z_index: i32) -> Self {
        Self {
            z_index,
            commands: Vec::new(),
            fill: Fill::None,
            stroked: true,
        }
    }

    /// Point lists, one per `MoveTo`.
    pub fn subpaths(&self) -> Vec<Vec<(f64, f64)>> {
        let mut out: Vec<Vec<(f64, f64)>> = Vec::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(x, y) => out.push(vec![(x, y)]),
                PathCommand::LineTo(x, y) => match out.last_mut() {
                    Some(points) => points.push((x, y)),
                    None => out.push(vec![(x, y)]),
                },
            }
        }
        out
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.commands
            .iter()
            .map(|command| match *command {
                PathCommand::MoveTo(x, y) | PathCommand::LineTo(x, y) => Rect::new(x, y, 0.0, 0.0),
            })
            .reduce(|acc, r| acc.union(&r))
    }
}

/// In-memory [`PathFactory`]: keeps every live path so it can be inspected
/// or rasterized onto a [`Canvas`].
#[derive(Debug, Clone, Default)]
pub struct Scene {
    slots: Vec<Option<ScenePath>>,
    created: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self, id: PathId) -> Option<&ScenePath> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Live paths in creation order.
    pub fn paths(&self) -> impl Iterator<Item = (PathId, &ScenePath)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|path| (PathId(i), path)))
    }

    pub fn live_paths(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Paths ever allocated, including released ones.
    pub fn created_paths(&self) -> usize {
        self.created
    }

    fn slot(&mut self, id: PathId) -> Option<&mut ScenePath> {
        let slot = self.slots.get_mut(id.0).and_then(Option::as_mut);
        if slot.is_none() {
            tracing::warn!(?id, "scene path used after release");
        }
        slot
    }

    /// Paints every live path, lowest z-index first.
    pub fn render(&self, canvas: &mut Canvas) {
        let mut order: Vec<(PathId, &ScenePath)> = self.paths().collect();
        order.sort_by_key(|(id, path)| (path.z_index, *id));
        for (_, path) in order {
            canvas.fill_path(path);
        }
    }
}

impl PathFactory for Scene {
    type Path = PathId;

    fn create_path(&mut self, z_index: i32) -> PathId {
        self.created += 1;
        let path = ScenePath::new(z_index);
        if let Some(free) = self.slots.iter().position(Option::is_none) {
            self.slots[free] = Some(path);
            PathId(free)
        } else {
            self.slots.push(Some(path));
            PathId(self.slots.len() - 1)
        }
    }

    fn clear(&mut self, path: PathId) {
        if let Some(path) = self.slot(path) {
            path.commands.clear();
        }
    }

    fn move_to(&mut self, path: PathId, x: f64, y: f64) {
        if let Some(path) = self.slot(path) {
            path.commands.push(PathCommand::MoveTo(x, y));
        }
    }

    fn line_to(&mut self, path: PathId, x: f64, y: f64) {
        if let Some(path) = self.slot(path) {
            path.commands.push(PathCommand::LineTo(x, y));
        }
    }

    fn set_fill(&mut self, path: PathId, fill: Fill) {
        if let Some(path) = self.slot(path) {
            path.fill = fill;
        }
    }

    fn set_stroke_none(&mut self, path: PathId) {
        if let Some(path) = self.slot(path) {
            path.stroked = false;
        }
    }

    fn release(&mut self, path: PathId) {
        if let Some(slot) = self.slots.get_mut(path.0) {
            *slot = None;
        }
    }
}

// ============================================================================
// CANVAS
// ============================================================================

/// RGBA8 framebuffer view.
pub struct Canvas<'a> {
    pub frame: &'a mut [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    /// Source-over blend of one pixel.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        if idx + 4 > self.frame.len() {
            return;
        }
        let a = coverage.clamp(0.0, 1.0) * color.a as f32 / 255.0;
        let src = [color.r as f32, color.g as f32, color.b as f32];
        for (channel, s) in src.iter().enumerate() {
            let d = self.frame[idx + channel] as f32;
            self.frame[idx + channel] = (s * a + d * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = 0xff;
    }

    /// Even-odd scanline fill of every subpath, sampling pixel centers.
    pub fn fill_path(&mut self, path: &ScenePath) {
        if path.fill == Fill::None {
            return;
        }
        let subpaths = path.subpaths();
        let Some(bounds) = path.bounds() else {
            return;
        };
        let y0 = bounds.top.floor().max(0.0) as i64;
        let y1 = bounds.bottom().ceil().min(self.height as f64) as i64;
        let mut crossings: Vec<f64> = Vec::new();
        for y in y0..y1 {
            let sy = y as f64 + 0.5;
            crossings.clear();
            for points in &subpaths {
                for edge in points.windows(2) {
                    let ((ax, ay), (bx, by)) = (edge[0], edge[1]);
                    if (ay <= sy) != (by <= sy) {
                        crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                    }
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let xs = (span[0] - 0.5).ceil().max(0.0) as i64;
                let xe = (span[1] - 0.5).ceil().min(self.width as f64) as i64;
                for x in xs..xe {
                    self.paint(x, y, path.fill);
                }
            }
        }
    }

    fn paint(&mut self, x: i64, y: i64, fill: Fill) {
        match fill {
            Fill::None => {}
            Fill::Solid(color) => self.blend_pixel(x, y, color, 1.0),
            Fill::Hatch {
                kind,
                color,
                size,
                thickness,
            } => {
                if kind.covers(x, y, size, thickness) {
                    self.blend_pixel(x, y, color, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HatchKind;

    #[test]
    fn release_frees_slot_for_reuse() {
        let mut scene = Scene::new();
        let a = scene.create_path(0);
        let b = scene.create_path(0);
        scene.release(a);
        assert_eq!(scene.live_paths(), 1);
        let c = scene.create_path(5);
        assert_eq!(c, a);
        assert_ne!(c, b);
        assert_eq!(scene.created_paths(), 3);
        assert_eq!(scene.path(c).map(|p| p.z_index), Some(5));
    }

    #[test]
    fn rect_records_closed_outline() {
        let mut scene = Scene::new();
        let p = scene.create_path(0);
        scene.rect(p, &Rect::new(1.0, 2.0, 3.0, 4.0));
        let path = scene.path(p).unwrap();
        assert_eq!(path.commands.len(), 5);
        let outline = vec![(1.0, 2.0), (4.0, 2.0), (4.0, 6.0), (1.0, 6.0), (1.0, 2.0)];
        assert_eq!(path.subpaths(), vec![outline]);
        assert_eq!(path.bounds(), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
        scene.clear(p);
        assert!(scene.path(p).unwrap().commands.is_empty());
    }

    #[test]
    fn renders_solid_rect() {
        let mut scene = Scene::new();
        let p = scene.create_path(0);
        scene.rect(p, &Rect::new(1.0, 1.0, 2.0, 2.0));
        scene.set_fill(p, Fill::Solid(Color::new(255, 0, 0)));

        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.clear(Color::new(0, 0, 0));
        scene.render(&mut canvas);

        let px = |x: usize, y: usize| frame[(y * 4 + x) * 4];
        assert_eq!(px(1, 1), 255);
        assert_eq!(px(2, 2), 255);
        assert_eq!(px(0, 0), 0);
        assert_eq!(px(3, 3), 0);
    }

    #[test]
    fn hatch_leaves_gaps() {
        let mut scene = Scene::new();
        let p = scene.create_path(0);
        scene.rect(p, &Rect::new(0.0, 0.0, 4.0, 1.0));
        scene.set_fill(
            p,
            Fill::Hatch {
                kind: HatchKind::Vertical,
                color: Color::new(0, 255, 0),
                size: 2,
                thickness: 1,
            },
        );
        let mut frame = vec![0u8; 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 1);
        scene.render(&mut canvas);
        let green: Vec<u8> = (0..4).map(|x| frame[x * 4 + 1]).collect();
        assert_eq!(green, vec![255, 0, 255, 0]);
    }
}
