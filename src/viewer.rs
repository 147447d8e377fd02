// ============================================================================
// WINDOWED GAUGE
// ============================================================================

use std::sync::mpsc::Receiver;
use std::time::Instant;

use bon::Builder;
use pixels::{Pixels, SurfaceTexture};
use rusttype::{point, Font, PositionedGlyph, Scale as FontScale};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::bands::Dimmer;
use crate::color::Color;
use crate::color_scale::LinearColorScale;
use crate::constraint::SettingValue;
use crate::geometry::{Orientation, Rect, Track};
use crate::pointer::{LedPointer, PointerState};
use crate::scale::LinearScale;
use crate::scene::{Canvas, Scene};

/// Command enum for type-safe gauge updates
#[derive(Debug, Clone)]
pub enum GaugeCommand {
    SetValue(f64),
    SetRange(f64, f64),
    SetGap(SettingValue),
    SetSize(SettingValue),
    SetCount(SettingValue),
    Hover(bool),
}

#[derive(Debug, Clone, Builder)]
pub struct GaugeConfig {
    #[builder(default = "LED Gauge".to_string(), into)]
    pub title: String,
    #[builder(default = (0.0, 100.0))]
    pub range: (f64, f64),
    #[builder(default = false)]
    pub inverted: bool,
    #[builder(default)]
    pub orientation: Orientation,

    // Window configuration
    #[builder(default = 160)]
    pub window_width: usize,
    #[builder(default = 400)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
    #[builder(default = 24.0)]
    pub track_margin: f64,

    // Segments; falls back to 1% gaps and 4% segments when none is given
    #[builder(into)]
    pub gap: Option<SettingValue>,
    #[builder(into)]
    pub size: Option<SettingValue>,
    #[builder(into)]
    pub count: Option<SettingValue>,

    // Colors
    #[builder(default = vec![
        Color::new(0x2e, 0x7d, 0x32),
        Color::new(0xf9, 0xa8, 0x25),
        Color::new(0xc6, 0x28, 0x28),
    ])]
    pub colors: Vec<Color>,
    #[builder(default = 0.75)]
    pub dimmer_factor: f64,
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub background_color: Color,
    #[builder(default = Color::new(0x00, 0x00, 0x00))]
    pub text_color: Color,

    // Readout
    pub font_data: Option<Vec<u8>>,
    #[builder(default = 28.0)]
    pub readout_font_size: f32,
}

/// Main gauge struct - the primary public interface
#[derive(Debug, Clone)]
pub struct LedGauge {
    config: GaugeConfig,
    value: f64,
}

impl LedGauge {
    pub fn new(config: GaugeConfig) -> Self {
        let value = config.range.0;
        Self { config, value }
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn show(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(None)
    }

    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<GaugeCommand>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver))
    }

    fn run_window(
        &self,
        receiver: Option<Receiver<GaugeCommand>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let config = self.config.clone();
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)?;

        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();
        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let font = config.font_data.clone().and_then(Font::try_from_vec);
        if config.font_data.is_some() && font.is_none() {
            tracing::warn!("readout font could not be parsed; readout disabled");
        }

        let mut state = GaugeState::new(&config, self.value);
        let frame_duration = std::time::Duration::from_secs_f64(1.0 / config.max_framerate);
        let mut last_frame = Instant::now();

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let inside = state.track.is_some_and(|track| {
                            let b = track.bounds;
                            position.x >= b.left
                                && position.x <= b.right()
                                && position.y >= b.top
                                && position.y <= b.bottom()
                        });
                        state.apply(GaugeCommand::Hover(inside));
                    }
                    WindowEvent::CursorLeft { .. } => {
                        state.apply(GaugeCommand::Hover(false));
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(ref receiver) = receiver {
                            while let Ok(command) = receiver.try_recv() {
                                state.apply(command);
                            }
                        }
                        state.update(fb_width, fb_height, &config);

                        let frame = pixels.frame_mut();
                        let mut canvas = Canvas::new(frame, fb_width, fb_height);
                        canvas.clear(config.background_color);
                        state.pointer.surface().render(&mut canvas);
                        if let Some(ref font) = font {
                            let text = format!("{:.1}", state.pointer.value());
                            let scale = FontScale::uniform(config.readout_font_size);
                            let y = fb_height as i32 - (config.track_margin / 2.0) as i32;
                            let x = fb_width as i32 / 2;
                            draw_text(&mut canvas, x, y, &text, font, scale, config.text_color);
                        }
                        if let Err(err) = pixels.render() {
                            tracing::error!(%err, "pixels render failed");
                            window_target.exit();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

// ============================================================================
// INTERNAL STATE
// ============================================================================

struct GaugeState {
    pointer: LedPointer<Scene>,
    scale: LinearScale,
    track: Option<Track>,
    hover: PointerState,
    hover_dirty: bool,
}

impl GaugeState {
    fn new(config: &GaugeConfig, value: f64) -> Self {
        let mut pointer = LedPointer::new(Scene::new());
        pointer
            .set_color_scale(Box::new(LinearColorScale::new(config.colors.clone())))
            .set_dimmer(Dimmer::darken(config.dimmer_factor))
            .set_value(value);
        if config.gap.is_none() && config.size.is_none() && config.count.is_none() {
            pointer.set_gap("1%").set_size("4%");
        }
        if let Some(gap) = config.gap.clone() {
            pointer.set_gap(gap);
        }
        if let Some(size) = config.size.clone() {
            pointer.set_size(size);
        }
        if let Some(count) = config.count.clone() {
            pointer.set_count(count);
        }
        Self {
            pointer,
            scale: LinearScale::new(config.range.0, config.range.1).with_inverted(config.inverted),
            track: None,
            hover: PointerState::Normal,
            hover_dirty: false,
        }
    }

    fn apply(&mut self, command: GaugeCommand) {
        match command {
            GaugeCommand::SetValue(value) => {
                let value = value.clamp(self.scale.minimum, self.scale.maximum);
                self.pointer.set_value(value);
            }
            GaugeCommand::SetRange(lower, upper) => {
                let inverted = self.scale.inverted;
                self.scale = LinearScale::new(lower, upper).with_inverted(inverted);
                self.pointer.invalidate_color_scale();
            }
            GaugeCommand::SetGap(gap) => {
                self.pointer.set_gap(gap);
            }
            GaugeCommand::SetSize(size) => {
                self.pointer.set_size(size);
            }
            GaugeCommand::SetCount(count) => {
                self.pointer.set_count(count);
            }
            GaugeCommand::Hover(inside) => {
                let hover = if inside {
                    PointerState::Hovered
                } else {
                    PointerState::Normal
                };
                if hover != self.hover {
                    self.hover = hover;
                    self.hover_dirty = true;
                }
            }
        }
    }

    fn update(&mut self, width: usize, height: usize, config: &GaugeConfig) {
        let track = track_for(width, height, config);
        if self.pointer.needs_redraw() || self.track != Some(track) {
            self.pointer.draw(&track, &self.scale);
            self.track = Some(track);
            self.hover_dirty = true;
        }
        if self.hover_dirty {
            self.pointer.colorize(self.hover);
            self.hover_dirty = false;
        }
    }
}

/// Track rectangle inside the window margins; the bottom margin is doubled
/// to leave room for the readout.
fn track_for(width: usize, height: usize, config: &GaugeConfig) -> Track {
    let margin = config.track_margin;
    let bounds = Rect::new(
        margin,
        margin,
        (width as f64 - 2.0 * margin).max(0.0),
        (height as f64 - 3.0 * margin).max(0.0),
    );
    Track::new(bounds, config.orientation)
}

// ============================================================================
// TEXT
// ============================================================================

/// Draws `text` centered on `(x, y)`.
fn draw_text(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    text: &str,
    font: &Font,
    scale: FontScale,
    color: Color,
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();

    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    let width_px = if min_x < max_x { max_x - min_x } else { 0 };
    let height_px = if min_y < max_y { max_y - min_y } else { 0 };
    let offset_x = x - width_px / 2;
    let offset_y = y - height_px / 2;
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                canvas.blend_pixel(px as i64, py as i64, color, v);
            });
        }
    }
}
