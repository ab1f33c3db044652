//! High-level picking for mouse-based object selection
//!
//! Orchestrates the picking pipeline: input → camera → ray picker, falling
//! back to a color pass when no bounding volume is hit. Turning the result
//! into a selection change is up to the caller.

use crate::config::PickingConfig;
use crate::input::{MouseState, PickRegion};
use crate::render::Camera;

use super::candidate::PickCandidate;
use super::color::PickColor;
use super::color_picker::{ColorPicker, PickBuffer, PickPass, PickingError};
use super::ray_picker::{RayPickHit, RayPicker};

/// Path that produced a pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMethod {
    /// CPU ray against bounding volumes
    Ray,
    /// Color-ID pass
    Color,
}

/// Object chosen by [`PickingSystem::pick_at`]
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult<K> {
    /// Picked object
    pub key: K,
    /// Path that found it
    pub method: PickMethod,
    /// Ray distance to the volume, or linear depth of the pixel for color picks
    pub distance: f32,
}

/// Ray-then-color picking dispatch
///
/// # Usage
/// ```
/// # use editor_spatial::foundation::math::{Transform, Vec3};
/// # use editor_spatial::input::MouseState;
/// # use editor_spatial::picking::{CpuPickBuffer, PickCandidate, PickingSystem, PickMethod};
/// # use editor_spatial::render::Camera;
/// # use editor_spatial::scene::BoundingVolume;
/// let mut camera = Camera::perspective(Vec3::zeros(), 60.0, 1.0, 0.1, 100.0);
/// camera.set_target(Vec3::new(0.0, 0.0, -1.0));
/// let mut mouse = MouseState::new(64, 64);
/// mouse.update_position(32.0, 32.0);
///
/// let volume = BoundingVolume::new(Vec3::repeat(-1.0), Vec3::repeat(1.0));
/// let candidates = vec![PickCandidate::new("crate", Some(volume), Transform::from_position(Vec3::new(0.0, 0.0, -5.0)))];
///
/// let mut picking = PickingSystem::new(CpuPickBuffer::new());
/// let hit = picking.pick_at(&camera, &mouse, &candidates, |_, _, _| {}).unwrap().unwrap();
/// assert_eq!(hit.key, "crate");
/// assert_eq!(hit.method, PickMethod::Ray);
/// ```
#[derive(Debug)]
pub struct PickingSystem<B: PickBuffer> {
    config: PickingConfig,
    ray_picker: RayPicker,
    color_picker: ColorPicker<B>,
}

impl<B: PickBuffer> PickingSystem<B> {
    /// Create a picking system with default configuration
    pub fn new(buffer: B) -> Self {
        Self::with_config(buffer, PickingConfig::default())
    }

    /// Create a picking system with explicit configuration
    pub fn with_config(buffer: B, config: PickingConfig) -> Self {
        Self {
            config,
            ray_picker: RayPicker::new(),
            color_picker: ColorPicker::new(buffer),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &PickingConfig {
        &self.config
    }

    /// Enable or disable the color fallback
    pub fn set_color_fallback(&mut self, enabled: bool) {
        self.config.color_fallback = enabled;
    }

    /// The color picker and its buffer
    pub fn color_picker(&self) -> &ColorPicker<B> {
        &self.color_picker
    }

    /// Ray pick only, under the cursor
    pub fn pick_ray<K: Clone>(
        &self,
        camera: &Camera,
        mouse: &MouseState,
        candidates: &[PickCandidate<K>],
    ) -> Option<RayPickHit<K>> {
        let (ndc_x, ndc_y) = mouse.screen_to_ndc();
        let ray = camera.screen_to_world_ray(ndc_x, ndc_y)?;
        self.ray_picker.find_nearest(&ray, candidates)
    }

    /// Pick the object under the cursor
    ///
    /// Tries the ray picker first. When it misses and the color fallback is
    /// enabled, runs a color pass: `draw` is called once per color-pickable
    /// candidate with the pass buffer and the color to draw it with.
    pub fn pick_at<K, F>(
        &mut self,
        camera: &Camera,
        mouse: &MouseState,
        candidates: &[PickCandidate<K>],
        draw: F,
    ) -> Result<Option<PickResult<K>>, PickingError>
    where
        K: Clone,
        F: FnMut(&mut B, &PickCandidate<K>, PickColor),
    {
        if let Some(hit) = self.pick_ray(camera, mouse, candidates) {
            log::debug!("Ray pick hit at distance {:.3}", hit.distance);
            return Ok(Some(PickResult {
                key: hit.key,
                method: PickMethod::Ray,
                distance: hit.distance,
            }));
        }

        if !self.config.color_fallback {
            return Ok(None);
        }
        let Some((x, y)) = mouse.pixel() else {
            return Ok(None);
        };

        let pass = self.draw_pass(mouse, candidates, draw)?;
        let hit = pass.read_point_with_depth(x, y, camera)?;
        log::debug!("Color pick at ({x}, {y}): {}", if hit.is_some() { "hit" } else { "miss" });

        Ok(hit.map(|pick| PickResult {
            key: pick.key,
            method: PickMethod::Color,
            distance: pick.linear_depth,
        }))
    }

    /// Every color-pickable object drawn inside `region`
    pub fn pick_region<K, F>(
        &mut self,
        mouse: &MouseState,
        region: PickRegion,
        candidates: &[PickCandidate<K>],
        draw: F,
    ) -> Result<Vec<K>, PickingError>
    where
        K: Clone,
        F: FnMut(&mut B, &PickCandidate<K>, PickColor),
    {
        self.draw_pass(mouse, candidates, draw)?.read_region(region)
    }

    /// Marquee selection under the current drag, empty when not dragging
    pub fn pick_drag<K, F>(
        &mut self,
        mouse: &MouseState,
        candidates: &[PickCandidate<K>],
        draw: F,
    ) -> Result<Vec<K>, PickingError>
    where
        K: Clone,
        F: FnMut(&mut B, &PickCandidate<K>, PickColor),
    {
        match mouse.drag_rect() {
            Some(rect) => self.pick_region(mouse, PickRegion::Rect(rect), candidates, draw),
            None => Ok(Vec::new()),
        }
    }

    fn draw_pass<K, F>(
        &mut self,
        mouse: &MouseState,
        candidates: &[PickCandidate<K>],
        mut draw: F,
    ) -> Result<PickPass<'_, B, K>, PickingError>
    where
        K: Clone,
        F: FnMut(&mut B, &PickCandidate<K>, PickColor),
    {
        let mut pass = self
            .color_picker
            .begin_pass(mouse.window_width, mouse.window_height)?;
        for candidate in candidates.iter().filter(|c| c.is_color_pickable()) {
            let color = pass.assign_color(candidate.key.clone());
            draw(pass.buffer_mut(), candidate, color);
        }
        Ok(pass)
    }
}
