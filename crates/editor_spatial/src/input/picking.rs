//! Mouse state for picking operations
//!
//! Converts window-space mouse positions to Normalized Device Coordinates
//! for ray picking and to pixel regions for color picking.

/// Pixels the cursor must travel with the button held before a press
/// counts as a drag rather than a click
pub const DRAG_THRESHOLD: f64 = 5.0;

/// Axis-aligned rectangle in framebuffer pixels, origin at the top left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PixelRect {
    /// Create a rectangle
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Single-pixel rectangle
    pub fn point(x: u32, y: u32) -> Self {
        Self::new(x, y, 1, 1)
    }

    /// True when the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Clip to a `width x height` viewport, `None` if nothing remains
    pub fn clipped(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);
        (self.x < x1 && self.y < y1).then(|| PixelRect::new(self.x, self.y, x1 - self.x, y1 - self.y))
    }

    /// Pixel coordinates covered, row by row
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y + self.height).flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x, y)))
    }
}

/// Screen region read back by a color-picking pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickRegion {
    /// One pixel
    Point {
        /// Column
        x: u32,
        /// Row
        y: u32,
    },
    /// Marquee rectangle
    Rect(PixelRect),
    /// Pixels whose centers lie within `radius` of a center pixel
    Circle {
        /// Center column
        x: u32,
        /// Center row
        y: u32,
        /// Radius in pixels
        radius: u32,
    },
}

impl PickRegion {
    /// Smallest rectangle containing the region
    pub fn bounding_rect(&self) -> PixelRect {
        match *self {
            PickRegion::Point { x, y } => PixelRect::point(x, y),
            PickRegion::Rect(rect) => rect,
            PickRegion::Circle { x, y, radius } => PixelRect::new(
                x.saturating_sub(radius),
                y.saturating_sub(radius),
                // Left and right spans may be clipped at zero
                x.saturating_add(radius + 1) - x.saturating_sub(radius),
                y.saturating_add(radius + 1) - y.saturating_sub(radius),
            ),
        }
    }

    /// Whether a pixel belongs to the region
    pub fn contains(&self, px: u32, py: u32) -> bool {
        match *self {
            PickRegion::Point { x, y } => px == x && py == y,
            PickRegion::Rect(rect) => {
                px >= rect.x && py >= rect.y && px - rect.x < rect.width && py - rect.y < rect.height
            }
            PickRegion::Circle { x, y, radius } => {
                let dx = i64::from(px) - i64::from(x);
                let dy = i64::from(py) - i64::from(y);
                dx * dx + dy * dy <= i64::from(radius) * i64::from(radius)
            }
        }
    }
}

/// Mouse state for picking operations
#[derive(Debug, Clone, PartialEq)]
pub struct MouseState {
    /// Current screen-space X position (pixels from left)
    pub screen_x: f64,
    /// Current screen-space Y position (pixels from top)
    pub screen_y: f64,
    /// Viewport width in pixels
    pub window_width: u32,
    /// Viewport height in pixels
    pub window_height: u32,
    /// Drag start position (None if not dragging)
    pub drag_start: Option<(f64, f64)>,
    /// Whether the picking button is currently held down
    pub button_down: bool,
}

impl MouseState {
    /// Create a new mouse state for a viewport
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            screen_x: 0.0,
            screen_y: 0.0,
            window_width,
            window_height,
            drag_start: None,
            button_down: false,
        }
    }

    /// Convert the cursor position to Normalized Device Coordinates
    ///
    /// NDC range is [-1, 1] with:
    /// - X: -1 = left, +1 = right
    /// - Y: -1 = bottom, +1 = top
    ///
    /// # Examples
    /// ```
    /// # use editor_spatial::input::MouseState;
    /// let mut mouse = MouseState::new(1920, 1080);
    /// mouse.update_position(0.0, 0.0);
    /// assert_eq!(mouse.screen_to_ndc(), (-1.0, 1.0));
    /// ```
    pub fn screen_to_ndc(&self) -> (f32, f32) {
        let width = f64::from(self.window_width.max(1));
        let height = f64::from(self.window_height.max(1));
        let ndc_x = (self.screen_x / width) as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - (self.screen_y / height) as f32 * 2.0;
        (ndc_x, ndc_y)
    }

    /// Pixel under the cursor, `None` outside the viewport
    pub fn pixel(&self) -> Option<(u32, u32)> {
        let inside = self.screen_x >= 0.0
            && self.screen_y >= 0.0
            && self.screen_x < f64::from(self.window_width)
            && self.screen_y < f64::from(self.window_height);
        inside.then(|| (self.screen_x as u32, self.screen_y as u32))
    }

    /// Update mouse position from window events
    pub fn update_position(&mut self, x: f64, y: f64) {
        self.screen_x = x;
        self.screen_y = y;
    }

    /// Update viewport size after a resize
    pub fn update_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Start a drag operation at the current mouse position
    pub fn start_drag(&mut self) {
        self.drag_start = Some((self.screen_x, self.screen_y));
        self.button_down = true;
    }

    /// End drag operation
    pub fn end_drag(&mut self) {
        self.drag_start = None;
        self.button_down = false;
    }

    /// Check if the held button has moved past [`DRAG_THRESHOLD`]
    pub fn is_dragging(&self) -> bool {
        match self.drag_start {
            Some((start_x, start_y)) if self.button_down => {
                let dx = self.screen_x - start_x;
                let dy = self.screen_y - start_y;
                dx.hypot(dy) >= DRAG_THRESHOLD
            }
            _ => false,
        }
    }

    /// Marquee rectangle in pixels, clipped to the viewport
    ///
    /// `None` unless a drag is in progress.
    pub fn drag_rect(&self) -> Option<PixelRect> {
        if !self.is_dragging() {
            return None;
        }
        let (start_x, start_y) = self.drag_start?;
        let clamp_x = |v: f64| v.clamp(0.0, f64::from(self.window_width)) as u32;
        let clamp_y = |v: f64| v.clamp(0.0, f64::from(self.window_height)) as u32;

        let x0 = clamp_x(start_x.min(self.screen_x));
        let x1 = clamp_x(start_x.max(self.screen_x));
        let y0 = clamp_y(start_y.min(self.screen_y));
        let y1 = clamp_y(start_y.max(self.screen_y));

        let rect = PixelRect::new(x0, y0, x1 - x0, y1 - y0);
        (!rect.is_empty()).then_some(rect)
    }
}

impl Default for MouseState {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_to_ndc_center() {
        let mut mouse = MouseState::new(1920, 1080);
        mouse.update_position(960.0, 540.0);

        let (ndc_x, ndc_y) = mouse.screen_to_ndc();
        assert!(ndc_x.abs() < 0.001);
        assert!(ndc_y.abs() < 0.001);
    }

    #[test]
    fn test_screen_to_ndc_corners() {
        let mut mouse = MouseState::new(1920, 1080);
        mouse.update_position(0.0, 1080.0);

        let (ndc_x, ndc_y) = mouse.screen_to_ndc();
        assert!((ndc_x - (-1.0)).abs() < 0.001); // Left edge
        assert!((ndc_y - (-1.0)).abs() < 0.001); // Bottom edge
    }

    #[test]
    fn test_click_is_not_a_drag() {
        let mut mouse = MouseState::new(800, 600);
        mouse.update_position(100.0, 100.0);
        mouse.start_drag();
        mouse.update_position(102.0, 101.0);
        assert!(!mouse.is_dragging());
        assert_eq!(mouse.drag_rect(), None);
    }

    #[test]
    fn test_drag_rect_is_normalized_and_clipped() {
        let mut mouse = MouseState::new(800, 600);
        mouse.update_position(300.0, 200.0);
        mouse.start_drag();
        mouse.update_position(-50.0, 250.0);
        assert!(mouse.is_dragging());
        assert_eq!(mouse.drag_rect(), Some(PixelRect::new(0, 200, 300, 50)));

        mouse.end_drag();
        assert_eq!(mouse.drag_rect(), None);
    }

    #[test]
    fn test_pixel_outside_viewport() {
        let mut mouse = MouseState::new(800, 600);
        mouse.update_position(799.5, 10.0);
        assert_eq!(mouse.pixel(), Some((799, 10)));
        mouse.update_position(800.0, 10.0);
        assert_eq!(mouse.pixel(), None);
    }

    #[test]
    fn test_rect_clipping() {
        let rect = PixelRect::new(790, 590, 20, 20);
        assert_eq!(rect.clipped(800, 600), Some(PixelRect::new(790, 590, 10, 10)));
        assert_eq!(PixelRect::new(900, 0, 5, 5).clipped(800, 600), None);
        assert_eq!(rect.pixels().count(), 400);
    }

    #[test]
    fn test_circle_region() {
        let region = PickRegion::Circle { x: 1, y: 10, radius: 2 };
        assert_eq!(region.bounding_rect(), PixelRect::new(0, 8, 4, 5));
        assert!(region.contains(1, 12));
        assert!(!region.contains(3, 12));
        assert!(region.contains(0, 10));
    }
}
