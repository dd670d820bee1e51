/// Drawing-surface and text-element interfaces the renderer paints through.
///
/// Shaped after a 2D canvas context so the renderer reads like canvas code:
/// styles are strings, coordinates are `f64`, paths are built then stroked.
pub trait DrawingSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    fn set_stroke_style(&mut self, style: &str);
    fn set_fill_style(&mut self, style: &str);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
}

/// Anything with settable text content, like a DOM text node
pub trait TextElement {
    fn set_text_content(&mut self, text: &str);
    fn text_content(&self) -> &str;
}

/// Plain in-memory text element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusText(String);

impl StatusText {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextElement for StatusText {
    fn set_text_content(&mut self, text: &str) {
        self.0.clear();
        self.0.push_str(text);
    }

    fn text_content(&self) -> &str {
        &self.0
    }
}
