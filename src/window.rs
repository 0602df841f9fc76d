use crate::rasterizer::ColorBuffer;

/// Presents a finished color buffer in a minifb window.
pub struct Window {
    window: minifb::Window,
    scratch: Vec<u32>,
    width: usize,
    height: usize,
    frame_time_idx: usize,
}

impl Window {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, minifb::Error> {
        let window = minifb::Window::new(title, width, height, minifb::WindowOptions::default())?;

        Ok(Self {
            window,
            scratch: vec![0; width * height],
            width,
            height,
            frame_time_idx: 0,
        })
    }

    /// Blits the color buffer. Returns Ok(false) once the window has been
    /// closed or escape pressed.
    pub fn present(&mut self, color_buffer: &ColorBuffer) -> minifb::Result<bool> {
        if !self.window.is_open() || self.window.is_key_down(minifb::Key::Escape) {
            return Ok(false);
        }

        debug_assert_eq!(color_buffer.data().len(), self.scratch.len());
        for (out, color) in self.scratch.iter_mut().zip(color_buffer.data()) {
            *out = color.to_argb();
        }

        self.window.update_with_buffer(&self.scratch)?;

        Ok(true)
    }

    pub fn display_frame_time(&mut self, d: &std::time::Duration) {
        if self.frame_time_idx == 10 {
            let t = d.as_secs_f32();
            self.window.set_title(
                format!("softras FPS: {:.2}, ({:.2} ms)", 1.0f32 / t, t * 1000.0f32).as_str(),
            );
            self.frame_time_idx = 0;
        } else {
            self.frame_time_idx += 1;
        }
    }
}
