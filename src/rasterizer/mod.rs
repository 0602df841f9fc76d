use thiserror::Error;

use crate::color::Color;
use crate::math::{vec4, Vec4};

mod bounding_box;
mod buffers;

pub use crate::rasterizer::bounding_box::PixelBoundingBox;
pub use crate::rasterizer::buffers::{Buffer, ColorBuffer, DepthBuffer, Framebuffer, CLEAR_DEPTH};

/// Vertex winding order of front face triangles, as seen in NDC (y up).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WindingOrder {
    Clockwise,
    CounterClockwise,
}

impl Default for WindingOrder {
    fn default() -> Self {
        WindingOrder::CounterClockwise
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CullMode {
    Front,
    Back,
    None,
}

impl Default for CullMode {
    fn default() -> Self {
        CullMode::None
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("vertex buffer length {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
}

pub fn default_vertex_shader(pos: Vec4) -> Vec4 {
    pos
}

pub fn default_fragment_shader(_: Vec4) -> Color {
    Color::blue()
}

// Signed area of the triangle (a, b, c), negative for counter-clockwise
// vertex order in screen space (y down).
fn triangle_signed_area(a: Vec4, b: Vec4, c: Vec4) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn blend_colors(src: Color, dest: Color) -> Color {
    let factor_src = src.a as f32 / 255.0;
    let factor_dest = 1.0 - factor_src;
    src * factor_src + dest * factor_dest
}

/// The pipeline state machine. Borrows the framebuffer exclusively; callers
/// get access back through [framebuffer()](Rasterizer::framebuffer) between
/// draw calls, or by letting the rasterizer go out of scope.
pub struct Rasterizer<'fb> {
    framebuffer: &'fb mut Framebuffer,
    winding_order: WindingOrder,
    cull_mode: CullMode,
}

impl<'fb> Rasterizer<'fb> {
    pub fn new(framebuffer: &'fb mut Framebuffer) -> Self {
        framebuffer.clear();
        Self {
            framebuffer,
            winding_order: WindingOrder::default(),
            cull_mode: CullMode::default(),
        }
    }

    pub fn clear(&mut self) {
        self.framebuffer.clear();
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.framebuffer
    }

    pub fn winding_order(&self) -> WindingOrder {
        self.winding_order
    }

    pub fn set_winding_order(&mut self, winding_order: WindingOrder) {
        self.winding_order = winding_order;
    }

    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }

    pub fn set_cull_mode(&mut self, cull_mode: CullMode) {
        self.cull_mode = cull_mode;
    }

    /// Draws every consecutive vertex triple as one triangle, in input
    /// order. The buffer length must be a multiple of 3; nothing is drawn
    /// otherwise.
    pub fn render_vertex_buffer(
        &mut self,
        vertices: &[Vec4],
        vs: impl Fn(Vec4) -> Vec4,
        fs: impl Fn(Vec4) -> Color,
    ) -> Result<(), DrawError> {
        if vertices.len() % 3 != 0 {
            return Err(DrawError::IncompleteTriangle(vertices.len()));
        }

        log::trace!("rasterizing {} triangles", vertices.len() / 3);
        for triangle in vertices.chunks(3) {
            self.draw_triangle(triangle[0], triangle[1], triangle[2], &vs, &fs);
        }

        Ok(())
    }

    //
    //                (y)
    //                 1 (-z)
    //                 ^  -1
    //                 |  /
    //                 | /
    //                 |/
    // (-x) -1 -----------------> 1 (x)
    //                /|
    //               / |
    //              /  |
    //             1  -1
    //            (z)(-y)
    //
    pub fn draw_triangle(
        &mut self,
        a_ndc: Vec4,
        b_ndc: Vec4,
        c_ndc: Vec4,
        vs: impl Fn(Vec4) -> Vec4,
        fs: impl Fn(Vec4) -> Color,
    ) {
        let a = self.viewport_transform(vs(a_ndc));
        let b = self.viewport_transform(vs(b_ndc));
        let c = self.viewport_transform(vs(c_ndc));

        let width = self.framebuffer.width();
        let height = self.framebuffer.height();
        let aabb = match PixelBoundingBox::for_viewport(&[a, b, c], width, height) {
            Some(aabb) => aabb,
            None => return,
        };

        let abc = triangle_signed_area(a, b, c);
        if abc == 0.0 {
            // Degenerate triangle
            return;
        }

        for y in aabb.min_y..aabb.max_y {
            for x in aabb.min_x..aabb.max_x {
                let p = vec4(x as f32, y as f32, 0.0, 1.0);

                let abp = triangle_signed_area(a, b, p);
                let bcp = triangle_signed_area(b, c, p);
                let cap = triangle_signed_area(c, a, p);

                // Pixels exactly on an edge satisfy both, so shared edges
                // between adjacent triangles are never dropped.
                let cw = abp >= 0.0 && bcp >= 0.0 && cap >= 0.0;
                let ccw = abp <= 0.0 && bcp <= 0.0 && cap <= 0.0;

                let (front, back) = self.faces_from_winding_order(cw, ccw);
                if !self.apply_culling(front, back) {
                    continue;
                }

                let weight_a = bcp / abc;
                let weight_b = cap / abc;
                let weight_c = abp / abc;
                if !weight_a.is_finite() || !weight_b.is_finite() || !weight_c.is_finite() {
                    continue;
                }

                let depth = weight_a * a.z + weight_b * b.z + weight_c * c.z;
                if depth < self.framebuffer.depth().get(x, y) {
                    continue;
                }

                let src = fs(p);
                let dest = self.framebuffer.color().get(x, y);
                let blended = blend_colors(src, dest);

                self.framebuffer.color_mut().write(x, y, blended);
                self.framebuffer.depth_mut().write(x, y, depth);
            }
        }
    }

    // NDC [-1, 1] (y up) to pixel space [0, W] x [0, H] (y down). z and w
    // pass through.
    fn viewport_transform(&self, v: Vec4) -> Vec4 {
        vec4(
            (v.x + 1.0) / 2.0 * self.framebuffer.width() as f32,
            (1.0 - v.y) / 2.0 * self.framebuffer.height() as f32,
            v.z,
            v.w,
        )
    }

    fn faces_from_winding_order(&self, cw: bool, ccw: bool) -> (bool, bool) {
        match self.winding_order {
            WindingOrder::Clockwise => (cw, ccw),
            WindingOrder::CounterClockwise => (ccw, cw),
        }
    }

    fn apply_culling(&self, front: bool, back: bool) -> bool {
        match self.cull_mode {
            CullMode::Front => back,
            CullMode::Back => front,
            CullMode::None => front || back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The 4x4 scenarios below use the lower-right half of the viewport:
    // in pixel space that is every (x, y) with x + y >= 4.
    fn lower_right() -> [Vec4; 3] {
        [
            vec4(-1.0, -1.0, 0.0, 1.0),
            vec4(1.0, -1.0, 0.0, 1.0),
            vec4(1.0, 1.0, 0.0, 1.0),
        ]
    }

    fn upper_left() -> [Vec4; 3] {
        [
            vec4(-1.0, -1.0, 0.0, 1.0),
            vec4(1.0, 1.0, 0.0, 1.0),
            vec4(-1.0, 1.0, 0.0, 1.0),
        ]
    }

    // Counter-clockwise in NDC and spans every pixel of a 4x4 viewport.
    fn full_screen() -> [Vec4; 3] {
        [
            vec4(-1.0, -1.0, 0.0, 1.0),
            vec4(3.0, -1.0, 0.0, 1.0),
            vec4(-1.0, 3.0, 0.0, 1.0),
        ]
    }

    fn at_depth(vertices: [Vec4; 3], z: f32) -> [Vec4; 3] {
        [
            vec4(vertices[0].x, vertices[0].y, z, 1.0),
            vec4(vertices[1].x, vertices[1].y, z, 1.0),
            vec4(vertices[2].x, vertices[2].y, z, 1.0),
        ]
    }

    fn draw(rasterizer: &mut Rasterizer, vertices: [Vec4; 3], color: Color) {
        rasterizer.draw_triangle(
            vertices[0],
            vertices[1],
            vertices[2],
            default_vertex_shader,
            move |_| color,
        );
    }

    fn count_written(rasterizer: &Rasterizer) -> usize {
        let fb = rasterizer.framebuffer();
        let mut written = 0;
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                if fb.depth().get(x, y) != CLEAR_DEPTH {
                    written += 1;
                }
            }
        }
        written
    }

    #[test]
    fn fill_lower_right_half() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        let [a, b, c] = lower_right();
        rasterizer.draw_triangle(a, b, c, default_vertex_shader, default_fragment_shader);

        for y in 0..4 {
            for x in 0..4 {
                let inside = x + y >= 4;
                let color = rasterizer.framebuffer().color().get(x, y);
                let depth = rasterizer.framebuffer().depth().get(x, y);
                if inside {
                    assert_eq!(color, Color::blue(), "({}, {})", x, y);
                    assert_eq!(depth, 0.0, "({}, {})", x, y);
                } else {
                    assert_eq!(color, Color::black(), "({}, {})", x, y);
                    assert_eq!(depth, CLEAR_DEPTH, "({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn shared_edge_is_drawn_by_both() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        draw(&mut rasterizer, lower_right(), Color::red());
        draw(&mut rasterizer, upper_left(), Color::green());

        // The two halves cover the whole viewport. Pixels on the shared
        // hypotenuse pass for both triangles, so the later draw wins there.
        assert_eq!(count_written(&rasterizer), 16);
        for &(x, y) in &[(1, 3), (2, 2), (3, 1)] {
            assert_eq!(rasterizer.framebuffer().color().get(x, y), Color::green());
        }
        assert_eq!(rasterizer.framebuffer().color().get(3, 3), Color::red());
        assert_eq!(rasterizer.framebuffer().color().get(3, 2), Color::red());
        assert_eq!(rasterizer.framebuffer().color().get(0, 0), Color::green());
    }

    #[test]
    fn degenerate_triangle_is_skipped() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        rasterizer.draw_triangle(
            vec4(-1.0, -1.0, 0.0, 1.0),
            vec4(1.0, -1.0, 0.0, 1.0),
            vec4(-1.0, -1.0, 0.0, 1.0),
            default_vertex_shader,
            default_fragment_shader,
        );

        assert_eq!(count_written(&rasterizer), 0);
    }

    #[test]
    fn depth_test_keeps_nearest() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        draw(&mut rasterizer, full_screen(), Color::white());
        // Covers only pixel (2, 2), nearer than the first triangle.
        let small = [
            vec4(-0.2, -0.2, 0.5, 1.0),
            vec4(0.4, -0.2, 0.5, 1.0),
            vec4(0.4, 0.4, 0.5, 1.0),
        ];
        draw(&mut rasterizer, small, Color::red());

        for y in 0..4 {
            for x in 0..4 {
                let color = rasterizer.framebuffer().color().get(x, y);
                let depth = rasterizer.framebuffer().depth().get(x, y);
                if (x, y) == (2, 2) {
                    assert_eq!(color, Color::red());
                    assert_eq!(depth, 0.5);
                } else {
                    assert_eq!(color, Color::white(), "({}, {})", x, y);
                    assert_eq!(depth, 0.0, "({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn farther_triangle_loses() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        draw(&mut rasterizer, at_depth(full_screen(), 0.5), Color::white());
        draw(&mut rasterizer, at_depth(full_screen(), 0.0), Color::red());

        assert_eq!(rasterizer.framebuffer().color().get(1, 1), Color::white());
        assert_eq!(rasterizer.framebuffer().depth().get(1, 1), 0.5);
    }

    #[test]
    fn equal_depth_last_submission_wins() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        draw(&mut rasterizer, full_screen(), Color::white());
        draw(&mut rasterizer, full_screen(), Color::red());

        assert_eq!(rasterizer.framebuffer().color().get(1, 1), Color::red());
    }

    #[test]
    fn rejects_partial_triangles() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        let vertices = vec![
            vec4(-1.0, -1.0, 0.0, 1.0),
            vec4(1.0, -1.0, 0.0, 1.0),
            vec4(1.0, 1.0, 0.0, 1.0),
            vec4(-1.0, 1.0, 0.0, 1.0),
        ];

        let result = rasterizer.render_vertex_buffer(
            &vertices,
            default_vertex_shader,
            default_fragment_shader,
        );

        assert_eq!(result, Err(DrawError::IncompleteTriangle(4)));
        assert_eq!(count_written(&rasterizer), 0);
    }

    #[test]
    fn renders_vertex_buffer_in_triples() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        let mut vertices = Vec::new();
        vertices.extend_from_slice(&lower_right());
        vertices.extend_from_slice(&upper_left());

        rasterizer
            .render_vertex_buffer(&vertices, default_vertex_shader, default_fragment_shader)
            .unwrap();

        assert_eq!(count_written(&rasterizer), 16);
    }

    #[test]
    fn cull_modes() {
        // Clockwise in NDC, so a back face under the default winding order.
        let clockwise = [
            vec4(-1.0, -1.0, 0.0, 1.0),
            vec4(1.0, 1.0, 0.0, 1.0),
            vec4(1.0, -1.0, 0.0, 1.0),
        ];

        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        rasterizer.set_cull_mode(CullMode::Back);
        draw(&mut rasterizer, clockwise, Color::red());
        assert_eq!(count_written(&rasterizer), 0);

        rasterizer.clear();
        rasterizer.set_cull_mode(CullMode::Front);
        draw(&mut rasterizer, clockwise, Color::red());
        assert_eq!(count_written(&rasterizer), 6);

        rasterizer.clear();
        rasterizer.set_cull_mode(CullMode::None);
        draw(&mut rasterizer, clockwise, Color::red());
        assert_eq!(count_written(&rasterizer), 6);
    }

    #[test]
    fn winding_order_flips_faces() {
        let clockwise = [
            vec4(-1.0, -1.0, 0.0, 1.0),
            vec4(1.0, 1.0, 0.0, 1.0),
            vec4(1.0, -1.0, 0.0, 1.0),
        ];

        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        rasterizer.set_winding_order(WindingOrder::Clockwise);
        rasterizer.set_cull_mode(CullMode::Back);
        draw(&mut rasterizer, clockwise, Color::red());
        assert_eq!(count_written(&rasterizer), 6);
    }

    #[test]
    fn vertex_shader_runs_before_viewport_transform() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        let [a, b, c] = lower_right();
        // Shift the triangle out of the viewport entirely.
        rasterizer.draw_triangle(
            a,
            b,
            c,
            |v| vec4(v.x - 2.0, v.y, v.z, v.w),
            default_fragment_shader,
        );
        assert_eq!(count_written(&rasterizer), 0);
    }

    #[test]
    fn transparent_source_keeps_destination_color() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        draw(&mut rasterizer, full_screen(), Color::white());

        let transparent = Color {
            r: 0xff,
            g: 0x0,
            b: 0x0,
            a: 0x0,
        };
        draw(&mut rasterizer, at_depth(full_screen(), 0.5), transparent);

        assert_eq!(rasterizer.framebuffer().color().get(1, 1), Color::white());
        assert_eq!(rasterizer.framebuffer().depth().get(1, 1), 0.5);
    }

    #[test]
    fn nan_vertices_are_ignored() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        let nan = f32::NAN;
        draw(
            &mut rasterizer,
            [
                vec4(nan, nan, 0.0, 1.0),
                vec4(1.0, -1.0, 0.0, 1.0),
                vec4(1.0, 1.0, 0.0, 1.0),
            ],
            Color::red(),
        );
        draw(
            &mut rasterizer,
            [
                vec4(nan, nan, nan, nan),
                vec4(nan, nan, nan, nan),
                vec4(nan, nan, nan, nan),
            ],
            Color::red(),
        );
        assert_eq!(count_written(&rasterizer), 0);
    }

    #[test]
    fn construction_clears_and_defaults() {
        let mut fb = Framebuffer::new(4, 4);
        fb.color_mut().write(0, 0, Color::red());
        fb.depth_mut().write(0, 0, 0.7);

        let rasterizer = Rasterizer::new(&mut fb);
        assert_eq!(rasterizer.winding_order(), WindingOrder::CounterClockwise);
        assert_eq!(rasterizer.cull_mode(), CullMode::None);
        assert_eq!(rasterizer.framebuffer().color().get(0, 0), Color::black());
        assert_eq!(rasterizer.framebuffer().depth().get(0, 0), CLEAR_DEPTH);
    }

    #[test]
    fn clear_resets_previous_draw() {
        let mut fb = Framebuffer::new(4, 4);
        let mut rasterizer = Rasterizer::new(&mut fb);
        draw(&mut rasterizer, full_screen(), Color::white());
        assert_eq!(count_written(&rasterizer), 16);

        rasterizer.clear();
        assert_eq!(count_written(&rasterizer), 0);
        assert_eq!(rasterizer.framebuffer().color().get(2, 2), Color::black());
    }

    #[test]
    fn default_shaders() {
        assert_eq!(default_vertex_shader(vec4(0.1, 0.2, 0.3, 1.0)), vec4(0.1, 0.2, 0.3, 1.0));
        assert_eq!(default_fragment_shader(vec4(0.0, 0.0, 0.0, 1.0)), Color::blue());
    }
}
