use std::time::{Duration, Instant};

use softras::color::Color;
use softras::export;
use softras::math::{vec4, Mat4, Vec4};
use softras::mesh;
use softras::rasterizer::{CullMode, Framebuffer, Rasterizer};
use softras::window::Window;

const WIDTH: usize = 800;
const HEIGHT: usize = 800;

enum Scene {
    Cube,
    Quad,
    Obj(String),
}

struct Args {
    scene: Scene,
    cull_mode: CullMode,
    png: Option<String>,
    ppm: Option<String>,
}

fn parse_args() -> Option<Args> {
    let mut ret = Args {
        scene: Scene::Cube,
        cull_mode: CullMode::None,
        png: None,
        ppm: None,
    };

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--quad" => ret.scene = Scene::Quad,
            "--obj" => {
                i += 1;
                ret.scene = Scene::Obj(args.get(i)?.clone());
            }
            "--cull" => {
                i += 1;
                ret.cull_mode = match args.get(i)?.as_str() {
                    "front" => CullMode::Front,
                    "back" => CullMode::Back,
                    "none" => CullMode::None,
                    _ => return None,
                };
            }
            "--png" => {
                i += 1;
                ret.png = Some(args.get(i)?.clone());
            }
            "--ppm" => {
                i += 1;
                ret.ppm = Some(args.get(i)?.clone());
            }
            _ => return None,
        }
        i += 1;
    }

    Some(ret)
}

fn model_matrix(t: f32) -> Mat4 {
    Mat4::rotate(vec4(0.0, 1.0, 0.0, 0.0), t)
        * Mat4::rotate(vec4(1.0, 0.0, 0.0, 0.0), 0.4)
        * Mat4::scale(vec4(0.6, 0.6, 0.6, 1.0))
}

fn fragment_shader(p: Vec4) -> Color {
    Color {
        r: (p.x / WIDTH as f32 * 255.0) as u8,
        g: (p.y / HEIGHT as f32 * 255.0) as u8,
        b: 0xb0,
        a: 0xff,
    }
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Some(args) => args,
        None => {
            eprintln!(
                "usage: softras [--quad | --obj <path>] [--cull front|back|none] \
                 [--png <path>] [--ppm <path>]"
            );
            std::process::exit(1);
        }
    };

    let vertices = match &args.scene {
        Scene::Cube => mesh::cube(1.0),
        Scene::Quad => mesh::quad(1.2),
        Scene::Obj(path) => match mesh::load_obj(path) {
            Ok(vertices) => vertices,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
    };

    let mut framebuffer = Framebuffer::new(WIDTH, HEIGHT);
    let mut rasterizer = Rasterizer::new(&mut framebuffer);
    rasterizer.set_cull_mode(args.cull_mode);

    // One-shot export renders a single frame without opening a window.
    if args.png.is_some() || args.ppm.is_some() {
        let model = model_matrix(0.8);
        if let Err(e) =
            rasterizer.render_vertex_buffer(&vertices, move |v| model * v, fragment_shader)
        {
            log::error!("{}", e);
            std::process::exit(1);
        }

        if let Some(path) = &args.png {
            if let Err(e) = export::write_png(path, rasterizer.framebuffer().color()) {
                log::error!("{}", e);
                std::process::exit(1);
            }
        }
        if let Some(path) = &args.ppm {
            if let Err(e) = export::write_ppm(path, rasterizer.framebuffer().color()) {
                log::error!("{}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut window = match Window::new("softras", WIDTH, HEIGHT) {
        Ok(window) => window,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    let mut avg = Duration::new(0, 0);
    let mut iterations = 0u32;

    loop {
        let t0 = Instant::now();

        let model = model_matrix(start.elapsed().as_secs_f32());
        let vertex_shader = move |v: Vec4| model * v;

        rasterizer.clear();
        if let Err(e) = rasterizer.render_vertex_buffer(&vertices, vertex_shader, fragment_shader) {
            log::error!("{}", e);
            return;
        }

        avg = (avg * iterations + t0.elapsed()) / (iterations + 1);
        iterations += 1;
        if iterations % 100 == 0 {
            log::debug!("average frame time: {:?}", avg);
        }

        window.display_frame_time(&avg);
        match window.present(rasterizer.framebuffer().color()) {
            Err(e) => {
                log::error!("{}", e);
                return;
            }
            Ok(false) => return,
            Ok(true) => (),
        }
    }
}
