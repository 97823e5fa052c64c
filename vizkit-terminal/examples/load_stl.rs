/// Example: Load an STL file and view it in the terminal
///
/// Usage: cargo run --example load_stl -- path/to/file.stl
use std::env;
use std::io;
use vizkit_core::{Dataset, PolyData, Scene};
use vizkit_render::{Actor, Interpolation, NamedColors, Property, RenderWindow, Renderer};
use vizkit_terminal::TerminalApp;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut scene = Scene::new();

    let mesh = if args.len() < 2 {
        eprintln!("Usage: {} <stl-file>", args[0]);
        eprintln!("\nNo STL file provided, using default cube...");
        scene.add_dataset(Dataset::Mesh(PolyData::cube(2.0)))
    } else {
        println!("Loading STL file: {}", args[1]);
        scene
            .load(&args[1])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
    };
    println!("Loaded {} points", scene.dataset(mesh).number_of_points());

    let colors = NamedColors::new();
    let color = colors
        .color("Peacock")
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut renderer = Renderer::default();
    renderer.add_actor(Actor::new(
        mesh,
        Property::default()
            .with_color(color)
            .surface(Interpolation::Phong)
            .with_specular(0.4, 20.0),
    ));
    let mut window = RenderWindow::new(80, 48);
    window.add_renderer(renderer);
    window
        .reset_cameras(&scene)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut app = TerminalApp::new(scene, window)?;
    app.run()
}
