//! The three visualization programs, built as scene + window pairs.
use std::path::Path;

use nalgebra::{Point3, Vector3};
use tracing::info;
use vizkit_core::filters::PLANE_OUTLINE_SAMPLES;
use vizkit_core::{Camera, DatasetId, GeometryId, Plane, Scene, Stage, VizResult};
use vizkit_render::{
    Actor, Color, ColorTransferFunction, Interpolation, NamedColors, PiecewiseFunction, Property,
    RenderWindow, Renderer, Viewport, VolumeActor, VolumeInterpolation, VolumeProperty,
};

use crate::config::{SceneConfig, SceneKind};

/// A ready-to-render scene
pub struct Prepared {
    pub scene: Scene,
    pub window: RenderWindow,
    /// Dataset facts printed to stdout
    pub report: Vec<String>,
}

/// Load `input` and lay out the scene for `kind`
pub fn prepare(
    kind: SceneKind,
    input: &Path,
    config: &SceneConfig,
    colors: &NamedColors,
) -> VizResult<Prepared> {
    let mut scene = Scene::new();
    let dataset = scene.load(input)?;
    let (window, report) = match kind {
        SceneKind::Shading => shading_scene(&scene, dataset, config, colors)?,
        SceneKind::Clip => clip_scene(&mut scene, dataset, config, colors)?,
        SceneKind::Volume => volume_scene(&mut scene, dataset, config)?,
    };
    info!(
        scene = %kind,
        input = %input.display(),
        renderers = window.renderers().len(),
        "Scene ready"
    );
    Ok(Prepared {
        scene,
        window,
        report,
    })
}

fn new_window(kind: SceneKind, config: &SceneConfig) -> RenderWindow {
    let [width, height] = config.window_size(kind);
    let mut window = RenderWindow::new(width, height);
    window.title = kind.window_title().to_string();
    window
}

/// Wireframe, flat, Gouraud and Phong views of one mesh
pub fn shading_scene(
    scene: &Scene,
    mesh: DatasetId,
    config: &SceneConfig,
    colors: &NamedColors,
) -> VizResult<(RenderWindow, Vec<String>)> {
    let points = scene.geometry(mesh.into())?.number_of_points();

    let properties = [
        Property::default().wireframe(),
        Property::default()
            .with_color(colors.color("Gold")?)
            .surface(Interpolation::Flat),
        Property::default()
            .with_color(colors.color("SaddleBrown")?)
            .surface(Interpolation::Gouraud),
        Property::default()
            .with_color(colors.color("Teal")?)
            .surface(Interpolation::Phong),
    ];

    let mut window = new_window(SceneKind::Shading, config);
    // Top-left, top-right, bottom-left, bottom-right
    for (viewport, property) in Viewport::grid(2, 2).into_iter().zip(properties) {
        let mut renderer = Renderer::new(viewport);
        renderer.add_actor(Actor::new(mesh, property));
        window.add_renderer(renderer);
    }
    window.reset_cameras(scene)?;

    Ok((window, vec![format!("Number of vertices: {}", points)]))
}

/// Mesh clipped at its center: cut-away wireframe, kept part, section and plane
pub fn clip_scene(
    scene: &mut Scene,
    mesh: DatasetId,
    config: &SceneConfig,
    colors: &NamedColors,
) -> VizResult<(RenderWindow, Vec<String>)> {
    let bounds = scene.dataset(mesh).bounds();
    let center = bounds.center();
    let plane = Plane::new(center, Vector3::z())?;
    let auxiliary = Plane::new(center, -Vector3::z())?;

    let clipped = scene.run(mesh, Stage::Clip { plane })?;
    let remaining = scene.run(mesh, Stage::Clip { plane: auxiliary })?;
    let section = scene.run(mesh, Stage::Cut { plane })?;
    let outline = scene.run(
        mesh,
        Stage::PlaneOutline {
            plane,
            bounds,
            samples: PLANE_OUTLINE_SAMPLES,
        },
    )?;

    let mut renderer = Renderer::default().with_background(Color::new(0.95, 0.95, 0.95));
    renderer.add_actor(Actor::new(
        clipped,
        Property::default().with_color(Color::BLACK).wireframe(),
    ));
    renderer.add_actor(Actor::new(
        remaining,
        Property::default().with_color(colors.color("Orange")?),
    ));
    renderer.add_actor(Actor::new(
        section,
        Property::default().with_color(colors.color("Red")?),
    ));
    renderer.add_actor(Actor::new(
        outline,
        Property::default()
            .with_color(colors.color("Yellow")?)
            .wireframe(),
    ));
    renderer.reset_camera(scene)?;

    let mut window = new_window(SceneKind::Clip, config);
    window.add_renderer(renderer);

    let reported: [GeometryId; 3] = [mesh.into(), clipped.into(), remaining.into()];
    let report = reported
        .into_iter()
        .map(|id| scene.geometry(id).map(|g| g.number_of_points().to_string()))
        .collect::<VizResult<Vec<_>>>()?;
    Ok((window, report))
}

/// Volume, isosurface and both together, side by side
pub fn volume_scene(
    scene: &mut Scene,
    volume: DatasetId,
    config: &SceneConfig,
) -> VizResult<(RenderWindow, Vec<String>)> {
    let data = scene.volume(volume)?;
    let [nx, ny, nz] = data.dimensions();
    let [sx, sy, sz] = data.spacing();
    let (min, max) = data.scalar_range();
    let report = vec![
        format!("Dimensions of the Image:  ({}, {}, {})", nx, ny, nz),
        format!("Voxel Dimensions:  ({}, {}, {})", sx, sy, sz),
        format!("Minimum Pixel Intensity:  {}", min),
        format!("Maximum Pixel Intensity:  {}", max),
    ];

    let iso = scene.run(
        volume,
        Stage::Isosurface {
            value: config.iso_value,
            compute_normals: true,
        },
    )?;

    let mut color = ColorTransferFunction::new();
    color
        .add_rgb_point(0.0, 0.0, 0.0, 0.0)
        .add_rgb_point(255.0, 1.0, 0.5, 0.0);
    let mut opacity = PiecewiseFunction::new();
    opacity.add_point(0.0, 0.0).add_point(255.0, 1.0);
    let property =
        VolumeProperty::new(color, opacity).with_interpolation(VolumeInterpolation::Linear);
    let iso_property = Property::default().with_color(Color::new(1.0, 0.0, 0.0));

    let backgrounds = [
        Color::new(0.1, 0.2, 0.3),
        Color::new(0.5, 0.5, 0.5),
        Color::new(0.9, 0.8, 0.7),
    ];
    let [px, py, pz] = config.camera_position;
    let [fx, fy, fz] = config.focal_point;

    let mut window = new_window(SceneKind::Volume, config);
    for (index, (viewport, background)) in Viewport::row(3)
        .into_iter()
        .zip(backgrounds)
        .enumerate()
    {
        let mut renderer = Renderer::new(viewport).with_background(background);
        if index != 1 {
            renderer.add_volume(VolumeActor::new(volume, property.clone()));
        }
        if index != 0 {
            renderer.add_actor(Actor::new(iso, iso_property.clone()));
        }
        renderer.camera = Camera::looking_at(Point3::new(px, py, pz), Point3::new(fx, fy, fz));
        renderer.reset_camera(scene)?;
        window.add_renderer(renderer);
    }

    Ok((window, report))
}
