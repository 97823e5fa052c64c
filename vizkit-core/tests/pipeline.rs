use std::fs;

use nalgebra::{Point3, Vector3};
use tempfile::tempdir;
use vizkit_core::filters::isosurface;
use vizkit_core::stl::write_binary_stl;
use vizkit_core::{load_dataset, Dataset, ImageVolume, Plane, Scene, Stage, VizError};

/// Write a sphere isosurface as binary STL and return its path
fn sphere_stl(dir: &std::path::Path) -> std::path::PathBuf {
    let volume = ImageVolume::from_fn([17, 17, 17], [1.0; 3], Point3::new(-8.0, -8.0, -8.0), |p| {
        p.coords.norm()
    })
    .unwrap();
    let surface = isosurface(&volume, 5.3, false);
    let triangles: Vec<_> = surface.iter_triangles().collect();
    let path = dir.join("sphere.stl");
    fs::write(&path, write_binary_stl(&triangles)).unwrap();
    path
}

#[test]
fn loading_twice_gives_same_point_count() {
    let dir = tempdir().unwrap();
    let path = sphere_stl(dir.path());

    let first = load_dataset(&path).unwrap();
    let second = load_dataset(&path).unwrap();
    assert!(first.number_of_points() > 100);
    assert_eq!(first.number_of_points(), second.number_of_points());
}

#[test]
fn opposite_clips_cover_the_mesh() {
    let dir = tempdir().unwrap();
    let mut scene = Scene::new();
    let mesh = scene.load(sphere_stl(dir.path())).unwrap();
    let original = scene.dataset(mesh).number_of_points();
    let center = scene.dataset(mesh).bounds().center();

    for normal in [Vector3::z(), Vector3::x(), Vector3::new(1.0, 1.0, 0.3)] {
        let plane = Plane::new(center, normal).unwrap();
        let kept = scene.run(mesh, Stage::Clip { plane }).unwrap();
        let rest = scene
            .run(mesh, Stage::Clip { plane: plane.flipped() })
            .unwrap();
        let kept = scene.geometry(kept.into()).unwrap().number_of_points();
        let rest = scene.geometry(rest.into()).unwrap().number_of_points();
        assert!(kept > 0 && rest > 0);
        assert!(kept + rest >= original, "{} + {} < {}", kept, rest, original);
    }
}

#[test]
fn cut_of_sphere_is_one_closed_loop() {
    let dir = tempdir().unwrap();
    let mut scene = Scene::new();
    let mesh = scene.load(sphere_stl(dir.path())).unwrap();
    let plane = Plane::new(Point3::new(0.0, 0.0, 0.25), Vector3::z()).unwrap();
    let cut = scene.run(mesh, Stage::Cut { plane }).unwrap();
    let section = scene.geometry(cut.into()).unwrap();

    assert_eq!(section.lines.len(), 1);
    let line = &section.lines[0];
    assert_eq!(line.first(), line.last());
    for &i in line {
        let p = section.points[i as usize];
        assert!((p.z - 0.25).abs() < 1e-4);
    }
}

#[test]
fn missing_and_unsupported_inputs() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_dataset(dir.path().join("nope.stl")),
        Err(VizError::NotFound { .. })
    ));

    let text = dir.path().join("notes.txt");
    fs::write(&text, "hello").unwrap();
    assert!(matches!(
        load_dataset(&text),
        Err(VizError::UnsupportedFormat { .. })
    ));

    let broken = dir.path().join("broken.stl");
    fs::write(&broken, [0u8; 20]).unwrap();
    assert!(matches!(
        load_dataset(&broken),
        Err(VizError::UnsupportedFormat { .. })
    ));
}

#[test]
fn isosurface_stage_reads_volumes_only() {
    let volume = ImageVolume::from_fn([5, 5, 5], [1.0; 3], Point3::origin(), |p| p.x).unwrap();
    let mut scene = Scene::new();
    let id = scene.add_dataset(Dataset::Volume(volume));
    let iso = scene
        .run(
            id,
            Stage::Isosurface {
                value: 2.5,
                compute_normals: true,
            },
        )
        .unwrap();
    let surface = scene.geometry(iso.into()).unwrap();
    assert!(!surface.is_empty());
    assert!(surface.points.iter().all(|p| (p.x - 2.5).abs() < 1e-4));

    let plane = Plane::new(Point3::origin(), Vector3::z()).unwrap();
    assert!(matches!(
        scene.run(id, Stage::Clip { plane }),
        Err(VizError::Configuration { .. })
    ));
}
