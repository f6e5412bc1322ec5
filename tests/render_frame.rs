use nightrail::{CpuRenderer, Scene, Viewport};

#[test]
fn full_scene_frame_is_opaque_and_non_trivial() {
    let viewport = Viewport::new(800, 600).unwrap();
    let scene = Scene::night_train(viewport, 1).unwrap();
    let mut renderer = CpuRenderer::new(viewport).unwrap();

    let frame = renderer.render(&scene).unwrap();
    assert_eq!((frame.width, frame.height), (800, 600));
    assert_eq!(frame.data.len(), 800 * 600 * 4);
    assert!(frame.premultiplied);

    // The sky is opaque, so everything composited over it is too.
    for px in frame.data.chunks_exact(4) {
        assert_eq!(px[3], 255);
    }

    // Mountains, ground and train must leave the frame partly non-sky.
    let sky = [0x02, 0x1F, 0x4B, 0xFF];
    let non_sky = frame
        .data
        .chunks_exact(4)
        .filter(|px| *px != sky)
        .count();
    assert!(non_sky > 800 * 600 / 10);
    assert!(non_sky < 800 * 600);
}

#[test]
fn frames_change_as_the_scene_ticks() {
    let viewport = Viewport::new(400, 300).unwrap();
    let mut scene = Scene::night_train(viewport, 1).unwrap();
    let mut renderer = CpuRenderer::new(viewport).unwrap();

    let first = renderer.render(&scene).unwrap();
    for _ in 0..10 {
        scene.tick(1.0).unwrap();
    }
    let later = renderer.render(&scene).unwrap();

    assert_ne!(first.data, later.data);
}

#[test]
fn same_pose_renders_identically() {
    let viewport = Viewport::new(400, 300).unwrap();
    let scene = Scene::night_train(viewport, 8).unwrap();
    let mut renderer = CpuRenderer::new(viewport).unwrap();

    let a = renderer.render(&scene).unwrap();
    let b = renderer.render(&scene).unwrap();
    assert_eq!(a.data, b.data);
}
