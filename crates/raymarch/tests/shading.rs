use glam::{Vec2, Vec3};
use raymarch::camera::step_brightness;
use raymarch::{
    distance_field, ray_march, render_frame, FieldParams, FrameInputs, Orientation, Scene,
    Tunables, Variant, BACKGROUND, MAX_DIST, MAX_STEPS,
};

fn sample_inputs() -> FrameInputs {
    FrameInputs {
        time: 4.25,
        pointer: Vec2::new(0.08, 0.03),
        orientation: Orientation::new(0.6, 0.4, 1.1),
        aspect: 4.0 / 3.0,
        tunables: Tunables {
            zoom: 2.5,
            radius: 0.03,
            iterations: 12,
        },
    }
}

#[test]
fn escaping_ray_uses_background_colour() {
    let params = FieldParams::default();
    let result = ray_march(
        Vec3::new(0.0, 0.0, -100.0),
        Vec3::new(0.0, 0.0, -1.0),
        MAX_STEPS,
        &params,
    );
    assert!(result.distance > MAX_DIST || result.steps == MAX_STEPS);

    // Rays that start far away and point off-axis never reach the fractal.
    let scene = Scene::new(
        Variant::Tunable,
        FrameInputs {
            tunables: Tunables {
                zoom: 1.0,
                ..Tunables::default()
            },
            ..FrameInputs::default()
        },
    );
    let corner = scene.shade_sample(Vec2::new(0.0, 1.0));
    let march = corner.march.expect("raymarch variant");
    assert!(march.escaped(), "corner ray should leave the field: {march:?}");
    assert_eq!(corner.base, BACKGROUND);
    assert_eq!(
        corner.color(),
        (BACKGROUND * step_brightness(march.steps)).extend(1.0)
    );
}

#[test]
fn frames_do_not_depend_on_worker_count() {
    let scene = Scene::new(Variant::Tunable, sample_inputs());
    let single = render_frame(&scene, 24, 18, 1).expect("single worker");
    let pooled = render_frame(&scene, 24, 18, 5).expect("worker pool");
    assert_eq!(single, pooled);
    assert_eq!(single.pixels().len(), 24 * 18);
    assert_eq!(single.to_rgba8().len(), 24 * 18 * 4);
}

#[test]
fn every_variant_produces_opaque_pixels() {
    for variant in Variant::ALL {
        let scene = Scene::new(variant, sample_inputs());
        let frame = render_frame(&scene, 9, 7, 0).expect("render");
        for pixel in frame.pixels() {
            assert_eq!(pixel[3], 1.0, "{variant}");
            assert!(pixel[..3].iter().all(|c| c.is_finite() && *c >= 0.0 && *c <= 1.0));
        }
    }
}

#[test]
fn field_and_march_stay_bounded_over_a_grid() {
    let params = FieldParams::new(Orientation::new(2.0, 0.5, 4.0), Tunables::default());
    for i in 0..16 {
        let angle = i as f32 / 16.0 * std::f32::consts::TAU;
        let dir = Vec3::new(angle.cos() * 0.4, angle.sin() * 0.4, 1.0).normalize();
        let result = ray_march(Vec3::new(0.0, 0.0, -5.5), dir, MAX_STEPS, &params);
        assert!(result.steps <= MAX_STEPS);
        let sample = distance_field(Vec3::new(0.0, 0.0, -5.5) + dir * 3.0, &params);
        assert!(sample.distance.is_finite());
    }
}

#[test]
fn pointer_variant_ignores_sliders() {
    let mut inputs = sample_inputs();
    let baseline = Scene::new(Variant::Pointer, inputs);
    inputs.tunables.zoom = 9.0;
    inputs.orientation = Orientation::new(3.0, 3.0, 3.0);
    let changed = Scene::new(Variant::Pointer, inputs);
    assert_eq!(baseline, changed);
}
