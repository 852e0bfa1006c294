//! CPU rendition of the Phong WGSL stages, fed from the same packed
//! uniform block the GPU receives.

use glam::{Mat4, Vec3, Vec4};
use instanced_cubes::renderer::{PhongUniform, ShaderUniformState, MAX_LIGHTS};

const EPSILON: f32 = 1e-5;

#[derive(Clone, Copy, Debug)]
struct Varyings {
    world_position: Vec3,
    normal: Vec3,
    to_camera: Vec3,
}

fn v3(v: [f32; 4]) -> Vec3 {
    Vec4::from_array(v).truncate()
}

fn run_vertex_shader(u: &PhongUniform, instance: Mat4, position: Vec4, normal: Vec3) -> Varyings {
    let model = Mat4::from_cols_array_2d(&u.model) * instance;
    let world = model * position;
    Varyings {
        world_position: world.truncate(),
        normal: (model * normal.extend(0.0)).truncate().normalize(),
        to_camera: (v3(u.camera_position) - world.truncate()).normalize(),
    }
}

fn run_fragment_shader(u: &PhongUniform, frag: Varyings) -> Vec3 {
    let v = frag.to_camera.normalize();
    let n = frag.normal.normalize();
    let ambient = v3(u.ambient_product);
    let diffuse_color = v3(u.diffuse_color);

    let count = (u.light_count as usize).min(MAX_LIGHTS);
    let mut color = Vec3::ZERO;
    for light in &u.light_positions[..count] {
        let light_dir = v3(*light) - frag.world_position;
        let attenuation = 2.0 / light_dir.length().max(2.0);
        let l = light_dir.normalize();

        let diffuse = v3(u.diffuse_product) * n.dot(l).max(0.0);
        let specular = if l.dot(n) < 0.0 {
            Vec3::ZERO
        } else {
            let h = (l + v).normalize();
            v3(u.specular_product) * n.dot(h).max(0.0).powf(u.shininess)
        };
        color += diffuse_color * (ambient + attenuation * (diffuse + specular));
    }
    color
}

/// Front face of a unit cube at the origin, seen head on.
fn front_face_sample(state: &ShaderUniformState) -> Vec3 {
    let u = state.to_uniform();
    let frag = run_vertex_shader(
        &u,
        Mat4::IDENTITY,
        Vec4::new(0.0, 0.0, 0.5, 1.0),
        Vec3::Z,
    );
    run_fragment_shader(&u, frag)
}

fn single_light(position: Vec3) -> ShaderUniformState {
    let mut state = ShaderUniformState::new();
    state.set_light_count(1);
    state.set_light_position(0, position);
    state
}

// Ambient is added once per active light, never on its own, so the
// "ambient-only" result with no lights is black. A light behind the surface
// is what yields a pure ambient term (next test).
#[test]
fn no_active_lights_is_black() {
    let mut state = ShaderUniformState::new();
    state.set_light_count(0);
    assert!(front_face_sample(&state).abs_diff_eq(Vec3::ZERO, EPSILON));
}

#[test]
fn light_behind_surface_leaves_only_ambient() {
    let state = single_light(Vec3::new(0.0, 0.0, -10.0));
    let expected = state.diffuse_color() * state.ambient_product();
    assert!(front_face_sample(&state).abs_diff_eq(expected, EPSILON));
}

#[test]
fn attenuation_starts_beyond_two_units() {
    let mut near = single_light(Vec3::new(0.0, 0.0, 1.5));
    let mut at_two = single_light(Vec3::new(0.0, 0.0, 2.5));
    let mut at_four = single_light(Vec3::new(0.0, 0.0, 4.5));
    for state in [&mut near, &mut at_two, &mut at_four] {
        state.set_ambient_product(Vec3::ZERO);
        state.set_specular_product(Vec3::ZERO);
        state.set_diffuse_color(Vec3::ONE);
    }

    assert!(front_face_sample(&near).abs_diff_eq(Vec3::ONE, EPSILON));
    assert!(front_face_sample(&at_two).abs_diff_eq(Vec3::ONE, EPSILON));
    assert!(front_face_sample(&at_four).abs_diff_eq(Vec3::splat(0.5), EPSILON));
}

#[test]
fn highlight_peaks_when_light_and_eye_share_the_normal() {
    let mut state = single_light(Vec3::new(0.0, 0.0, 2.5));
    state.set_camera_position(Vec3::new(0.0, 0.0, 30.0));
    state.set_ambient_product(Vec3::ZERO);
    state.set_diffuse_product(Vec3::ZERO);
    state.set_specular_product(Vec3::new(0.5, 0.25, 1.0));
    state.set_diffuse_color(Vec3::ONE);

    let color = front_face_sample(&state);
    assert!(color.abs_diff_eq(Vec3::new(0.5, 0.25, 1.0), 1e-4));
}

#[test]
fn lights_accumulate() {
    let one = single_light(Vec3::new(1.0, 1.0, 3.0));
    let mut two = one;
    two.set_light_count(2);
    two.set_light_position(1, Vec3::new(1.0, 1.0, 3.0));

    let single = front_face_sample(&one);
    assert!(front_face_sample(&two).abs_diff_eq(single * 2.0, EPSILON));
}

#[test]
fn writes_past_active_count_do_not_change_shading() {
    let mut state = single_light(Vec3::new(0.0, 1.0, 3.0));
    let before = front_face_sample(&state);

    assert!(!state.set_light_position(5, Vec3::new(0.0, 0.0, 2.0)));
    assert!(front_face_sample(&state).abs_diff_eq(before, EPSILON));
}

#[test]
fn light_count_is_capped() {
    let mut state = ShaderUniformState::new();
    assert!(!state.set_light_count(MAX_LIGHTS + 8));
    assert_eq!(state.lights().active(), MAX_LIGHTS);
    assert_eq!(state.to_uniform().light_count as usize, MAX_LIGHTS);
}

#[test]
fn default_state_lights_the_front_face() {
    let color = front_face_sample(&ShaderUniformState::new());
    assert!(color.x > 0.0 && color.y > 0.0);
    // default diffuse colour has no blue
    assert!(color.z.abs() < EPSILON);
}

#[test]
fn instance_transform_moves_geometry_and_turns_normals() {
    let u = ShaderUniformState::new().to_uniform();
    let instance = Mat4::from_translation(Vec3::new(3.0, 0.0, -2.0))
        * Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);

    let out = run_vertex_shader(&u, instance, Vec4::new(0.0, 0.0, 0.5, 1.0), Vec3::Z);
    assert!(out.world_position.abs_diff_eq(Vec3::new(3.5, 0.0, -2.0), 1e-5));
    assert!(out.normal.abs_diff_eq(Vec3::X, 1e-5));
}

#[test]
fn global_model_applies_after_instance() {
    let mut state = ShaderUniformState::new();
    state.set_model(Mat4::from_scale(Vec3::splat(2.0)));
    let u = state.to_uniform();

    let instance = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
    let out = run_vertex_shader(&u, instance, Vec4::new(0.0, 0.0, 0.0, 1.0), Vec3::Z);
    assert!(out.world_position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
}
