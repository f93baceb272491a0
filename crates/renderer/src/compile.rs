use std::borrow::Cow;

use raymarch::field::{OFFSET, ORBIT_WEIGHT, SCALE};
use raymarch::{BACKGROUND, CAMERA_ORIGIN, MAX_DIST, MAX_STEPS, MIN_DIST, POINTER_SENSITIVITY};
use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the fractal fragment shader through naga's GLSL frontend.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("kaleido fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(fragment_shader_source()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Assembles the fragment shader: [`HEADER`], the shared constants, then
/// [`BODY`].
///
/// The constants are formatted from the CPU core so both paths march the
/// same field.
pub fn fragment_shader_source() -> String {
    let constants = format!(
        "const int MAX_STEPS = {max_steps};\n\
         const float MAX_DIST = {max_dist};\n\
         const float MIN_DIST = {min_dist};\n\
         const float SCALE = {scale};\n\
         const vec3 OFFSET = {offset};\n\
         const float ORBIT_WEIGHT = {orbit_weight};\n\
         const vec3 CAMERA_ORIGIN = {camera};\n\
         const float POINTER_SENSITIVITY = {sensitivity};\n\
         const vec3 BACKGROUND = {background};\n",
        max_steps = MAX_STEPS,
        max_dist = glsl_float(MAX_DIST),
        min_dist = glsl_float(MIN_DIST),
        scale = glsl_float(SCALE),
        offset = glsl_vec3(OFFSET.to_array()),
        orbit_weight = glsl_float(ORBIT_WEIGHT),
        camera = glsl_vec3(CAMERA_ORIGIN.to_array()),
        sensitivity = glsl_float(POINTER_SENSITIVITY),
        background = glsl_vec3(BACKGROUND.to_array()),
    );
    format!("{HEADER}\n{constants}\n{BODY}")
}

/// Formats `value` as a GLSL float literal. `Debug` always keeps a decimal
/// point or exponent, which GLSL needs to type the literal as `float`.
fn glsl_float(value: f32) -> String {
    format!("{value:?}")
}

fn glsl_vec3(value: [f32; 3]) -> String {
    format!(
        "vec3({}, {}, {})",
        glsl_float(value[0]),
        glsl_float(value[1]),
        glsl_float(value[2])
    )
}

/// Uniform block and varyings. The layout must match [`FractalUniforms`].
///
/// [`FractalUniforms`]: crate::gpu::FractalUniforms
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FractalParams {
    mat3 rotation;
    vec2 pointer;
    float time;
    float aspect;
    float zoom;
    float radius;
    int iterations;
    int variant;
} params;
";

const BODY: &str = r"
const int VARIANT_GRADIENT = 0;

mat3 rotate_x(float angle) {
    float c = cos(angle);
    float s = sin(angle);
    return mat3(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c);
}

mat3 rotate_y(float angle) {
    float c = cos(angle);
    float s = sin(angle);
    return mat3(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c);
}

float distance_field(vec3 p, out vec3 orbit) {
    vec3 z = p;
    float total_scale = 1.0;
    orbit = vec3(0.0);
    for (int i = 0; i < params.iterations; i++) {
        z = abs(z);
        z *= SCALE;
        z += OFFSET;
        total_scale *= SCALE;
        z = params.rotation * z;
        orbit += z * ORBIT_WEIGHT;
    }
    return length(z) / total_scale - params.radius;
}

// Returns the travelled distance; `steps` is the index of the stopping sample.
float ray_march(vec3 origin, vec3 dir, out vec3 orbit, out int steps) {
    float travelled = 0.0;
    orbit = vec3(0.0);
    steps = MAX_STEPS;
    for (int i = 0; i < MAX_STEPS; i++) {
        vec3 sample_orbit;
        float d = distance_field(origin + dir * travelled, sample_orbit);
        travelled += d;
        orbit = sample_orbit;
        if (travelled > MAX_DIST || d < MIN_DIST) {
            steps = i;
            break;
        }
    }
    return travelled;
}

float step_brightness(int steps) {
    if (steps == 0) {
        return 0.0;
    }
    return 1.0 - float(steps) / float(MAX_STEPS);
}

void main() {
    vec2 uv = v_uv;
    if (params.variant == VARIANT_GRADIENT) {
        vec3 ramp = 0.5 + 0.5 * cos(params.time + uv.xyx + vec3(0.0, 2.0, 4.0));
        outColor = vec4(ramp, 1.0);
        return;
    }

    vec2 ndc = uv * 2.0 - 1.0;
    ndc.y /= params.aspect;
    mat3 camera = rotate_y(-params.pointer.x * POINTER_SENSITIVITY)
        * rotate_x(params.pointer.y * POINTER_SENSITIVITY);
    vec3 origin = camera * CAMERA_ORIGIN;
    vec3 dir = camera * normalize(vec3(ndc, params.zoom));

    vec3 orbit;
    int steps;
    float travelled = ray_march(origin, dir, orbit, steps);
    vec3 base = travelled < MAX_DIST ? clamp(orbit, 0.0, 1.0) : BACKGROUND;
    outColor = vec4(base * step_brightness(steps), 1.0);
}
";

/// Minimal full-screen triangle vertex shader; `v_uv` spans `[0, 1]` with
/// `v` growing upward.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

#[cfg(test)]
mod tests {
    use wgpu::naga::front::glsl::{Frontend, Options};
    use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

    use super::*;

    fn parse_and_validate(stage: ShaderStage, source: &str) {
        let module = Frontend::default()
            .parse(&Options::from(stage), source)
            .unwrap_or_else(|err| panic!("{stage:?} shader failed to parse: {err:?}"));
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap_or_else(|err| panic!("{stage:?} shader failed validation: {err:?}"));
    }

    #[test]
    fn fragment_shader_parses_and_validates() {
        parse_and_validate(ShaderStage::Fragment, &fragment_shader_source());
    }

    #[test]
    fn vertex_shader_parses_and_validates() {
        parse_and_validate(ShaderStage::Vertex, VERTEX_SHADER_GLSL);
    }

    #[test]
    fn fragment_source_inlines_core_constants() {
        let source = fragment_shader_source();
        assert!(source.starts_with("#version 450"));
        assert!(source.contains("const int MAX_STEPS = 70;"));
        assert!(source.contains("const float MAX_DIST = 1000.0;"));
        assert!(source.contains("const float MIN_DIST = 0.0001;"));
        assert!(source.contains("const vec3 OFFSET = vec3(-1.0, -0.1, -0.5);"));
        assert!(source.contains("const vec3 CAMERA_ORIGIN = vec3(0.0, 0.0, -5.5);"));
        assert!(source.contains("void main()"));
    }

    #[test]
    fn float_literals_keep_a_decimal_point() {
        assert_eq!(glsl_float(2.0), "2.0");
        assert_eq!(glsl_float(1.5), "1.5");
        assert_eq!(glsl_vec3([0.1, 0.1, 0.1]), "vec3(0.1, 0.1, 0.1)");
    }

    #[test]
    fn uniform_block_declares_members_in_struct_order() {
        let order = [
            "mat3 rotation",
            "vec2 pointer",
            "float time",
            "float aspect",
            "float zoom",
            "float radius",
            "int iterations",
            "int variant",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|member| HEADER.find(member).expect(member))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
