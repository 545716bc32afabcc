/// WGSL source of the knot shader: fresnel rim, scrolling shine band, progress fade.
///
/// Mirrors `knotfade_shading::{shade_vertex, shade_fragment}` term for term.
/// The uniform structs must match `TransformUniforms` and `ShadingUniforms`.
pub const KNOT_SHADER: &str = r#"
struct Transforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    camera_position: vec4<f32>,
};

struct Shading {
    progress: f32,
    fresnel_amount: f32,
    shine_size: f32,
    shine_speed: f32,
    elapsed_time: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0)
var<uniform> transforms: Transforms;

@group(0) @binding(1)
var<uniform> shading: Shading;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) unit_position: vec3<f32>,
    @location(2) view_dir: vec3<f32>,
    @location(3) world_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = transforms.model * vec4<f32>(vertex.position, 1.0);
    let world_normal = transforms.model * vec4<f32>(vertex.normal, 0.0);

    var out: VertexOutput;
    out.clip_position = transforms.projection * transforms.view * world_pos;
    out.uv = vertex.uv;
    out.unit_position = vertex.position * 0.5 + 0.5;
    out.view_dir = normalize(transforms.camera_position.xyz - world_pos.xyz);
    out.world_normal = normalize(world_normal.xyz);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let direction = in.unit_position.y;
    let facing = dot(in.world_normal, in.view_dir);

    let fresnel = pow(1.0 - facing, shading.fresnel_amount);
    let fresnel_color = vec3<f32>(1.0) * fresnel;

    let uv = in.unit_position.xy;
    let wave = 0.5 + 0.5 * sin(uv.y + shading.elapsed_time * shading.shine_speed);
    let shine = step(1.0 - shading.shine_size * 0.5, wave);
    let shine_color = vec4<f32>(vec3<f32>(1.0 + shine), 0.2);

    let base = vec3<f32>(0.0, 0.7, 0.5) * facing;
    let fade = step(shading.progress, direction);

    let color = mix(base + fresnel_color, shine_color.rgb, shine * shine_color.a);
    return vec4<f32>(color, fade);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_both_entry_points() {
        assert!(KNOT_SHADER.contains("fn vs_main("));
        assert!(KNOT_SHADER.contains("fn fs_main("));
    }

    #[test]
    fn shading_fields_in_upload_order() {
        let order = [
            "progress: f32",
            "fresnel_amount: f32",
            "shine_size: f32",
            "shine_speed: f32",
            "elapsed_time: f32",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|field| KNOT_SHADER.find(field).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
