//! Shader program assembly
//!
//! The player shader is a shared WGSL template with two format-specific
//! fragments spliced in: the vertex stage's UV remap and the fragment
//! stage's color resolution. The CPU functions at the bottom of this module
//! evaluate the same rules, so shading behaviour can be checked without a GPU.

use glam::{Vec2, Vec3, Vec4};

use super::error::RendererError;
use super::eye::TexCoordWindow;
use super::types::Format;

/// The embedded shader template
pub const PLAYER_SHADER_TEMPLATE: &str = include_str!("../shaders/player.wgsl");

const MAPPED_UV_MARKER: &str = "{{MAPPED_UV}}";
const FRAG_COLOR_MARKER: &str = "{{FRAG_COLOR}}";

/// Vertex entry point name
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment entry point name
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Per-format shading rules
///
/// Both the WGSL fragments and the CPU evaluation below are generated from
/// these values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingRules {
    /// Horizontal stretch applied to the flipped UV before the eye window
    pub u_stretch: f32,
    /// Paint the `z > 0` half of the mesh opaque black
    pub mask_rear: bool,
}

impl ShadingRules {
    pub fn for_format(format: Format) -> Self {
        match format {
            // 180° frames hold one hemisphere; stretch U to cover it once
            Format::Fov180 => Self {
                u_stretch: 2.0,
                mask_rear: true,
            },
            Format::Fov360 | Format::Screen => Self {
                u_stretch: 1.0,
                mask_rear: false,
            },
        }
    }
}

/// WGSL statement computing `out.mapped_uv` from `flipped_uv`, `scale` and `offset`
pub fn mapped_uv_wgsl(format: Format) -> String {
    let rules = ShadingRules::for_format(format);
    if rules.u_stretch == 1.0 {
        "out.mapped_uv = flipped_uv * scale + offset;".to_string()
    } else {
        format!(
            "out.mapped_uv = flipped_uv * vec2<f32>({:?}, 1.0) * scale + offset;",
            rules.u_stretch
        )
    }
}

/// WGSL fragment body returning the output color from `color` and `in.behind`
pub fn frag_color_wgsl(format: Format) -> &'static str {
    if ShadingRules::for_format(format).mask_rear {
        "if (in.behind > 0.0) {
        return vec4<f32>(0.0, 0.0, 0.0, 1.0);
    }
    return color;"
    } else {
        "return color;"
    }
}

/// Assemble the complete WGSL source for a format
pub fn build_shader_source(format: Format) -> String {
    PLAYER_SHADER_TEMPLATE
        .replace(MAPPED_UV_MARKER, &mapped_uv_wgsl(format))
        .replace(FRAG_COLOR_MARKER, frag_color_wgsl(format))
}

/// Compiled shader module for one format
pub struct ShaderProgram {
    format: Format,
    module: wgpu::ShaderModule,
}

impl ShaderProgram {
    /// Build and compile the program for a format
    ///
    /// Validation errors are captured in an error scope and returned instead
    /// of reaching the device's uncaptured error handler.
    pub fn compile(device: &wgpu::Device, format: Format) -> Result<Self, RendererError> {
        let source = build_shader_source(format);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Player Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RendererError::ShaderCompilation(error.to_string()));
        }

        tracing::debug!("Compiled player shader for {} format", format);

        Ok(Self { format, module })
    }

    /// Format this program was built for
    pub fn format(&self) -> Format {
        self.format
    }

    /// The compiled module
    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}

// ============================================================================
// CPU evaluation of the shading rules
// ============================================================================

/// Mesh UVs flipped on both axes to match video orientation
pub fn flip_uv(uv: Vec2) -> Vec2 {
    Vec2::ONE - uv
}

/// Texture coordinate sampled for a mesh UV
pub fn mapped_uv(format: Format, uv: Vec2, window: TexCoordWindow) -> Vec2 {
    let stretch = Vec2::new(ShadingRules::for_format(format).u_stretch, 1.0);
    flip_uv(uv) * stretch * window.scale + window.offset
}

/// Behind signal for a model-space vertex position (1.0 when `z > 0`)
pub fn behind(position: Vec3) -> f32 {
    if position.z > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Output color given the interpolated behind signal and the sampled texel
pub fn fragment_color(format: Format, behind: f32, sampled: Vec4) -> Vec4 {
    if ShadingRules::for_format(format).mask_rear && behind > 0.0 {
        Vec4::new(0.0, 0.0, 0.0, 1.0)
    } else {
        sampled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use naga::{BinaryOperator, Expression, Handle, Literal};

    fn validate(source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source).expect("WGSL should parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .expect("WGSL should validate");
        module
    }

    /// Statements of `vs_main`, one per line, whitespace trimmed
    fn vertex_body(source: &str) -> Vec<String> {
        let start = source.find("fn vs_main").expect("vertex entry");
        let body = &source[start..];
        let open = body.find('{').expect("body start");
        let close = body.find("\n}").expect("body end");
        body[open + 1..close]
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    }

    fn literal(function: &naga::Function, handle: Handle<Expression>) -> Option<f64> {
        match function.expressions[handle] {
            Expression::Literal(Literal::F32(v)) => Some(v as f64),
            Expression::Literal(Literal::AbstractFloat(v)) => Some(v),
            _ => None,
        }
    }

    /// `in.<member>` where `in` is the vertex input argument
    fn input_member(function: &naga::Function, handle: Handle<Expression>) -> Option<u32> {
        match function.expressions[handle] {
            Expression::AccessIndex { base, index } => {
                matches!(function.expressions[base], Expression::FunctionArgument(0)).then_some(index)
            }
            _ => None,
        }
    }

    fn vertex_function(module: &naga::Module) -> &naga::Function {
        &module
            .entry_points
            .iter()
            .find(|ep| ep.name == VERTEX_ENTRY)
            .expect("vertex entry point")
            .function
    }

    #[test]
    fn test_generated_sources_validate() {
        for format in Format::all() {
            let source = build_shader_source(*format);
            assert!(!source.contains("{{"), "unfilled marker for {:?}", format);
            assert!(source.contains(VERTEX_ENTRY));
            assert!(source.contains(FRAGMENT_ENTRY));
            validate(&source);
        }
    }

    #[test]
    fn test_only_fov180_differs() {
        let screen = build_shader_source(Format::Screen);
        let fov360 = build_shader_source(Format::Fov360);
        let fov180 = build_shader_source(Format::Fov180);
        assert_eq!(screen, fov360);
        assert_ne!(screen, fov180);
        assert!(fov180.contains("vec2<f32>(2.0, 1.0)"));
        assert!(fov180.contains("in.behind > 0.0"));
        assert!(!screen.contains("in.behind > 0.0"));
    }

    #[test]
    fn test_vertex_stage_statements() {
        for format in Format::all() {
            let body = vertex_body(&build_shader_source(*format));
            let expected = vec![
                "var out: VertexOutput;".to_string(),
                "out.clip_position = uniforms.projection * uniforms.view * uniforms.model * vec4<f32>(in.position, 1.0);".to_string(),
                "out.behind = select(0.0, 1.0, in.position.z > 0.0);".to_string(),
                "let flipped_uv = vec2<f32>(1.0, 1.0) - in.uv;".to_string(),
                "let scale = uniforms.tex_coord_scale_offset.xy;".to_string(),
                "let offset = uniforms.tex_coord_scale_offset.zw;".to_string(),
                mapped_uv_wgsl(*format),
                "return out;".to_string(),
            ];
            assert_eq!(body, expected, "vertex stage for {:?}", format);
        }
    }

    #[test]
    fn test_behind_signal_is_positive_z() {
        let module = validate(&build_shader_source(Format::Fov180));
        let function = vertex_function(&module);

        let found = function.expressions.iter().any(|(_, expr)| {
            let Expression::Select { condition, accept, reject } = *expr else {
                return false;
            };
            let Expression::Binary { op: BinaryOperator::Greater, left, right } =
                function.expressions[condition]
            else {
                return false;
            };
            // left must be `in.position.z`
            let Expression::AccessIndex { base, index: 2 } = function.expressions[left] else {
                return false;
            };
            input_member(function, base) == Some(0)
                && literal(function, right) == Some(0.0)
                && literal(function, accept) == Some(1.0)
                && literal(function, reject) == Some(0.0)
        });
        assert!(found, "behind must be select(0.0, 1.0, in.position.z > 0.0)");
        assert_eq!(behind(Vec3::new(0.0, 0.0, 0.5)), 1.0);
        assert_eq!(behind(Vec3::new(0.0, 0.0, -0.5)), 0.0);
    }

    #[test]
    fn test_uv_flip_subtracts_from_one() {
        let module = validate(&build_shader_source(Format::Fov360));
        let function = vertex_function(&module);

        let found = function.expressions.iter().any(|(_, expr)| {
            let Expression::Binary { op: BinaryOperator::Subtract, left, right } = *expr else {
                return false;
            };
            let ones = match &function.expressions[left] {
                Expression::Compose { components, .. } => components
                    .iter()
                    .all(|c| literal(function, *c) == Some(1.0)),
                Expression::Splat { value, .. } => literal(function, *value) == Some(1.0),
                _ => false,
            };
            ones && input_member(function, right) == Some(1)
        });
        assert!(found, "flipped_uv must be vec2(1.0, 1.0) - in.uv");
        assert_eq!(flip_uv(Vec2::new(0.2, 0.9)), Vec2::ONE - Vec2::new(0.2, 0.9));
    }

    #[test]
    fn test_rules_drive_both_sides() {
        for format in Format::all() {
            let rules = ShadingRules::for_format(*format);
            let source = build_shader_source(*format);
            assert_eq!(source.contains("in.behind > 0.0"), rules.mask_rear);
            assert_eq!(
                source.contains(&format!("flipped_uv * vec2<f32>({:?}, 1.0)", rules.u_stretch)),
                rules.u_stretch != 1.0
            );
            let texel = Vec4::ONE;
            assert_eq!(fragment_color(*format, 1.0, texel) != texel, rules.mask_rear);
        }
    }

    #[test]
    fn test_flip_uv() {
        assert_eq!(flip_uv(Vec2::new(0.0, 0.0)), Vec2::new(1.0, 1.0));
        assert_eq!(flip_uv(Vec2::new(0.25, 1.0)), Vec2::new(0.75, 0.0));
    }

    #[test]
    fn test_mapped_uv_stretches_180() {
        let window = TexCoordWindow::new(Vec2::new(0.5, 1.0), Vec2::new(0.5, 0.0));
        let uv = Vec2::new(0.75, 0.5);
        // flipped = (0.25, 0.5)
        assert_eq!(mapped_uv(Format::Fov360, uv, window), Vec2::new(0.625, 0.5));
        assert_eq!(mapped_uv(Format::Screen, uv, window), Vec2::new(0.625, 0.5));
        assert_eq!(mapped_uv(Format::Fov180, uv, window), Vec2::new(0.75, 0.5));
    }

    #[test]
    fn test_fov180_masks_rear_hemisphere() {
        let texel = Vec4::new(0.2, 0.9, 0.4, 0.5);
        let rear = behind(Vec3::new(0.0, 0.0, 0.7));
        let front = behind(Vec3::new(0.0, 0.0, -0.7));
        assert_eq!(rear, 1.0);
        assert_eq!(front, 0.0);

        assert_eq!(fragment_color(Format::Fov180, rear, texel), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(fragment_color(Format::Fov180, front, texel), texel);
        assert_eq!(fragment_color(Format::Fov360, rear, texel), texel);
        assert_eq!(fragment_color(Format::Screen, rear, texel), texel);
    }
}
