//! GLSL `#pragma mapbox` handling.
//!
//! Shader programs declare data-driven inputs with
//! `#pragma mapbox: define <precision> <type> <name>` and
//! `#pragma mapbox: initialize <precision> <type> <name>`. Preprocessing expands
//! each pragma into a uniform branch (`HAS_UNIFORM_u_<name>` defined) and an
//! attribute branch. Pragma names must line up with the bindings of the
//! generated properties tables.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;

use crate::codegen::ir::LayerIr;
use crate::error::ShaderError;
use crate::types::EvaluatedType;

static PRAGMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#pragma mapbox: ([\w]+) ([\w]+) ([\w]+) ([\w]+)").expect("pragma regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PragmaOp {
    Define,
    Initialize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pragma {
    pub op: PragmaOp,
    pub precision: String,
    pub ty: String,
    pub name: String,
}

/// Every pragma in `source`, in order. Unknown operations are skipped.
pub fn pragmas(source: &str) -> Vec<Pragma> {
    PRAGMA
        .captures_iter(source)
        .filter_map(|c| {
            let op = match &c[1] {
                "define" => PragmaOp::Define,
                "initialize" => PragmaOp::Initialize,
                _ => return None,
            };
            Some(Pragma {
                op,
                precision: c[2].to_string(),
                ty: c[3].to_string(),
                name: c[4].to_string(),
            })
        })
        .collect()
}

/// Attribute type: floats travel as zoom pairs, everything else as vec4.
fn attribute_type(ty: &str) -> &'static str {
    if ty == "float" { "vec2" } else { "vec4" }
}

fn unpack_function(ty: &str, name: &str) -> &'static str {
    match attribute_type(ty) {
        "vec2" => "unpack_mix_vec2",
        _ if name.contains("color") => "unpack_mix_color",
        _ => "unpack_mix_vec4",
    }
}

/// Expand the pragmas of a vertex/fragment pair.
pub fn preprocess(vertex: &str, fragment: &str) -> (String, String) {
    let fragment = PRAGMA.replace_all(fragment, |c: &Captures| {
        let (op, precision, ty, name) = (&c[1], &c[2], &c[3], &c[4]);
        match op {
            "define" => format!(
                "#ifndef HAS_UNIFORM_u_{name}\n\
                 varying {precision} {ty} {name};\n\
                 #else\n\
                 uniform {precision} {ty} u_{name};\n\
                 #endif"
            ),
            _ => format!(
                "#ifdef HAS_UNIFORM_u_{name}\n\
                 \x20   {precision} {ty} {name} = u_{name};\n\
                 #endif"
            ),
        }
    });

    let vertex = PRAGMA.replace_all(vertex, |c: &Captures| {
        let (op, precision, ty, name) = (&c[1], &c[2], &c[3], &c[4]);
        let attr = attribute_type(ty);
        match op {
            "define" => format!(
                "#ifndef HAS_UNIFORM_u_{name}\n\
                 uniform lowp float u_{name}_t;\n\
                 attribute {precision} {attr} a_{name};\n\
                 varying {precision} {ty} {name};\n\
                 #else\n\
                 uniform {precision} {ty} u_{name};\n\
                 #endif"
            ),
            _ => format!(
                "#ifndef HAS_UNIFORM_u_{name}\n\
                 \x20   {name} = {}(a_{name}, u_{name}_t);\n\
                 #else\n\
                 \x20   {precision} {ty} {name} = u_{name};\n\
                 #endif",
                unpack_function(ty, name)
            ),
        }
    });

    (vertex.into_owned(), fragment.into_owned())
}

/// GLSL type a binding of this evaluated type is declared with.
fn glsl_type(ty: &EvaluatedType) -> Option<&'static str> {
    match ty {
        EvaluatedType::Float | EvaluatedType::Double | EvaluatedType::Rotation => Some("float"),
        EvaluatedType::Color | EvaluatedType::Image => Some("vec4"),
        _ => None,
    }
}

/// One shader program loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    /// `line_sdf`
    pub name: String,
    pub vertex: String,
    pub fragment: Option<String>,
}

/// Check every pragma of a program's vertex and fragment sources against the layer bindings.
pub fn check_program(layer: &LayerIr, program: &ShaderProgram) -> Result<(), ShaderError> {
    let sources = std::iter::once(program.vertex.as_str()).chain(program.fragment.as_deref());
    for pragma in sources.flat_map(pragmas) {
        let Some((property, _)) = layer.bindings().find(|(_, b)| b.name == pragma.name) else {
            return Err(ShaderError::UnknownBinding {
                program: program.name.clone(),
                layer: layer.type_name.clone(),
                name: pragma.name,
            });
        };
        let expected = glsl_type(&property.evaluated).unwrap_or("float");
        if pragma.ty != expected {
            return Err(ShaderError::TypeMismatch {
                program: program.name.clone(),
                name: pragma.name,
                declared: pragma.ty,
                expected,
            });
        }
    }
    Ok(())
}

/// Layer whose stem is the longest prefix of `program`.
pub fn layer_for_program<'a>(program: &str, layers: &'a [LayerIr]) -> Option<&'a LayerIr> {
    layers
        .iter()
        .filter(|l| program == l.stem || program.starts_with(&format!("{}_", l.stem)))
        .max_by_key(|l| l.stem.len())
}

/// Load every `<program>.vertex.glsl` in `dir`, with its fragment shader if present.
pub fn load_programs(dir: &Path) -> Result<Vec<ShaderProgram>> {
    let mut programs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read shader directory '{}'", dir.display()))? {
        let path = entry?.path();
        let Some(name) = path
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_suffix(".vertex.glsl"))
        else {
            continue;
        };
        let vertex = fs::read_to_string(&path).with_context(|| format!("Failed to read '{}'", path.display()))?;
        let fragment_path = dir.join(format!("{name}.fragment.glsl"));
        let fragment = match fs::read_to_string(&fragment_path) {
            Ok(source) => Some(source),
            Err(e) => {
                log::warn!("No fragment shader for {}: {}", name, e);
                None
            }
        };
        programs.push(ShaderProgram {
            name: name.to_string(),
            vertex,
            fragment,
        });
    }
    programs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(programs)
}

/// Check every program in `dir` against `layers`. Returns the number checked.
pub fn check_directory(dir: &Path, layers: &[LayerIr]) -> Result<usize> {
    let programs = load_programs(dir)?;
    for program in &programs {
        let layer = layer_for_program(&program.name, layers)
            .ok_or_else(|| ShaderError::NoLayer(program.name.clone()))?;
        check_program(layer, program)?;
        log::debug!("Shader program {} matches the {} layer", program.name, layer.type_name);
    }
    log::info!("Checked {} shader programs in {}", programs.len(), dir.display());
    Ok(programs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Generator;
    use crate::spec::StyleSpec;
    use std::path::PathBuf;

    const VERTEX: &str = "#pragma mapbox: define highp vec4 color\n\
                          #pragma mapbox: define lowp float opacity\n\
                          void main() {\n\
                          #pragma mapbox: initialize highp vec4 color\n\
                          #pragma mapbox: initialize lowp float opacity\n\
                          }\n";

    fn shader_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders")
    }

    fn layer(name: &str) -> LayerIr {
        let spec = StyleSpec::embedded().unwrap();
        Generator::new(&spec).layer_ir(spec.layer(name).unwrap()).unwrap()
    }

    fn program(name: &str) -> ShaderProgram {
        load_programs(&shader_dir())
            .unwrap()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    #[test]
    fn test_parse_pragmas() {
        let found = pragmas(VERTEX);
        assert_eq!(found.len(), 4);
        assert_eq!(
            found[0],
            Pragma {
                op: PragmaOp::Define,
                precision: "highp".into(),
                ty: "vec4".into(),
                name: "color".into()
            }
        );
        assert_eq!(found[3].op, PragmaOp::Initialize);
    }

    #[test]
    fn test_preprocess_expands_both_branches() {
        let (vertex, fragment) = preprocess(VERTEX, "#pragma mapbox: define lowp float opacity\n");
        assert!(vertex.contains("attribute highp vec4 a_color;"));
        assert!(vertex.contains("attribute lowp vec2 a_opacity;"));
        assert!(vertex.contains("uniform lowp float u_opacity_t;"));
        assert!(vertex.contains("    color = unpack_mix_color(a_color, u_color_t);"));
        assert!(vertex.contains("    opacity = unpack_mix_vec2(a_opacity, u_opacity_t);"));
        assert!(vertex.contains("    lowp float opacity = u_opacity;"));
        assert!(!vertex.contains("#pragma"));

        assert!(fragment.contains("#ifndef HAS_UNIFORM_u_opacity\nvarying lowp float opacity;"));
        assert!(fragment.contains("uniform lowp float u_opacity;"));
    }

    #[test]
    fn test_line_program_needs_synthetic_binding() {
        let line = layer("line");
        let program = program("line");
        assert_eq!(check_program(&line, &program), Ok(()));

        let err = check_program(&line.public(), &program).unwrap_err();
        assert_eq!(
            err,
            ShaderError::UnknownBinding {
                program: "line".into(),
                layer: "line".into(),
                name: "floorwidth".into()
            }
        );
    }

    #[test]
    fn test_type_mismatch() {
        let fill = layer("fill");
        let program = ShaderProgram {
            name: "fill".into(),
            vertex: "#pragma mapbox: define lowp float color\n".into(),
            fragment: None,
        };
        assert!(matches!(
            check_program(&fill, &program),
            Err(ShaderError::TypeMismatch { expected: "vec4", .. })
        ));
    }

    #[test]
    fn test_program_layer_lookup() {
        let spec = StyleSpec::embedded().unwrap();
        let layers = Generator::new(&spec).layer_irs().unwrap();
        assert_eq!(layer_for_program("fill_extrusion", &layers).unwrap().type_name, "fill-extrusion");
        assert_eq!(layer_for_program("fill_outline", &layers).unwrap().type_name, "fill");
        assert!(layer_for_program("collision_box", &layers).is_none());
    }

    #[test]
    fn test_check_shader_directory() {
        let spec = StyleSpec::embedded().unwrap();
        let layers = Generator::new(&spec).layer_irs().unwrap();
        assert_eq!(check_directory(&shader_dir(), &layers).unwrap(), 2);

        let dir = std::env::temp_dir().join("stylegen_shaders_unknown");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("collision_box.vertex.glsl"), "void main() {}\n").unwrap();
        let err = check_directory(&dir, &layers).unwrap_err();
        assert!(err.to_string().contains("collision_box"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_fragment_pragmas_are_checked() {
        let spec = StyleSpec::embedded().unwrap();
        let layers = Generator::new(&spec).layer_irs().unwrap();

        let dir = std::env::temp_dir().join("stylegen_shaders_fragment");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("fill.vertex.glsl"), "#pragma mapbox: define highp vec4 color\n").unwrap();
        fs::write(
            dir.join("fill.fragment.glsl"),
            "#pragma mapbox: define lowp float no_such_binding\n",
        )
        .unwrap();

        let err = check_directory(&dir, &layers).unwrap_err();
        let shader_err = err.downcast_ref::<ShaderError>().unwrap();
        assert_eq!(
            *shader_err,
            ShaderError::UnknownBinding {
                program: "fill".into(),
                layer: "fill".into(),
                name: "no_such_binding".into()
            }
        );
        let _ = fs::remove_dir_all(&dir);
    }
}
