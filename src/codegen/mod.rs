//! Code generator.
//!
//! Spec model -> IR -> C++ artifacts -> write-if-modified.
//!
//! Layers render in parallel (each only reads the immutable spec model);
//! artifacts are then written one by one in sorted layer order so logs and
//! partial failures are deterministic.

pub mod cpp;
pub mod ir;
pub mod writer;

use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::TypeError;
use crate::spec::{LayerSpec, StyleSpec};
use crate::types::TypeMapper;
use ir::{LayerIr, LightIr, inject_synthetic};
use writer::{ArtifactWriter, WriteOutcome};

/// One rendered file, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

impl Artifact {
    fn new(path: impl Into<PathBuf>, content: String) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub updated: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    /// Outdated files left alone because of dry run
    pub would_update: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn total(&self) -> usize {
        self.updated.len() + self.unchanged.len() + self.would_update.len()
    }
}

/// Generator bound to one parsed spec.
pub struct Generator<'a> {
    spec: &'a StyleSpec,
    layers: TypeMapper,
    light: TypeMapper,
}

impl<'a> Generator<'a> {
    pub fn new(spec: &'a StyleSpec) -> Self {
        Self {
            spec,
            layers: TypeMapper::layers(),
            light: TypeMapper::light(),
        }
    }

    /// Internal IR of one layer, synthetic properties included.
    pub fn layer_ir(&self, layer: &LayerSpec) -> Result<LayerIr, TypeError> {
        let mut layer = layer.clone();
        inject_synthetic(&mut layer);
        let ir = LayerIr::build(&self.layers, &layer)?;
        log::debug!(
            "{}: {} layout, {} paint properties",
            ir.type_name,
            ir.layout.len(),
            ir.paint.len()
        );
        Ok(ir)
    }

    /// Internal IR of every layer, in spec order.
    pub fn layer_irs(&self) -> Result<Vec<LayerIr>, TypeError> {
        self.spec.layers.iter().map(|l| self.layer_ir(l)).collect()
    }

    pub fn light_ir(&self) -> Result<LightIr, TypeError> {
        LightIr::build(&self.light, &self.spec.light)
    }

    /// Check the shader programs in `dir` against the internal layer bindings.
    pub fn check_shaders(&self, dir: &Path) -> Result<usize> {
        let layers = self.layer_irs()?;
        crate::shaders::check_directory(dir, &layers)
    }

    /// Render every artifact without touching the file system.
    pub fn render(&self) -> Result<Vec<Artifact>, TypeError> {
        let per_layer: Vec<Vec<Artifact>> = self
            .spec
            .layers
            .par_iter()
            .map(|layer| self.layer_ir(layer).map(|ir| render_layer(&ir)))
            .collect::<Result<_, _>>()?;

        let mut artifacts: Vec<Artifact> = per_layer.into_iter().flatten().collect();
        artifacts.extend(render_light(&self.light_ir()?));
        Ok(artifacts)
    }

    /// Render and write everything below the writer's root.
    pub fn generate(&self, writer: &ArtifactWriter) -> Result<GenerationReport> {
        let artifacts = self.render()?;
        let mut report = GenerationReport::default();
        for artifact in artifacts {
            match writer.write_if_modified(&artifact.path, &artifact.content)? {
                WriteOutcome::Updated => report.updated.push(artifact.path),
                WriteOutcome::Unchanged => report.unchanged.push(artifact.path),
                WriteOutcome::WouldUpdate => report.would_update.push(artifact.path),
            }
        }
        log::info!(
            "Generated {} files under {}: {} updated, {} up-to-date{}",
            report.total(),
            writer.root().display(),
            report.updated.len(),
            report.unchanged.len(),
            if writer.is_dry_run() {
                format!(", {} outdated (dry run)", report.would_update.len())
            } else {
                String::new()
            }
        );
        Ok(report)
    }
}

/// Properties artifacts from the full IR, then the public class from the
/// filtered one.
fn render_layer(ir: &LayerIr) -> Vec<Artifact> {
    let stem = &ir.stem;
    let layers_src = Path::new("src/mbgl/style/layers");
    let layers_include = Path::new("include/mbgl/style/layers");

    let properties_hpp = cpp::properties::render_header(ir);
    let properties_cpp = cpp::properties::render_source(ir);

    let public = ir.public();
    let layer_hpp = cpp::layer::render_header(&public);
    let layer_cpp = cpp::layer::render_source(&public);

    vec![
        Artifact::new(layers_include.join(format!("{stem}_layer.hpp")), layer_hpp),
        Artifact::new(layers_src.join(format!("{stem}_layer.cpp")), layer_cpp),
        Artifact::new(layers_src.join(format!("{stem}_layer_properties.hpp")), properties_hpp),
        Artifact::new(layers_src.join(format!("{stem}_layer_properties.cpp")), properties_cpp),
    ]
}

fn render_light(ir: &LightIr) -> Vec<Artifact> {
    vec![
        Artifact::new("include/mbgl/style/light.hpp", cpp::light::render_header(ir)),
        Artifact::new("src/mbgl/style/light.cpp", cpp::light::render_source(ir)),
        Artifact::new("src/mbgl/style/light_properties.hpp", cpp::light::render_properties(ir)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_spec_str;
    use std::fs;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stylegen_codegen_{name}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn find<'a>(artifacts: &'a [Artifact], path: &str) -> &'a str {
        artifacts
            .iter()
            .find(|a| a.path == Path::new(path))
            .map(|a| a.content.as_str())
            .unwrap_or_else(|| panic!("missing artifact {path}"))
    }

    const FILL_ONLY: &str = r##"{
        "layer": { "type": { "values": { "fill": { "doc": "A filled polygon." } } } },
        "paint_fill": {
            "fill-color": { "type": "color", "default": "#000000", "property-type": "data-driven" }
        }
    }"##;

    #[test]
    fn test_fill_color_end_to_end() {
        let spec = parse_spec_str(FILL_ONLY).unwrap();
        let artifacts = Generator::new(&spec).render().unwrap();
        assert_eq!(artifacts.len(), 4 + 3);

        let props = find(&artifacts, "src/mbgl/style/layers/fill_layer_properties.hpp");
        assert!(props.contains(
            "struct FillColor : DataDrivenPaintProperty<Color, attributes::color, uniforms::color> {"
        ));
        let public = find(&artifacts, "include/mbgl/style/layers/fill_layer.hpp");
        assert!(public.contains("    const PropertyValue<Color>& getFillColor() const;"));
    }

    #[test]
    fn test_synthetic_property_isolation() {
        let spec = StyleSpec::embedded().unwrap();
        let artifacts = Generator::new(&spec).render().unwrap();

        let props = find(&artifacts, "src/mbgl/style/layers/line_layer_properties.hpp");
        assert!(props.contains(
            "struct LineFloorWidth : DataDrivenPaintProperty<float, attributes::floorwidth, uniforms::floorwidth> {"
        ));
        assert!(props.contains("    LineFloorWidth,"));

        for path in ["include/mbgl/style/layers/line_layer.hpp", "src/mbgl/style/layers/line_layer.cpp"] {
            let public = find(&artifacts, path);
            assert!(!public.contains("FloorWidth"), "{path} exposes the synthetic property");
            assert!(!public.contains("line-floor-width"));
            assert!(public.contains("LineGapWidth"));
        }
    }

    #[test]
    fn test_output_is_independent_of_input_order() {
        let forward = r##"{
            "layer": { "type": { "values": { "fill": {}, "circle": {} } } },
            "paint_fill": {
                "fill-opacity": { "type": "number", "default": 1, "property-type": "data-driven" },
                "fill-color": { "type": "color", "default": "#000000", "property-type": "data-driven" },
                "fill-antialias": { "type": "boolean", "default": true, "property-type": "data-constant" }
            },
            "paint_circle": {
                "circle-radius": { "type": "number", "default": 5, "property-type": "data-driven" },
                "circle-blur": { "type": "number", "default": 0, "property-type": "data-driven" }
            }
        }"##;
        let reversed = r##"{
            "paint_circle": {
                "circle-blur": { "type": "number", "default": 0, "property-type": "data-driven" },
                "circle-radius": { "type": "number", "default": 5, "property-type": "data-driven" }
            },
            "paint_fill": {
                "fill-antialias": { "type": "boolean", "default": true, "property-type": "data-constant" },
                "fill-color": { "type": "color", "default": "#000000", "property-type": "data-driven" },
                "fill-opacity": { "type": "number", "default": 1, "property-type": "data-driven" }
            },
            "layer": { "type": { "values": { "circle": {}, "fill": {} } } }
        }"##;
        let a = Generator::new(&parse_spec_str(forward).unwrap()).render().unwrap();
        let b = Generator::new(&parse_spec_str(reversed).unwrap()).render().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_second_run_touches_nothing() {
        let root = temp_root("idempotent");
        let spec = StyleSpec::embedded().unwrap();
        let generator = Generator::new(&spec);
        let writer = ArtifactWriter::new(&root, false);

        let first = generator.generate(&writer).unwrap();
        assert!(first.unchanged.is_empty());
        assert_eq!(first.updated.len(), spec.layers.len() * 4 + 3);

        let path = root.join("src/mbgl/style/light.cpp");
        let before = fs::read(&path).unwrap();
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();

        let second = generator.generate(&writer).unwrap();
        assert!(second.updated.is_empty());
        assert_eq!(second.unchanged.len(), first.updated.len());
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), mtime);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let root = temp_root("dry_run");
        let spec = parse_spec_str(FILL_ONLY).unwrap();
        let report = Generator::new(&spec)
            .generate(&ArtifactWriter::new(&root, true))
            .unwrap();
        assert_eq!(report.would_update.len(), 7);
        assert!(report.updated.is_empty());
        assert!(!root.exists());
    }

    #[test]
    fn test_type_error_aborts_render() {
        let json = r#"{
            "layer": { "type": { "values": { "fill": {} } } },
            "paint_fill": { "fill-legacy": { "type": "image", "property-type": "data-constant" } }
        }"#;
        let spec = parse_spec_str(json).unwrap();
        let err = Generator::new(&spec).render().unwrap_err();
        assert!(matches!(err, TypeError::NoEvaluatedType { .. }));
    }
}
