//! `<stem>_layer_properties.{hpp,cpp}`: the internal property table.
//!
//! Rendered from the full IR, synthetic properties included.

use super::{Source, container_type, default_literal, evaluated_type, expression_type};
use crate::codegen::ir::{LayerIr, PropertyIr};

/// One container struct per property.
pub(crate) fn property_struct(src: &mut Source, prefix: &str, property: &PropertyIr) {
    let ty = evaluated_type(&property.evaluated);
    src.line(format!(
        "struct {prefix}{} : {} {{",
        property.camel,
        container_type(property)
    ));
    src.line(format!(
        "    static constexpr const char *name() {{ return \"{}\"; }}",
        property.name
    ));
    src.line(format!(
        "    static constexpr auto expressionType() {{ return {}; }}",
        expression_type(&property.expression)
    ));
    src.line(format!(
        "    static {ty} defaultValue() {{ return {}; }}",
        default_literal(&property.default)
    ));
    src.line("};");
    src.blank();
}

/// `class <Name> : public Properties<A, B, ...> {};`
pub(crate) fn property_list(src: &mut Source, class: &str, prefix: &str, properties: &[PropertyIr]) {
    src.line(format!("class {class} : public Properties<"));
    let last = properties.len().saturating_sub(1);
    for (i, property) in properties.iter().enumerate() {
        let sep = if i == last { "" } else { "," };
        src.line(format!("    {prefix}{}{sep}", property.camel));
    }
    src.line("> {};");
    src.blank();
}

pub fn render_header(layer: &LayerIr) -> String {
    let camel = &layer.camel;
    let mut src = Source::generated();
    src.line("#pragma once");
    src.blank();
    src.line("#include <mbgl/style/types.hpp>");
    src.line("#include <mbgl/style/layer_properties.hpp>");
    src.line(format!("#include <mbgl/style/layers/{}_layer.hpp>", layer.stem));
    src.line("#include <mbgl/style/layout_property.hpp>");
    src.line("#include <mbgl/style/paint_property.hpp>");
    src.line("#include <mbgl/style/properties.hpp>");
    src.line("#include <mbgl/shaders/attributes.hpp>");
    src.line("#include <mbgl/shaders/uniforms.hpp>");
    src.blank();
    src.open_namespaces();

    for property in &layer.layout {
        property_struct(&mut src, "", property);
    }
    for property in &layer.paint {
        property_struct(&mut src, "", property);
    }

    if !layer.layout.is_empty() {
        property_list(&mut src, &format!("{camel}LayoutProperties"), "", &layer.layout);
    }
    property_list(&mut src, &format!("{camel}PaintProperties"), "", &layer.paint);

    src.line(format!("class {camel}LayerProperties final : public LayerProperties {{"));
    src.line("public:");
    src.line(format!("    explicit {camel}LayerProperties(Immutable<{camel}Layer::Impl>);"));
    src.line(format!("    {camel}LayerProperties("));
    src.line(format!("        Immutable<{camel}Layer::Impl>,"));
    if layer.has_cross_faded() {
        src.line("        CrossfadeParameters,");
    }
    src.line(format!("        {camel}PaintProperties::PossiblyEvaluated);"));
    src.line(format!("    ~{camel}LayerProperties() override;"));
    src.blank();
    src.line("    unsigned long constantsMask() const override;");
    src.blank();
    src.line(format!("    const {camel}Layer::Impl& layerImpl() const noexcept;"));
    src.line("    // Data members.");
    if layer.has_cross_faded() {
        src.line("    CrossfadeParameters crossfade;");
    }
    src.line(format!("    {camel}PaintProperties::PossiblyEvaluated evaluated;"));
    src.line("};");
    src.blank();

    src.close_namespaces();
    src.finish()
}

pub fn render_source(layer: &LayerIr) -> String {
    let camel = &layer.camel;
    let class = format!("{camel}LayerProperties");
    let mut src = Source::generated();
    src.line(format!("#include <mbgl/style/layers/{}_layer_properties.hpp>", layer.stem));
    src.blank();
    src.line(format!("#include <mbgl/style/layers/{}_layer_impl.hpp>", layer.stem));
    src.blank();
    src.open_namespaces();

    src.line(format!("{class}::{class}("));
    src.line(format!("    Immutable<{camel}Layer::Impl> impl_)"));
    src.line("    : LayerProperties(std::move(impl_)) {}");
    src.blank();

    src.line(format!("{class}::{class}("));
    src.line(format!("    Immutable<{camel}Layer::Impl> impl_,"));
    if layer.has_cross_faded() {
        src.line("    CrossfadeParameters crossfade_,");
    }
    src.line(format!("    {camel}PaintProperties::PossiblyEvaluated evaluated_)"));
    if layer.has_cross_faded() {
        src.line("  : LayerProperties(std::move(impl_)),");
        src.line("    crossfade(std::move(crossfade_)),");
    } else {
        src.line("  : LayerProperties(std::move(impl_)),");
    }
    src.line("    evaluated(std::move(evaluated_)) {}");
    src.blank();

    src.line(format!("{class}::~{class}() = default;"));
    src.blank();
    src.line(format!("unsigned long {class}::constantsMask() const {{"));
    src.line("    return evaluated.constantsMask();");
    src.line("}");
    src.blank();
    src.line(format!("const {camel}Layer::Impl& {class}::layerImpl() const noexcept {{"));
    src.line(format!("    return static_cast<const {camel}Layer::Impl&>(*baseImpl);"));
    src.line("}");
    src.blank();

    src.close_namespaces();
    src.finish()
}
