//! `<stem>_layer.{hpp,cpp}`: the public layer class.
//!
//! Rendered from `LayerIr::public()`, so synthetic properties never reach
//! the public API.

use indexmap::IndexMap;

use super::{Source, value_type};
use crate::codegen::ir::{LayerIr, PropertyIr};
use crate::types::ValueWrapper;

/// Properties whose string values may contain `{token}` references.
const TOKEN_PROPERTIES: &[&str] = &["icon-image", "text-field"];

fn layer_constructor_params(layer: &LayerIr) -> &'static str {
    if layer.has_source() {
        "const std::string& layerID, const std::string& sourceID"
    } else {
        "const std::string& layerID"
    }
}

pub fn render_header(layer: &LayerIr) -> String {
    let class = format!("{}Layer", layer.camel);
    let mut src = Source::generated();
    src.line("#pragma once");
    src.blank();
    src.line("#include <mbgl/style/layer.hpp>");
    src.line("#include <mbgl/style/filter.hpp>");
    src.line("#include <mbgl/style/property_value.hpp>");
    if layer.has_color_ramp() {
        src.line("#include <mbgl/style/color_ramp_property_value.hpp>");
    }
    src.line("#include <mbgl/util/color.hpp>");
    src.blank();
    src.open_namespaces();
    src.line("class TransitionOptions;");
    src.blank();
    if !layer.doc.is_empty() {
        src.line(format!("// {}", layer.doc));
    }
    src.line(format!("class {class} final : public Layer {{"));
    src.line("public:");
    src.line(format!("    {class}({});", layer_constructor_params(layer)));
    src.line(format!("    ~{class}() final;"));
    src.blank();

    if !layer.layout.is_empty() {
        src.line("    // Layout properties");
        src.blank();
        for property in &layer.layout {
            accessor_declarations(&mut src, property, false);
        }
    }

    src.line("    // Paint properties");
    src.blank();
    for property in &layer.paint {
        accessor_declarations(&mut src, property, true);
    }

    src.line("    // Private implementation");
    src.blank();
    src.line("    class Impl;");
    src.line("    const Impl& impl() const;");
    src.blank();
    src.line("    Mutable<Impl> mutableImpl() const;");
    src.line(format!("    {class}(Immutable<Impl>);"));
    src.line("    std::unique_ptr<Layer> cloneRef(const std::string& id) const final;");
    src.blank();
    src.line("protected:");
    src.line("    // Dynamic properties");
    src.line("    std::optional<conversion::Error> setPropertyInternal(const std::string& name, const conversion::Convertible& value) final;");
    src.blank();
    src.line("    Mutable<Layer::Impl> mutableBaseImpl() const final;");
    src.line("};");
    src.blank();
    src.close_namespaces();
    src.finish()
}

fn accessor_declarations(src: &mut Source, property: &PropertyIr, paint: bool) {
    let ty = value_type(property);
    let camel = &property.camel;
    if let Some(doc) = &property.doc {
        src.line(format!("    // {doc}"));
    }
    src.line(format!("    static {ty} getDefault{camel}();"));
    src.line(format!("    const {ty}& get{camel}() const;"));
    src.line(format!("    void set{camel}(const {ty}&);"));
    if paint {
        src.line(format!("    void set{camel}Transition(const TransitionOptions&);"));
        src.line(format!("    TransitionOptions get{camel}Transition() const;"));
    }
    src.blank();
}

pub fn render_source(layer: &LayerIr) -> String {
    let class = format!("{}Layer", layer.camel);
    let mut src = Source::generated();
    src.line(format!("#include <mbgl/style/layers/{}_layer.hpp>", layer.stem));
    src.line(format!("#include <mbgl/style/layers/{}_layer_impl.hpp>", layer.stem));
    src.line("#include <mbgl/style/layer_observer.hpp>");
    src.line("#include <mbgl/style/conversion/color_ramp_property_value.hpp>");
    src.line("#include <mbgl/style/conversion/constant.hpp>");
    src.line("#include <mbgl/style/conversion/property_value.hpp>");
    src.line("#include <mbgl/style/conversion/transition_options.hpp>");
    src.line("#include <mbgl/style/conversion/json.hpp>");
    src.line("#include <mbgl/style/conversion_impl.hpp>");
    src.line("#include <mbgl/util/traits.hpp>");
    src.blank();
    src.line("#include <mapbox/eternal.hpp>");
    src.blank();
    src.open_namespaces();

    // Construction and cloning
    if layer.has_source() {
        src.line(format!("{class}::{class}(const std::string& layerID, const std::string& sourceID)"));
        src.line("    : Layer(makeMutable<Impl>(layerID, sourceID)) {");
    } else {
        src.line(format!("{class}::{class}(const std::string& layerID)"));
        src.line("    : Layer(makeMutable<Impl>(layerID, std::string())) {");
    }
    src.line("}");
    src.blank();
    src.line(format!("{class}::{class}(Immutable<Impl> impl_)"));
    src.line("    : Layer(std::move(impl_)) {");
    src.line("}");
    src.blank();
    src.line(format!("{class}::~{class}() = default;"));
    src.blank();
    src.line(format!("const {class}::Impl& {class}::impl() const {{"));
    src.line("    return static_cast<const Impl&>(*baseImpl);");
    src.line("}");
    src.blank();
    src.line(format!("Mutable<{class}::Impl> {class}::mutableImpl() const {{"));
    src.line("    return makeMutable<Impl>(impl());");
    src.line("}");
    src.blank();
    src.line(format!("std::unique_ptr<Layer> {class}::cloneRef(const std::string& id_) const {{"));
    src.line("    auto impl_ = mutableImpl();");
    src.line("    impl_->id = id_;");
    src.line(format!("    impl_->paint = {}PaintProperties::Transitionable();", layer.camel));
    src.line(format!("    return std::make_unique<{class}>(std::move(impl_));"));
    src.line("}");
    src.blank();

    if !layer.layout.is_empty() {
        src.line("// Layout properties");
        src.blank();
        for property in &layer.layout {
            layout_accessors(&mut src, &class, property);
        }
    }

    src.line("// Paint properties");
    src.blank();
    for property in &layer.paint {
        paint_accessors(&mut src, &class, property);
    }

    src.line("using namespace conversion;");
    src.blank();
    property_table(&mut src, layer);
    set_property_internal(&mut src, &class, layer);

    src.line(format!("Mutable<Layer::Impl> {class}::mutableBaseImpl() const {{"));
    src.line("    return staticMutableCast<Layer::Impl>(mutableImpl());");
    src.line("}");
    src.blank();

    src.close_namespaces();
    src.finish()
}

fn default_getter(src: &mut Source, class: &str, property: &PropertyIr, braced: bool) {
    let ty = value_type(property);
    let camel = &property.camel;
    src.line(format!("{ty} {class}::getDefault{camel}() {{"));
    match (&property.wrapper, &property.raw_default) {
        (ValueWrapper::ColorRamp, Some(raw)) => {
            src.line("    conversion::Error error;");
            src.line(format!("    std::string rawValue = R\"JSON({raw})JSON\";"));
            src.line(format!("    return *conversion::convertJSON<{ty}>(rawValue, error);"));
        }
        (ValueWrapper::ColorRamp, None) => src.line("    return {};"),
        (ValueWrapper::PropertyValue, _) if braced => {
            src.line(format!("    return {{{camel}::defaultValue()}};"))
        }
        (ValueWrapper::PropertyValue, _) => src.line(format!("    return {camel}::defaultValue();")),
    }
    src.line("}");
    src.blank();
}

fn layout_accessors(src: &mut Source, class: &str, property: &PropertyIr) {
    let ty = value_type(property);
    let camel = &property.camel;
    default_getter(src, class, property, false);
    src.line(format!("const {ty}& {class}::get{camel}() const {{"));
    src.line(format!("    return impl().layout.get<{camel}>();"));
    src.line("}");
    src.blank();
    src.line(format!("void {class}::set{camel}(const {ty}& value) {{"));
    src.line(format!("    if (value == get{camel}()) return;"));
    src.line("    auto impl_ = mutableImpl();");
    src.line(format!("    impl_->layout.get<{camel}>() = value;"));
    src.line("    baseImpl = std::move(impl_);");
    src.line("    observer->onLayerChanged(*this);");
    src.line("}");
    src.blank();
}

fn paint_accessors(src: &mut Source, class: &str, property: &PropertyIr) {
    let ty = value_type(property);
    let camel = &property.camel;
    default_getter(src, class, property, true);
    src.line(format!("const {ty}& {class}::get{camel}() const {{"));
    src.line(format!("    return impl().paint.template get<{camel}>().value;"));
    src.line("}");
    src.blank();
    src.line(format!("void {class}::set{camel}(const {ty}& value) {{"));
    src.line(format!("    if (value == get{camel}()) return;"));
    src.line("    auto impl_ = mutableImpl();");
    src.line(format!("    impl_->paint.template get<{camel}>().value = value;"));
    src.line("    baseImpl = std::move(impl_);");
    src.line("    observer->onLayerChanged(*this);");
    src.line("}");
    src.blank();
    src.line(format!("void {class}::set{camel}Transition(const TransitionOptions& options) {{"));
    src.line("    auto impl_ = mutableImpl();");
    src.line(format!("    impl_->paint.template get<{camel}>().options = options;"));
    src.line("    baseImpl = std::move(impl_);");
    src.line("}");
    src.blank();
    src.line(format!("TransitionOptions {class}::get{camel}Transition() const {{"));
    src.line(format!("    return impl().paint.template get<{camel}>().options;"));
    src.line("}");
    src.blank();
}

/// `Property` enum plus the name -> index table.
fn property_table(src: &mut Source, layer: &LayerIr) {
    src.line("namespace {");
    src.blank();
    src.line(format!(
        "constexpr uint8_t kPaintPropertyCount = {}u;",
        layer.paint.len() * 2
    ));
    src.blank();
    src.line("enum class Property : uint8_t {");
    for property in &layer.paint {
        src.line(format!("    {},", property.camel));
    }
    for property in &layer.paint {
        src.line(format!("    {}Transition,", property.camel));
    }
    for (i, property) in layer.layout.iter().enumerate() {
        if i == 0 {
            src.line(format!("    {} = kPaintPropertyCount,", property.camel));
        } else {
            src.line(format!("    {},", property.camel));
        }
    }
    src.line("};");
    src.blank();
    src.line("template <typename T>");
    src.line("constexpr uint8_t toUint8(T t) noexcept {");
    src.line("    return uint8_t(mbgl::underlying_type(t));");
    src.line("}");
    src.blank();

    let mut entries: Vec<String> = Vec::new();
    for property in &layer.paint {
        entries.push(format!("{{\"{}\", toUint8(Property::{})}}", property.name, property.camel));
    }
    for property in &layer.paint {
        entries.push(format!(
            "{{\"{}-transition\", toUint8(Property::{}Transition)}}",
            property.name, property.camel
        ));
    }
    for property in &layer.layout {
        entries.push(format!("{{\"{}\", toUint8(Property::{})}}", property.name, property.camel));
    }
    src.line("MAPBOX_ETERNAL_CONSTEXPR const auto layerProperties = mapbox::eternal::hash_map<mapbox::eternal::string, uint8_t>(");
    src.line(format!("    {{{}}});", entries.join(",\n     ")));
    src.blank();
    src.line("} // namespace");
    src.blank();
}

/// Conversion dispatch grouped by target value type.
fn set_property_internal(src: &mut Source, class: &str, layer: &LayerIr) {
    let mut groups: IndexMap<(String, bool, bool), Vec<&PropertyIr>> = IndexMap::new();
    for property in layer.paint.iter().chain(layer.layout.iter()) {
        let key = (
            value_type(property),
            property.is_data_driven(),
            TOKEN_PROPERTIES.contains(&property.name.as_str()),
        );
        groups.entry(key).or_default().push(property);
    }

    src.line(format!(
        "std::optional<Error> {class}::setPropertyInternal(const std::string& name, const Convertible& value) {{"
    ));
    src.line("    const auto it = layerProperties.find(name.c_str());");
    src.line("    if (it == layerProperties.end()) return Error{\"layer doesn't support this property\"};");
    src.blank();
    src.line("    auto property = static_cast<Property>(it->second);");
    src.blank();

    for ((ty, data_driven, tokens), properties) in &groups {
        let condition = properties
            .iter()
            .map(|p| format!("property == Property::{}", p.camel))
            .collect::<Vec<_>>()
            .join(" || ");
        src.line(format!("    if ({condition}) {{"));
        src.line("        Error error;");
        src.line(format!(
            "        const auto& typedValue = convert<{ty}>(value, error, {data_driven}, {tokens});"
        ));
        src.line("        if (!typedValue) {");
        src.line("            return error;");
        src.line("        }");
        src.blank();
        for property in properties {
            src.line(format!("        if (property == Property::{}) {{", property.camel));
            src.line(format!("            set{}(*typedValue);", property.camel));
            src.line("            return std::nullopt;");
            src.line("        }");
        }
        src.line("    }");
        src.blank();
    }

    src.line("    Error error;");
    src.line("    std::optional<TransitionOptions> transition = convert<TransitionOptions>(value, error);");
    src.line("    if (!transition) {");
    src.line("        return error;");
    src.line("    }");
    src.blank();
    for property in &layer.paint {
        src.line(format!("    if (property == Property::{}Transition) {{", property.camel));
        src.line(format!("        set{}Transition(*transition);", property.camel));
        src.line("        return std::nullopt;");
        src.line("    }");
        src.blank();
    }
    src.line("    return Error{\"layer doesn't support this property\"};");
    src.line("}");
    src.blank();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::ir::inject_synthetic;
    use crate::spec::{LayerSpec, PropertyKind, PropertySpec, ValueType};
    use crate::types::TypeMapper;
    use serde_json::json;

    fn ir(layer: LayerSpec) -> LayerIr {
        LayerIr::build(&TypeMapper::layers(), &layer).unwrap()
    }

    #[test]
    fn test_header_accessors() {
        let fill = ir(LayerSpec::new(
            "fill",
            "A filled polygon.",
            vec![PropertySpec::new("fill-sort-key", ValueType::Number, PropertyKind::DataDriven)],
            vec![
                PropertySpec::new("fill-color", ValueType::Color, PropertyKind::DataDriven)
                    .with_default(json!("#000000")),
            ],
        ));
        let header = render_header(&fill);
        assert!(header.contains("class FillLayer final : public Layer {"));
        assert!(header.contains("    FillLayer(const std::string& layerID, const std::string& sourceID);"));
        assert!(header.contains("    static PropertyValue<float> getDefaultFillSortKey();"));
        assert!(header.contains("    void setFillColor(const PropertyValue<Color>&);"));
        assert!(header.contains("    void setFillColorTransition(const TransitionOptions&);"));
        assert!(!header.contains("setFillSortKeyTransition"));
    }

    #[test]
    fn test_property_doc_precedes_accessors() {
        let fill = ir(LayerSpec::new(
            "fill",
            "",
            vec![],
            vec![
                PropertySpec::new("fill-opacity", ValueType::Number, PropertyKind::DataDriven)
                    .with_default(json!(1))
                    .with_doc("The opacity of the entire fill layer.\n  Ranges from 0 to 1."),
                PropertySpec::new("fill-antialias", ValueType::Boolean, PropertyKind::DataConstant),
            ],
        ));
        let header = render_header(&fill);
        let comment = "    // The opacity of the entire fill layer. Ranges from 0 to 1.";
        let at = header.find(comment).unwrap();
        assert!(header[at..].starts_with(&format!(
            "{comment}\n    static PropertyValue<float> getDefaultFillOpacity();"
        )));
        assert_eq!(header.matches("    // The opacity").count(), 1);
        assert!(!header.contains("    // \n"));
    }

    #[test]
    fn test_background_has_no_source() {
        let background = ir(LayerSpec::new(
            "background",
            "",
            vec![],
            vec![PropertySpec::new("background-opacity", ValueType::Number, PropertyKind::DataConstant)],
        ));
        let header = render_header(&background);
        assert!(header.contains("    BackgroundLayer(const std::string& layerID);"));
        assert!(!header.contains("// Layout properties"));
    }

    #[test]
    fn test_source_property_table() {
        let mut line = LayerSpec::new(
            "line",
            "",
            vec![PropertySpec::new("line-cap", ValueType::Enum, PropertyKind::DataConstant)
                .with_default(json!("butt"))],
            vec![
                PropertySpec::new("line-width", ValueType::Number, PropertyKind::DataDriven),
                PropertySpec::new("line-blur", ValueType::Number, PropertyKind::DataDriven),
                PropertySpec::new("line-gradient", ValueType::Color, PropertyKind::ColorRamp),
            ],
        );
        inject_synthetic(&mut line);
        let public = ir(line).public();
        let source = render_source(&public);

        assert!(source.contains("constexpr uint8_t kPaintPropertyCount = 6u;"));
        assert!(source.contains("    LineCap = kPaintPropertyCount,"));
        assert!(source.contains("{\"line-blur-transition\", toUint8(Property::LineBlurTransition)}"));
        assert!(source.contains(
            "    if (property == Property::LineBlur || property == Property::LineWidth) {"
        ));
        assert!(source.contains("convert<PropertyValue<float>>(value, error, true, false);"));
        assert!(source.contains("convert<ColorRampPropertyValue>(value, error, false, false);"));
        assert!(source.contains("ColorRampPropertyValue LineLayer::getDefaultLineGradient() {\n    return {};\n}"));
        assert!(!source.contains("LineFloorWidth"));
        assert!(!source.contains("line-floor-width"));
    }

    #[test]
    fn test_color_ramp_default_reparses_json() {
        let heatmap = ir(LayerSpec::new(
            "heatmap",
            "",
            vec![],
            vec![PropertySpec::new("heatmap-color", ValueType::Color, PropertyKind::ColorRamp)
                .with_default(json!(["interpolate", ["linear"], ["heatmap-density"], 0, "red", 1, "blue"]))],
        ));
        let source = render_source(&heatmap);
        assert!(source.contains(
            r#"std::string rawValue = R"JSON(["interpolate",["linear"],["heatmap-density"],0,"red",1,"blue"])JSON";"#
        ));
        assert!(source.contains("#include <mbgl/util/traits.hpp>"));
    }
}
