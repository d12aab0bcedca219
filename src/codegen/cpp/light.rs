//! `light.{hpp,cpp}` and `light_properties.hpp`.

use super::properties::{property_list, property_struct};
use super::{Source, evaluated_type};
use crate::codegen::ir::LightIr;

pub fn render_properties(light: &LightIr) -> String {
    let mut src = Source::generated();
    src.line("#pragma once");
    src.blank();
    src.line("#include <mbgl/style/types.hpp>");
    src.line("#include <mbgl/style/properties.hpp>");
    src.line("#include <mbgl/style/position.hpp>");
    src.line("#include <mbgl/util/color.hpp>");
    src.line("#include <mbgl/util/indexed_tuple.hpp>");
    src.blank();
    src.open_namespaces();

    src.line("template <class T>");
    src.line("class LightProperty {");
    src.line("public:");
    src.line("    using TransitionableType = Transitionable<PropertyValue<T>>;");
    src.line("    using UnevaluatedType = Transitioning<PropertyValue<T>>;");
    src.line("    using EvaluatorType = PropertyEvaluator<T>;");
    src.line("    using PossiblyEvaluatedType = T;");
    src.line("    using Type = T;");
    src.line("    static constexpr bool IsDataDriven = false;");
    src.line("    static constexpr bool IsOverridable = false;");
    src.line("};");
    src.blank();

    for property in &light.properties {
        property_struct(&mut src, "Light", property);
    }
    property_list(&mut src, "LightProperties", "Light", &light.properties);

    src.close_namespaces();
    src.finish()
}

pub fn render_header(light: &LightIr) -> String {
    let mut src = Source::generated();
    src.line("#pragma once");
    src.blank();
    src.line("#include <mbgl/style/conversion.hpp>");
    src.line("#include <mbgl/style/property_value.hpp>");
    src.line("#include <mbgl/style/transition_options.hpp>");
    src.line("#include <mbgl/style/types.hpp>");
    src.line("#include <mbgl/util/immutable.hpp>");
    src.blank();
    src.open_namespaces();
    src.line("class LightObserver;");
    src.blank();
    src.line("class Light {");
    src.line("public:");
    src.line("    Light();");
    src.line("    ~Light();");
    src.blank();
    src.line("    // Dynamic properties");
    src.line("    std::optional<conversion::Error> setProperty(const std::string& name, const conversion::Convertible& value);");
    src.blank();

    for property in &light.properties {
        let ty = evaluated_type(&property.evaluated);
        let camel = &property.camel;
        src.line(format!("    static {ty} getDefault{camel}();"));
        src.line(format!("    PropertyValue<{ty}> get{camel}() const;"));
        src.line(format!("    void set{camel}(PropertyValue<{ty}>);"));
        src.line(format!("    void set{camel}Transition(const TransitionOptions&);"));
        src.line(format!("    TransitionOptions get{camel}Transition() const;"));
        src.blank();
    }

    src.line("    class Impl;");
    src.line("    Immutable<Impl> impl;");
    src.line("    explicit Light(Immutable<Impl>);");
    src.line("    Mutable<Impl> mutableImpl() const;");
    src.blank();
    src.line("    LightObserver* observer = nullptr;");
    src.line("    void setObserver(LightObserver*);");
    src.line("};");
    src.blank();
    src.close_namespaces();
    src.finish()
}

pub fn render_source(light: &LightIr) -> String {
    let mut src = Source::generated();
    src.line("#include <mbgl/style/light.hpp>");
    src.line("#include <mbgl/style/light_impl.hpp>");
    src.line("#include <mbgl/style/light_observer.hpp>");
    src.line("#include <mbgl/style/conversion/light.hpp>");
    src.line("#include <mbgl/style/conversion/property_value.hpp>");
    src.line("#include <mbgl/style/conversion/transition_options.hpp>");
    src.line("#include <mbgl/style/conversion/json.hpp>");
    src.line("#include <mbgl/style/conversion_impl.hpp>");
    src.blank();
    src.line("#include <mapbox/eternal.hpp>");
    src.blank();
    src.open_namespaces();

    src.line("static LightObserver nullObserver;");
    src.blank();
    src.line("Light::Light(Immutable<Light::Impl> impl_) : impl(std::move(impl_)), observer(&nullObserver) {}");
    src.blank();
    src.line("Light::Light() : Light(makeMutable<Impl>()) {}");
    src.blank();
    src.line("Light::~Light() = default;");
    src.blank();
    src.line("void Light::setObserver(LightObserver* observer_) {");
    src.line("    observer = observer_ ? observer_ : &nullObserver;");
    src.line("}");
    src.blank();
    src.line("Mutable<Light::Impl> Light::mutableImpl() const {");
    src.line("    return makeMutable<Impl>(*impl);");
    src.line("}");
    src.blank();
    src.line("using namespace conversion;");
    src.blank();

    src.line("namespace {");
    src.blank();
    src.line("enum class Property : uint8_t {");
    for property in &light.properties {
        src.line(format!("    {},", property.camel));
    }
    for property in &light.properties {
        src.line(format!("    {}Transition,", property.camel));
    }
    src.line("};");
    src.blank();
    src.line("template <typename T>");
    src.line("constexpr uint8_t toUint8(T t) noexcept {");
    src.line("    return uint8_t(mbgl::underlying_type(t));");
    src.line("}");
    src.blank();
    let mut entries = Vec::new();
    for property in &light.properties {
        entries.push(format!("{{\"{}\", toUint8(Property::{})}}", property.name, property.camel));
    }
    for property in &light.properties {
        entries.push(format!(
            "{{\"{}-transition\", toUint8(Property::{}Transition)}}",
            property.name, property.camel
        ));
    }
    src.line("MAPBOX_ETERNAL_CONSTEXPR const auto properties = mapbox::eternal::hash_map<mapbox::eternal::string, uint8_t>(");
    src.line(format!("    {{{}}});", entries.join(",\n     ")));
    src.blank();
    src.line("} // namespace");
    src.blank();

    src.line("std::optional<Error> Light::setProperty(const std::string& name, const Convertible& value) {");
    src.line("    const auto it = properties.find(name.c_str());");
    src.line("    if (it == properties.end()) {");
    src.line("        return Error{\"light doesn't support this property\"};");
    src.line("    }");
    src.blank();
    src.line("    auto property = static_cast<Property>(it->second);");
    src.blank();
    for property in &light.properties {
        let ty = evaluated_type(&property.evaluated);
        src.line(format!("    if (property == Property::{}) {{", property.camel));
        src.line("        Error error;");
        src.line(format!(
            "        const auto& typedValue = convert<PropertyValue<{ty}>>(value, error, false, false);"
        ));
        src.line("        if (!typedValue) {");
        src.line("            return error;");
        src.line("        }");
        src.blank();
        src.line(format!("        set{}(*typedValue);", property.camel));
        src.line("        return std::nullopt;");
        src.line("    }");
        src.blank();
    }
    src.line("    Error error;");
    src.line("    std::optional<TransitionOptions> transition = convert<TransitionOptions>(value, error);");
    src.line("    if (!transition) {");
    src.line("        return error;");
    src.line("    }");
    src.blank();
    for property in &light.properties {
        src.line(format!("    if (property == Property::{}Transition) {{", property.camel));
        src.line(format!("        set{}Transition(*transition);", property.camel));
        src.line("        return std::nullopt;");
        src.line("    }");
        src.blank();
    }
    src.line("    return Error{\"light doesn't support this property\"};");
    src.line("}");
    src.blank();

    for property in &light.properties {
        let ty = evaluated_type(&property.evaluated);
        let camel = &property.camel;
        src.line(format!("{ty} Light::getDefault{camel}() {{"));
        src.line(format!("    return Light{camel}::defaultValue();"));
        src.line("}");
        src.blank();
        src.line(format!("PropertyValue<{ty}> Light::get{camel}() const {{"));
        src.line(format!("    return impl->properties.template get<Light{camel}>().value;"));
        src.line("}");
        src.blank();
        src.line(format!("void Light::set{camel}(PropertyValue<{ty}> property) {{"));
        src.line("    auto impl_ = mutableImpl();");
        src.line(format!("    impl_->properties.template get<Light{camel}>().value = property;"));
        src.line("    impl = std::move(impl_);");
        src.line("    observer->onLightChanged(*this);");
        src.line("}");
        src.blank();
        src.line(format!("void Light::set{camel}Transition(const TransitionOptions& options) {{"));
        src.line("    auto impl_ = mutableImpl();");
        src.line(format!("    impl_->properties.template get<Light{camel}>().options = options;"));
        src.line("    impl = std::move(impl_);");
        src.line("    observer->onLightChanged(*this);");
        src.line("}");
        src.blank();
        src.line(format!("TransitionOptions Light::get{camel}Transition() const {{"));
        src.line(format!("    return impl->properties.template get<Light{camel}>().options;"));
        src.line("}");
        src.blank();
    }

    src.close_namespaces();
    src.finish()
}
