//! Typed description of every generated container.
//!
//! One `PropertyIr` per property with everything a renderer needs already
//! resolved: evaluated/expression type, default literal, container kind and
//! GPU bindings. Renderers never look at the spec model directly.

use serde_json::Value;

use crate::defaults::{DefaultLiteral, default_value};
use crate::error::TypeError;
use crate::spec::{LayerSpec, PropertyKind, PropertySpec, ValueType};
use crate::types::{
    Binding, ContainerKind, EvaluatedType, ExpressionType, TypeMapper, ValueWrapper, camelize,
};

/// Data-driven line paint property with no spec entry. It only exists to give
/// the line shader a `floorwidth` binding.
pub const LINE_FLOOR_WIDTH: &str = "line-floor-width";

/// Property set a property was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyGroup {
    Layout,
    Paint,
    Light,
}

/// Fully resolved property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyIr {
    /// Style name, e.g. `fill-color`
    pub name: String,
    /// Container type name, e.g. `FillColor`
    pub camel: String,
    pub group: PropertyGroup,
    pub kind: PropertyKind,
    /// Spec doc string, flattened to one line
    pub doc: Option<String>,
    pub evaluated: EvaluatedType,
    pub expression: ExpressionType,
    pub default: DefaultLiteral,
    /// Spec default as written, for targets that re-parse it at runtime
    pub raw_default: Option<Value>,
    pub container: ContainerKind,
    pub wrapper: ValueWrapper,
    /// GPU bindings (data-driven paint properties only)
    pub bindings: Vec<Binding>,
    /// Injected by the generator, absent from the public layer API
    pub synthetic: bool,
}

impl PropertyIr {
    pub fn build(
        mapper: &TypeMapper,
        property: &PropertySpec,
        group: PropertyGroup,
        layer_type: &str,
    ) -> Result<Self, TypeError> {
        let container = match group {
            PropertyGroup::Layout => mapper.layout_container(property),
            PropertyGroup::Paint | PropertyGroup::Light => mapper.paint_container(property),
        };
        let bindings = if group == PropertyGroup::Paint && property.is_data_driven() {
            mapper.bindings(property, layer_type)
        } else {
            Vec::new()
        };
        Ok(Self {
            name: property.name.clone(),
            camel: camelize(&property.name),
            group,
            kind: property.kind,
            doc: property
                .doc
                .as_deref()
                .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|d| !d.is_empty()),
            evaluated: mapper.evaluated_type(property)?,
            expression: mapper.expression_type(property)?,
            default: default_value(mapper, property)?,
            raw_default: property.default.clone(),
            container,
            wrapper: mapper.value_wrapper(property),
            bindings,
            synthetic: property.name == LINE_FLOOR_WIDTH,
        })
    }

    pub fn is_data_driven(&self) -> bool {
        self.kind.is_data_driven()
    }

    pub fn is_cross_faded(&self) -> bool {
        self.kind.is_cross_faded()
    }
}

/// One layer type, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerIr {
    pub type_name: String,
    /// `fill_extrusion`
    pub stem: String,
    /// `FillExtrusion`
    pub camel: String,
    pub doc: String,
    pub layout: Vec<PropertyIr>,
    pub paint: Vec<PropertyIr>,
}

impl LayerIr {
    /// Resolve every property of `layer`. Fails on the first type error.
    pub fn build(mapper: &TypeMapper, layer: &LayerSpec) -> Result<Self, TypeError> {
        let resolve = |props: &[PropertySpec], group| {
            props
                .iter()
                .map(|p| PropertyIr::build(mapper, p, group, &layer.type_name))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            type_name: layer.type_name.clone(),
            stem: layer.stem(),
            camel: camelize(&layer.type_name),
            doc: layer.doc.clone(),
            layout: resolve(&layer.layout, PropertyGroup::Layout)?,
            paint: resolve(&layer.paint, PropertyGroup::Paint)?,
        })
    }

    /// Any paint property needs crossfade parameters.
    pub fn has_cross_faded(&self) -> bool {
        self.paint.iter().any(PropertyIr::is_cross_faded)
    }

    pub fn has_color_ramp(&self) -> bool {
        self.paint
            .iter()
            .any(|p| p.wrapper == ValueWrapper::ColorRamp)
    }

    /// Every binding of the internal property table, in property order.
    pub fn bindings(&self) -> impl Iterator<Item = (&PropertyIr, &Binding)> {
        self.paint
            .iter()
            .flat_map(|p| p.bindings.iter().map(move |b| (p, b)))
    }

    /// Layer as exposed by the public class: synthetic properties removed.
    pub fn public(&self) -> LayerIr {
        let mut public = self.clone();
        public.paint.retain(|p| !p.synthetic);
        public
    }

    /// Background has no source.
    pub fn has_source(&self) -> bool {
        self.type_name != "background"
    }
}

/// Light properties, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct LightIr {
    pub properties: Vec<PropertyIr>,
}

impl LightIr {
    /// `mapper` must be in light scope.
    pub fn build(mapper: &TypeMapper, light: &[PropertySpec]) -> Result<Self, TypeError> {
        let properties = light
            .iter()
            .map(|p| PropertyIr::build(mapper, p, PropertyGroup::Light, "light"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { properties })
    }
}

/// Add the synthetic floor-width property to the line layer.
///
/// Returns `false` for every other layer type or when already present.
pub fn inject_synthetic(layer: &mut LayerSpec) -> bool {
    if layer.type_name != "line" || layer.paint_property(LINE_FLOOR_WIDTH).is_some() {
        return false;
    }
    layer.paint.push(
        PropertySpec::new(LINE_FLOOR_WIDTH, ValueType::Number, PropertyKind::DataDriven)
            .with_default(serde_json::json!(1)),
    );
    layer.sort_properties();
    true
}
