//! Layer type entries.

use super::collate::locale_cmp;
use super::property::PropertySpec;

/// Layout property every layer handles itself; never generated per layer.
pub const VISIBILITY: &str = "visibility";

/// One layer type with its layout and paint property sets.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    /// Unique type name, e.g. `fill-extrusion`
    pub type_name: String,
    pub doc: String,
    pub layout: Vec<PropertySpec>,
    pub paint: Vec<PropertySpec>,
}

impl LayerSpec {
    /// Build a layer with its property sets sorted by name.
    pub fn new(
        type_name: impl Into<String>,
        doc: impl Into<String>,
        layout: Vec<PropertySpec>,
        paint: Vec<PropertySpec>,
    ) -> Self {
        let mut layer = Self {
            type_name: type_name.into(),
            doc: doc.into(),
            layout: layout.into_iter().filter(|p| p.name != VISIBILITY).collect(),
            paint,
        };
        layer.sort_properties();
        layer
    }

    /// File stem used for generated artifacts (`fill-extrusion` -> `fill_extrusion`).
    pub fn stem(&self) -> String {
        self.type_name.replace('-', "_")
    }

    /// Restore locale-aware name order of both property sets.
    pub fn sort_properties(&mut self) {
        self.layout.sort_by(|a, b| locale_cmp(&a.name, &b.name));
        self.paint.sort_by(|a, b| locale_cmp(&a.name, &b.name));
    }

    pub fn paint_property(&self, name: &str) -> Option<&PropertySpec> {
        self.paint.iter().find(|p| p.name == name)
    }

    pub fn layout_property(&self, name: &str) -> Option<&PropertySpec> {
        self.layout.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::property::{PropertyKind, ValueType};

    fn prop(name: &str) -> PropertySpec {
        PropertySpec::new(name, ValueType::Number, PropertyKind::DataDriven)
    }

    #[test]
    fn test_properties_sorted_and_visibility_dropped() {
        let layer = LayerSpec::new(
            "line",
            "A stroked line.",
            vec![prop("line-miter-limit"), prop("visibility"), prop("line-cap")],
            vec![prop("line-width"), prop("line-blur"), prop("line-color")],
        );
        let layout: Vec<_> = layer.layout.iter().map(|p| p.name.as_str()).collect();
        let paint: Vec<_> = layer.paint.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(layout, vec!["line-cap", "line-miter-limit"]);
        assert_eq!(paint, vec!["line-blur", "line-color", "line-width"]);
    }

    #[test]
    fn test_stem() {
        let layer = LayerSpec::new("fill-extrusion", "", vec![], vec![]);
        assert_eq!(layer.stem(), "fill_extrusion");
    }
}
