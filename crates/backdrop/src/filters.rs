use themeconfig::FilterCoefficients;

use crate::markup::{format_number, Element};

/// Identifier sibling elements use to opt into the frosted glass look
/// (`filter: url(#glass-effect)`). Renaming it breaks every consumer.
pub const GLASS_EFFECT_ID: &str = "glass-effect";
/// Identifier of the metaball style blur/threshold filter.
pub const GOOEY_FILTER_ID: &str = "gooey-filter";

/// Alpha threshold applied after the gooey blur: `alpha * 19 - 9`.
const GOOEY_ALPHA_MATRIX: &str = "1 0 0 0 0  0 1 0 0 0  0 0 1 0 0  0 0 0 19 -9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOperator {
    Over,
    In,
    Atop,
}

impl CompositeOperator {
    fn as_str(self) -> &'static str {
        match self {
            Self::Over => "over",
            Self::In => "in",
            Self::Atop => "atop",
        }
    }
}

/// SVG filter primitives used by the backdrop filters.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPrimitive {
    Turbulence {
        base_frequency: f32,
        octaves: u32,
        result: &'static str,
    },
    DisplacementMap {
        input: &'static str,
        displacement: &'static str,
        scale: f32,
    },
    ColorMatrix {
        input: Option<&'static str>,
        values: String,
        result: Option<&'static str>,
    },
    GaussianBlur {
        input: &'static str,
        std_deviation: f32,
        result: &'static str,
    },
    Composite {
        input: &'static str,
        backdrop: &'static str,
        operator: CompositeOperator,
    },
}

impl FilterPrimitive {
    pub fn to_element(&self) -> Element {
        match self {
            Self::Turbulence {
                base_frequency,
                octaves,
                result,
            } => Element::new("feTurbulence")
                .attr("baseFrequency", format_number(*base_frequency))
                .attr("numOctaves", octaves.to_string())
                .attr("result", *result),
            Self::DisplacementMap {
                input,
                displacement,
                scale,
            } => Element::new("feDisplacementMap")
                .attr("in", *input)
                .attr("in2", *displacement)
                .attr("scale", format_number(*scale)),
            Self::ColorMatrix {
                input,
                values,
                result,
            } => {
                let mut element = Element::new("feColorMatrix");
                if let Some(input) = input {
                    element = element.attr("in", *input);
                }
                element = element.attr("type", "matrix").attr("values", values.as_str());
                if let Some(result) = result {
                    element = element.attr("result", *result);
                }
                element
            }
            Self::GaussianBlur {
                input,
                std_deviation,
                result,
            } => Element::new("feGaussianBlur")
                .attr("in", *input)
                .attr("stdDeviation", format_number(*std_deviation))
                .attr("result", *result),
            Self::Composite {
                input,
                backdrop,
                operator,
            } => Element::new("feComposite")
                .attr("in", *input)
                .attr("in2", *backdrop)
                .attr("operator", operator.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterDefinition {
    pub id: &'static str,
    pub primitives: Vec<FilterPrimitive>,
}

impl FilterDefinition {
    pub fn to_element(&self) -> Element {
        Element::new("filter")
            .attr("id", self.id)
            .attr("x", "-50%")
            .attr("y", "-50%")
            .attr("width", "200%")
            .attr("height", "200%")
            .children(self.primitives.iter().map(FilterPrimitive::to_element))
    }
}

/// Noise displacement followed by the theme tint.
pub fn glass_effect(coefficients: &FilterCoefficients) -> FilterDefinition {
    FilterDefinition {
        id: GLASS_EFFECT_ID,
        primitives: vec![
            FilterPrimitive::Turbulence {
                base_frequency: 0.005,
                octaves: 1,
                result: "noise",
            },
            FilterPrimitive::DisplacementMap {
                input: "SourceGraphic",
                displacement: "noise",
                scale: 0.3,
            },
            FilterPrimitive::ColorMatrix {
                input: None,
                values: coefficients.color_matrix_values(),
                result: Some("tint"),
            },
        ],
    }
}

pub fn gooey_filter() -> FilterDefinition {
    FilterDefinition {
        id: GOOEY_FILTER_ID,
        primitives: vec![
            FilterPrimitive::GaussianBlur {
                input: "SourceGraphic",
                std_deviation: 4.0,
                result: "blur",
            },
            FilterPrimitive::ColorMatrix {
                input: Some("blur"),
                values: GOOEY_ALPHA_MATRIX.to_string(),
                result: Some("gooey"),
            },
            FilterPrimitive::Composite {
                input: "SourceGraphic",
                backdrop: "gooey",
                operator: CompositeOperator::Atop,
            },
        ],
    }
}

/// Zero-size SVG carrying both shared filter definitions.
pub fn filter_defs(coefficients: &FilterCoefficients) -> Element {
    Element::new("svg")
        .attr("class", "shader-filters")
        .attr("width", "0")
        .attr("height", "0")
        .attr("aria-hidden", "true")
        .attr("style", "position:absolute")
        .child(
            Element::new("defs")
                .child(glass_effect(coefficients).to_element())
                .child(gooey_filter().to_element()),
        )
}
