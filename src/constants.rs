/// DOM-facing constants for the web front-end.
///
/// Node ids used by the scene are the registry names from the composition
/// table; these are the few ids and classes the front-end itself needs.
// Root <svg> of the scene; its rendered width drives the pointer mapping
pub const SCENE_ELEMENT_ID: &str = "scene";

// Class carried by lazily gated groups until their gate activates
pub const LAZY_PLACEHOLDER_CLASS: &str = "lazy-placeholder";

// SVG attributes written by the render target
pub const ATTR_TRANSFORM: &str = "transform";
pub const ATTR_OPACITY: &str = "opacity";
pub const ATTR_HUE_VALUES: &str = "values"; // feColorMatrix type="hueRotate"

// Decimal places kept when formatting attribute values
pub const ATTR_PRECISION: usize = 3;

// Viewport size used before the first resize event can be measured
pub const FALLBACK_VIEWPORT_W: f32 = 1280.0;
pub const FALLBACK_VIEWPORT_H: f32 = 800.0;

#[inline]
pub fn root_margin_css(px: f32) -> String {
    format!("{}px", px.max(0.0).round())
}

#[inline]
pub fn format_attr(value: f32) -> String {
    let s = format!("{:.*}", ATTR_PRECISION, value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "" | "-0" => "0".to_string(),
        _ => s.to_string(),
    }
}
