//! Overlay layer built from user-supplied GeoJSON.

use super::GeoBounds;
use eframe::egui::Color32;
use geo_types::Coord;
use geojson::{Feature, GeoJson, Geometry, Value};

/// Why a GeoJSON document could not be turned into an overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJsonError {
    /// The bytes are not UTF-8 text.
    Encoding(String),
    /// The text is not JSON.
    Json(String),
    /// The JSON is not a GeoJSON object.
    NotGeoJson(String),
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::Encoding(msg) => write!(f, "not UTF-8 text ({})", msg),
            GeoJsonError::Json(msg) => write!(f, "invalid JSON ({})", msg),
            GeoJsonError::NotGeoJson(msg) => write!(f, "not a GeoJSON object ({})", msg),
        }
    }
}

impl std::error::Error for GeoJsonError {}

/// A drawable geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoShape {
    Point(Coord<f64>),
    LineString(Vec<Coord<f64>>),
    Polygon {
        exterior: Vec<Coord<f64>>,
        holes: Vec<Vec<Coord<f64>>>,
    },
}

impl GeoShape {
    /// All coordinates of the shape, holes included.
    pub fn coords(&self) -> Box<dyn Iterator<Item = &Coord<f64>> + '_> {
        match self {
            GeoShape::Point(coord) => Box::new(std::iter::once(coord)),
            GeoShape::LineString(coords) => Box::new(coords.iter()),
            GeoShape::Polygon { exterior, holes } => {
                Box::new(exterior.iter().chain(holes.iter().flatten()))
            }
        }
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_coords(self.coords())
    }
}

/// One GeoJSON feature: its shapes and the popup rows built from its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFeature {
    pub shapes: Vec<GeoShape>,
    /// `(key, value)` rows, present only for features with properties.
    pub popup: Option<Vec<(String, String)>>,
    pub bounds: Option<GeoBounds>,
}

impl OverlayFeature {
    fn new(shapes: Vec<GeoShape>, popup: Option<Vec<(String, String)>>) -> Self {
        let bounds = shapes
            .iter()
            .fold(None, |acc, shape| GeoBounds::merge(acc, shape.bounds()));
        Self {
            shapes,
            popup,
            bounds,
        }
    }
}

/// Fixed visual style for imported overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub stroke_color: Color32,
    pub stroke_width: f32,
    pub fill_opacity: f32,
    /// Radius of point markers in pixels.
    pub point_radius: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            // #ff6347 (tomato)
            stroke_color: Color32::from_rgb(0xff, 0x63, 0x47),
            stroke_width: 3.0,
            fill_opacity: 0.6,
            point_radius: 6.0,
        }
    }
}

impl OverlayStyle {
    /// Fill color: the stroke color at `fill_opacity`.
    pub fn fill_color(&self) -> Color32 {
        let [r, g, b, _] = self.stroke_color.to_array();
        Color32::from_rgba_unmultiplied(r, g, b, (self.fill_opacity * 255.0).round() as u8)
    }
}

/// A vector overlay built from one GeoJSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    /// Where the data came from (file name or URL)
    pub source: String,
    pub features: Vec<OverlayFeature>,
    pub style: OverlayStyle,
    /// Bounding box of all features, None for an empty document
    pub bounds: Option<GeoBounds>,
}

impl OverlayLayer {
    /// Parses raw bytes (file contents or an HTTP body) into an overlay.
    pub fn from_geojson_bytes(bytes: &[u8], source: &str) -> Result<Self, GeoJsonError> {
        let text = std::str::from_utf8(bytes).map_err(|e| GeoJsonError::Encoding(e.to_string()))?;
        Self::from_geojson_str(text, source)
    }

    /// Parses GeoJSON text into an overlay.
    pub fn from_geojson_str(text: &str, source: &str) -> Result<Self, GeoJsonError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| GeoJsonError::Json(e.to_string()))?;
        let geojson =
            GeoJson::from_json_value(value).map_err(|e| GeoJsonError::NotGeoJson(e.to_string()))?;

        let features: Vec<OverlayFeature> = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features.iter().map(convert_feature).collect(),
            GeoJson::Feature(f) => vec![convert_feature(&f)],
            GeoJson::Geometry(g) => vec![OverlayFeature::new(convert_geometry(&g), None)],
        };

        let bounds = features
            .iter()
            .fold(None, |acc, feature| GeoBounds::merge(acc, feature.bounds));

        Ok(Self {
            source: source.to_string(),
            features,
            style: OverlayStyle::default(),
            bounds,
        })
    }

    /// Number of drawable shapes across all features.
    pub fn shape_count(&self) -> usize {
        self.features.iter().map(|f| f.shapes.len()).sum()
    }
}

fn convert_feature(feature: &Feature) -> OverlayFeature {
    let shapes = feature
        .geometry
        .as_ref()
        .map(convert_geometry)
        .unwrap_or_default();

    let popup = feature
        .properties
        .as_ref()
        .filter(|props| !props.is_empty())
        .map(|props| {
            props
                .iter()
                .map(|(key, value)| (key.clone(), display_value(value)))
                .collect()
        });

    OverlayFeature::new(shapes, popup)
}

/// Formats a property value for a popup row: strings bare, everything else as JSON.
fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_coord(position: &[f64]) -> Option<Coord<f64>> {
    match position {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn to_line(positions: &[Vec<f64>]) -> Vec<Coord<f64>> {
    positions.iter().filter_map(|p| to_coord(p)).collect()
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<GeoShape> {
    let (exterior, holes) = rings.split_first()?;
    Some(GeoShape::Polygon {
        exterior: to_line(exterior),
        holes: holes.iter().map(|ring| to_line(ring)).collect(),
    })
}

fn convert_geometry(geometry: &Geometry) -> Vec<GeoShape> {
    match &geometry.value {
        Value::Point(position) => to_coord(position).map(GeoShape::Point).into_iter().collect(),
        Value::MultiPoint(positions) => positions
            .iter()
            .filter_map(|p| to_coord(p))
            .map(GeoShape::Point)
            .collect(),
        Value::LineString(positions) => vec![GeoShape::LineString(to_line(positions))],
        Value::MultiLineString(lines) => lines
            .iter()
            .map(|line| GeoShape::LineString(to_line(line)))
            .collect(),
        Value::Polygon(rings) => to_polygon(rings).into_iter().collect(),
        Value::MultiPolygon(polygons) => polygons.iter().filter_map(|p| to_polygon(p)).collect(),
        Value::GeometryCollection(geometries) => {
            geometries.iter().flat_map(convert_geometry).collect()
        }
    }
}

/// Holds at most one overlay.
///
/// The only mutations are `replace` and `clear`, so the map can never show
/// two overlays at once.
#[derive(Debug, Default)]
pub struct OverlaySlot {
    layer: Option<OverlayLayer>,
    generation: u64,
}

impl OverlaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `layer`, returning the one it displaced.
    pub fn replace(&mut self, layer: OverlayLayer) -> Option<OverlayLayer> {
        self.generation += 1;
        self.layer.replace(layer)
    }

    pub fn clear(&mut self) -> Option<OverlayLayer> {
        let previous = self.layer.take();
        if previous.is_some() {
            self.generation += 1;
        }
        previous
    }

    pub fn current(&self) -> Option<&OverlayLayer> {
        self.layer.as_ref()
    }

    /// Incremented on every change; lets popups detect a replaced overlay.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "properties": { "name": "Fountain", "height": 4.5 },
              "geometry": { "type": "Point", "coordinates": [2.35, 48.85] } },
            { "type": "Feature",
              "properties": null,
              "geometry": { "type": "LineString", "coordinates": [[2.0, 48.0], [3.0, 49.0]] } },
            { "type": "Feature",
              "properties": { "zone": "A" },
              "geometry": { "type": "Polygon", "coordinates": [
                  [[0, 0], [4, 0], [4, 4], [0, 4], [0, 0]],
                  [[1, 1], [2, 1], [2, 2], [1, 1]]
              ] } }
        ]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let layer = OverlayLayer::from_geojson_str(COLLECTION, "parks.geojson").unwrap();

        assert_eq!(layer.source, "parks.geojson");
        assert_eq!(layer.features.len(), 3);
        assert_eq!(layer.shape_count(), 3);

        let bounds = layer.bounds.unwrap();
        assert_eq!(bounds.min, Coord { x: 0.0, y: 0.0 });
        assert_eq!(bounds.max, Coord { x: 4.0, y: 49.0 });

        match &layer.features[2].shapes[0] {
            GeoShape::Polygon { exterior, holes } => {
                assert_eq!(exterior.len(), 5);
                assert_eq!(holes.len(), 1);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_popup_rows_from_properties() {
        let layer = OverlayLayer::from_geojson_str(COLLECTION, "parks.geojson").unwrap();

        let rows = layer.features[0].popup.as_ref().unwrap();
        assert!(rows.contains(&("name".to_string(), "Fountain".to_string())));
        assert!(rows.contains(&("height".to_string(), "4.5".to_string())));

        assert!(layer.features[1].popup.is_none());
        assert_eq!(
            layer.features[2].popup,
            Some(vec![("zone".to_string(), "A".to_string())])
        );
    }

    #[test]
    fn test_bare_geometry_and_multi_parts() {
        let text = r#"{ "type": "MultiPolygon", "coordinates": [
            [[[0, 0], [1, 0], [1, 1], [0, 0]]],
            [[[5, 5], [6, 5], [6, 6], [5, 5]]]
        ] }"#;
        let layer = OverlayLayer::from_geojson_str(text, "shapes").unwrap();
        assert_eq!(layer.features.len(), 1);
        assert_eq!(layer.shape_count(), 2);
        assert!(layer.features[0].popup.is_none());
    }

    #[test]
    fn test_empty_collection_has_no_bounds() {
        let layer =
            OverlayLayer::from_geojson_str(r#"{"type":"FeatureCollection","features":[]}"#, "x")
                .unwrap();
        assert!(layer.features.is_empty());
        assert!(layer.bounds.is_none());
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = OverlayLayer::from_geojson_str("{not valid", "bad").unwrap_err();
        assert!(matches!(err, GeoJsonError::Json(_)));
    }

    #[test]
    fn test_json_that_is_not_geojson_rejected() {
        let err = OverlayLayer::from_geojson_str(r#"{"hello": "world"}"#, "bad").unwrap_err();
        assert!(matches!(err, GeoJsonError::NotGeoJson(_)));
    }

    #[test]
    fn test_non_utf8_rejected() {
        let err = OverlayLayer::from_geojson_bytes(&[0xff, 0xfe, 0x00], "bad").unwrap_err();
        assert!(matches!(err, GeoJsonError::Encoding(_)));
    }

    #[test]
    fn test_default_style() {
        let style = OverlayStyle::default();
        assert_eq!(style.stroke_color, Color32::from_rgb(255, 99, 71));
        assert_eq!(style.stroke_width, 3.0);
        assert_eq!(style.fill_color().a(), 153);
    }

    #[test]
    fn test_slot_holds_latest_overlay() {
        let mut slot = OverlaySlot::new();
        assert!(slot.current().is_none());

        for i in 0..4 {
            let text = format!(
                r#"{{"type":"Point","coordinates":[{}, 0]}}"#,
                i
            );
            let layer = OverlayLayer::from_geojson_str(&text, &format!("import-{}", i)).unwrap();
            let previous = slot.replace(layer);
            assert_eq!(previous.is_some(), i > 0);
        }

        let current = slot.current().unwrap();
        assert_eq!(current.source, "import-3");
        assert_eq!(slot.generation(), 4);

        assert!(slot.clear().is_some());
        assert!(slot.current().is_none());
        assert_eq!(slot.generation(), 5);
    }
}
