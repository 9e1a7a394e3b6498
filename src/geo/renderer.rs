//! Map rendering: basemap tiles and the vector overlay.

use super::{GeoShape, MapProjection, OverlayLayer, OverlayStyle, TileCache};
use super::{visible_tiles, Basemap};
use eframe::egui::{self, epaint::Vertex, Color32, Mesh, Painter, Pos2, Rect, Shape, Stroke};
use geo_types::Coord;

const FULL_UV: Rect = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));

/// Placeholder color drawn under tiles that are still loading.
const TILE_PLACEHOLDER: Color32 = Color32::from_rgb(221, 221, 221);

/// Draws the basemap tiles covering the projection's screen rectangle.
///
/// Missing tiles are requested from the cache and painted as a placeholder.
pub fn render_tiles(
    ctx: &egui::Context,
    painter: &Painter,
    projection: &MapProjection,
    basemap: &Basemap,
    cache: &mut TileCache,
) {
    painter.rect_filled(projection.screen_rect, 0.0, TILE_PLACEHOLDER);

    let zoom = projection.tile_zoom(basemap.max_zoom);
    for placement in visible_tiles(projection, zoom) {
        if let Some(texture) = cache.get_or_request(ctx, basemap, placement.id) {
            painter.image(texture.id(), placement.rect, FULL_UV, Color32::WHITE);
        }
    }
}

/// Draws every shape of the overlay with its style.
pub fn render_overlay(painter: &Painter, layer: &OverlayLayer, projection: &MapProjection) {
    let visible = projection.visible_bounds();
    let style = &layer.style;

    for feature in &layer.features {
        // Bounds check before projecting every coordinate
        if let Some(bounds) = feature.bounds {
            if !bounds.intersects(&visible) {
                continue;
            }
        }
        for shape in &feature.shapes {
            render_shape(painter, shape, projection, style);
        }
    }
}

fn render_shape(
    painter: &Painter,
    shape: &GeoShape,
    projection: &MapProjection,
    style: &OverlayStyle,
) {
    let stroke = Stroke::new(style.stroke_width, style.stroke_color);
    let to_screen = |coords: &[Coord<f64>]| -> Vec<Pos2> {
        coords.iter().map(|c| projection.geo_to_screen(*c)).collect()
    };

    match shape {
        GeoShape::Point(coord) => {
            let pos = projection.geo_to_screen(*coord);
            painter.circle(pos, style.point_radius, style.fill_color(), stroke);
        }
        GeoShape::LineString(coords) => {
            if coords.len() >= 2 {
                painter.add(Shape::line(to_screen(coords), stroke));
            }
        }
        GeoShape::Polygon { exterior, holes } => {
            let exterior = to_screen(exterior);
            let holes: Vec<Vec<Pos2>> = holes.iter().map(|h| to_screen(h)).collect();

            if let Some(mesh) = fill_mesh(&exterior, &holes, style.fill_color()) {
                painter.add(Shape::mesh(mesh));
            }
            for ring in std::iter::once(&exterior).chain(holes.iter()) {
                if ring.len() >= 2 {
                    painter.add(Shape::closed_line(ring.clone(), stroke));
                }
            }
        }
    }
}

/// Drops a repeated closing vertex, which earcut does not expect.
fn open_ring(ring: &[Pos2]) -> &[Pos2] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Triangulates a polygon (in screen space) into a filled mesh.
fn fill_mesh(exterior: &[Pos2], holes: &[Vec<Pos2>], color: Color32) -> Option<Mesh> {
    let mut vertices: Vec<Pos2> = Vec::new();
    let mut hole_indices = Vec::with_capacity(holes.len());

    vertices.extend_from_slice(open_ring(exterior));
    if vertices.len() < 3 {
        return None;
    }
    for hole in holes {
        let hole = open_ring(hole);
        if hole.len() < 3 {
            continue;
        }
        hole_indices.push(vertices.len());
        vertices.extend_from_slice(hole);
    }

    let flat: Vec<f64> = vertices
        .iter()
        .flat_map(|p| [p.x as f64, p.y as f64])
        .collect();
    let indices = match earcutr::earcut(&flat, &hole_indices, 2) {
        Ok(indices) => indices,
        Err(e) => {
            log::debug!("Polygon triangulation failed: {:?}", e);
            return None;
        }
    };
    if indices.is_empty() {
        return None;
    }

    let mut mesh = Mesh::default();
    mesh.vertices = vertices
        .iter()
        .map(|&pos| Vertex {
            pos,
            uv: egui::epaint::WHITE_UV,
            color,
        })
        .collect();
    mesh.indices = indices.into_iter().map(|i| i as u32).collect();
    Some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> Vec<Pos2> {
        vec![
            Pos2::new(0.0, 0.0),
            Pos2::new(size, 0.0),
            Pos2::new(size, size),
            Pos2::new(0.0, size),
            Pos2::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_fill_square() {
        let mesh = fill_mesh(&square(10.0), &[], Color32::RED).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn test_fill_with_hole() {
        let hole: Vec<Pos2> = square(2.0)
            .into_iter()
            .map(|p| p + egui::vec2(4.0, 4.0))
            .collect();
        let mesh = fill_mesh(&square(10.0), &[hole], Color32::RED).unwrap();
        assert_eq!(mesh.vertices.len(), 8);
        // 8 triangles for a square with a square hole
        assert_eq!(mesh.indices.len(), 24);
    }

    #[test]
    fn test_degenerate_ring_not_filled() {
        let ring = vec![Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0), Pos2::new(0.0, 0.0)];
        assert!(fill_mesh(&ring, &[], Color32::RED).is_none());
    }
}
