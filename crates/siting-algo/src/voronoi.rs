//! Voronoi tessellation in screen space.
//!
//! Sites are Delaunay-triangulated first; a site's Voronoi neighbours are
//! exactly its Delaunay neighbours. Each cell starts as the padded viewport
//! rectangle and is clipped by the perpendicular bisector to each neighbour,
//! nearest first. Clipping stops once the next neighbour is more than twice
//! the cell's current radius away, since its bisector can no longer reach the
//! cell.
//!
//! Cells are in projected screen coordinates, so they must be rebuilt when
//! the projection changes (pan or zoom). A land mask, given in lon/lat, is
//! projected with the same [`Projection`] and intersected with every cell.
//!
//! Degenerate input is handled by omission:
//!
//! - non-finite or unprojectable sites are dropped
//! - a site on the same screen point as an earlier one gets no cell
//! - fewer than two sites produce no cells at all

use std::collections::HashSet;
use std::f64::consts::PI;
use std::fmt::Write as _;

use geo::{coord, BooleanOps, Coord, LineString, MapCoords, MultiPolygon, Polygon, Rect};
use serde::Serialize;
use spade::{DelaunayTriangulation, HasPosition, Point2, Triangulation};
use siting_core::{LocationId, SitingError, SitingResult};
use tracing::{debug, warn};

/// Web Mercator latitude limit.
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

const TILE_SIZE: f64 = 256.0;

/// Geographic → screen projection supplied by the rendering layer.
pub trait Projection {
    /// Screen position of `(latitude, longitude)`, `None` if it cannot be projected.
    fn project(&self, latitude: f64, longitude: f64) -> Option<Coord<f64>>;

    /// Screen size in pixels.
    fn viewport_size(&self) -> (f64, f64);
}

/// Slippy-map style Web Mercator view with 256 px tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WebMercatorViewport {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl WebMercatorViewport {
    pub fn new(center_latitude: f64, center_longitude: f64, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center_latitude,
            center_longitude,
            zoom,
            width,
            height,
        }
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    /// World pixel coordinates at the current zoom.
    fn world_point(&self, latitude: f64, longitude: f64) -> Coord<f64> {
        let world = self.world_size();
        let lat = latitude
            .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
            .to_radians();
        let x = (longitude + 180.0) / 360.0 * world;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
        coord! { x: x, y: y }
    }
}

impl Projection for WebMercatorViewport {
    fn project(&self, latitude: f64, longitude: f64) -> Option<Coord<f64>> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        let center = self.world_point(self.center_latitude, self.center_longitude);
        let p = self.world_point(latitude, longitude);
        let screen = coord! {
            x: p.x - center.x + self.width / 2.0,
            y: p.y - center.y + self.height / 2.0,
        };
        (screen.x.is_finite() && screen.y.is_finite()).then_some(screen)
    }

    fn viewport_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// Viewport rectangle grown by `padding_factor · max(width, height)` on every side.
pub fn padded_bounds(width: f64, height: f64, padding_factor: f64) -> Rect<f64> {
    let pad = width.max(height) * padding_factor;
    Rect::new(
        coord! { x: -pad, y: -pad },
        coord! { x: width + pad, y: height + pad },
    )
}

/// A projected site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub location_id: LocationId,
    pub position: Coord<f64>,
}

/// Project `(location_id, latitude, longitude)` records, dropping failures.
pub fn project_sites<P, I>(projection: &P, records: I) -> Vec<Site>
where
    P: Projection + ?Sized,
    I: IntoIterator<Item = (LocationId, f64, f64)>,
{
    records
        .into_iter()
        .filter_map(|(location_id, lat, lon)| {
            projection
                .project(lat, lon)
                .map(|position| Site { location_id, position })
        })
        .collect()
}

/// Land area in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LandMask {
    screen: MultiPolygon<f64>,
}

impl LandMask {
    /// Project land polygons. Each polygon is `[exterior, holes...]`, every
    /// ring a list of `[longitude, latitude]` pairs, as in GeoJSON.
    pub fn project<P: Projection + ?Sized>(polygons: &[Vec<Vec<[f64; 2]>>], projection: &P) -> SitingResult<Self> {
        let ring = |points: &[[f64; 2]]| -> LineString<f64> {
            points.iter().map(|&[x, y]| coord! { x: x, y: y }).collect()
        };
        let geographic = MultiPolygon::new(
            polygons
                .iter()
                .filter_map(|rings| {
                    let (exterior, holes) = rings.split_first()?;
                    if exterior.len() < 3 {
                        return None;
                    }
                    let interiors = holes.iter().filter(|h| h.len() >= 3).map(|h| ring(h.as_slice())).collect();
                    Some(Polygon::new(ring(exterior.as_slice()), interiors))
                })
                .collect(),
        );

        let screen = geographic.try_map_coords(|c| {
            projection.project(c.y, c.x).ok_or_else(|| {
                SitingError::Geometry(format!("land vertex ({}, {}) cannot be projected", c.x, c.y))
            })
        })?;
        Ok(Self { screen })
    }

    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.screen
    }
}

/// The region of the plane closest to one site.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    pub location_id: LocationId,
    pub site: Coord<f64>,
    pub region: MultiPolygon<f64>,
}

/// Serializable outline of a cell: per polygon `[exterior, holes...]`, each
/// ring as `[x, y]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellOutline {
    pub location_id: LocationId,
    pub polygons: Vec<Vec<Vec<[f64; 2]>>>,
    pub path: String,
}

impl VoronoiCell {
    /// SVG path data, one closed subpath per polygon ring.
    pub fn svg_path(&self) -> String {
        let mut path = String::new();
        for polygon in &self.region {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                // Rings are closed; skip the repeated final vertex.
                let n = ring.0.len().saturating_sub(1);
                for (i, c) in ring.0.iter().take(n).enumerate() {
                    let cmd = if i == 0 { 'M' } else { 'L' };
                    let _ = write!(path, "{cmd}{:.2},{:.2}", c.x, c.y);
                }
                if n > 0 {
                    path.push('Z');
                }
            }
        }
        path
    }

    pub fn outline(&self) -> CellOutline {
        CellOutline {
            location_id: self.location_id,
            polygons: self
                .region
                .iter()
                .map(|p| {
                    std::iter::once(p.exterior())
                        .chain(p.interiors())
                        .map(|ring| ring.0.iter().map(|c| [c.x, c.y]).collect())
                        .collect()
                })
                .collect(),
            path: self.svg_path(),
        }
    }
}

fn distance_sq(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let (dx, dy) = (a.x - b.x, a.y - b.y);
    dx * dx + dy * dy
}

/// Keep the part of `poly` on `site`'s side of its bisector with `other`.
fn clip_half_plane(poly: &[Coord<f64>], site: Coord<f64>, other: Coord<f64>) -> Vec<Coord<f64>> {
    let normal = coord! { x: other.x - site.x, y: other.y - site.y };
    let mid = coord! { x: (site.x + other.x) / 2.0, y: (site.y + other.y) / 2.0 };
    let side = |p: Coord<f64>| (p.x - mid.x) * normal.x + (p.y - mid.y) * normal.y;

    let mut out = Vec::with_capacity(poly.len() + 1);
    for (k, &a) in poly.iter().enumerate() {
        let b = poly[(k + 1) % poly.len()];
        let (sa, sb) = (side(a), side(b));
        if sa <= 0.0 {
            out.push(a);
        }
        if (sa < 0.0 && sb > 0.0) || (sa > 0.0 && sb < 0.0) {
            let t = sa / (sa - sb);
            out.push(coord! { x: a.x + (b.x - a.x) * t, y: a.y + (b.y - a.y) * t });
        }
    }
    out
}

/// Triangulation vertex remembering which site it came from.
#[derive(Debug, Clone, Copy)]
struct SiteVertex {
    position: Point2<f64>,
    site: usize,
}

impl HasPosition for SiteVertex {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Voronoi neighbours of every site, taken from the Delaunay triangulation.
///
/// `sites` must be finite and pairwise distinct.
fn delaunay_neighbors(sites: &[Site]) -> SitingResult<Vec<Vec<usize>>> {
    let vertices = sites
        .iter()
        .enumerate()
        .map(|(site, s)| SiteVertex {
            position: Point2::new(s.position.x, s.position.y),
            site,
        })
        .collect();
    let triangulation: DelaunayTriangulation<SiteVertex> = DelaunayTriangulation::bulk_load(vertices)
        .map_err(|err| SitingError::Geometry(format!("delaunay triangulation failed: {err:?}")))?;

    let mut neighbors = vec![Vec::new(); sites.len()];
    if triangulation.all_vertices_on_line() {
        // No triangles: each site only borders its neighbours along the line.
        let mut order: Vec<usize> = (0..sites.len()).collect();
        order.sort_by(|&a, &b| {
            let (pa, pb) = (sites[a].position, sites[b].position);
            pa.x.total_cmp(&pb.x).then(pa.y.total_cmp(&pb.y))
        });
        for pair in order.windows(2) {
            neighbors[pair[0]].push(pair[1]);
            neighbors[pair[1]].push(pair[0]);
        }
        return Ok(neighbors);
    }

    for vertex in triangulation.vertices() {
        let site = vertex.data().site;
        neighbors[site].extend(vertex.out_edges().map(|edge| edge.to().data().site));
    }
    Ok(neighbors)
}

fn cell_for(index: usize, sites: &[Site], neighbors: &[usize], bounds: &Rect<f64>) -> Vec<Coord<f64>> {
    let site = sites[index].position;
    let (min, max) = (bounds.min(), bounds.max());
    let mut cell = vec![
        coord! { x: min.x, y: min.y },
        coord! { x: max.x, y: min.y },
        coord! { x: max.x, y: max.y },
        coord! { x: min.x, y: max.y },
    ];

    let mut nearest: Vec<(f64, Coord<f64>)> = neighbors
        .iter()
        .map(|&j| (distance_sq(site, sites[j].position), sites[j].position))
        .collect();
    nearest.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (d2, other) in nearest {
        let radius_sq = cell
            .iter()
            .map(|&v| distance_sq(site, v))
            .fold(0.0, f64::max);
        if d2 > 4.0 * radius_sq {
            break;
        }
        cell = clip_half_plane(&cell, site, other);
        if cell.len() < 3 {
            break;
        }
    }
    cell
}

/// Tessellate `sites` within `bounds`, optionally clipped to `land`.
pub fn tessellate(sites: &[Site], bounds: Rect<f64>, land: Option<&LandMask>) -> Vec<VoronoiCell> {
    let mut seen = HashSet::with_capacity(sites.len());
    let unique: Vec<Site> = sites
        .iter()
        .filter(|site| site.position.x.is_finite() && site.position.y.is_finite())
        // `+ 0.0` folds -0.0 into 0.0 so both share a key.
        .filter(|site| seen.insert(((site.position.x + 0.0).to_bits(), (site.position.y + 0.0).to_bits())))
        .copied()
        .collect();

    if unique.len() < 2 {
        warn!(sites = unique.len(), "too few sites for a tessellation, skipping");
        return Vec::new();
    }

    let neighbors = match delaunay_neighbors(&unique) {
        Ok(neighbors) => neighbors,
        Err(err) => {
            warn!(%err, "skipping tessellation");
            return Vec::new();
        }
    };

    let cells: Vec<VoronoiCell> = (0..unique.len())
        .filter_map(|i| {
            let ring = cell_for(i, &unique, &neighbors[i], &bounds);
            if ring.len() < 3 {
                return None;
            }
            let polygon = Polygon::new(LineString::from(ring), vec![]);
            let mut region = MultiPolygon::new(vec![polygon]);
            if let Some(mask) = land {
                region = region.intersection(mask.polygons());
            }
            if region.0.is_empty() {
                return None;
            }
            Some(VoronoiCell {
                location_id: unique[i].location_id,
                site: unique[i].position,
                region,
            })
        })
        .collect();

    debug!(
        sites = sites.len(),
        unique = unique.len(),
        cells = cells.len(),
        land_clipped = land.is_some(),
        "tessellated"
    );
    cells
}
