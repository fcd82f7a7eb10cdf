use crate::{
    geometry::{InvalidParameter, Point2, Polygon},
    grid::{GridParams, Hex},
};
use derive_more::Display;
use log::debug;
use std::collections::BTreeSet;

/// A pair of polygon sets that decides which hexes get drawn. Exclude
/// polygons knock hexes out of the grid, include polygons put them back.
///
/// A mask is a plain value built fresh for each render. Polygons aren't owned
/// by any hex or grid, they're only consulted at query time.
#[derive(Clone, Debug, Default)]
pub struct Mask {
    exclude: Vec<Polygon>,
    include: Vec<Polygon>,
}

impl Mask {
    /// Build a mask from two polygon sets. Polygons with fewer than 3
    /// vertices aren't regions, so they're dropped here and have no effect.
    pub fn new(
        exclude: impl IntoIterator<Item = Polygon>,
        include: impl IntoIterator<Item = Polygon>,
    ) -> Self {
        fn regions_only(
            kind: &str,
            polygons: impl IntoIterator<Item = Polygon>,
        ) -> Vec<Polygon> {
            polygons
                .into_iter()
                .filter(|polygon| {
                    let keep = polygon.is_region();
                    if !keep {
                        debug!(
                            "Ignoring {} polygon with {} vertices",
                            kind,
                            polygon.vertices().len()
                        );
                    }
                    keep
                })
                .collect()
        }

        Self {
            exclude: regions_only("exclude", exclude),
            include: regions_only("include", include),
        }
    }

    pub fn exclude(&self) -> &[Polygon] {
        &self.exclude
    }

    pub fn include(&self) -> &[Polygon] {
        &self.include
    }

    /// Does this mask have nothing in it? An empty mask accepts every hex.
    pub fn is_empty(&self) -> bool {
        self.exclude.is_empty()
    }

    /// A vertex fails if it's inside any exclude polygon but not inside any
    /// include polygon. Everything else passes.
    pub fn vertex_passes(&self, vertex: Point2) -> bool {
        !self.exclude.iter().any(|polygon| polygon.contains(vertex))
            || self.include.iter().any(|polygon| polygon.contains(vertex))
    }

    /// Should a hex with these vertices be drawn? It's all or nothing: every
    /// single vertex has to pass. A hex that pokes into an excluded region is
    /// dropped entirely, unless include regions cover every vertex in the
    /// excluded part. This keeps masked edges snapped to whole hexes.
    pub fn accepts(&self, vertices: &[Point2]) -> bool {
        vertices.iter().all(|vertex| self.vertex_passes(*vertex))
    }

    /// Convenience wrapper around [Self::accepts] for a lattice hex
    pub fn accepts_hex(&self, hex: &Hex, params: &GridParams) -> bool {
        self.is_empty() || self.accepts(&hex.vertices(params))
    }
}

/// A stable identifier for a finalized polygon in a [MaskBook]. IDs are
/// handed out in increasing order and never reused, so two polygons with
/// identical vertices are still distinct.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display(fmt = "#{}", _0)]
pub struct PolygonId(pub u32);

/// Bookkeeping for user-drawn mask polygons. A polygon is authored one
/// vertex at a time into a draft, then finalized once it has at least 3
/// vertices. Finalized polygons can be selected by ID.
///
/// Every finalized polygon excludes hexes. Selected polygons additionally
/// re-include hexes, so selecting a polygon drawn inside an excluded area
/// adds an island back in.
#[derive(Clone, Debug, Default)]
pub struct MaskBook {
    next_id: u32,
    polygons: Vec<(PolygonId, Polygon)>,
    selected: BTreeSet<PolygonId>,
    draft: Vec<Point2>,
}

impl MaskBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex to the in-progress polygon. Rejects non-finite
    /// coordinates.
    pub fn add_vertex(
        &mut self,
        vertex: Point2,
    ) -> Result<(), InvalidParameter> {
        if !vertex.is_finite() {
            return Err(InvalidParameter::new(
                "vertex",
                format!("vertex is not finite: {}", vertex),
            ));
        }
        self.draft.push(vertex);
        Ok(())
    }

    /// Get the vertices of the in-progress polygon
    pub fn draft(&self) -> &[Point2] {
        &self.draft
    }

    /// Throw away the in-progress polygon
    pub fn discard_draft(&mut self) {
        self.draft.clear();
    }

    /// Turn the in-progress polygon into a finalized one, and return its new
    /// ID. If the draft has fewer than 3 vertices it isn't a region yet, so
    /// it's left in place and `None` is returned.
    pub fn finalize(&mut self) -> Option<PolygonId> {
        if self.draft.len() < 3 {
            return None;
        }

        let vertices = std::mem::take(&mut self.draft);
        let id = PolygonId(self.next_id);
        self.next_id += 1;
        // Vertices were checked as they were added
        self.polygons.push((id, Polygon::new(vertices).ok()?));
        debug!("Finalized mask polygon {}", id);
        Some(id)
    }

    /// Add a complete polygon in one shot. Returns `Ok(None)` if it has fewer
    /// than 3 vertices. The current draft is left untouched.
    pub fn add_polygon(
        &mut self,
        vertices: impl IntoIterator<Item = Point2>,
    ) -> Result<Option<PolygonId>, InvalidParameter> {
        let draft = std::mem::take(&mut self.draft);
        let mut result = Ok(None);
        for vertex in vertices {
            if let Err(err) = self.add_vertex(vertex) {
                result = Err(err);
                break;
            }
        }
        if result.is_ok() {
            result = Ok(self.finalize());
        }
        self.draft = draft;
        result
    }

    pub fn get(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons
            .iter()
            .find(|(polygon_id, _)| *polygon_id == id)
            .map(|(_, polygon)| polygon)
    }

    /// Iterate over all finalized polygons, in the order they were finalized
    pub fn polygons(&self) -> impl Iterator<Item = (PolygonId, &Polygon)> {
        self.polygons.iter().map(|(id, polygon)| (*id, polygon))
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Delete a finalized polygon. Returns the removed polygon, or `None` if
    /// the ID is unknown.
    pub fn remove(&mut self, id: PolygonId) -> Option<Polygon> {
        let index = self.polygons.iter().position(|(pid, _)| *pid == id)?;
        self.selected.remove(&id);
        Some(self.polygons.remove(index).1)
    }

    /// Flip the selection state of a polygon. Returns the new state, i.e.
    /// `true` if it's now selected. Unknown IDs are never selected.
    pub fn toggle_selected(&mut self, id: PolygonId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    pub fn is_selected(&self, id: PolygonId) -> bool {
        self.selected.contains(&id)
    }

    /// Get the IDs of all selected polygons, in ascending order
    pub fn selected(&self) -> impl Iterator<Item = PolygonId> + '_ {
        self.selected.iter().copied()
    }

    /// Build a mask from the current state: all finalized polygons exclude,
    /// and the selected ones also include. The draft is ignored.
    pub fn mask(&self) -> Mask {
        let exclude = self.polygons.iter().map(|(_, polygon)| polygon.clone());
        let include = self
            .polygons
            .iter()
            .filter(|(id, _)| self.selected.contains(id))
            .map(|(_, polygon)| polygon.clone());
        Mask::new(exclude, include)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::hex_vertices;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    fn polygon(vertices: Vec<Point2>) -> Polygon {
        Polygon::new(vertices).unwrap()
    }

    #[test]
    fn test_empty_mask_accepts_everything() {
        let mask = Mask::default();
        assert!(mask.accepts(&hex_vertices(Point2::new(5.0, 5.0), 3.0)));
    }

    #[test]
    fn test_fully_excluded_hex() {
        let vertices = hex_vertices(Point2::new(50.0, 50.0), 5.0);
        let mask =
            Mask::new(vec![polygon(rect(0.0, 0.0, 100.0, 100.0))], vec![]);
        assert!(!mask.accepts(&vertices));
    }

    #[test]
    fn test_include_rescues_excluded_hex() {
        let vertices = hex_vertices(Point2::new(50.0, 50.0), 5.0);
        let mask = Mask::new(
            vec![polygon(rect(0.0, 0.0, 100.0, 100.0))],
            vec![polygon(rect(40.0, 40.0, 60.0, 60.0))],
        );
        assert!(mask.accepts(&vertices));
    }

    #[test]
    fn test_partial_overlap_drops_hex() {
        // Exclusion covers only the right half of the hex
        let vertices = hex_vertices(Point2::new(50.0, 50.0), 5.0);
        let mask =
            Mask::new(vec![polygon(rect(50.0, 0.0, 100.0, 100.0))], vec![]);
        assert!(!mask.accepts(&vertices));

        // Include covers only some of the excluded vertices, still dropped
        let mask = Mask::new(
            vec![polygon(rect(50.0, 0.0, 100.0, 100.0))],
            vec![polygon(rect(50.0, 0.0, 100.0, 49.0))],
        );
        assert!(!mask.accepts(&vertices));
    }

    #[test]
    fn test_hex_outside_exclusion() {
        let vertices = hex_vertices(Point2::new(150.0, 50.0), 5.0);
        let mask =
            Mask::new(vec![polygon(rect(0.0, 0.0, 100.0, 100.0))], vec![]);
        assert!(mask.accepts(&vertices));
    }

    #[test]
    fn test_degenerate_polygons_ignored() {
        let vertices = hex_vertices(Point2::new(50.0, 50.0), 5.0);
        let mask = Mask::new(
            vec![polygon(vec![
                Point2::new(0.0, 0.0),
                Point2::new(100.0, 100.0),
            ])],
            vec![],
        );
        assert!(mask.is_empty());
        assert!(mask.accepts(&vertices));
    }

    #[test]
    fn test_draft_lifecycle() {
        let mut book = MaskBook::new();
        book.add_vertex(Point2::new(0.0, 0.0)).unwrap();
        book.add_vertex(Point2::new(10.0, 0.0)).unwrap();
        assert_eq!(book.finalize(), None);
        assert_eq!(book.draft().len(), 2);
        assert!(book.mask().is_empty());

        book.add_vertex(Point2::new(10.0, 10.0)).unwrap();
        assert_eq!(book.finalize(), Some(PolygonId(0)));
        assert!(book.draft().is_empty());
        assert_eq!(book.len(), 1);

        assert!(book.add_vertex(Point2::new(f64::NAN, 0.0)).is_err());
        assert!(book.draft().is_empty());
    }

    #[test]
    fn test_identical_polygons_get_distinct_ids() {
        let mut book = MaskBook::new();
        let a = book.add_polygon(rect(0.0, 0.0, 10.0, 10.0)).unwrap().unwrap();
        let b = book.add_polygon(rect(0.0, 0.0, 10.0, 10.0)).unwrap().unwrap();
        assert_ne!(a, b);

        assert!(book.toggle_selected(b));
        assert!(!book.is_selected(a));
        assert!(book.is_selected(b));
        assert_eq!(book.selected().collect::<Vec<_>>(), vec![b]);

        assert!(!book.toggle_selected(b));
        assert!(!book.is_selected(b));
    }

    #[test]
    fn test_add_polygon_keeps_draft() {
        let mut book = MaskBook::new();
        book.add_vertex(Point2::new(1.0, 1.0)).unwrap();
        assert_eq!(
            book.add_polygon(vec![Point2::new(0.0, 0.0)]).unwrap(),
            None
        );
        assert!(book
            .add_polygon(vec![Point2::new(0.0, f64::INFINITY)])
            .is_err());
        assert_eq!(book.draft(), &[Point2::new(1.0, 1.0)]);
        assert!(book.is_empty());
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut book = MaskBook::new();
        let id = book.add_polygon(rect(0.0, 0.0, 10.0, 10.0)).unwrap().unwrap();
        book.toggle_selected(id);
        assert!(book.remove(id).is_some());
        assert!(!book.is_selected(id));
        assert!(book.remove(id).is_none());
        assert!(!book.toggle_selected(id));
        // IDs aren't reused
        let next = book.add_polygon(rect(0.0, 0.0, 5.0, 5.0)).unwrap().unwrap();
        assert_ne!(next, id);
    }

    #[test]
    fn test_lake_with_island() {
        let mut book = MaskBook::new();
        let _lake =
            book.add_polygon(rect(0.0, 0.0, 100.0, 100.0)).unwrap().unwrap();
        let island =
            book.add_polygon(rect(30.0, 30.0, 70.0, 70.0)).unwrap().unwrap();
        book.toggle_selected(island);
        let mask = book.mask();
        assert_eq!(mask.exclude().len(), 2);
        assert_eq!(mask.include().len(), 1);

        // On the island
        assert!(mask.accepts(&hex_vertices(Point2::new(50.0, 50.0), 5.0)));
        // In the lake
        assert!(!mask.accepts(&hex_vertices(Point2::new(15.0, 15.0), 5.0)));
        // On dry land
        assert!(mask.accepts(&hex_vertices(Point2::new(150.0, 50.0), 5.0)));
    }
}
