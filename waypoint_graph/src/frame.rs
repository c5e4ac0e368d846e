use serde::{Deserialize, Serialize};

use geom::{GPSBounds, Pt2D};

use crate::Graph;

/// The UTM origin of a map is rounded to a multiple of this, in meters.
pub const UTM_GRID_SIZE: f64 = 10_000.0;

/// Maps whose coordinates span less than this many degrees are assumed to be real latitude and
/// longitude. Anything wider is taken to be planar coordinates stored in the lat/lon fields.
const GEODETIC_SPAN_DEGREES: f64 = 2.0;

/// How a graph's way-points were placed in the local frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Frame {
    /// Projected onto UTM, then shifted so the origin is a grid corner near the first way-point.
    Utm {
        zone: u8,
        origin_easting: f64,
        origin_northing: f64,
    },
    /// The route file already held planar coordinates; longitude is x and latitude is y.
    Planar,
}

impl Graph {
    /// A heuristic: real geodetic maps cover a small fraction of the globe.
    pub fn uses_geodetic(&self) -> bool {
        let pts: Vec<_> = self.nodes().iter().map(|n| n.ll).collect();
        let span = GPSBounds::from(&pts).span_degrees();
        span >= 0.0 && span < GEODETIC_SPAN_DEGREES
    }

    /// Picks `find_mapxy` or `xy_rndf` and records edge lengths in the resulting frame.
    pub fn establish_frame(&mut self) -> Frame {
        if self.uses_geodetic() {
            self.find_mapxy()
        } else {
            self.xy_rndf()
        }
    }

    /// Projects every way-point into UTM, using the zone of the first one, and subtracts an
    /// origin rounded to the nearest `UTM_GRID_SIZE` cell. Keeping coordinates small avoids losing
    /// precision far from the projection's origin.
    pub fn find_mapxy(&mut self) -> Frame {
        let frame = match self.nodes().first() {
            Some(first) => {
                let utm = first.ll.to_utm();
                Frame::Utm {
                    zone: utm.zone,
                    origin_easting: (utm.easting / UTM_GRID_SIZE).round() * UTM_GRID_SIZE,
                    origin_northing: (utm.northing / UTM_GRID_SIZE).round() * UTM_GRID_SIZE,
                }
            }
            None => Frame::Utm {
                zone: 1,
                origin_easting: 0.0,
                origin_northing: 0.0,
            },
        };
        if let Frame::Utm {
            zone,
            origin_easting,
            origin_northing,
        } = frame
        {
            for node in self.nodes_mut() {
                let utm = node.ll.to_utm_in_zone(zone);
                node.map = Pt2D::new(utm.easting - origin_easting, utm.northing - origin_northing);
            }
            info!(
                "Projected {} way-points into UTM zone {}, origin ({}, {})",
                self.nodes().len(),
                zone,
                origin_easting,
                origin_northing
            );
        }
        self.finish_frame(frame)
    }

    /// The route file's coordinates are already planar meters.
    pub fn xy_rndf(&mut self) -> Frame {
        for node in self.nodes_mut() {
            node.map = Pt2D::new(node.ll.longitude, node.ll.latitude);
        }
        info!("Using planar coordinates for {} way-points", self.nodes().len());
        self.finish_frame(Frame::Planar)
    }

    /// The UTM zone and the (easting, northing) subtracted from every projected way-point. None
    /// for planar graphs, or before any frame is established.
    pub fn utm_origin(&self) -> Option<(u8, f64, f64)> {
        match self.frame? {
            Frame::Utm {
                zone,
                origin_easting,
                origin_northing,
            } => Some((zone, origin_easting, origin_northing)),
            Frame::Planar => None,
        }
    }

    fn finish_frame(&mut self, frame: Frame) -> Frame {
        self.frame = Some(frame);
        self.recalculate_distances();
        frame
    }
}

#[cfg(test)]
mod tests {
    use geom::{Distance, LonLat};

    use super::*;
    use crate::{ElementID, NodeIndex, WayPointEdge, WayPointNode};

    fn graph(pts: Vec<(f64, f64)>) -> Graph {
        let nodes = pts
            .into_iter()
            .enumerate()
            .map(|(i, (lon, lat))| {
                WayPointNode::new(
                    ElementID::new(1, 1, i as u32 + 1),
                    NodeIndex(i),
                    LonLat::new(lon, lat),
                    Distance::meters(4.0),
                )
            })
            .collect();
        Graph::new(nodes, vec![WayPointEdge::new(NodeIndex(0), NodeIndex(1))]).unwrap()
    }

    #[test]
    fn geodetic_maps_project_near_origin() {
        let mut g = graph(vec![(-97.7341, 30.2849), (-97.7331, 30.2849)]);
        assert!(g.uses_geodetic());
        let frame = g.establish_frame();
        assert!(matches!(frame, Frame::Utm { zone: 14, .. }));
        let (zone, easting, northing) = g.utm_origin().unwrap();
        assert_eq!(zone, 14);
        assert_eq!(easting % UTM_GRID_SIZE, 0.0);
        assert_eq!(northing % UTM_GRID_SIZE, 0.0);
        for n in g.nodes() {
            assert!(n.map.x().abs() <= UTM_GRID_SIZE / 2.0 + 100.0);
            assert!(n.map.y().abs() <= UTM_GRID_SIZE / 2.0 + 100.0);
        }
        // 0.001 degrees of longitude at this latitude is about 96m
        let len = g.edges()[0].distance.inner_meters();
        assert!(len > 94.0 && len < 98.0, "{}", len);
    }

    #[test]
    fn wide_maps_are_planar() {
        let mut g = graph(vec![(0.0, 0.0), (300.0, 40.0)]);
        assert!(!g.uses_geodetic());
        assert_eq!(g.utm_origin(), None);
        assert_eq!(g.establish_frame(), Frame::Planar);
        assert_eq!(g.utm_origin(), None);
        assert_eq!(g.nodes()[1].map, Pt2D::new(300.0, 40.0));
        let len = g.edges()[0].distance.inner_meters();
        assert!((len - 91_600f64.sqrt()).abs() < 1e-9);
    }
}
