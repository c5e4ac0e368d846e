//! Stateless queries over an ordered polygon list, as produced by synthesis. Functions returning
//! an index mean a position in the slice they were given.

mod containment;
mod distance;
mod lanes;
mod perimeter;

pub use self::containment::{
    closest_poly, containing_poly, distance_to_poly, point_in_poly, CONTAIN_EPSILON,
};
pub use self::distance::{dist_along_poly, distance_along_lane};
pub use self::lanes::{
    adjacent_lane, adjacent_lane_id, bearing_to_poly, is_left_of, lane_polys, next_poly,
    poly_by_way, polys_between, prev_poly, starting_poly, stop_poly_ahead, Side,
};
pub use self::perimeter::{lane_boundaries, LaneBoundaries};
