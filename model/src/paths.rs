use geo::{Distance, Haversine, InterpolatePoint, Point};

// Half the mean-earth circumference; a haversine distance this close to it
// means the pair is nearly antipodal and the great circle is ill-defined.
const NEARLY_ANTIPODAL_M: f64 = 20_000_000.0;
const COINCIDENT_M: f64 = 1.0;

/// A polyline of `num_points + 1` points approximating the great-circle path
/// between two coordinates, for downstream rendering. Spherical
/// interpolation when the pair is well-conditioned; otherwise linear
/// interpolation in latitude and adjusted-longitude space. Either way a
/// transpacific route progresses monotonically across the date line instead
/// of doubling back across the whole map.
pub fn flight_path(from: Point<f64>, to: Point<f64>, num_points: usize) -> Vec<Point<f64>> {
    let num_points = num_points.max(1);
    if let Some(points) = spherical_path(from, to, num_points) {
        return points;
    }
    linear_path(from, to, num_points)
}

fn spherical_path(from: Point<f64>, to: Point<f64>, num_points: usize) -> Option<Vec<Point<f64>>> {
    let distance = Haversine.distance(from, to);
    if !distance.is_finite() || distance < COINCIDENT_M || distance > NEARLY_ANTIPODAL_M {
        return None;
    }
    let mut points = Vec::with_capacity(num_points + 1);
    for i in 0..=num_points {
        let t = i as f64 / num_points as f64;
        let point = Haversine.point_at_ratio_between(from, to, t);
        if !point.x().is_finite() || !point.y().is_finite() {
            return None;
        }
        points.push(point);
    }
    Some(points)
}

fn linear_path(from: Point<f64>, to: Point<f64>, num_points: usize) -> Vec<Point<f64>> {
    let delta_lon = adjusted_lon_delta(from, to);
    let mut points = Vec::with_capacity(num_points + 1);
    for i in 0..=num_points {
        let t = i as f64 / num_points as f64;
        let lat = from.y() + t * (to.y() - from.y());
        let lon = wrap_lon(from.x() + t * delta_lon);
        points.push(Point::new(lon, lat));
    }
    points
}

/// The signed longitude delta to interpolate over. Transpacific pairs keep
/// moving in the direction of travel across the date line even when the raw
/// delta points the other way; everything else just takes the shorter arc.
pub(crate) fn adjusted_lon_delta(from: Point<f64>, to: Point<f64>) -> f64 {
    let raw = to.x() - from.x();
    // Asia (east of 60) to the Americas (west of -60): fly east
    if from.x() > 60.0 && to.x() < -60.0 {
        if raw < 0.0 {
            return raw + 360.0;
        }
        return raw;
    }
    // Americas to Asia: fly west
    if from.x() < -60.0 && to.x() > 60.0 {
        if raw > 0.0 {
            return raw - 360.0;
        }
        return raw;
    }
    if raw > 180.0 {
        return raw - 360.0;
    }
    if raw < -180.0 {
        return raw + 360.0;
    }
    raw
}

fn wrap_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}
