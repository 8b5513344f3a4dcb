//! Dataset builders with known-value patterns for tests.

use cf_common::{Dataset, Variable};

/// 1-D coordinate variable over its own dimension.
pub fn coord_var(dim: &str, values: Vec<f64>) -> Variable {
    let n = values.len();
    Variable::new(vec![dim.to_string()], vec![n], values)
}

/// Data variable over named dimensions; the shape is recomputed when
/// the variable is inserted into a dataset.
pub fn var_over(dims: &[&str], values: Vec<f64>) -> Variable {
    Variable::new(dims.iter().map(|d| d.to_string()).collect(), vec![], values)
}

fn lat_coord(values: Vec<f64>) -> Variable {
    coord_var("lat", values)
        .with_attr("standard_name", "latitude")
        .with_attr("long_name", "latitude")
        .with_attr("units", "degrees_north")
        .with_attr("axis", "Y")
}

fn lon_coord(values: Vec<f64>) -> Variable {
    coord_var("lon", values)
        .with_attr("standard_name", "longitude")
        .with_attr("long_name", "longitude")
        .with_attr("units", "degrees_east")
        .with_attr("axis", "X")
}

fn time_coord(values: Vec<f64>, units: &str) -> Variable {
    coord_var("time", values)
        .with_attr("standard_name", "time")
        .with_attr("axis", "T")
        .with_attr("units", units)
}

/// A small dataset with fully canonical metadata.
pub fn compliant_dataset() -> Dataset {
    let sst = var_over(&["time", "lat", "lon"], vec![15.0; 4 * 3 * 4])
        .with_attr("standard_name", "sea_surface_temperature")
        .with_attr("long_name", "sea surface temperature")
        .with_attr("units", "K");
    Dataset::new()
        .with_attr("Conventions", "CF-1.12")
        .with_attr("title", "test field")
        .with_dim("time", 4)
        .with_dim("lat", 3)
        .with_dim("lon", 4)
        .with_coord(
            "time",
            time_coord(vec![0.0, 1.0, 2.0, 3.0], "days since 2001-01-01"),
        )
        .and_then(|ds| ds.with_coord("lat", lat_coord(vec![-30.0, 0.0, 30.0])))
        .and_then(|ds| ds.with_coord("lon", lon_coord(vec![0.0, 90.0, 180.0, 270.0])))
        .and_then(|ds| ds.with_var("sst", sst))
        .unwrap_or_default()
}

/// A dataset riddled with metadata problems: odd attribute casing, a
/// coordinate-less dimension, a non-monotonic out-of-range latitude, a
/// time coordinate without units, a variable with standard_name but no
/// units, and a coordinate _FillValue.
pub fn messy_dataset() -> Dataset {
    let lat = coord_var("lat", vec![0.0, -5.0, 95.0]).with_attr("_FillValue", -999.0);
    let time = coord_var("time", vec![0.0, 1.0, 2.0]);
    let sst = var_over(&["time", "lat", "lon"], vec![1.0; 3 * 3 * 4])
        .with_attr("standard_name", "sea_surface_temperature");
    let chl = var_over(&["lat", "lon"], vec![0.5; 3 * 4])
        .with_attr("Units", "mg m-3")
        .with_attr("long_name", "chlorophyll concentration");
    Dataset::new()
        .with_attr("conventions", "CF-1.0")
        .with_dim("time", 3)
        .with_dim("lat", 3)
        .with_dim("lon", 4)
        .with_coord("time", time)
        .and_then(|ds| ds.with_coord("lat", lat))
        .and_then(|ds| ds.with_var("sst", sst))
        .and_then(|ds| ds.with_var("chl", chl))
        .unwrap_or_default()
}

/// Land reference points as (lat, lon) in the -180..180 convention,
/// matching the ocean check's table.
const LAND_POINTS: &[(f64, f64)] = &[
    (23.0, 13.0),
    (-25.0, 134.0),
    (47.0, 103.0),
    (72.0, -40.0),
    (-15.0, -60.0),
];

/// Same nearest-cell selection as the checks: first index with a
/// strictly smaller distance wins.
fn nearest(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in values.iter().enumerate() {
        let distance = (value - target).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

fn land_cells(lat_vals: &[f64], lon_vals: &[f64]) -> Vec<(usize, usize)> {
    LAND_POINTS
        .iter()
        .filter_map(|&(lat, lon)| {
            let lon = if lon < 0.0 { lon + 360.0 } else { lon };
            Some((nearest(lat_vals, lat)?, nearest(lon_vals, lon)?))
        })
        .collect()
}

/// Grid over (time, lat, lon) with per-cell values from a closure
/// taking (time_idx, lat_idx, lon_idx).
fn grid_dataset(
    time_vals: Vec<f64>,
    lat_vals: Vec<f64>,
    lon_vals: Vec<f64>,
    cell: impl Fn(usize, usize, usize) -> f64,
) -> Dataset {
    let (nt, nlat, nlon) = (time_vals.len(), lat_vals.len(), lon_vals.len());
    let mut values = Vec::with_capacity(nt * nlat * nlon);
    for t in 0..nt {
        for la in 0..nlat {
            for lo in 0..nlon {
                values.push(cell(t, la, lo));
            }
        }
    }
    let sst = var_over(&["time", "lat", "lon"], values)
        .with_attr("standard_name", "sea_surface_temperature")
        .with_attr("units", "K");
    Dataset::new()
        .with_attr("Conventions", "CF-1.12")
        .with_dim("time", nt)
        .with_dim("lat", nlat)
        .with_dim("lon", nlon)
        .with_coord("time", time_coord(time_vals, "days since 2000-01-01"))
        .and_then(|ds| ds.with_coord("lat", lat_coord(lat_vals)))
        .and_then(|ds| ds.with_coord("lon", lon_coord(lon_vals)))
        .and_then(|ds| ds.with_var("sst", sst))
        .unwrap_or_default()
}

fn global_lat() -> Vec<f64> {
    (0..17).map(|i| -80.0 + 10.0 * i as f64).collect()
}

fn global_lon() -> Vec<f64> {
    (0..36).map(|i| 10.0 * i as f64).collect()
}

/// Global 10-degree grid in the 0..360 longitude convention: ocean
/// everywhere except the land reference cells.
pub fn global_ocean_dataset() -> Dataset {
    let lat_vals = global_lat();
    let lon_vals = global_lon();
    let land = land_cells(&lat_vals, &lon_vals);
    grid_dataset(vec![0.0, 1.0], lat_vals, lon_vals, move |_, la, lo| {
        if land.contains(&(la, lo)) {
            f64::NAN
        } else {
            20.0
        }
    })
}

/// Global grid whose first `width` longitude bands are fully missing.
pub fn global_ocean_dataset_with_edge_band(width: usize) -> Dataset {
    let lat_vals = global_lat();
    let lon_vals = global_lon();
    let land = land_cells(&lat_vals, &lon_vals);
    grid_dataset(vec![0.0, 1.0], lat_vals, lon_vals, move |_, la, lo| {
        if lo < width || land.contains(&(la, lo)) {
            f64::NAN
        } else {
            20.0
        }
    })
}

/// Global grid with a fully-missing longitude band away from the seam.
pub fn global_ocean_dataset_with_interior_band(start: usize, end: usize) -> Dataset {
    let lat_vals = global_lat();
    let lon_vals = global_lon();
    let land = land_cells(&lat_vals, &lon_vals);
    grid_dataset(vec![0.0, 1.0], lat_vals, lon_vals, move |_, la, lo| {
        if (start..=end).contains(&lo) || land.contains(&(la, lo)) {
            f64::NAN
        } else {
            20.0
        }
    })
}

/// Global grid with the land/ocean mask inverted: defined only at the
/// land reference cells. Every reference point disagrees.
pub fn inverted_ocean_dataset() -> Dataset {
    let lat_vals = global_lat();
    let lon_vals = global_lon();
    let land = land_cells(&lat_vals, &lon_vals);
    grid_dataset(vec![0.0, 1.0], lat_vals, lon_vals, move |_, la, lo| {
        if land.contains(&(la, lo)) {
            20.0
        } else {
            f64::NAN
        }
    })
}

/// Small regional grid, fully defined.
pub fn regional_ocean_dataset() -> Dataset {
    let lat_vals: Vec<f64> = (0..5).map(|i| -10.0 + 5.0 * i as f64).collect();
    let lon_vals: Vec<f64> = (0..5).map(|i| 100.0 + 10.0 * i as f64).collect();
    grid_dataset(vec![0.0], lat_vals, lon_vals, |_, _, _| 18.0)
}

/// Eight-step time series over a 2x2 grid; the listed time indices are
/// fully missing.
pub fn time_series_dataset(missing_indices: &[usize]) -> Dataset {
    let missing: Vec<usize> = missing_indices.to_vec();
    grid_dataset(
        (0..8).map(|i| i as f64).collect(),
        vec![0.0, 10.0],
        vec![0.0, 10.0],
        move |t, _, _| {
            if missing.contains(&t) {
                f64::NAN
            } else {
                1.0
            }
        },
    )
}

/// Time series where one index is missing everywhere except one cell.
pub fn time_series_dataset_partial(index: usize) -> Dataset {
    grid_dataset(
        (0..8).map(|i| i as f64).collect(),
        vec![0.0, 10.0],
        vec![0.0, 10.0],
        move |t, la, lo| {
            if t == index && !(la == 0 && lo == 0) {
                f64::NAN
            } else {
                1.0
            }
        },
    )
}
