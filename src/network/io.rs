//! CSV loaders for the bus network, hot spots and parcels.
//!
//! Rows that cannot be used (bad numbers, positions off the globe, duplicate
//! stop numbers) are skipped with a warning. Failing to open or read a file
//! is fatal.

use std::{
    collections::{BTreeSet, HashSet},
    fs::File,
    io::{BufReader, Read},
    path::Path,
    sync::Arc,
};

use csv::StringRecord;
use itertools::Itertools;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, info, warn};

use crate::{
    error::LoadError,
    network::{
        line::BusLine,
        stop::{BusStop, RouteId, StopId},
        BusNetwork,
    },
    spatial::{coordinate::is_valid_position, HotSpot, LatitudeIndex, Parcel},
};

#[derive(Deserialize)]
struct BusLineRecord {
    route_id: String,
    direction: String,
}

#[derive(Deserialize)]
struct BusStopRecord {
    // Exports write stop numbers as floats, e.g. 7256.000
    system_stop_id: f64,
    direction: String,
    routes: String,
    public_name: String,
    longitude: f64,
    latitude: f64,
}

#[derive(Deserialize)]
struct PlaceRecord {
    id: String,
    latitude: f64,
    longitude: f64,
}

const BUS_LINE_COLUMNS: &[&str] = &["route_id", "direction"];
const BUS_STOP_COLUMNS: &[&str] = &[
    "system_stop_id",
    "direction",
    "routes",
    "public_name",
    "longitude",
    "latitude",
];
const PLACE_COLUMNS: &[&str] = &["id", "latitude", "longitude"];

fn open<P: AsRef<Path>>(path: P) -> Result<BufReader<File>, LoadError> {
    let path = path.as_ref();
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Open {
            path: path.to_owned(),
            source,
        })
}

/// Reads every well-formed row of `reader`. Malformed rows are logged and
/// skipped, I/O failures abort.
fn read_records<R: Read, T: DeserializeOwned>(
    reader: R,
    what: &'static str,
    columns: &[&'static str],
) -> Result<Vec<T>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Read { what, source })?
        .clone();
    check_columns(&headers, what, columns)?;

    let mut records = vec![];
    let mut skipped = 0;
    for (i, row) in rdr.deserialize().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(LoadError::Read { what, source: e });
            }
            Err(e) => {
                // Header is line 1
                warn!("Skipping malformed {what} row {}: {e}", i + 2);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} malformed {what} rows");
    }
    Ok(records)
}

fn check_columns(
    headers: &StringRecord,
    what: &'static str,
    columns: &[&'static str],
) -> Result<(), LoadError> {
    match columns.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        Some(column) => Err(LoadError::MissingColumn {
            what,
            column: *column,
        }),
        None => Ok(()),
    }
}

fn stop_id(value: f64) -> Option<StopId> {
    let in_range = value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX);
    (in_range && value.fract() == 0.0).then(|| StopId::new(value as u32))
}

fn parse_routes(routes: &str) -> BTreeSet<RouteId> {
    routes
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(RouteId::new)
        .collect()
}

pub fn load_bus_lines<P: AsRef<Path>>(path: P) -> Result<BusNetwork, LoadError> {
    read_bus_lines(open(path)?)
}

/// Builds a network of empty bus lines from `route_id,direction` rows.
pub fn read_bus_lines<R: Read>(reader: R) -> Result<BusNetwork, LoadError> {
    let records: Vec<BusLineRecord> = read_records(reader, "bus line", BUS_LINE_COLUMNS)?;

    let network = BusNetwork::new(
        records
            .into_iter()
            .filter(|r| !r.route_id.is_empty())
            .map(|r| BusLine::new(RouteId::new(&r.route_id), r.direction)),
    );

    info!("Loaded {} bus lines", network.len());
    Ok(network)
}

pub fn load_bus_stops<P: AsRef<Path>>(
    path: P,
    network: &mut BusNetwork,
) -> Result<LatitudeIndex<Arc<BusStop>>, LoadError> {
    read_bus_stops(open(path)?, network)
}

/// Reads bus stops and inserts each one into every line of `network` it
/// serves. The returned stops are sorted by latitude.
pub fn read_bus_stops<R: Read>(
    reader: R,
    network: &mut BusNetwork,
) -> Result<LatitudeIndex<Arc<BusStop>>, LoadError> {
    let records: Vec<BusStopRecord> = read_records(reader, "bus stop", BUS_STOP_COLUMNS)?;

    let mut seen = HashSet::new();
    let mut unknown_routes = BTreeSet::new();
    let mut stops = Vec::with_capacity(records.len());

    for record in records {
        let Some(id) = stop_id(record.system_stop_id) else {
            warn!("Skipping bus stop with invalid id {}", record.system_stop_id);
            continue;
        };
        if !is_valid_position(record.latitude, record.longitude) {
            warn!(
                "Skipping bus stop {id} at invalid position ({}, {})",
                record.latitude, record.longitude
            );
            continue;
        }
        if !seen.insert(id) {
            warn!("Skipping duplicate bus stop {id}");
            continue;
        }

        let stop = Arc::new(BusStop::new(
            id,
            record.direction,
            parse_routes(&record.routes),
            record.public_name,
            record.latitude,
            record.longitude,
        ));
        unknown_routes.extend(network.add_stop(&stop));
        stops.push(stop);
    }

    if !unknown_routes.is_empty() {
        warn!(
            "Bus stops reference {} routes missing from the bus lines: {}",
            unknown_routes.len(),
            unknown_routes.iter().join(", ")
        );
    }

    let mut unserved = 0;
    for line in network.lines() {
        if line.is_empty() {
            unserved += 1;
        } else {
            debug!(
                "Line {} ({}) serves {} stops",
                line.route_id,
                line.direction,
                line.stops().len()
            );
        }
    }
    if unserved > 0 {
        info!("{unserved} bus lines have no stops");
    }

    info!("Loaded {} bus stops", stops.len());
    Ok(LatitudeIndex::new(stops))
}

fn read_places<R: Read>(reader: R, what: &'static str) -> Result<Vec<PlaceRecord>, LoadError> {
    let records: Vec<PlaceRecord> = read_records(reader, what, PLACE_COLUMNS)?;
    let total = records.len();

    let valid = records
        .into_iter()
        .filter(|r| is_valid_position(r.latitude, r.longitude))
        .collect::<Vec<_>>();

    if valid.len() < total {
        warn!(
            "Skipped {} {what} rows with invalid positions",
            total - valid.len()
        );
    }
    Ok(valid)
}

pub fn load_hot_spots<P: AsRef<Path>>(path: P) -> Result<LatitudeIndex<HotSpot>, LoadError> {
    read_hot_spots(open(path)?)
}

/// Reads `id,latitude,longitude` rows, sorted by latitude.
pub fn read_hot_spots<R: Read>(reader: R) -> Result<LatitudeIndex<HotSpot>, LoadError> {
    let hot_spots = read_places(reader, "hot spot")?
        .into_iter()
        .map(|r| HotSpot::new(r.id, r.latitude, r.longitude))
        .collect::<Vec<_>>();

    info!("Loaded {} hot spots", hot_spots.len());
    Ok(LatitudeIndex::new(hot_spots))
}

pub fn load_parcels<P: AsRef<Path>>(path: P) -> Result<Vec<Parcel>, LoadError> {
    read_parcels(open(path)?)
}

/// Reads `id,latitude,longitude` rows in file order.
pub fn read_parcels<R: Read>(reader: R) -> Result<Vec<Parcel>, LoadError> {
    let parcels = read_places(reader, "parcel")?
        .into_iter()
        .map(|r| Parcel::new(r.id, r.latitude, r.longitude))
        .collect::<Vec<_>>();

    info!("Loaded {} parcels", parcels.len());
    Ok(parcels)
}
