use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use clap::ValueEnum;
use geo_types::Point;
use serde::Serialize;

use crate::{scorer::ParcelScore, spatial::Coordinate};

pub const UNDEFINED_SCORE: &str = "undefined";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `parcel_id,latitude,longitude,reachable,drivable,score` row per parcel
    #[default]
    Csv,
    /// A FeatureCollection of parcel points
    Geojson,
}

#[derive(Serialize)]
struct ScoreRow<'a> {
    parcel_id: &'a str,
    latitude: f64,
    longitude: f64,
    reachable: usize,
    drivable: usize,
    score: String,
}

#[derive(Serialize)]
struct ScoreFeature<'a> {
    #[serde(serialize_with = "geojson::ser::serialize_geometry")]
    geometry: Point,
    parcel_id: &'a str,
    starting_stops: usize,
    reachable_stops: usize,
    reachable_hot_spots: usize,
    drivable_hot_spots: usize,
    score: Option<f64>,
}

fn scale(score: Option<f64>, percent: bool) -> Option<f64> {
    score.map(|s| if percent { s * 100.0 } else { s })
}

pub fn write_csv<W: Write>(writer: W, scores: &[ParcelScore], percent: bool) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for s in scores {
        wtr.serialize(ScoreRow {
            parcel_id: &s.parcel.id,
            latitude: s.parcel.latitude(),
            longitude: s.parcel.longitude(),
            reachable: s.reachable_hot_spots,
            drivable: s.drivable_hot_spots,
            score: scale(s.score, percent)
                .map_or_else(|| UNDEFINED_SCORE.to_owned(), |v| v.to_string()),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_geojson<W: Write>(
    writer: W,
    scores: &[ParcelScore],
    percent: bool,
) -> anyhow::Result<()> {
    let features: Vec<ScoreFeature> = scores
        .iter()
        .map(|s| ScoreFeature {
            geometry: s.parcel.point,
            parcel_id: &s.parcel.id,
            starting_stops: s.starting_stops,
            reachable_stops: s.reachable_stops,
            reachable_hot_spots: s.reachable_hot_spots,
            drivable_hot_spots: s.drivable_hot_spots,
            score: scale(s.score, percent),
        })
        .collect();

    geojson::ser::to_feature_collection_writer(writer, &features)
        .context("Failed to serialize")
}

pub fn write_scores<P: AsRef<Path>>(
    path: P,
    scores: &[ParcelScore],
    format: OutputFormat,
    percent: bool,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::Csv => write_csv(&mut writer, scores, percent)?,
        OutputFormat::Geojson => write_geojson(&mut writer, scores, percent)?,
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}
