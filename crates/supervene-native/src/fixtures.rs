//! Synthetic raw files for tests

use std::f64::consts::PI;
use std::path::Path;

use ndarray::{Array1, Array2};

use crate::mat::{CellArray, MatValue, MatWriter, NumericArray};
use crate::processing::ecog::{channel_path, channel_variable};
use crate::processing::fmri::FMRI_VARIABLE;
use crate::processing::meg::MEG_VARIABLE;

/// Offset, drift and a channel-specific tone at 1 kHz.
pub fn ecog_signal(channel: usize, len: usize) -> Array1<f64> {
    let freq = 5.0 + (channel % 7) as f64 * 3.0;
    let amplitude = 1.0 + channel as f64 * 0.1;
    Array1::from_shape_fn(len, |i| {
        let t = i as f64 / 1000.0;
        40.0 + 2.0 * t + amplitude * (2.0 * PI * freq * t).sin()
    })
}

pub fn write_ecog_channel(dir: &Path, channel: usize, signal: &Array1<f64>) {
    let mut writer = MatWriter::new().compressed(channel % 2 == 0);
    writer.numeric(&channel_variable(channel), NumericArray::column_vector(signal.to_vec()));
    writer.write_to(channel_path(dir, channel)).unwrap();
}

pub fn write_ecog(dir: &Path, channels: usize, len: usize) {
    for channel in 1..=channels {
        write_ecog_channel(dir, channel, &ecog_signal(channel, len));
    }
}

/// Distinct value for every (subject, region, time) triple.
pub fn fmri_value(subject: usize, region: usize, t: usize) -> f64 {
    (subject * 100_000 + region * 100 + t) as f64
}

pub fn fmri_cells(subjects: usize, regions: usize, len: usize) -> CellArray {
    let cells = (0..subjects)
        .map(|s| {
            let m = Array2::from_shape_fn((regions, len), |(r, t)| fmri_value(s, r, t));
            MatValue::Numeric(NumericArray::from_array2(&m))
        })
        .collect();
    CellArray::column(cells)
}

pub fn write_fmri(path: &Path, subjects: usize, regions: usize, len: usize) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut writer = MatWriter::new().compressed(true);
    writer.cell(FMRI_VARIABLE, fmri_cells(subjects, regions, len));
    writer.write_to(path).unwrap();
}

pub fn meg_channels(channels: usize, len: usize) -> Vec<Vec<f64>> {
    (0..channels)
        .map(|c| {
            (0..len)
                .map(|t| 1e-12 * ((t as f64 * 0.37 + c as f64).sin() * (c + 1) as f64 + c as f64))
                .collect()
        })
        .collect()
}

pub fn meg_cells(channels: &[Vec<f64>]) -> CellArray {
    CellArray::row(
        channels
            .iter()
            .map(|c| MatValue::Numeric(NumericArray::row_vector(c.clone())))
            .collect(),
    )
}

pub fn write_meg(path: &Path, channels: &[Vec<f64>]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut writer = MatWriter::new();
    writer.cell(MEG_VARIABLE, meg_cells(channels));
    writer.write_to(path).unwrap();
}
