//! Dashboard aggregations.
//!
//! Pure in-memory counts over record collections the visibility filter has
//! already reduced. Mirrors the analytics screen: top diagnoses (optionally
//! windowed on creation time), gender breakdown, per-age-band diagnoses,
//! top prescribed drugs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{PatientRecord, PrescriptionRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

/// Age bands used by the per-band diagnosis charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    Infant,
    Child,
    Teen,
    Adult,
    Middle,
    Senior,
}

impl AgeBand {
    pub fn of(age: u32) -> Self {
        match age {
            0..=1 => Self::Infant,
            2..=12 => Self::Child,
            13..=20 => Self::Teen,
            21..=44 => Self::Adult,
            45..=64 => Self::Middle,
            _ => Self::Senior,
        }
    }
}

fn ranked(counts: BTreeMap<String, usize>, limit: usize) -> Vec<NamedCount> {
    let mut out: Vec<NamedCount> = counts
        .into_iter()
        .map(|(name, count)| NamedCount { name, count })
        .collect();
    // Highest count first; BTreeMap iteration already fixed the name order
    // for ties.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out.truncate(limit);
    out
}

fn in_window(record: &PatientRecord, window: Option<(i64, i64)>) -> bool {
    match window {
        None => true,
        Some((start, end)) => record.created_at >= start && record.created_at <= end,
    }
}

/// Most frequent diagnoses, optionally restricted to a creation-time window
/// (epoch milliseconds, inclusive).
pub fn top_diagnoses(
    records: &[PatientRecord],
    window: Option<(i64, i64)>,
    limit: usize,
) -> Vec<NamedCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records.iter().filter(|r| in_window(r, window)) {
        for entry in &record.diagnoses {
            let name = entry.diagnosis.trim();
            if name.is_empty() {
                continue;
            }
            *counts.entry(name.to_string()).or_default() += 1;
        }
    }
    ranked(counts, limit)
}

/// Patient counts per gender string, as entered.
pub fn gender_counts(records: &[PatientRecord]) -> Vec<NamedCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        let gender = record.gender.trim();
        if gender.is_empty() {
            continue;
        }
        *counts.entry(gender.to_string()).or_default() += 1;
    }
    ranked(counts, usize::MAX)
}

/// Top diagnoses within each age band. Bands with no records are absent.
pub fn diagnoses_by_age_band(
    records: &[PatientRecord],
    limit: usize,
) -> BTreeMap<AgeBand, Vec<NamedCount>> {
    let mut per_band: BTreeMap<AgeBand, BTreeMap<String, usize>> = BTreeMap::new();
    for record in records {
        let band = AgeBand::of(record.age);
        for entry in &record.diagnoses {
            let name = entry.diagnosis.trim();
            if name.is_empty() {
                continue;
            }
            *per_band
                .entry(band)
                .or_default()
                .entry(name.to_string())
                .or_default() += 1;
        }
    }
    per_band
        .into_iter()
        .map(|(band, counts)| (band, ranked(counts, limit)))
        .collect()
}

/// Most prescribed medicines across the given prescriptions.
pub fn top_drugs(prescriptions: &[PrescriptionRecord], limit: usize) -> Vec<NamedCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for rx in prescriptions {
        for drug in &rx.drugs {
            let name = drug.medicine.trim();
            if name.is_empty() {
                continue;
            }
            *counts.entry(name.to_string()).or_default() += 1;
        }
    }
    ranked(counts, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patient(age: u32, gender: &str, created_at: i64, diagnoses: &[&str]) -> PatientRecord {
        let entries: Vec<_> = diagnoses
            .iter()
            .map(|d| json!({"diagnosis": d, "severity": "mild"}))
            .collect();
        serde_json::from_value(json!({
            "patientId": "p",
            "firstName": "P",
            "lastName": "R",
            "gender": gender,
            "age": age,
            "createdAt": created_at,
            "diagnoses": entries
        }))
        .unwrap()
    }

    #[test]
    fn age_band_boundaries() {
        assert_eq!(AgeBand::of(0), AgeBand::Infant);
        assert_eq!(AgeBand::of(1), AgeBand::Infant);
        assert_eq!(AgeBand::of(2), AgeBand::Child);
        assert_eq!(AgeBand::of(12), AgeBand::Child);
        assert_eq!(AgeBand::of(13), AgeBand::Teen);
        assert_eq!(AgeBand::of(20), AgeBand::Teen);
        assert_eq!(AgeBand::of(21), AgeBand::Adult);
        assert_eq!(AgeBand::of(44), AgeBand::Adult);
        assert_eq!(AgeBand::of(45), AgeBand::Middle);
        assert_eq!(AgeBand::of(64), AgeBand::Middle);
        assert_eq!(AgeBand::of(65), AgeBand::Senior);
    }

    #[test]
    fn top_diagnoses_ranks_by_frequency() {
        let records = vec![
            patient(30, "MALE", 10, &["Asthma", "Flu"]),
            patient(40, "MALE", 20, &["Asthma"]),
            patient(50, "FEMALE", 30, &["Hypertension"]),
        ];
        let top = top_diagnoses(&records, None, 2);
        assert_eq!(top[0].name, "Asthma");
        assert_eq!(top[0].count, 2);
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn window_restricts_by_creation_time() {
        let records = vec![
            patient(30, "MALE", 10, &["Asthma"]),
            patient(40, "MALE", 20, &["Flu"]),
        ];
        let top = top_diagnoses(&records, Some((15, 25)), 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Flu");
    }

    #[test]
    fn gender_counts_ignore_blank_entries() {
        let records = vec![
            patient(30, "MALE", 0, &[]),
            patient(40, "MALE", 0, &[]),
            patient(50, "FEMALE", 0, &[]),
            patient(60, " ", 0, &[]),
        ];
        let counts = gender_counts(&records);
        assert_eq!(counts[0], NamedCount { name: "MALE".into(), count: 2 });
        assert_eq!(counts[1], NamedCount { name: "FEMALE".into(), count: 1 });
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn bands_split_the_diagnosis_counts() {
        let records = vec![
            patient(1, "MALE", 0, &["Colic"]),
            patient(15, "MALE", 0, &["Acne"]),
            patient(70, "FEMALE", 0, &["Arthritis"]),
        ];
        let by_band = diagnoses_by_age_band(&records, 5);
        assert_eq!(by_band[&AgeBand::Infant][0].name, "Colic");
        assert_eq!(by_band[&AgeBand::Teen][0].name, "Acne");
        assert_eq!(by_band[&AgeBand::Senior][0].name, "Arthritis");
        assert!(!by_band.contains_key(&AgeBand::Adult));
    }

    #[test]
    fn top_drugs_counts_across_prescriptions() {
        let rx = |drugs: &[&str]| -> PrescriptionRecord {
            let entries: Vec<_> = drugs.iter().map(|d| json!({"medicine": d})).collect();
            serde_json::from_value(json!({
                "prescriptionId": "rx",
                "patientFirstName": "P",
                "patientLastName": "R",
                "doctorId": "doc1",
                "drugs": entries
            }))
            .unwrap()
        };
        let prescriptions = vec![
            rx(&["Salbutamol", "Cetirizine"]),
            rx(&["Salbutamol"]),
        ];
        let top = top_drugs(&prescriptions, 1);
        assert_eq!(top, vec![NamedCount { name: "Salbutamol".into(), count: 2 }]);
    }
}
