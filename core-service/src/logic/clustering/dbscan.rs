//! Density-based clustering over raw (lat, lng)
//!
//! Classic DBSCAN: a point is core when at least `min_samples` points
//! (itself included) lie within `eps`, distance inclusive. Neighbour lookups
//! go through a uniform cell index of side `eps`, so only the 3x3 block of
//! cells around a point is ever scanned.

use std::collections::{HashMap, VecDeque};

use crate::logic::geo::GeoPoint;

/// Label for every input point, in input order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Noise,
    Cluster(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbscanResult {
    pub labels: Vec<Label>,
    pub cluster_count: usize,
}

impl DbscanResult {
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| **l == Label::Noise).count()
    }

    /// Member indices per cluster, clusters in discovery order
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.cluster_count];
        for (idx, label) in self.labels.iter().enumerate() {
            if let Label::Cluster(c) = label {
                groups[*c].push(idx);
            }
        }
        groups
    }
}

struct CellIndex<'a> {
    points: &'a [GeoPoint],
    eps: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl<'a> CellIndex<'a> {
    fn build(points: &'a [GeoPoint], eps: f64) -> Self {
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (idx, p) in points.iter().enumerate() {
            cells.entry(Self::key(p, eps)).or_default().push(idx);
        }
        Self { points, eps, cells }
    }

    fn key(p: &GeoPoint, eps: f64) -> (i64, i64) {
        ((p.lat / eps).floor() as i64, (p.lng / eps).floor() as i64)
    }

    /// All points within `eps` of `idx`, itself included, ascending
    fn neighbours(&self, idx: usize) -> Vec<usize> {
        let p = &self.points[idx];
        let (ci, cj) = Self::key(p, self.eps);
        let mut found = Vec::new();
        for di in -1..=1 {
            for dj in -1..=1 {
                if let Some(bucket) = self.cells.get(&(ci + di, cj + dj)) {
                    found.extend(
                        bucket
                            .iter()
                            .copied()
                            .filter(|&j| p.distance_deg(&self.points[j]) <= self.eps),
                    );
                }
            }
        }
        found.sort_unstable();
        found
    }
}

/// Run DBSCAN. `eps` must be positive and finite, `min_samples` at least 1;
/// callers validate that.
pub fn dbscan(points: &[GeoPoint], eps: f64, min_samples: usize) -> DbscanResult {
    let mut labels: Vec<Option<Label>> = vec![None; points.len()];
    if points.is_empty() {
        return DbscanResult { labels: Vec::new(), cluster_count: 0 };
    }

    let index = CellIndex::build(points, eps);
    let mut cluster_count = 0;

    for start in 0..points.len() {
        if labels[start].is_some() {
            continue;
        }
        let seeds = index.neighbours(start);
        if seeds.len() < min_samples {
            labels[start] = Some(Label::Noise);
            continue;
        }

        let cluster = cluster_count;
        cluster_count += 1;
        labels[start] = Some(Label::Cluster(cluster));

        let mut queue: VecDeque<usize> = seeds.into_iter().filter(|&j| j != start).collect();
        while let Some(j) = queue.pop_front() {
            match labels[j] {
                // border point previously marked as noise
                Some(Label::Noise) => labels[j] = Some(Label::Cluster(cluster)),
                Some(Label::Cluster(_)) => continue,
                None => {
                    labels[j] = Some(Label::Cluster(cluster));
                    let reach = index.neighbours(j);
                    if reach.len() >= min_samples {
                        queue.extend(reach.into_iter().filter(|&k| labels[k].is_none() || labels[k] == Some(Label::Noise)));
                    }
                }
            }
        }
    }

    DbscanResult {
        labels: labels.into_iter().map(|l| l.unwrap_or(Label::Noise)).collect(),
        cluster_count,
    }
}
