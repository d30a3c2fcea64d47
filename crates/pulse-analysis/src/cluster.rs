//! Topic clustering: k-means over TF-IDF vectors of the cleaned text.

use std::collections::BTreeMap;

use pulse_core::{ClusterSummary, PostTable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AnalysisError;
use crate::tfidf::TfIdfVectorizer;

const SEED: u64 = 42;
const RESTARTS: usize = 10;
const MAX_ITERATIONS: usize = 300;
const TOLERANCE: f64 = 1e-4;
const VOCABULARY_CAP: usize = 100;
const VOCABULARY_MIN_DF: usize = 2;
const LABEL_TERMS: usize = 5;

/// Number of clusters actually requested for `posts` posts when `k` was asked.
#[must_use]
pub fn effective_k(requested: usize, posts: usize) -> usize {
    if posts < requested {
        posts.saturating_sub(1).max(1)
    } else {
        requested.max(1)
    }
}

/// Partitions the table into topic clusters and labels each one.
///
/// # Errors
///
/// Returns [`AnalysisError::NoData`] for an empty table and
/// [`AnalysisError::EmptyVocabulary`] when no term appears in two posts.
pub fn cluster_topics(table: &PostTable, k: usize) -> Result<ClusterSummary, AnalysisError> {
    if table.is_empty() {
        return Err(AnalysisError::NoData);
    }
    let k_eff = effective_k(k, table.len());
    if k_eff != k {
        tracing::debug!(requested = k, effective = k_eff, "reduced cluster count");
    }

    let docs: Vec<&str> = table.iter().map(|p| p.cleaned_text.as_str()).collect();
    let matrix = TfIdfVectorizer::new()
        .with_min_df(VOCABULARY_MIN_DF)
        .with_max_features(VOCABULARY_CAP)
        .fit_transform(&docs)?;

    let assignments = kmeans(matrix.rows(), k_eff)?;

    let mut members: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for (doc, &cluster) in docs.iter().zip(&assignments) {
        members.entry(cluster).or_default().push(*doc);
    }

    let mut cluster_counts = BTreeMap::new();
    let mut cluster_terms = BTreeMap::new();
    for (cluster, texts) in members {
        cluster_counts.insert(cluster, texts.len());
        cluster_terms.insert(cluster, label_cluster(&texts));
    }

    tracing::debug!(clusters = cluster_terms.len(), "topics clustered");
    Ok(ClusterSummary {
        assignments,
        cluster_counts,
        cluster_terms,
        requested_k: k,
        effective_k: k_eff,
    })
}

/// Top terms of one cluster's texts. Empty when nothing survives tokenizing.
fn label_cluster(texts: &[&str]) -> Vec<String> {
    match TfIdfVectorizer::new().fit_transform(texts) {
        Ok(matrix) => matrix
            .ranked_terms(LABEL_TERMS)
            .into_iter()
            .map(|t| t.term)
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Best-of-`RESTARTS` k-means with k-means++ seeding. Returns the cluster of
/// every point.
fn kmeans(points: &[Vec<f64>], k: usize) -> Result<Vec<usize>, AnalysisError> {
    if points.is_empty() || k == 0 {
        return Err(AnalysisError::Clustering(format!(
            "cannot form {k} clusters from {} points",
            points.len()
        )));
    }
    let k = k.min(points.len());
    let mut rng = StdRng::seed_from_u64(SEED);

    let mut best: Option<(f64, Vec<usize>)> = None;
    for _ in 0..RESTARTS {
        let centroids = seed_centroids(points, k, &mut rng);
        let (assignments, inertia) = lloyd(points, centroids);
        if !inertia.is_finite() {
            continue;
        }
        if best.as_ref().is_none_or(|(b, _)| inertia < *b) {
            best = Some((inertia, assignments));
        }
    }

    best.map(|(_, assignments)| assignments)
        .ok_or_else(|| AnalysisError::Clustering("no restart produced a finite inertia".into()))
}

/// k-means++: first centroid uniform, then proportional to squared distance.
fn seed_centroids(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| squared_distance(p, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let next = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                if target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        } else {
            // Every point already coincides with a centroid.
            rng.random_range(0..points.len())
        };
        centroids.push(points[next].clone());
    }
    centroids
}

fn lloyd(points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>) -> (Vec<usize>, f64) {
    let dims = points[0].len();
    let mut assignments = assign(points, &centroids);

    for _ in 0..MAX_ITERATIONS {
        let mut sums = vec![vec![0.0_f64; dims]; centroids.len()];
        let mut counts = vec![0_usize; centroids.len()];
        for (point, &cluster) in points.iter().zip(&assignments) {
            counts[cluster] += 1;
            for (s, v) in sums[cluster].iter_mut().zip(point) {
                *s += v;
            }
        }

        let mut shift = 0.0_f64;
        for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
            // Empty clusters keep their previous centroid.
            if count == 0 {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let denom = count as f64;
            let updated: Vec<f64> = sum.into_iter().map(|s| s / denom).collect();
            shift += squared_distance(centroid, &updated);
            *centroid = updated;
        }

        assignments = assign(points, &centroids);
        if shift <= TOLERANCE {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&assignments)
        .map(|(p, &c)| squared_distance(p, &centroids[c]))
        .sum();
    (assignments, inertia)
}

/// Nearest centroid per point; ties go to the lower cluster id.
fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (i, c) in centroids.iter().enumerate() {
                let d = squared_distance(p, c);
                if d < best_dist {
                    best = i;
                    best_dist = d;
                }
            }
            best
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
