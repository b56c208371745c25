//! # Title clustering.
//!
//! Groups near-duplicate items (the same story syndicated by several outlets) by title
//! similarity. Greedy and order-dependent: each item joins the first cluster whose
//! *first* title is similar enough, otherwise it opens a new cluster.
//!
//! Similarity is the Ratcliff/Obershelp ratio `2·M / (|a| + |b|)`, where `M` is the
//! number of characters in the recursively found longest common blocks, computed on
//! lower-cased, whitespace-collapsed titles.

use serde::Serialize;

/// Default similarity threshold for grouping titles.
pub const DEFAULT_THRESHOLD: f64 = 0.82;

/// A group of similar items.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cluster<T> {
    /// The longest member title (first one on ties).
    pub title: String,
    pub items: Vec<T>,
}

impl<T> Cluster<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn normalize(s: &str) -> Vec<char> {
    s.split_whitespace()
        .flat_map(|w| std::iter::once(' ').chain(w.chars()))
        .skip(1)
        .flat_map(char::to_lowercase)
        .collect()
}

/// Similarity ratio in `[0, 1]`. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`, earliest in `a` on ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];
    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            cur[col] = if a[i] == b[j] { prev[col - 1] + 1 } else { 0 };
            if cur[col] > best_k {
                best_k = cur[col];
                best_i = i + 1 - best_k;
                best_j = j + 1 - best_k;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    (best_i, best_j, best_k)
}

/// Greedy clustering of `items` by the title `title_of` returns.
///
/// Items without a (non-blank) title always get a cluster of their own.
pub fn cluster_by_title<T, F>(items: Vec<T>, title_of: F, threshold: f64) -> Vec<Cluster<T>>
where
    F: Fn(&T) -> Option<&str>,
{
    // (first title, members)
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();

    for item in items {
        let title = title_of(&item).map(str::trim).unwrap_or_default().to_string();
        let slot = if title.is_empty() {
            None
        } else {
            groups
                .iter()
                .position(|(rep, _)| !rep.is_empty() && similarity(&title, rep) >= threshold)
        };
        match slot {
            Some(idx) => groups[idx].1.push(item),
            None => groups.push((title, vec![item])),
        }
    }

    groups
        .into_iter()
        .map(|(rep, items)| {
            let mut title = rep;
            let mut best = 0;
            for t in items.iter().filter_map(&title_of) {
                let len = t.chars().count();
                if len > best {
                    best = len;
                    title = t.to_string();
                }
            }
            Cluster { title, items }
        })
        .collect()
}
