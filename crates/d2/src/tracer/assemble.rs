//! Boundary segments and ring assembly.

use super::walk::Origin;
use geo::Coord;
use std::collections::{HashMap, HashSet};

/// Segments shorter than this are dropped.
pub const MIN_SEGMENT_LENGTH: f64 = 1e-6;

/// Endpoint rounding scale (0.1 mm).
const KEY_SCALE: f64 = 1e4;

/// Rounded point used as a graph key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey(i64, i64);

impl PointKey {
    pub fn new(c: Coord<f64>) -> Self {
        Self(
            (c.x * KEY_SCALE).round() as i64,
            (c.y * KEY_SCALE).round() as i64,
        )
    }
}

/// An undirected boundary edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Coord<f64>,
    pub b: Coord<f64>,
    /// Probe outcome that produced the segment.
    pub origin: Origin,
}

impl Segment {
    pub fn length(&self) -> f64 {
        (self.b.x - self.a.x).hypot(self.b.y - self.a.y)
    }
}

/// Deduplicating segment collector.
#[derive(Debug, Default)]
pub struct SegmentSet {
    segments: Vec<Segment>,
    seen: HashSet<(PointKey, PointKey)>,
}

impl SegmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a segment unless it is degenerate or already present in
    /// either direction. Returns true if it was added.
    pub fn push(&mut self, a: Coord<f64>, b: Coord<f64>, origin: Origin) -> bool {
        let segment = Segment { a, b, origin };
        if segment.length() < MIN_SEGMENT_LENGTH {
            return false;
        }
        let (ka, kb) = (PointKey::new(a), PointKey::new(b));
        if ka == kb {
            return false;
        }
        let key = if ka <= kb { (ka, kb) } else { (kb, ka) };
        if !self.seen.insert(key) {
            return false;
        }
        self.segments.push(segment);
        true
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }
}

/// Chains segments into one closed ring.
///
/// Traversal starts at `start` when it is an endpoint, else at the first
/// degree-1 vertex, else at the first segment. At each vertex the first
/// unused edge is taken; when none is left the walk jumps to the next unused
/// segment. Returns `None` when the ring has fewer than 3 distinct points.
pub fn assemble_segments_smartly(
    segments: &[Segment],
    start: Option<Coord<f64>>,
) -> Option<Vec<Coord<f64>>> {
    let first = segments.first()?;

    let mut graph: HashMap<PointKey, Vec<(usize, PointKey)>> = HashMap::new();
    let mut coords: HashMap<PointKey, Coord<f64>> = HashMap::new();
    for (i, s) in segments.iter().enumerate() {
        let (ka, kb) = (PointKey::new(s.a), PointKey::new(s.b));
        graph.entry(ka).or_default().push((i, kb));
        graph.entry(kb).or_default().push((i, ka));
        coords.entry(ka).or_insert(s.a);
        coords.entry(kb).or_insert(s.b);
    }

    let start_key = start
        .map(PointKey::new)
        .filter(|k| graph.contains_key(k))
        .or_else(|| {
            segments
                .iter()
                .flat_map(|s| [PointKey::new(s.a), PointKey::new(s.b)])
                .find(|k| graph.get(k).is_some_and(|edges| edges.len() == 1))
        })
        .unwrap_or_else(|| PointKey::new(first.a));

    let mut used = vec![false; segments.len()];
    let mut remaining = segments.len();
    let mut current = start_key;
    let mut ring = vec![coords[&start_key]];

    while remaining > 0 {
        let next = graph
            .get(&current)
            .and_then(|edges| edges.iter().find(|(i, _)| !used[*i]).copied());

        match next {
            Some((i, other)) => {
                used[i] = true;
                remaining -= 1;
                current = other;
                ring.push(coords[&other]);
            }
            None => {
                let Some(i) = used.iter().position(|u| !u) else {
                    break;
                };
                let s = &segments[i];
                log::warn!(
                    "boundary gap: jumping from ({:.2}, {:.2}) to ({:.2}, {:.2})",
                    coords[&current].x,
                    coords[&current].y,
                    s.a.x,
                    s.a.y
                );
                used[i] = true;
                remaining -= 1;
                ring.push(s.a);
                ring.push(s.b);
                current = PointKey::new(s.b);
            }
        }
    }

    if PointKey::new(ring[ring.len() - 1]) != start_key {
        ring.push(ring[0]);
    } else {
        let last = ring.len() - 1;
        ring[last] = ring[0];
    }

    let distinct: HashSet<PointKey> = ring.iter().map(|c| PointKey::new(*c)).collect();
    if distinct.len() < 3 {
        return None;
    }
    Some(ring)
}
