//! Redaction zones and their merging

use serde::{Deserialize, Serialize};

use crate::{RenderError, Result};

/// Inclusive range of character indices in the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RedactionZone {
    pub start: usize,
    pub end: usize,
}

impl RedactionZone {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(RenderError::InvalidZone { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Zones overlap when they share at least one index
    pub fn overlaps(&self, other: &RedactionZone) -> bool {
        (self.start <= other.end) == (self.end >= other.start)
    }

    pub fn union(&self, other: &RedactionZone) -> RedactionZone {
        RedactionZone {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

/// Pairwise non-overlapping set of zones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneSet {
    zones: Vec<RedactionZone>,
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone, absorbing every existing zone it overlaps.
    ///
    /// The first overlapping zone becomes the accumulator; any further
    /// overlapping zones are folded into it and dropped, so one new zone can
    /// join several existing ones.
    pub fn merge(&mut self, zone: RedactionZone) {
        if self.zones.contains(&zone) {
            return;
        }

        let mut accumulator: Option<usize> = None;
        let mut absorbed = Vec::new();
        for i in 0..self.zones.len() {
            let target = accumulator.map_or(zone, |j| self.zones[j]);
            if !self.zones[i].overlaps(&target) {
                continue;
            }
            match accumulator {
                None => {
                    self.zones[i] = self.zones[i].union(&zone);
                    accumulator = Some(i);
                }
                Some(j) => {
                    self.zones[j] = self.zones[j].union(&self.zones[i]);
                    absorbed.push(i);
                }
            }
        }

        for i in absorbed.into_iter().rev() {
            self.zones.remove(i);
        }
        if accumulator.is_none() {
            self.zones.push(zone);
        }
    }

    pub fn zones(&self) -> &[RedactionZone] {
        &self.zones
    }

    pub fn into_zones(self) -> Vec<RedactionZone> {
        self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zones ordered by start index
    pub fn sorted(&self) -> Vec<RedactionZone> {
        let mut zones = self.zones.clone();
        zones.sort();
        zones
    }
}

impl FromIterator<RedactionZone> for ZoneSet {
    fn from_iter<I: IntoIterator<Item = RedactionZone>>(iter: I) -> Self {
        let mut set = ZoneSet::new();
        for zone in iter {
            set.merge(zone);
        }
        set
    }
}

impl Extend<RedactionZone> for ZoneSet {
    fn extend<I: IntoIterator<Item = RedactionZone>>(&mut self, iter: I) {
        for zone in iter {
            self.merge(zone);
        }
    }
}
