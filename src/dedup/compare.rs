//! Tag similarity under a size-dependent threshold.

use crate::models::TagSet;

/// Threshold tier selected by the size of the smaller tag set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// 0..=2 keys: every key must match
    Exact,
    /// 3..=4 keys: under 34% may differ
    Small,
    /// 5+ keys: under 25% may differ
    Large,
}

impl Tier {
    pub fn for_keys(total: usize) -> Self {
        match total {
            0..=2 => Tier::Exact,
            3..=4 => Tier::Small,
            _ => Tier::Large,
        }
    }

    fn accepts(&self, percent_different: f64) -> bool {
        match self {
            Tier::Exact => percent_different == 0.0,
            Tier::Small => percent_different < 34.0,
            Tier::Large => percent_different < 25.0,
        }
    }
}

/// Key-by-key comparison of the smaller tag set against the larger one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagComparison {
    /// Keys in the smaller set
    pub total: usize,
    /// Keys missing from the larger set or carrying another value there
    pub different: usize,
}

impl TagComparison {
    pub fn between(a: &TagSet, b: &TagSet) -> Self {
        let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

        let different = small
            .iter()
            .filter(|(key, value)| large.get(*key) != Some(*value))
            .count();

        Self {
            total: small.len(),
            different,
        }
    }

    pub fn percent_different(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.different as f64 * 100.0 / self.total as f64
    }

    pub fn tier(&self) -> Tier {
        Tier::for_keys(self.total)
    }

    /// Two empty sets have nothing that differs and count as similar.
    pub fn is_similar(&self) -> bool {
        self.total == 0 || self.tier().accepts(self.percent_different())
    }
}

pub fn is_similar(a: &TagSet, b: &TagSet) -> bool {
    TagComparison::between(a, b).is_similar()
}
