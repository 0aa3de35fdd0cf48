use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use image::RgbaImage;

/// Hash over the dimensions and raw RGBA bytes of an untrimmed frame.
pub fn content_hash(rgba: &RgbaImage) -> u64 {
    let mut hasher = DefaultHasher::new();
    rgba.dimensions().hash(&mut hasher);
    rgba.as_raw().hash(&mut hasher);
    hasher.finish()
}

fn same_content(a: &RgbaImage, b: &RgbaImage) -> bool {
    a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw()
}

/// Result of offering a frame to the [`DuplicateDetector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// First time this content is seen; `unique` is its index among unique frames.
    First { unique: usize },
    /// Content already seen; `unique` names the canonical frame.
    Repeat { unique: usize },
}

impl Occurrence {
    pub fn unique_index(&self) -> usize {
        match *self {
            Occurrence::First { unique } | Occurrence::Repeat { unique } => unique,
        }
    }
}

/// Maps frame content to the first frame that carried it.
///
/// A hash match is only a candidate: the bucket is scanned with an exact
/// byte comparison, so colliding hashes never merge distinct frames.
#[derive(Debug, Default)]
pub struct DuplicateDetector<'a> {
    buckets: HashMap<u64, Vec<(usize, &'a RgbaImage)>>,
    unique: usize,
}

impl<'a> DuplicateDetector<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct contents seen so far.
    pub fn unique_count(&self) -> usize {
        self.unique
    }

    pub fn observe(&mut self, rgba: &'a RgbaImage) -> Occurrence {
        self.observe_hashed(content_hash(rgba), rgba)
    }

    /// Like [`observe`](Self::observe) with a precomputed hash.
    pub fn observe_hashed(&mut self, hash: u64, rgba: &'a RgbaImage) -> Occurrence {
        let bucket = self.buckets.entry(hash).or_default();
        if let Some((unique, _)) = bucket.iter().find(|(_, seen)| same_content(seen, rgba)) {
            return Occurrence::Repeat { unique: *unique };
        }
        let unique = self.unique;
        bucket.push((unique, rgba));
        self.unique += 1;
        Occurrence::First { unique }
    }
}
