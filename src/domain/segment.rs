// One cached hour of samples
use super::sample::Sample;

#[derive(Debug, Clone)]
pub struct Segment {
    pub raw: Vec<Sample>,
    pub simplified: Vec<Sample>,
}

impl Segment {
    pub fn new(raw: Vec<Sample>, simplified: Vec<Sample>) -> Self {
        Self { raw, simplified }
    }

    /// Chooses which form of the hour to hand out for a request
    pub fn points(&self, simplify_each_hour: bool) -> &[Sample] {
        if simplify_each_hour && self.raw.len() > super::SIMPLIFY_THRESHOLD {
            &self.simplified
        } else {
            &self.raw
        }
    }
}
