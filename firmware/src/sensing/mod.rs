#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Light sampling pipeline: raw reading, smoothing, trigger edges.

use sensor_core::filter::SampleFilter;
use sensor_core::trigger::{Edge, HysteresisTrigger, Sample, ThresholdBandError};

use crate::config;

/// Source of raw light readings.
pub trait LightSource {
    /// Takes one raw sample; synchronous and non-blocking.
    fn read_raw(&mut self) -> Sample;
}

/// Result of ingesting one sample.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SampleReport {
    /// Smoothed value for the display.
    pub value: Sample,
    /// Threshold transition, when one fired.
    pub edge: Option<Edge>,
}

/// Smoothing filter and trigger driven once per sample tick.
pub struct SamplePipeline {
    filter: SampleFilter<{ config::FILTER_DEPTH }>,
    trigger: HysteresisTrigger,
}

impl SamplePipeline {
    /// Builds the pipeline from the configured threshold band.
    pub const fn new() -> Result<Self, ThresholdBandError> {
        let trigger = match HysteresisTrigger::new(config::LOWER_THRESHOLD, config::UPPER_THRESHOLD)
        {
            Ok(trigger) => trigger,
            Err(error) => return Err(error),
        };

        Ok(Self {
            filter: SampleFilter::new(),
            trigger,
        })
    }

    /// Feeds one raw sample through the filter and trigger.
    pub fn ingest(&mut self, raw: Sample) -> SampleReport {
        let value = self.filter.update(raw);
        SampleReport {
            value,
            edge: self.trigger.check(value),
        }
    }

    /// Restarts the filter from a single unfiltered sample.
    ///
    /// Called on wake-from-reset and wake-from-sleep so the smoothing window
    /// does not blend fresh readings with stale pre-sleep history. The
    /// trigger keeps its armed state; the next `ingest` re-evaluates it.
    pub fn reseed(&mut self, raw: Sample) -> Sample {
        self.filter.reseed(raw)
    }

    /// Returns `true` while the level last crossed above the band.
    #[must_use]
    pub const fn armed(&self) -> bool {
        self.trigger.armed()
    }
}
