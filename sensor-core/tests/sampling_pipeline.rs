use sensor_core::filter::SampleFilter;
use sensor_core::trigger::{Edge, HysteresisTrigger, Sample};

const LOWER: Sample = 3_000;
const UPPER: Sample = 10_000;

fn feed<const DEPTH: usize>(
    filter: &mut SampleFilter<DEPTH>,
    trigger: &mut HysteresisTrigger,
    samples: &[Sample],
) -> Vec<Edge> {
    samples
        .iter()
        .filter_map(|&raw| trigger.check(filter.update(raw)))
        .collect()
}

#[test]
fn noisy_hover_around_the_upper_threshold_emits_one_edge() {
    let mut filter = SampleFilter::<8>::new();
    let mut trigger = HysteresisTrigger::new(LOWER, UPPER).expect("valid band");

    // Noise straddling the upper threshold: the smoothed value climbs past
    // it once and stays inside the band afterwards.
    let samples = [
        11_000u16, 12_000, 9_500, 12_500, 11_800, 9_900, 12_200, 11_500, 12_400, 9_700,
    ];

    let edges = feed(&mut filter, &mut trigger, &samples);
    assert_eq!(edges, vec![Edge::RoseAboveUpper]);
    assert!(trigger.armed());
}

#[test]
fn sustained_darkness_releases_after_the_window_drains() {
    let mut filter = SampleFilter::<8>::new();
    let mut trigger = HysteresisTrigger::new(LOWER, UPPER).expect("valid band");

    // Bright long enough to fill the window, then lights out.
    let mut samples = vec![15_000u16; 8];
    samples.extend([100u16; 8]);

    let edges = feed(&mut filter, &mut trigger, &samples);
    assert_eq!(edges, vec![Edge::RoseAboveUpper, Edge::FellBelowLower]);
    assert!(!trigger.armed());
}

#[test]
fn a_single_dark_dropout_does_not_release_the_trigger() {
    let mut filter = SampleFilter::<8>::new();
    let mut trigger = HysteresisTrigger::new(LOWER, UPPER).expect("valid band");

    let mut samples = vec![15_000u16; 8];
    // One fully dark reading in an otherwise bright stream: the average
    // dips to ~13k, well inside the band.
    samples.push(0);
    samples.extend([15_000u16; 4]);

    let edges = feed(&mut filter, &mut trigger, &samples);
    assert_eq!(edges, vec![Edge::RoseAboveUpper]);
    assert!(trigger.armed());
}

#[test]
fn reseeding_restarts_detection_from_the_fresh_reading() {
    let mut filter = SampleFilter::<8>::new();
    let mut trigger = HysteresisTrigger::new(LOWER, UPPER).expect("valid band");

    let bright = vec![15_000u16; 8];
    feed(&mut filter, &mut trigger, &bright);
    assert!(trigger.armed());

    // Wake from sleep into darkness: the seed replaces the bright history,
    // so the very next smoothed sample reflects the real level.
    filter.reseed(200);
    assert_eq!(trigger.check(filter.update(200)), Some(Edge::FellBelowLower));
}
