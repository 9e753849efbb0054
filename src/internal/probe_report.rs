#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]

//! Churn simulation for `OpenAddressingMap`.
//!
//! For a range of load factor thresholds, fills a map to a fixed number of live
//! keys, then repeatedly removes a random live key and inserts a fresh one. The
//! live set never grows, so every resize is caused by tombstones alone. Probe
//! lengths of all live keys are measured at the end and charted.
//!
//! Set `RUST_LOG=debug` to see each resize as it happens.

use openmap::{MapError, OpenAddressingMap};
use plotters::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

const INITIAL_CAPACITY: usize = 64;
const LIVE_KEYS: usize = 2_000;
const CHURN_ROUNDS: usize = 50_000;
const NUM_LOAD_FACTORS: usize = 10;
const SEED: u64 = 0x5eed;

/// Measurements taken from one churn run
#[derive(Debug, Clone, Copy)]
struct ChurnStats {
    max_load_factor: f64,
    avg_probe: f64,
    worst_probe: usize,
    peak_tombstone_ratio: f64,
    resizes: usize,
    final_capacity: usize,
}

/// Puts `key`, counting a resize when the capacity changes
fn put_counting(map: &mut OpenAddressingMap<u64, u64>, key: u64, resizes: &mut usize) {
    let before = map.capacity();
    map.put(key, key);
    if map.capacity() != before {
        *resizes += 1;
    }
}

fn run_churn(max_load_factor: f64, rng: &mut StdRng) -> Result<ChurnStats, MapError> {
    let mut map = OpenAddressingMap::new(INITIAL_CAPACITY, max_load_factor)?;
    let mut live: Vec<u64> = Vec::with_capacity(LIVE_KEYS);
    let mut next_key = 0_u64;
    let mut resizes = 0;
    let mut peak_tombstone_ratio: f64 = 0.0;

    while live.len() < LIVE_KEYS {
        put_counting(&mut map, next_key, &mut resizes);
        live.push(next_key);
        next_key += 1;
    }

    for _ in 0..CHURN_ROUNDS {
        let victim = live.swap_remove(rng.random_range(0..live.len()));
        map.remove(&victim);
        peak_tombstone_ratio =
            peak_tombstone_ratio.max(map.tombstones() as f64 / map.capacity() as f64);

        put_counting(&mut map, next_key, &mut resizes);
        live.push(next_key);
        next_key += 1;
    }

    let probes: Vec<usize> = live.iter().map(|key| map.probe_length(key)).collect();
    let avg_probe = probes.iter().sum::<usize>() as f64 / probes.len().max(1) as f64;
    let worst_probe = probes.iter().copied().max().unwrap_or(0);

    Ok(ChurnStats {
        max_load_factor,
        avg_probe,
        worst_probe,
        peak_tombstone_ratio,
        resizes,
        final_capacity: map.capacity(),
    })
}

/// Draws one line per series against the load factor threshold
fn draw_chart(
    path: &str,
    caption: &str,
    y_desc: &str,
    series: &[(&str, RGBColor, Vec<(f64, f64)>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = series
        .iter()
        .flat_map(|(_, _, points)| points.iter().map(|&(_, y)| y))
        .fold(0.0, f64::max) *
        1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..max_y.max(1.0))?;

    chart
        .configure_mesh()
        .x_desc("Max load factor")
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    for (label, color, points) in series {
        let style = ShapeStyle::from(color).stroke_width(2);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), style))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        chart.draw_series(points.iter().map(|&point| Circle::new(point, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Thresholds from 0.3 to 0.9
    let load_factors: Vec<f64> = (0..NUM_LOAD_FACTORS)
        .map(|i| 0.3 + (0.9 - 0.3) * (i as f64) / ((NUM_LOAD_FACTORS - 1) as f64))
        .collect();

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut results = Vec::with_capacity(load_factors.len());

    for &max_load_factor in &load_factors {
        log::info!("churning {LIVE_KEYS} live keys for {CHURN_ROUNDS} rounds at {max_load_factor:.2}");
        let stats = run_churn(max_load_factor, &mut rng)?;
        println!(
            "  max load {:.2}: avg probe = {:.2}, worst = {}, peak tombstones = {:.1}%, resizes = {}, capacity = {}",
            stats.max_load_factor,
            stats.avg_probe,
            stats.worst_probe,
            stats.peak_tombstone_ratio * 100.0,
            stats.resizes,
            stats.final_capacity
        );
        results.push(stats);
    }

    draw_chart(
        "probe_lengths.png",
        "Probe length under delete/insert churn",
        "Slots inspected per lookup",
        &[
            (
                "Average",
                RGBColor(50, 90, 220),
                results.iter().map(|s| (s.max_load_factor, s.avg_probe)).collect(),
            ),
            (
                "Worst case",
                RGBColor(220, 50, 50),
                results.iter().map(|s| (s.max_load_factor, s.worst_probe as f64)).collect(),
            ),
        ],
    )?;

    draw_chart(
        "tombstones.png",
        "Tombstone build-up and resizes under churn",
        "Count / percent",
        &[
            (
                "Peak tombstones (% of slots)",
                RGBColor(50, 180, 50),
                results
                    .iter()
                    .map(|s| (s.max_load_factor, s.peak_tombstone_ratio * 100.0))
                    .collect(),
            ),
            (
                "Resizes",
                RGBColor(180, 50, 180),
                results.iter().map(|s| (s.max_load_factor, s.resizes as f64)).collect(),
            ),
        ],
    )?;

    println!("Generated plot images: probe_lengths.png, tombstones.png");

    Ok(())
}
