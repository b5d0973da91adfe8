use axoplot::{
    AxisScale, BinSpec, CoordinateBase, Histogram1D, HistogramTable, Projection, Projection2D,
    Projection3D, ProjectionSettings, matrix,
};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal, Uniform};

const EPS: f64 = 1e-9;

fn linear(min: &[f64], max: &[f64]) -> CoordinateBase {
    CoordinateBase::new(min, max, &vec![AxisScale::Linear; min.len()]).unwrap()
}

#[test]
fn flat_projection_of_box_midpoint() {
    let base = linear(&[0.0, 0.0], &[10.0, 10.0]);
    let ratio = Projection2D::new().project_ratio(&base, &[5.0, 5.0]).unwrap();
    assert!((ratio[0] - 0.5).abs() < EPS && (ratio[1] - 0.5).abs() < EPS);

    // Rounded bounds land on the edges of the canvas.
    assert_eq!(
        Projection2D::new().project_ratio(&base, &[0.0, 10.0]),
        Some([0.0, 1.0])
    );
}

#[test]
fn log_axis_geometric_midpoint() {
    let base = CoordinateBase::new(
        &[1.0, 0.0],
        &[100.0, 1.0],
        &[AxisScale::Log, AxisScale::Linear],
    )
    .unwrap();
    let ratio = Projection::flat().project_ratio(&base, &[10.0, 0.0]).unwrap();
    assert!((ratio[0] - 0.5).abs() < EPS);
    assert_eq!(Projection::flat().project_ratio(&base, &[0.0, 0.0]), None);
}

#[test]
fn histogram_of_four_samples() {
    let h = Histogram1D::new(&[1.0, 2.0, 2.0, 3.0], Some((1.0, 3.0)), &BinSpec::Count(2)).unwrap();
    assert_eq!(h.bins[0].lower, 1.0);
    assert_eq!(h.bins[0].upper(), 2.0);
    assert_eq!(h.bins[0].count, 1);
    assert_eq!(h.bins[1].lower, 2.0);
    assert_eq!(h.bins[1].upper(), 3.0);
    assert_eq!(h.bins[1].count, 3);
}

#[test]
fn drag_of_100_pixels_turns_one_radian() {
    let mut p = Projection3D::from_settings(ProjectionSettings {
        theta: 0.0,
        phi: 0.0,
        zoom_factor: 1.7,
        ..ProjectionSettings::default()
    });
    p.rotate_by_drag(100.0, 0.0);
    assert!((p.theta() + 1.0).abs() < EPS);
    assert_eq!(p.phi(), 0.0);
}

#[test]
fn delete_then_insert_row_restores_matrix() {
    let m: Vec<Vec<f64>> = (0..5)
        .map(|i| (0..3).map(|j| (i * 3 + j) as f64).collect())
        .collect();
    for i in 0..m.len() {
        let row = m[i].clone();
        let removed = matrix::delete_row(&m, i).unwrap();
        assert_eq!(removed.len(), m.len() - 1);
        assert_eq!(matrix::insert_row(&removed, i, &row).unwrap(), m);
    }
}

#[test]
fn round_bounds_is_idempotent_on_random_data() {
    let mut rng = StdRng::seed_from_u64(7);
    let normal = Normal::new(250.0, 90.0).unwrap();
    for _ in 0..50 {
        let mut base = linear(&[0.0, 0.0], &[1.0, 1.0]);
        base.reset_raw_bounds();
        let points: Vec<Vec<f64>> = (0..20)
            .map(|_| vec![normal.sample(&mut rng), normal.sample(&mut rng) * 1e-3])
            .collect();
        base.include_all(&points).unwrap();
        base.round_bounds().unwrap();
        let first = (base.bounds(0).unwrap(), base.bounds(1).unwrap());
        base.round_bounds().unwrap();
        assert_eq!((base.bounds(0).unwrap(), base.bounds(1).unwrap()), first);

        for d in 0..2 {
            let (raw_min, raw_max) = base.raw_bounds(d).unwrap().unwrap();
            let (min, max) = base.bounds(d).unwrap();
            assert!(min <= raw_min && max >= raw_max);
            let intervals = ((max - min) / base.tick_step(d).unwrap()).round() as usize;
            assert!((3..=8).contains(&intervals), "{intervals} intervals on axis {d}");
        }
    }
}

#[test]
fn histogram_counts_every_sample_in_bounds() {
    let mut rng = StdRng::seed_from_u64(42);
    let normal = Normal::new(0.0, 1.0).unwrap();
    for n in [1usize, 10, 1000] {
        let samples: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng)).collect();
        for bins in [1usize, 3, 17] {
            let h = Histogram1D::new(&samples, None, &BinSpec::Count(bins)).unwrap_or_else(|_| {
                // A single sample has no extent; give it one.
                Histogram1D::new(&samples, Some((-10.0, 10.0)), &BinSpec::Count(bins)).unwrap()
            });
            assert_eq!(h.total(), n);
            assert_eq!(h.out_of_range, 0);
        }
    }

    let uniform = Uniform::new(-1.0, 1.0).unwrap();
    let samples: Vec<Vec<f64>> = (0..2000)
        .map(|_| (0..3).map(|_| uniform.sample(&mut rng)).collect())
        .collect();
    let t = HistogramTable::equal_width(&samples, &[(-1.0, 1.0); 3], &[4, 5, 6]).unwrap();
    assert_eq!(t.cells.len(), 4 * 5 * 6);
    assert_eq!(t.total(), samples.len());
}

#[test]
fn repeated_rotation_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(3);
    let uniform = Uniform::new(0.0, 10.0).unwrap();
    let base = linear(&[0.0; 3], &[10.0; 3]);
    let points: Vec<Vec<f64>> = (0..50)
        .map(|_| (0..3).map(|_| uniform.sample(&mut rng)).collect())
        .collect();

    let mut p = Projection3D::new();
    p.rotate_by_drag(37.0, -12.0);
    p.translate(0.05, -0.03);
    p.rotate(1.1, 0.4);
    let first: Vec<_> = points.iter().map(|pt| p.project_ratio(&base, pt)).collect();
    p.rotate(1.1, 0.4);
    let second: Vec<_> = points.iter().map(|pt| p.project_ratio(&base, pt)).collect();
    assert_eq!(first, second);
}

#[test]
fn pivot_tracks_bounds_changes() {
    let mut base = linear(&[0.0; 3], &[10.0; 3]);
    let p = Projection3D::new();
    let before = p.project_ratio(&base, &[5.0, 5.0, 5.0]).unwrap();
    assert!((before[0] - 0.5).abs() < EPS && (before[1] - 0.5).abs() < EPS);

    base.include_all(&[vec![-40.0, 0.0, 0.0], vec![60.0, 100.0, 30.0]])
        .unwrap();
    base.round_bounds().unwrap();
    let center = p.center(&base).unwrap();
    let after = p.project_ratio(&base, &center).unwrap();
    assert!((after[0] - 0.5).abs() < EPS && (after[1] - 0.5).abs() < EPS);
}
