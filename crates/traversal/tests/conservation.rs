//! Integration tests for the traversal conservation laws

use etmap_traversal::{Piece, Ray};
use nalgebra::Point3;
use rstest::rstest;

fn assert_length_conserved(ray: &Ray, cell_dim: f64) {
    let total: f64 = ray.pieces(cell_dim).map(|p| p.length).sum();
    let expected = ray.length();
    assert!(
        (total - expected).abs() <= 1e-9 * expected,
        "traversed {total} of {expected}"
    );
}

#[rstest]
#[case([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], 5.0)] // case 1: along an axis
#[case([0.0, 0.0, 0.0], [0.0, 0.0, 5.0], 2.0)] // case 2: two zero components
#[case([0.3, 7.1, 2.2], [9.8, 0.4, 6.6], 1.0)] // case 3: oblique
#[case([9.8, 0.4, 6.6], [0.3, 7.1, 2.2], 1.0)] // case 4: oblique, reversed
#[case([2.0, 2.0, 2.0], [6.0, 6.0, 6.0], 1.0)] // case 5: through cell corners
#[case([1.25, 3.5, 0.0], [1.25, 3.5, 0.7], 0.3)] // case 6: sub-cell steps
#[case([0.1, 0.1, 0.1], [0.2, 0.15, 0.1], 5.0)] // case 7: inside one cell
#[case([49.9, 0.0, 12.0], [0.0, 49.9, 12.0], 0.5)] // case 8: long diagonal
fn length_conservation(#[case] p0: [f64; 3], #[case] pn: [f64; 3], #[case] cell_dim: f64) {
    let ray = Ray::new(Point3::from(p0), Point3::from(pn));
    assert_length_conserved(&ray, cell_dim);
}

#[rstest]
#[case(1.0)]
#[case(0.25)]
#[case(3.0)]
fn pieces_are_ordered_and_within_cells(#[case] cell_dim: f64) {
    let ray = Ray::new(Point3::new(0.7, 9.2, 3.3), Point3::new(8.1, 1.6, 4.9));
    let pieces: Vec<Piece> = ray.pieces(cell_dim).collect();

    assert_eq!(pieces.first().unwrap().t0, 0.0);
    assert_eq!(pieces.last().unwrap().t1, 1.0);

    for pair in pieces.windows(2) {
        assert_eq!(pair[0].t1, pair[1].t0);
        assert!(pair[1].t0 < pair[1].t1);
    }

    // no piece is longer than the cell diagonal
    let diagonal = cell_dim * 3.0_f64.sqrt();
    assert!(pieces.iter().all(|p| p.length <= diagonal + 1e-12));
}

#[test]
fn zero_component_directions_stay_finite() {
    let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 5.0));
    let t: Vec<f64> = ray.crossings(2.0).collect();

    assert!(t.iter().all(|v| v.is_finite()));
    assert_eq!(t, vec![0.0, 0.4, 0.8, 1.0]);
    assert_length_conserved(&ray, 2.0);
}
