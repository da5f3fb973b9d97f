//! Lens / lensless round trips on device geometry

#![allow(
    clippy::cast_precision_loss,
    clippy::unwrap_used,
    clippy::indexing_slicing,
)]

use ndarray::{Array2, IxDyn};
use slm_optics::{
    amplitude, extend_to_complex, phase_from_intensity, Field, FieldTransform, PropagationSetup,
    TransferCache,
};
use slm_specs::devices::HOLOEYE_LC_2012;
use slm_specs::{CellDim, PhysicalParams, SlmShape};

fn max_diff(a: &Field, b: &Field) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

fn max_phase_diff(a: &Field, b: &Field) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x * y.conj()).arg().abs())
        .fold(0.0, f64::max)
}

#[test]
fn holoeye_round_trip() {
    let setup = PropagationSetup::for_device(&PhysicalParams::DEFAULT, &HOLOEYE_LC_2012).unwrap();
    let transform = FieldTransform::from_setup(&setup).unwrap();
    assert!(transform.transfer().is_full_band());

    let (rows, cols) = HOLOEYE_LC_2012.slm_shape.as_tuple();
    let image = Array2::from_shape_fn((rows, cols), |(r, c)| ((r / 32 + c / 32) % 2) as f64 * 255.0);
    let lens = extend_to_complex(&phase_from_intensity(&image)).into_dyn();

    let lensless = transform.lens_to_lensless(&lens).unwrap();
    assert!(lensless.iter().all(|z| z.re.is_finite() && z.im.is_finite()));

    let back = transform.lensless_to_lens(&lensless).unwrap();
    assert!(max_diff(&lens, &back) < 1e-4);
    assert!(max_phase_diff(&lens, &back) < 1e-4);
    assert!(amplitude(&back).iter().all(|a| (a - 1.0).abs() < 1e-4));
}

#[test]
fn batched_round_trip_through_cache() {
    let cache = TransferCache::new();
    let setup = PropagationSetup::new(2e-3, 520e-9, CellDim::new(8e-6, 6e-6), SlmShape::new(40, 56)).unwrap();
    let forward = FieldTransform::with_cache(&cache, &setup).unwrap();
    let inverse = FieldTransform::with_cache(&cache, &setup).unwrap();
    assert_eq!(cache.len(), 1);
    assert!(forward.transfer().is_full_band());

    let theta = ndarray::Array3::from_shape_fn((3, 40, 56), |(b, r, c)| {
        (b as f64 + 1.0) * ((r as f64 * 0.3).sin() + (c as f64 * 0.17).cos()) * 4.0
    });
    let lens = extend_to_complex(&theta).into_dyn();
    let back = inverse
        .lensless_to_lens(&forward.lens_to_lensless(&lens).unwrap())
        .unwrap();
    assert_eq!(back.shape(), &[3, 40, 56]);
    assert!(max_diff(&lens, &back) < 1e-4);
}

#[test]
fn linear_propagation_of_centered_aperture_stays_centered() {
    let setup = PropagationSetup::new(5e-3, 532e-9, CellDim::square(8e-6), SlmShape::new(32, 32)).unwrap();
    let transform = FieldTransform::from_setup(&setup).unwrap();
    let field = Array2::from_shape_fn((32, 32), |(r, c)| {
        let inside = (12..20).contains(&r) && (12..20).contains(&c);
        num_complex::Complex64::new(if inside { 1.0 } else { 0.0 }, 0.0)
    })
    .into_dyn();

    let out = transform.lensless_propagate_linear(&field).unwrap();
    let amp = amplitude(&out);
    let center = amp[IxDyn(&[16, 16])];
    let corner = amp[IxDyn(&[0, 0])];
    assert!(center > corner);
}
