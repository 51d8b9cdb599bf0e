use accretion_jet::audio::{AudioSample, SPECTRUM_LEN};
use accretion_jet::bucket::BucketMapper;
use accretion_jet::disk::{BUCKET_COUNT, DiskField, DiskPlacement, DiskShape, Revolution};
use accretion_jet::gradient::ColorGradient;
use accretion_jet::sim::SimError;

fn revolution() -> Revolution {
    Revolution {
        speed: 2000.0,
        falloff: 1.7,
        offset: 50.0,
    }
}

fn random_field(count: usize, seed: u64) -> DiskField {
    let shape = DiskShape {
        start: 50.0,
        range: 3000.0,
        thickness: 10.0,
    };
    let mut rng = fastrand::Rng::with_seed(seed);
    DiskField::new(count, shape, revolution(), &ColorGradient::accretion(), &mut rng)
        .expect("field should build")
}

fn noisy_sample(rng: &mut fastrand::Rng) -> AudioSample {
    let raw = (0..SPECTRUM_LEN).map(|_| rng.f32() * 2.0).collect::<Vec<_>>();
    AudioSample::from_slice(&raw)
}

fn xz_radius(p: glam::Vec3) -> f32 {
    (p.x * p.x + p.z * p.z).sqrt()
}

#[test]
fn fixed_radii_land_in_expected_buckets_and_colors() {
    let shape = DiskShape {
        start: 100.0,
        range: 300.0,
        thickness: 10.0,
    };
    let placements = [100.0f32, 175.0, 250.0, 400.0].map(|radius| DiskPlacement {
        radius,
        theta: 0.0,
        height: 0.0,
    });
    let gradient = ColorGradient::accretion();
    let field = DiskField::from_placements(shape, revolution(), &gradient, &placements)
        .expect("field should build");

    let buckets = field.particles().iter().map(|p| p.bucket()).collect::<Vec<_>>();
    assert_eq!(buckets, vec![0, 32, 64, 127]);

    let ts = placements.map(|p| shape.gradient_t(p.radius));
    assert_eq!(ts, [0.0, 0.25, 0.5, 1.0]);
    for (p, t) in field.particles().iter().zip(ts) {
        assert_eq!(p.color(), gradient.color_at(t));
    }
}

#[test]
fn every_particle_sits_in_exactly_one_matching_bucket() {
    let field = random_field(5_000, 11);
    let shape = field.shape();
    let mut seen = vec![0u32; field.len()];

    for (bucket, members) in field.buckets().iter() {
        for &idx in members {
            seen[idx] += 1;
            assert_eq!(field.particles()[idx].bucket(), bucket);
        }
    }
    assert!(seen.iter().all(|&n| n == 1));

    for p in field.particles() {
        let r = xz_radius(p.position());
        let expected = ((r - shape.start) / shape.range * BUCKET_COUNT as f32)
            .floor()
            .clamp(0.0, 127.0) as usize;
        // Recomputing from cartesian coordinates can cross a boundary by one ulp.
        assert!(p.bucket().abs_diff(expected) <= 1);
    }
}

#[test]
fn bucket_index_is_clamped_outside_the_disk() {
    let shape = DiskShape {
        start: 100.0,
        range: 300.0,
        thickness: 0.0,
    };
    assert_eq!(shape.bucket_for(10.0), 0);
    assert_eq!(shape.bucket_for(10_000.0), 127);
    assert_eq!(shape.gradient_t(10_000.0), 1.0);
}

#[test]
fn silence_restores_initial_heights_exactly() {
    let mut field = random_field(2_000, 5);
    let mapper = BucketMapper::new(60.0);
    let mut rng = fastrand::Rng::with_seed(99);

    for _ in 0..25 {
        mapper.apply(&mut field, &noisy_sample(&mut rng));
        field.revolve(1.0 / 60.0);
    }
    assert!(
        field
            .particles()
            .iter()
            .any(|p| p.position().y != p.initial_height())
    );

    mapper.apply(&mut field, &AudioSample::silent());
    for p in field.particles() {
        assert_eq!(p.position().y, p.initial_height());
    }
}

#[test]
fn mapper_lifts_only_the_driven_bucket() {
    let mut field = random_field(3_000, 8);
    let target = field.particles()[0].bucket();
    let mut raw = [0.0f32; SPECTRUM_LEN];
    raw[target] = 0.5;

    let drive = BucketMapper::new(10.0).apply(&mut field, &AudioSample::from_slice(&raw));
    assert_eq!(drive, AudioSample::from_slice(&raw).drive_level());

    for p in field.particles() {
        if p.bucket() == target {
            assert_eq!(p.position().y, p.initial_height() + 5.0);
        } else {
            assert_eq!(p.position().y, p.initial_height());
        }
    }
}

#[test]
fn drive_is_peak_of_both_lowest_bins() {
    let mut field = random_field(100, 1);
    let mut raw = [0.0f32; SPECTRUM_LEN];
    raw[0] = 0.3;
    raw[64] = 0.8;
    let drive = BucketMapper::new(1.0).apply(&mut field, &AudioSample::from_slice(&raw));
    assert_eq!(drive, 0.8);
}

#[test]
fn revolution_preserves_radius_and_height() {
    let mut field = random_field(1_000, 21);
    let before = field
        .particles()
        .iter()
        .map(|p| (xz_radius(p.position()), p.position().y))
        .collect::<Vec<_>>();

    for _ in 0..600 {
        field.revolve(1.0 / 60.0);
    }

    for (p, (r0, y0)) in field.particles().iter().zip(before) {
        let r1 = xz_radius(p.position());
        assert!((r1 - r0).abs() <= r0 * 1e-4, "radius drifted {r0} -> {r1}");
        assert_eq!(p.position().y, y0);
    }
}

#[test]
fn inner_particles_orbit_faster_than_outer_ones() {
    let shape = DiskShape {
        start: 100.0,
        range: 300.0,
        thickness: 0.0,
    };
    let placements = [
        DiskPlacement {
            radius: 100.0,
            theta: 0.0,
            height: 0.0,
        },
        DiskPlacement {
            radius: 400.0,
            theta: 0.0,
            height: 0.0,
        },
    ];
    let mut field =
        DiskField::from_placements(shape, revolution(), &ColorGradient::accretion(), &placements)
            .expect("field should build");
    field.revolve(0.01);

    let angle = |p: glam::Vec3| p.z.atan2(p.x).abs();
    let inner = angle(field.particles()[0].position());
    let outer = angle(field.particles()[1].position());
    assert!(inner > outer);
    assert!(inner > 0.0);
}

#[test]
fn zero_or_nan_step_leaves_positions_unchanged() {
    let mut field = random_field(200, 4);
    let before = field.points().map(|(p, _)| p).collect::<Vec<_>>();
    field.revolve(0.0);
    field.revolve(f32::NAN);
    let after = field.points().map(|(p, _)| p).collect::<Vec<_>>();
    assert_eq!(before, after);
}

#[test]
fn empty_placements_are_rejected() {
    let shape = DiskShape {
        start: 0.0,
        range: 1.0,
        thickness: 0.0,
    };
    let err = DiskField::from_placements(shape, revolution(), &ColorGradient::accretion(), &[])
        .err()
        .expect("empty disk must fail");
    assert_eq!(err, SimError::ZeroDiskParticles);
}
