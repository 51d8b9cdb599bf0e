use accretion_jet::jet::{JetDirection, JetStream, JetTuning};
use accretion_jet::sim::SimError;

fn tuning(mult: f32, interval: u32) -> JetTuning {
    JetTuning {
        mult,
        interval,
        enabled: true,
        vertical_velocity: 10.0,
        velocity_scalar: 40.0,
        angular_velocity: 0.5,
    }
}

fn stream(capacity: usize, mult: f32, interval: u32) -> JetStream {
    JetStream::new(capacity, tuning(mult, interval), fastrand::Rng::with_seed(17))
        .expect("stream should build")
}

#[test]
fn two_per_tick_fills_then_recycles_round_robin() {
    let mut jets = stream(3, 1.0, 0);
    assert_eq!(jets.launch_count(1.0), 2);

    assert_eq!(jets.step(1.0, 0.0), 2);
    let active = jets.particles().iter().map(|p| p.is_active()).collect::<Vec<_>>();
    assert_eq!(active, vec![true, true, false]);
    assert_eq!(jets.next_index(), 2);

    assert_eq!(jets.step(1.0, 0.1), 2);
    assert!(jets.particles().iter().all(|p| p.is_active()));
    assert_eq!(jets.next_index(), 1);

    // Slot 0 was recycled this tick, so it restarted from the origin.
    let p0 = jets.particles()[0];
    assert_eq!(p0.position(), p0.velocity() * 0.1);
    assert_eq!(jets.launched_total(), 4);
}

#[test]
fn launch_fills_slots_in_cursor_order() {
    let mut jets = stream(3, 0.0, 1);
    assert_eq!(jets.launch(2), 2);
    assert_eq!(jets.next_index(), 2);
    let active = jets.particles().iter().map(|p| p.is_active()).collect::<Vec<_>>();
    assert_eq!(active, vec![true, true, false]);

    assert_eq!(jets.launch(2), 2);
    assert_eq!(jets.next_index(), 1);
    assert_eq!(jets.active_count(), 3);
}

#[test]
fn cursor_returns_home_after_capacity_launches() {
    let capacity = 17;
    let mut rng = fastrand::Rng::with_seed(3);
    for _ in 0..20 {
        let mut jets = stream(capacity, 0.0, 1);
        jets.launch(rng.usize(0..capacity));
        let start = jets.next_index();

        let mut remaining = capacity;
        while remaining > 0 {
            let batch = rng.usize(1..=remaining.min(5));
            jets.launch(batch);
            remaining -= batch;
        }
        assert_eq!(jets.next_index(), start);
    }
}

#[test]
fn a_full_batch_uses_every_slot_once() {
    let mut jets = stream(9, 0.0, 1);
    assert_eq!(jets.launch(9), 9);
    assert_eq!(jets.next_index(), 0);
    assert_eq!(jets.active_count(), 9);

    // One launch per slot, so the lobes still alternate slot by slot.
    let signs = jets
        .particles()
        .iter()
        .map(|p| p.velocity().y.signum())
        .collect::<Vec<_>>();
    for w in signs.windows(2) {
        assert_eq!(w[0], -w[1]);
    }
}

#[test]
fn batch_larger_than_pool_is_capped_at_capacity() {
    let mut jets = stream(3, 5.0, 0);
    assert_eq!(jets.launch_count(1.0), 3);

    assert_eq!(jets.step(1.0, 0.0), 3);
    assert_eq!(jets.next_index(), 0);
    assert_eq!(jets.launched_total(), 3);
    let signs = jets
        .particles()
        .iter()
        .map(|p| p.velocity().y.signum())
        .collect::<Vec<_>>();
    assert_eq!(signs, vec![1.0, -1.0, 1.0]);
    assert_eq!(jets.direction(), JetDirection::South);

    assert_eq!(jets.launch(usize::MAX), 3);
    assert_eq!(jets.next_index(), 0);
}

#[test]
fn enormous_multiplier_launches_the_whole_pool() {
    let mut jets = stream(4, 1e30, 1);
    assert_eq!(jets.launch_count(1.0), 4);
    assert_eq!(jets.launch_count(0.0), 1);
    assert_eq!(jets.step(1.0, 0.01), 4);
    assert_eq!(jets.active_count(), 4);
}

#[test]
fn direction_alternates_on_every_launch() {
    let capacity = 12;
    let mut jets = stream(capacity, 0.0, 1);
    assert_eq!(jets.direction(), JetDirection::North);

    let mut signs = Vec::new();
    for i in 0..capacity {
        assert_eq!(jets.step(1.0, 1.0 / 60.0), 1);
        signs.push(jets.particles()[i].velocity().y.signum());
    }
    assert_eq!(signs[0], 1.0);
    for w in signs.windows(2) {
        assert_eq!(w[0], -w[1]);
    }
}

#[test]
fn launch_count_follows_drive() {
    let jets = stream(16, 5.0, 1);
    assert_eq!(jets.launch_count(0.0), 1);
    assert_eq!(jets.launch_count(0.5), 3);
    assert_eq!(jets.launch_count(1.0), 6);
    assert_eq!(jets.launch_count(40.0), 6);
    assert_eq!(jets.launch_count(f32::NAN), 1);
    assert_eq!(jets.launch_count(-2.0), 1);
}

#[test]
fn interval_spaces_out_launch_batches() {
    let mut jets = stream(100, 0.0, 3);
    let launched = (0..9).map(|_| jets.step(0.0, 0.0)).collect::<Vec<_>>();
    assert_eq!(launched, vec![1, 0, 0, 1, 0, 0, 1, 0, 0]);
}

#[test]
fn disabled_stream_only_integrates() {
    let mut jets = stream(4, 0.0, 1);
    jets.step(0.0, 0.0);
    jets.set_enabled(false);
    let before = jets.particles()[0].position();
    assert_eq!(jets.step(1.0, 0.5), 0);
    assert_eq!(jets.active_count(), 1);
    assert_ne!(jets.particles()[0].position(), before);
}

#[test]
fn launch_velocity_is_bounded_by_tuning() {
    let mut jets = stream(64, 0.0, 1);
    jets.launch(64);
    for p in jets.particles() {
        let v = p.velocity();
        let radial = (v.x * v.x + v.z * v.z).sqrt();
        assert!(radial <= 40.0 + 1e-3);
        assert_eq!(v.y.abs(), 400.0);
    }
}

#[test]
fn integration_co_rotates_without_touching_height_speed() {
    let mut jets = stream(2, 0.0, 1);
    jets.launch(1);
    let v0 = jets.particles()[0].velocity();
    for _ in 0..120 {
        jets.integrate(1.0 / 60.0);
    }
    let p = jets.particles()[0];
    assert_eq!(p.velocity().y, v0.y);
    let speed0 = (v0.x * v0.x + v0.z * v0.z).sqrt();
    let speed1 = (p.velocity().x.powi(2) + p.velocity().z.powi(2)).sqrt();
    assert!((speed0 - speed1).abs() <= speed0.max(1.0) * 1e-4);
    assert!((p.position().y - v0.y * 2.0).abs() < 1e-2);
    assert!(!jets.particles()[1].is_active());
    assert_eq!(jets.particles()[1].position(), glam::Vec3::ZERO);
}

#[test]
fn zero_capacity_is_rejected() {
    let err = JetStream::new(0, tuning(1.0, 1), fastrand::Rng::with_seed(1))
        .err()
        .expect("zero capacity must fail");
    assert_eq!(err, SimError::ZeroJetCapacity);
}
