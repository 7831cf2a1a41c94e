//! End-to-end checks of the frame state algebra and the tree walker

use approx::assert_relative_eq;
use astrodyn::framelib::{FrameError, FrameId, FrameTree, KinematicState, StateExpression};
use nalgebra::{Matrix3, Unit, UnitQuaternion, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::FRAC_PI_2;

const TOL: f64 = 1e-12;

fn assert_vec_close(actual: &Vector3<f64>, expected: &Vector3<f64>, tol: f64) {
    for i in 0..3 {
        assert_relative_eq!(actual[i], expected[i], epsilon = tol);
    }
}

fn assert_mat_close(actual: &Matrix3<f64>, expected: &Matrix3<f64>, tol: f64) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert_relative_eq!(*a, *e, epsilon = tol);
    }
}

fn assert_state_close(actual: &KinematicState, expected: &KinematicState, tol: f64) {
    assert_vec_close(&actual.trans.position, &expected.trans.position, tol);
    assert_vec_close(&actual.trans.velocity, &expected.trans.velocity, tol);
    assert_vec_close(actual.rot.ang_vel_this(), expected.rot.ang_vel_this(), tol);
    assert_mat_close(actual.rot.t_parent_this(), expected.rot.t_parent_this(), tol);
}

/// root → A → B, root → C
struct Scenario {
    tree: FrameTree,
    root: FrameId,
    a: FrameId,
    b: FrameId,
    c: FrameId,
}

fn scenario() -> Scenario {
    let mut tree = FrameTree::new();
    let root = tree.add_root("root").unwrap();
    let a = tree
        .add_child(
            root,
            "A",
            KinematicState::new(
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 0.5, 0.0),
                UnitQuaternion::identity(),
                Vector3::new(0.0, 0.0, 0.2),
            ),
        )
        .unwrap();
    // B is yawed +90° relative to A: its x axis lies along A's y axis
    let b = tree
        .add_child(
            a,
            "B",
            KinematicState::new(
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.3, 0.0, 0.0),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -FRAC_PI_2),
                Vector3::new(0.0, 0.0, 0.1),
            ),
        )
        .unwrap();
    let c = tree
        .add_child(
            root,
            "C",
            KinematicState::from_translation(
                Vector3::new(0.0, 0.0, 1.0),
                Vector3::new(0.0, 0.0, -0.2),
            ),
        )
        .unwrap();

    Scenario {
        tree,
        root,
        a,
        b,
        c,
    }
}

fn yaw_90_transform() -> Matrix3<f64> {
    Matrix3::new(0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0)
}

#[test]
fn test_sibling_subtree_literal_values() {
    let s = scenario();
    let rel = s.tree.compute_relative_state(s.b, s.c).unwrap();

    assert_vec_close(&rel.trans.position, &Vector3::new(1.0, 1.0, -1.0), TOL);
    // A's spin sweeps B's origin: (0, 0.5, 0) + (0.3, 0, 0) + (-0.2, 0, 0), less C's motion
    assert_vec_close(&rel.trans.velocity, &Vector3::new(0.1, 0.5, 0.2), TOL);
    assert_mat_close(rel.rot.t_parent_this(), &yaw_90_transform(), TOL);
    assert_vec_close(rel.rot.ang_vel_this(), &Vector3::new(0.0, 0.0, 0.3), TOL);
}

#[test]
fn test_sibling_case_matches_explicit_composition() {
    let s = scenario();
    let b_in_root = s.tree.compute_relative_state(s.b, s.root).unwrap();
    let c_in_root = s.tree.compute_relative_state(s.c, s.root).unwrap();

    // S_C:B = -S_root:C + S_root:B
    let mut expected = c_in_root.negated();
    expected.incr_right(&b_in_root);

    let rel = s.tree.compute_relative_state(s.b, s.c).unwrap();
    assert_state_close(&rel, &expected, TOL);
}

#[test]
fn test_reverse_direction_is_negation() {
    let s = scenario();
    let b_wrt_c = s.tree.compute_relative_state(s.b, s.c).unwrap();
    let c_wrt_b = s.tree.compute_relative_state(s.c, s.b).unwrap();
    assert_state_close(&c_wrt_b, &b_wrt_c.negated(), TOL);

    // C's origin seen from B, in B coordinates
    assert_vec_close(&c_wrt_b.trans.position, &Vector3::new(-1.0, 1.0, 1.0), TOL);
}

#[test]
fn test_state_in_this_frame() {
    let s = scenario();
    let rel = s
        .tree
        .compute_relative_state_as(s.b, s.c, StateExpression::InThisFrame)
        .unwrap();

    assert_vec_close(&rel.trans.position, &Vector3::new(1.0, -1.0, -1.0), TOL);
    assert_vec_close(&rel.trans.velocity, &Vector3::new(0.5, -0.1, 0.2), TOL);
    assert_mat_close(rel.rot.t_parent_this(), &yaw_90_transform().transpose(), TOL);
    assert_vec_close(rel.rot.ang_vel_this(), &Vector3::new(0.0, 0.0, 0.3), TOL);

    let default_sense = s
        .tree
        .compute_relative_state_as(s.b, s.c, StateExpression::default())
        .unwrap();
    assert_eq!(default_sense, s.tree.compute_relative_state(s.b, s.c).unwrap());
}

#[test]
fn test_position_fast_path_scenario() {
    let s = scenario();
    assert_vec_close(
        &s.tree.compute_position_from(s.b, s.c).unwrap(),
        &Vector3::new(1.0, 1.0, -1.0),
        TOL,
    );
    assert_vec_close(
        &s.tree.compute_position_from(s.c, s.b).unwrap(),
        &Vector3::new(-1.0, 1.0, 1.0),
        TOL,
    );
    assert_vec_close(
        &s.tree.compute_position_from(s.root, s.b).unwrap(),
        &s.tree.compute_relative_state(s.root, s.b).unwrap().trans.position,
        TOL,
    );
    assert_vec_close(
        &s.tree.compute_position_from(s.b, s.a).unwrap(),
        &Vector3::new(0.0, 1.0, 0.0),
        TOL,
    );
}

#[test]
fn test_disjoint_trees_fail() {
    let mut s = scenario();
    let other_root = s.tree.add_root("other").unwrap();
    let probe = s
        .tree
        .add_child(
            other_root,
            "probe",
            KinematicState::from_translation(Vector3::new(5.0, 0.0, 0.0), Vector3::zeros()),
        )
        .unwrap();

    let err = s.tree.compute_relative_state(s.b, probe).unwrap_err();
    assert_eq!(
        err,
        FrameError::InvalidNode {
            subject: "B".to_string(),
            target: "probe".to_string(),
            reason: "frames are not in the same tree".to_string(),
        }
    );
    assert!(err.to_string().contains("'B'"));
    assert!(s.tree.compute_position_from(probe, s.c).is_err());
}

#[test]
fn test_walk_follows_state_updates() {
    let mut s = scenario();
    let before = s.tree.compute_position_from(s.b, s.c).unwrap();

    s.tree.state_mut(s.a).unwrap().trans.position = Vector3::new(2.0, 0.0, 0.0);
    let after = s.tree.compute_position_from(s.b, s.c).unwrap();

    assert_relative_eq!(after.x - before.x, 1.0, epsilon = TOL);
}

fn random_state(rng: &mut StdRng) -> KinematicState {
    let mut v = || {
        Vector3::new(
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-3.0..3.0),
        )
    };
    let position = v();
    let velocity = v();
    let axis = Unit::new_normalize(v());
    let rate = v() * 0.05;
    let angle: f64 = rng.gen_range(-3.0..3.0);
    let shortcut = rng.gen_range(0..4);
    match shortcut {
        0 => KinematicState::from_translation(position, velocity),
        1 => KinematicState::new(position, velocity, UnitQuaternion::identity(), rate),
        2 => KinematicState::new(
            position,
            velocity,
            UnitQuaternion::from_axis_angle(&axis, angle),
            Vector3::zeros(),
        ),
        _ => KinematicState::new(
            position,
            velocity,
            UnitQuaternion::from_axis_angle(&axis, angle),
            rate,
        ),
    }
}

#[test]
fn test_random_tree_consistency() {
    let mut rng = StdRng::seed_from_u64(31337);
    let mut tree = FrameTree::new();
    let mut ids = vec![tree.add_root("root").unwrap()];
    for i in 0..12 {
        let parent = ids[rng.gen_range(0..ids.len())];
        let state = random_state(&mut rng);
        ids.push(tree.add_child(parent, &format!("f{}", i), state).unwrap());
    }

    for &this in &ids {
        for &wrt in &ids {
            let full = tree.compute_relative_state(this, wrt).unwrap();
            let position = tree.compute_position_from(this, wrt).unwrap();
            assert_vec_close(&position, &full.trans.position, 1e-9);

            let reverse = tree.compute_relative_state(wrt, this).unwrap();
            assert_state_close(&reverse, &full.negated(), 1e-9);

            // Any route through the root composes to the same state
            let this_in_root = tree.compute_relative_state(this, ids[0]).unwrap();
            let wrt_in_root = tree.compute_relative_state(wrt, ids[0]).unwrap();
            let mut via_root = this_in_root;
            via_root.decr_left(&wrt_in_root);
            assert_state_close(&via_root, &full, 1e-9);
        }
    }
}

/// S_A:B for B spinning about `axis` at `rate`, origin drifting linearly
fn spinning_state(
    t: f64,
    r0: Vector3<f64>,
    v0: Vector3<f64>,
    axis: Unit<Vector3<f64>>,
    angle0: f64,
    rate: f64,
) -> KinematicState {
    let angle = angle0 + rate * t;
    KinematicState::new(
        r0 + v0 * t,
        v0,
        UnitQuaternion::from_axis_angle(&axis, -angle),
        axis.into_inner() * rate,
    )
}

/// Angular velocity implied by dT/dt = -[ω×]T, in the frame T maps into
fn rate_from_transforms(
    before: &Matrix3<f64>,
    after: &Matrix3<f64>,
    now: &Matrix3<f64>,
    dt: f64,
) -> Vector3<f64> {
    let t_dot = (after - before) / (2.0 * dt);
    let skew = -t_dot * now.transpose();
    Vector3::new(skew[(2, 1)], skew[(0, 2)], skew[(1, 0)])
}

/// Velocity and rate carried by `now` agree with central differences of its neighbours
fn assert_consistent_kinematics(
    prev: &KinematicState,
    now: &KinematicState,
    next: &KinematicState,
    dt: f64,
) {
    let fd_velocity = (next.trans.position - prev.trans.position) / (2.0 * dt);
    assert_vec_close(&now.trans.velocity, &fd_velocity, 1e-8);

    let fd_rate = rate_from_transforms(
        prev.rot.t_parent_this(),
        next.rot.t_parent_this(),
        now.rot.t_parent_this(),
        dt,
    );
    assert_vec_close(now.rot.ang_vel_this(), &fd_rate, 1e-8);
}

#[test]
fn test_composition_matches_finite_differences() {
    let s_ab = |t: f64| {
        spinning_state(
            t,
            Vector3::new(1.0, -2.0, 0.5),
            Vector3::new(0.1, 0.2, -0.3),
            Vector3::z_axis(),
            0.3,
            0.4,
        )
    };
    let s_bc = |t: f64| {
        spinning_state(
            t,
            Vector3::new(0.5, 1.5, -1.0),
            Vector3::new(-0.2, 0.0, 0.1),
            Vector3::x_axis(),
            -0.7,
            0.25,
        )
    };
    let s_ac = |t: f64| {
        let mut state = s_bc(t);
        state.incr_left(&s_ab(t));
        state
    };

    let t = 1.3;
    let dt = 1e-5;
    assert_consistent_kinematics(&s_ac(t - dt), &s_ac(t), &s_ac(t + dt), dt);

    // The negated composite S_C:A obeys the same kinematics
    assert_consistent_kinematics(
        &s_ac(t - dt).negated(),
        &s_ac(t).negated(),
        &s_ac(t + dt).negated(),
        dt,
    );

    // As does S_B:C recovered from the composite
    let recovered = |t: f64| {
        let mut state = s_ac(t);
        state.decr_left(&s_ab(t));
        state
    };
    assert_consistent_kinematics(&recovered(t - dt), &recovered(t), &recovered(t + dt), dt);
}
