//! Kinematic state of one reference frame relative to another
//!
//! A [`KinematicState`] written S_A:B describes frame B relative to frame A:
//!
//! - `position`: origin of B relative to origin of A, in A coordinates
//! - `velocity`: time derivative of `position` taken in A, in A coordinates
//! - `t_parent_this`: transforms A components into B components (x_B = T·x_A)
//! - `q_parent_this`: unit quaternion with the same matrix (q·x_A = T·x_A)
//! - `ang_vel_this`: angular velocity of B relative to A, in B coordinates
//!
//! States compose like a (nonabelian) group: S_A:B + S_B:C = S_A:C and
//! -S_A:B = S_B:A. The five operators on [`KinematicState`] implement that
//! algebra in place. Each one skips the matrix work when an operand's
//! rotation is exactly the identity and skips the ω×r terms when an operand
//! does not rotate; most links in a frame tree satisfy one or both.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// Position and velocity of a frame origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationalState {
    /// Origin offset, parent coordinates
    pub position: Vector3<f64>,
    /// Rate of change of `position` as seen in the parent, parent coordinates
    pub velocity: Vector3<f64>,
}

impl TranslationalState {
    /// Create a translational state
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self { position, velocity }
    }

    /// Zero position and velocity
    pub fn zero() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
        }
    }
}

impl Default for TranslationalState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Orientation and angular velocity of a frame
///
/// The quaternion is the primary representation; the matrix is recomputed from
/// it whenever it changes. The angular velocity magnitude and unit vector are
/// cached alongside the raw rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationalState {
    q_parent_this: UnitQuaternion<f64>,
    t_parent_this: Matrix3<f64>,
    ang_vel_this: Vector3<f64>,
    ang_vel_mag: f64,
    ang_vel_unit: Vector3<f64>,
}

impl RotationalState {
    /// Identity orientation, no rotation rate
    pub fn identity() -> Self {
        Self {
            q_parent_this: UnitQuaternion::identity(),
            t_parent_this: Matrix3::identity(),
            ang_vel_this: Vector3::zeros(),
            ang_vel_mag: 0.0,
            ang_vel_unit: Vector3::zeros(),
        }
    }

    /// Create a rotational state from a parent-to-this quaternion and a rate in this frame
    pub fn new(q_parent_this: UnitQuaternion<f64>, ang_vel_this: Vector3<f64>) -> Self {
        let mut rot = Self::identity();
        rot.set_q_parent_this(q_parent_this);
        rot.set_ang_vel_this(ang_vel_this);
        rot
    }

    /// Quaternion taking parent components to this frame's components
    pub fn q_parent_this(&self) -> &UnitQuaternion<f64> {
        &self.q_parent_this
    }

    /// Matrix taking parent components to this frame's components
    pub fn t_parent_this(&self) -> &Matrix3<f64> {
        &self.t_parent_this
    }

    /// Angular velocity relative to the parent, this frame's coordinates
    pub fn ang_vel_this(&self) -> &Vector3<f64> {
        &self.ang_vel_this
    }

    /// Cached magnitude of the angular velocity
    pub fn ang_vel_mag(&self) -> f64 {
        self.ang_vel_mag
    }

    /// Cached unit vector along the angular velocity (zero when not rotating)
    pub fn ang_vel_unit(&self) -> &Vector3<f64> {
        &self.ang_vel_unit
    }

    /// Set the orientation, recomputing the transformation matrix
    pub fn set_q_parent_this(&mut self, q_parent_this: UnitQuaternion<f64>) {
        self.q_parent_this = q_parent_this;
        self.compute_transformation();
    }

    /// Set the angular velocity, recomputing the cached magnitude and unit vector
    pub fn set_ang_vel_this(&mut self, ang_vel_this: Vector3<f64>) {
        self.ang_vel_this = ang_vel_this;
        self.compute_ang_vel_products();
    }

    /// True when the quaternion scalar part is exactly 1
    ///
    /// Identity is assigned exactly by construction, so this is a bit-exact test.
    #[allow(clippy::float_cmp)]
    pub fn is_identity(&self) -> bool {
        self.q_parent_this.scalar() == 1.0
    }

    /// True when the angular velocity magnitude is exactly zero
    #[allow(clippy::float_cmp)]
    pub fn is_nonrotating(&self) -> bool {
        self.ang_vel_mag == 0.0
    }

    fn set_identity_rotation(&mut self) {
        self.q_parent_this = UnitQuaternion::identity();
        self.t_parent_this = Matrix3::identity();
    }

    fn set_zero_rate(&mut self) {
        self.ang_vel_this = Vector3::zeros();
        self.ang_vel_mag = 0.0;
        self.ang_vel_unit = Vector3::zeros();
    }

    /// Set the quaternion from a product, renormalizing before the matrix is rebuilt
    fn set_composed_rotation(&mut self, mut q_parent_this: UnitQuaternion<f64>) {
        q_parent_this.renormalize();
        self.set_q_parent_this(q_parent_this);
    }

    fn compute_transformation(&mut self) {
        self.t_parent_this = *self.q_parent_this.to_rotation_matrix().matrix();
    }

    fn compute_ang_vel_products(&mut self) {
        self.ang_vel_mag = self.ang_vel_this.norm();
        if self.ang_vel_mag > 0.0 {
            self.ang_vel_unit = self.ang_vel_this / self.ang_vel_mag;
        } else {
            self.ang_vel_unit = Vector3::zeros();
        }
    }
}

impl Default for RotationalState {
    fn default() -> Self {
        Self::identity()
    }
}

/// Full 6-DOF state of a frame relative to a reference frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicState {
    /// Translational part
    pub trans: TranslationalState,
    /// Rotational part
    pub rot: RotationalState,
}

impl KinematicState {
    /// Coincident frames: zero offset, identity rotation, no relative motion
    pub fn identity() -> Self {
        Self {
            trans: TranslationalState::zero(),
            rot: RotationalState::identity(),
        }
    }

    /// Create a state from its components
    pub fn new(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        q_parent_this: UnitQuaternion<f64>,
        ang_vel_this: Vector3<f64>,
    ) -> Self {
        Self {
            trans: TranslationalState::new(position, velocity),
            rot: RotationalState::new(q_parent_this, ang_vel_this),
        }
    }

    /// A purely translational state with identity rotation
    pub fn from_translation(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self {
            trans: TranslationalState::new(position, velocity),
            rot: RotationalState::identity(),
        }
    }

    /// Reset to the identity state
    pub fn set_identity(&mut self) {
        *self = Self::identity();
    }

    /// this ← -source, i.e. S_B:A from S_A:B
    pub fn negate(&mut self, source: &KinematicState) {
        let src_rot = &source.rot;
        let r = source.trans.position;
        let v = source.trans.velocity;

        // Position and velocity rotated into B before negation
        let (pos_b, vel_b) = if src_rot.is_identity() {
            (r, v)
        } else {
            (src_rot.t_parent_this * r, src_rot.t_parent_this * v)
        };
        let position = -pos_b;
        let mut velocity = -vel_b;
        if !src_rot.is_nonrotating() {
            velocity -= src_rot.ang_vel_this.cross(&position);
        }

        // Angular velocity of A wrt B, expressed in A
        let ang_vel = if src_rot.is_nonrotating() {
            Vector3::zeros()
        } else if src_rot.is_identity() {
            -src_rot.ang_vel_this
        } else {
            -(src_rot.t_parent_this.transpose() * src_rot.ang_vel_this)
        };

        if src_rot.is_identity() {
            self.rot.set_identity_rotation();
        } else {
            self.rot.set_q_parent_this(src_rot.q_parent_this.inverse());
        }
        if src_rot.is_nonrotating() {
            self.rot.set_zero_rate();
        } else {
            self.rot.set_ang_vel_this(ang_vel);
        }
        self.trans.position = position;
        self.trans.velocity = velocity;
    }

    /// The negation of this state as a new value
    pub fn negated(&self) -> KinematicState {
        let mut result = KinematicState::identity();
        result.negate(self);
        result
    }

    /// this (S_B:C) ← S_A:B + S_B:C = S_A:C
    pub fn incr_left(&mut self, s_ab: &KinematicState) {
        let composed = compose(s_ab, self);
        *self = composed;
    }

    /// this (S_A:B) ← S_A:B + S_B:C = S_A:C
    pub fn incr_right(&mut self, s_bc: &KinematicState) {
        let composed = compose(self, s_bc);
        *self = composed;
    }

    /// this (S_A:C) ← -S_A:B + S_A:C = S_B:C
    pub fn decr_left(&mut self, s_ab: &KinematicState) {
        let ab_rot = &s_ab.rot;

        // T_B:C = T_A:C · T_A:B'
        if !ab_rot.is_identity() {
            if self.rot.is_identity() {
                self.rot.set_q_parent_this(ab_rot.q_parent_this.inverse());
            } else {
                self.rot
                    .set_composed_rotation(self.rot.q_parent_this * ab_rot.q_parent_this.inverse());
            }
        }

        // ω_B:C = ω_A:C - T_B:C · ω_A:B
        if !ab_rot.is_nonrotating() {
            let ab_rate_in_c = if self.rot.is_identity() {
                ab_rot.ang_vel_this
            } else {
                self.rot.t_parent_this * ab_rot.ang_vel_this
            };
            let ang_vel = self.rot.ang_vel_this - ab_rate_in_c;
            self.rot.set_ang_vel_this(ang_vel);
        }

        // r_B:C = T_A:B (r_A:C - r_A:B), v likewise less the ω_A:B × r_B:C term
        let dr = self.trans.position - s_ab.trans.position;
        let dv = self.trans.velocity - s_ab.trans.velocity;
        let (position, mut velocity) = if ab_rot.is_identity() {
            (dr, dv)
        } else {
            (ab_rot.t_parent_this * dr, ab_rot.t_parent_this * dv)
        };
        if !ab_rot.is_nonrotating() {
            velocity -= ab_rot.ang_vel_this.cross(&position);
        }
        self.trans.position = position;
        self.trans.velocity = velocity;
    }

    /// this (S_A:C) ← S_A:C + -S_B:C = S_A:B
    pub fn decr_right(&mut self, s_bc: &KinematicState) {
        let bc_rot = &s_bc.rot;

        // T_A:B = T_B:C' · T_A:C
        if !bc_rot.is_identity() {
            if self.rot.is_identity() {
                self.rot.set_q_parent_this(bc_rot.q_parent_this.inverse());
            } else {
                self.rot
                    .set_composed_rotation(bc_rot.q_parent_this.inverse() * self.rot.q_parent_this);
            }
        }

        // ω_A:B = T_B:C' (ω_A:C - ω_B:C)
        if !(self.rot.is_nonrotating() && bc_rot.is_nonrotating()) {
            let diff = self.rot.ang_vel_this - bc_rot.ang_vel_this;
            let ang_vel = if bc_rot.is_identity() {
                diff
            } else {
                bc_rot.t_parent_this.transpose() * diff
            };
            self.rot.set_ang_vel_this(ang_vel);
        }

        // r_A:B = r_A:C - T_A:B' r_B:C
        // v_A:B = v_A:C - T_A:B' (v_B:C + ω_A:B × r_B:C)
        let r_bc = s_bc.trans.position;
        let mut v_bc = s_bc.trans.velocity;
        if !self.rot.is_nonrotating() {
            v_bc += self.rot.ang_vel_this.cross(&r_bc);
        }
        let (dr, dv) = if self.rot.is_identity() {
            (r_bc, v_bc)
        } else {
            let t_ba = self.rot.t_parent_this.transpose();
            (t_ba * r_bc, t_ba * v_bc)
        };
        self.trans.position -= dr;
        self.trans.velocity -= dv;
    }

    /// Swap the coordinate sense of a relative state S_A:B
    ///
    /// Position and velocity (still of B relative to A, derivative taken in A)
    /// are re-expressed in B coordinates; the transformation becomes B-to-A and
    /// the angular velocity of B relative to A is re-expressed in A coordinates.
    pub fn reverse_sense(&mut self) {
        if self.rot.is_identity() {
            return;
        }
        let t = self.rot.t_parent_this;
        self.trans.position = t * self.trans.position;
        self.trans.velocity = t * self.trans.velocity;
        let ang_vel = t.transpose() * self.rot.ang_vel_this;
        let q = self.rot.q_parent_this.inverse();
        self.rot.set_q_parent_this(q);
        self.rot.set_ang_vel_this(ang_vel);
    }
}

/// S_A:B + S_B:C = S_A:C
fn compose(s_ab: &KinematicState, s_bc: &KinematicState) -> KinematicState {
    let ab_rot = &s_ab.rot;
    let bc_rot = &s_bc.rot;
    let mut result = KinematicState::identity();

    // ω_A:C = ω_B:C + T_B:C · ω_A:B, computed against the unmodified T_B:C
    let ang_vel = match (ab_rot.is_nonrotating(), bc_rot.is_identity()) {
        (true, _) => bc_rot.ang_vel_this,
        (false, true) => bc_rot.ang_vel_this + ab_rot.ang_vel_this,
        (false, false) => bc_rot.ang_vel_this + bc_rot.t_parent_this * ab_rot.ang_vel_this,
    };

    // T_A:C = T_B:C · T_A:B
    match (ab_rot.is_identity(), bc_rot.is_identity()) {
        (true, true) => {}
        (true, false) => result.rot.set_q_parent_this(bc_rot.q_parent_this),
        (false, true) => result.rot.set_q_parent_this(ab_rot.q_parent_this),
        (false, false) => result
            .rot
            .set_composed_rotation(bc_rot.q_parent_this * ab_rot.q_parent_this),
    }
    result.rot.set_ang_vel_this(ang_vel);

    // r_A:C = r_A:B + T_A:B' r_B:C
    // v_A:C = v_A:B + T_A:B' (v_B:C + ω_A:B × r_B:C)
    let r_bc = s_bc.trans.position;
    let mut v_bc = s_bc.trans.velocity;
    if !ab_rot.is_nonrotating() {
        v_bc += ab_rot.ang_vel_this.cross(&r_bc);
    }
    let (dr, dv) = if ab_rot.is_identity() {
        (r_bc, v_bc)
    } else {
        let t_ba = ab_rot.t_parent_this.transpose();
        (t_ba * r_bc, t_ba * v_bc)
    };
    result.trans.position = s_ab.trans.position + dr;
    result.trans.velocity = s_ab.trans.velocity + dv;

    result
}
