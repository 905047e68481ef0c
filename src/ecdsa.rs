//! ECDSA over secp256k1 (component C5): point arithmetic in Jacobian
//! coordinates, a branch-free double-and-always-add scalar multiplication
//! ladder, and `sign`. Built on [`crate::bigint`]'s field arithmetic —
//! every modular operation here inherits its constant-time discipline.

use crate::bigint::{self, Field, U256};
use crate::error::SignError;

/// secp256k1 field prime `p = 2^256 - 2^32 - 977`, little-endian.
pub const P: U256 = [
    0x2f, 0xfc, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// secp256k1 group order `n`, little-endian.
pub const N: U256 = [
    0x41, 0x41, 0x36, 0xd0, 0x8c, 0x5e, 0xd2, 0xbf, 0x3b, 0xa0, 0x48, 0xaf, 0xe6, 0xdc, 0xae, 0xba,
    0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Base point `G`'s x-coordinate, little-endian.
pub const GX: U256 = [
    0x98, 0x17, 0xf8, 0x16, 0x5b, 0x81, 0xf2, 0x59, 0xd9, 0x28, 0xce, 0x2d, 0xdb, 0xfc, 0x9b, 0x02,
    0x07, 0x0b, 0x87, 0xce, 0x95, 0x62, 0xa0, 0x55, 0xac, 0xbb, 0xdc, 0xf9, 0x7e, 0x66, 0xbe, 0x79,
];

/// Base point `G`'s y-coordinate, little-endian.
pub const GY: U256 = [
    0xb8, 0xd4, 0x10, 0xfb, 0x8f, 0xd0, 0x47, 0x9c, 0x19, 0x54, 0x85, 0xa6, 0x48, 0xb4, 0x17, 0xfd,
    0xa8, 0x08, 0x11, 0x0e, 0xfc, 0xfb, 0xa4, 0x5d, 0x65, 0xc4, 0xa3, 0x26, 0x77, 0xda, 0x3a, 0x48,
];

/// `set_field_to_p`: the field secp256k1's curve coordinates live in.
pub fn field_p() -> Field {
    Field::new(P)
}

/// `set_field_to_n`: the field secp256k1's scalars (private keys, nonces,
/// signature components) live in.
pub fn field_n() -> Field {
    Field::new(N)
}

/// An affine point on the curve, or the point at infinity. When
/// `infinity` is set, `x`/`y` are unspecified (per spec §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffinePoint {
    pub x: U256,
    pub y: U256,
    pub infinity: bool,
}

/// `set_to_G`: the generator point.
pub fn generator() -> AffinePoint {
    AffinePoint {
        x: GX,
        y: GY,
        infinity: false,
    }
}

/// Jacobian-projective representation: affine `(X/Z^2, Y/Z^3)`. The point
/// at infinity is `Z == 0` (by convention, with `X = Y = 0` too).
#[derive(Clone, Copy)]
struct Jacobian {
    x: U256,
    y: U256,
    z: U256,
}

const ZERO: U256 = [0u8; 32];
const ONE: U256 = {
    let mut t = [0u8; 32];
    t[0] = 1;
    t
};

fn to_jacobian(p: &AffinePoint) -> Jacobian {
    if p.infinity {
        Jacobian {
            x: ZERO,
            y: ZERO,
            z: ZERO,
        }
    } else {
        Jacobian {
            x: p.x,
            y: p.y,
            z: ONE,
        }
    }
}

fn to_affine(p: &Jacobian, field: &Field) -> AffinePoint {
    if bigint::is_zero(&p.z) {
        return AffinePoint {
            x: ZERO,
            y: ZERO,
            infinity: true,
        };
    }
    let mut z_inv = ZERO;
    bigint::invert(&mut z_inv, &p.z, field);
    let mut z_inv2 = ZERO;
    bigint::mul_mod(&mut z_inv2, &z_inv, &z_inv, field);
    let mut z_inv3 = ZERO;
    bigint::mul_mod(&mut z_inv3, &z_inv2, &z_inv, field);

    let mut x = ZERO;
    bigint::mul_mod(&mut x, &p.x, &z_inv2, field);
    let mut y = ZERO;
    bigint::mul_mod(&mut y, &p.y, &z_inv3, field);

    AffinePoint {
        x,
        y,
        infinity: false,
    }
}

/// Point doubling (`a = 0` Weierstrass form, which secp256k1 is). Doubling
/// the point-at-infinity representation `(0, 0, 0)` naturally yields
/// `(0, 0, 0)` again, so no special case is needed here.
fn jacobian_double(p: &Jacobian, field: &Field) -> Jacobian {
    let mut a = ZERO;
    bigint::mul_mod(&mut a, &p.x, &p.x, field); // A = X1^2
    let mut b = ZERO;
    bigint::mul_mod(&mut b, &p.y, &p.y, field); // B = Y1^2
    let mut c = ZERO;
    bigint::mul_mod(&mut c, &b, &b, field); // C = B^2

    let mut x1_plus_b = ZERO;
    bigint::add_mod(&mut x1_plus_b, &p.x, &b, field);
    let mut sq = ZERO;
    bigint::mul_mod(&mut sq, &x1_plus_b, &x1_plus_b, field);
    let mut d_inner = ZERO;
    bigint::sub_mod(&mut d_inner, &sq, &a, field);
    bigint::sub_mod(&mut d_inner, &d_inner, &c, field);
    let mut d = ZERO;
    bigint::add_mod(&mut d, &d_inner, &d_inner, field); // D = 2*((X1+B)^2 - A - C)

    let mut e = ZERO;
    bigint::add_mod(&mut e, &a, &a, field);
    bigint::add_mod(&mut e, &e, &a, field); // E = 3*A

    let mut f = ZERO;
    bigint::mul_mod(&mut f, &e, &e, field); // F = E^2

    let mut two_d = ZERO;
    bigint::add_mod(&mut two_d, &d, &d, field);
    let mut x3 = ZERO;
    bigint::sub_mod(&mut x3, &f, &two_d, field); // X3 = F - 2D

    let mut d_minus_x3 = ZERO;
    bigint::sub_mod(&mut d_minus_x3, &d, &x3, field);
    let mut e_term = ZERO;
    bigint::mul_mod(&mut e_term, &e, &d_minus_x3, field);
    let mut eight_c = ZERO;
    bigint::add_mod(&mut eight_c, &c, &c, field);
    bigint::add_mod(&mut eight_c, &eight_c, &eight_c, field);
    bigint::add_mod(&mut eight_c, &eight_c, &eight_c, field);
    let mut y3 = ZERO;
    bigint::sub_mod(&mut y3, &e_term, &eight_c, field); // Y3 = E*(D - X3) - 8C

    let mut y1z1 = ZERO;
    bigint::mul_mod(&mut y1z1, &p.y, &p.z, field);
    let mut z3 = ZERO;
    bigint::add_mod(&mut z3, &y1z1, &y1z1, field); // Z3 = 2*Y1*Z1

    Jacobian { x: x3, y: y3, z: z3 }
}

/// General point addition (`add-2007-bl`), folded with a branch-free
/// select for the cases where either operand is the point at infinity —
/// the general formula alone does not pass those through correctly, so
/// the correct output is selected from the general result and the two
/// inputs after the fact. [`jacobian_double`] must be used instead when
/// the two operands are affine-equal; this ladder's accumulator and the
/// fixed generator it is added to are never equal except when the
/// accumulator is still the point at infinity, which the select below
/// handles.
fn jacobian_add(p1: &Jacobian, p2: &Jacobian, field: &Field) -> Jacobian {
    let mut z1z1 = ZERO;
    bigint::mul_mod(&mut z1z1, &p1.z, &p1.z, field);
    let mut z2z2 = ZERO;
    bigint::mul_mod(&mut z2z2, &p2.z, &p2.z, field);

    let mut u1 = ZERO;
    bigint::mul_mod(&mut u1, &p1.x, &z2z2, field);
    let mut u2 = ZERO;
    bigint::mul_mod(&mut u2, &p2.x, &z1z1, field);

    let mut z2_z2z2 = ZERO;
    bigint::mul_mod(&mut z2_z2z2, &p2.z, &z2z2, field);
    let mut s1 = ZERO;
    bigint::mul_mod(&mut s1, &p1.y, &z2_z2z2, field);
    let mut z1_z1z1 = ZERO;
    bigint::mul_mod(&mut z1_z1z1, &p1.z, &z1z1, field);
    let mut s2 = ZERO;
    bigint::mul_mod(&mut s2, &p2.y, &z1_z1z1, field);

    let mut h = ZERO;
    bigint::sub_mod(&mut h, &u2, &u1, field);
    let mut two_h = ZERO;
    bigint::add_mod(&mut two_h, &h, &h, field);
    let mut i = ZERO;
    bigint::mul_mod(&mut i, &two_h, &two_h, field);
    let mut j = ZERO;
    bigint::mul_mod(&mut j, &h, &i, field);

    let mut s2_minus_s1 = ZERO;
    bigint::sub_mod(&mut s2_minus_s1, &s2, &s1, field);
    let mut r = ZERO;
    bigint::add_mod(&mut r, &s2_minus_s1, &s2_minus_s1, field);

    let mut v = ZERO;
    bigint::mul_mod(&mut v, &u1, &i, field);

    let mut r2 = ZERO;
    bigint::mul_mod(&mut r2, &r, &r, field);
    let mut two_v = ZERO;
    bigint::add_mod(&mut two_v, &v, &v, field);
    let mut x3 = ZERO;
    bigint::sub_mod(&mut x3, &r2, &j, field);
    bigint::sub_mod(&mut x3, &x3, &two_v, field);

    let mut v_minus_x3 = ZERO;
    bigint::sub_mod(&mut v_minus_x3, &v, &x3, field);
    let mut r_term = ZERO;
    bigint::mul_mod(&mut r_term, &r, &v_minus_x3, field);
    let mut s1_j = ZERO;
    bigint::mul_mod(&mut s1_j, &s1, &j, field);
    let mut two_s1_j = ZERO;
    bigint::add_mod(&mut two_s1_j, &s1_j, &s1_j, field);
    let mut y3 = ZERO;
    bigint::sub_mod(&mut y3, &r_term, &two_s1_j, field);

    let mut z1_plus_z2 = ZERO;
    bigint::add_mod(&mut z1_plus_z2, &p1.z, &p2.z, field);
    let mut sq = ZERO;
    bigint::mul_mod(&mut sq, &z1_plus_z2, &z1_plus_z2, field);
    let mut z3_inner = ZERO;
    bigint::sub_mod(&mut z3_inner, &sq, &z1z1, field);
    bigint::sub_mod(&mut z3_inner, &z3_inner, &z2z2, field);
    let mut z3 = ZERO;
    bigint::mul_mod(&mut z3, &z3_inner, &h, field);

    let general = Jacobian { x: x3, y: y3, z: z3 };

    let p1_inf = bigint::is_zero(&p1.z) as u8;
    let p2_inf = bigint::is_zero(&p2.z) as u8;

    let mut x = ZERO;
    bigint::select(&mut x, &p2.x, &general.x, p1_inf);
    let mut y = ZERO;
    bigint::select(&mut y, &p2.y, &general.y, p1_inf);
    let mut z = ZERO;
    bigint::select(&mut z, &p2.z, &general.z, p1_inf);

    let mut out_x = ZERO;
    bigint::select(&mut out_x, &p1.x, &x, p2_inf);
    let mut out_y = ZERO;
    bigint::select(&mut out_y, &p1.y, &y, p2_inf);
    let mut out_z = ZERO;
    bigint::select(&mut out_z, &p1.z, &z, p2_inf);

    Jacobian {
        x: out_x,
        y: out_y,
        z: out_z,
    }
}

/// `point_multiply`: scalar-multiply `point` by the 256-bit scalar `k`
/// (little-endian). A left-to-right double-and-always-add ladder (the
/// Brier-Joye construction: conditionally swap, add, double, swap back)
/// runs a fixed 256 iterations regardless of `k`'s value, so the
/// instruction trace does not depend on which bits are set.
pub fn point_multiply(point: &AffinePoint, k: &U256, field: &Field) -> AffinePoint {
    let mut r0 = Jacobian {
        x: ZERO,
        y: ZERO,
        z: ZERO,
    }; // infinity
    let mut r1 = to_jacobian(point);

    for byte_idx in (0..32).rev() {
        for bit_idx in (0..8).rev() {
            let bit = (k[byte_idx] >> bit_idx) & 1;

            cswap(&mut r0, &mut r1, bit);
            r1 = jacobian_add(&r0, &r1, field);
            r0 = jacobian_double(&r0, field);
            cswap(&mut r0, &mut r1, bit);
        }
    }

    to_affine(&r0, field)
}

fn cswap(a: &mut Jacobian, b: &mut Jacobian, swap: u8) {
    let mut x = ZERO;
    bigint::select(&mut x, &b.x, &a.x, swap);
    let mut y = ZERO;
    bigint::select(&mut y, &b.y, &a.y, swap);
    let mut z = ZERO;
    bigint::select(&mut z, &b.z, &a.z, swap);

    let mut bx = ZERO;
    bigint::select(&mut bx, &a.x, &b.x, swap);
    let mut by = ZERO;
    bigint::select(&mut by, &a.y, &b.y, swap);
    let mut bz = ZERO;
    bigint::select(&mut bz, &a.z, &b.z, swap);

    a.x = x;
    a.y = y;
    a.z = z;
    b.x = bx;
    b.y = by;
    b.z = bz;
}

/// `sign`: ECDSA over secp256k1. `hash` is the 32-byte message digest
/// (assumed already reduced to fit comfortably below `n`, as any sig-hash
/// produced by [`crate::hash::sha256d`] is), `private_key` and `k` are
/// 32-byte scalars. Returns `(r, s)` on success.
///
/// No low-`s` normalisation is performed — the specification leaves that
/// to the host, not the device core.
///
/// On `NonceUnusable`, the caller must draw a fresh `k` (from
/// [`crate::rng`]) and retry; this function never retries internally.
pub fn sign(hash: &U256, private_key: &U256, k: &U256) -> Result<(U256, U256), SignError> {
    let p = field_p();
    let q = point_multiply(&generator(), k, &p);
    if q.infinity {
        return Err(SignError::NonceUnusable);
    }

    let n = field_n();
    let mut r = ZERO;
    bigint::modulo(&mut r, &q.x, &n);
    if bigint::is_zero(&r) {
        return Err(SignError::NonceUnusable);
    }

    let mut r_times_d = ZERO;
    bigint::mul_mod(&mut r_times_d, &r, private_key, &n);
    let mut e_plus_rd = ZERO;
    bigint::add_mod(&mut e_plus_rd, hash, &r_times_d, &n);

    let mut k_inv = ZERO;
    bigint::invert(&mut k_inv, k, &n);

    let mut s = ZERO;
    bigint::mul_mod(&mut s, &k_inv, &e_plus_rd, &n);
    if bigint::is_zero(&s) {
        return Err(SignError::NonceUnusable);
    }

    Ok((r, s))
}

/// Verifies `(r, s)` against `hash` and `public_key` via the curve's
/// verification relation. Not part of the device's signing contract, but
/// used by tests to check that every successful `sign` call produced a
/// valid signature (spec §8, "ECDSA" testable property).
#[cfg(test)]
fn verify(hash: &U256, r: &U256, s: &U256, public_key: &AffinePoint) -> bool {
    let n = field_n();
    let p = field_p();

    if bigint::is_zero(r) || bigint::compare(r, &N) != std::cmp::Ordering::Less {
        return false;
    }
    if bigint::is_zero(s) || bigint::compare(s, &N) != std::cmp::Ordering::Less {
        return false;
    }

    let mut s_inv = ZERO;
    bigint::invert(&mut s_inv, s, &n);

    let mut u1 = ZERO;
    bigint::mul_mod(&mut u1, hash, &s_inv, &n);
    let mut u2 = ZERO;
    bigint::mul_mod(&mut u2, r, &s_inv, &n);

    let p1 = point_multiply(&generator(), &u1, &p);
    let p2 = point_multiply(public_key, &u2, &p);

    let sum = jacobian_add(&to_jacobian(&p1), &to_jacobian(&p2), &p);
    let point = to_affine(&sum, &p);
    if point.infinity {
        return false;
    }

    let mut x_mod_n = ZERO;
    bigint::modulo(&mut x_mod_n, &point.x, &n);
    x_mod_n == *r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u256_from_u64(v: u64) -> U256 {
        let mut t = [0u8; 32];
        t[..8].copy_from_slice(&v.to_le_bytes());
        t
    }

    #[test]
    fn point_multiply_by_one_is_identity() {
        let field = field_p();
        let g = generator();
        let result = point_multiply(&g, &u256_from_u64(1), &field);
        assert_eq!(result, g);
    }

    #[test]
    fn point_multiply_by_zero_is_infinity() {
        let field = field_p();
        let g = generator();
        let result = point_multiply(&g, &ZERO, &field);
        assert!(result.infinity);
    }

    #[test]
    fn doubling_matches_adding_point_to_itself() {
        let field = field_p();
        let g = generator();
        let doubled_via_mul = point_multiply(&g, &u256_from_u64(2), &field);
        let gj = to_jacobian(&g);
        let doubled_via_double = to_affine(&jacobian_double(&gj, &field), &field);
        assert_eq!(doubled_via_mul, doubled_via_double);
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let private_key = u256_from_u64(0x1234_5678_9abc_def0);
        let k = u256_from_u64(0xdead_beef_cafe_babe);
        let hash = u256_from_u64(0x0011_2233_4455_6677);

        let (r, s) = sign(&hash, &private_key, &k).expect("sign should succeed for this fixture");

        let field = field_p();
        let public_key = point_multiply(&generator(), &private_key, &field);

        assert!(verify(&hash, &r, &s, &public_key));
    }

    #[test]
    fn sign_is_deterministic_given_the_same_inputs() {
        let private_key = u256_from_u64(42);
        let k = u256_from_u64(777);
        let hash = u256_from_u64(0xabcdef);

        let first = sign(&hash, &private_key, &k).unwrap();
        let second = sign(&hash, &private_key, &k).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn different_nonces_give_different_signatures() {
        let private_key = u256_from_u64(42);
        let hash = u256_from_u64(0xabcdef);

        let (r1, _) = sign(&hash, &private_key, &u256_from_u64(1)).unwrap();
        let (r2, _) = sign(&hash, &private_key, &u256_from_u64(2)).unwrap();
        assert_ne!(r1, r2);
    }
}
