//! Field elements of the Stark prime field
//!
//! The field arithmetic itself comes from `ark-ff`; this module only fixes the
//! modulus and provides the conversions the memory model needs.

use ark_ff::fields::{Fp256, MontBackend, MontConfig};
use ark_ff::PrimeField;

/// Modulus `2^251 + 17 * 2^192 + 1`
#[derive(MontConfig)]
#[modulus = "3618502788666131213697322783095070105623107215331596699973092056135872020481"]
#[generator = "3"]
pub struct StarkFieldConfig;

/// A field element as stored in VM memory
pub type Felt = Fp256<MontBackend<StarkFieldConfig, 4>>;

/// Canonical integer value of `felt`, if it fits in 64 bits
pub fn felt_to_u64(felt: &Felt) -> Option<u64> {
    let limbs = felt.into_bigint().0;
    if limbs[1..].iter().all(|limb| *limb == 0) {
        Some(limbs[0])
    } else {
        None
    }
}
