use alloy_primitives::U256;
use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use light_poseidon::{Poseidon, PoseidonHasher};

/// Reduce a 256-bit value into the BN254 scalar field.
pub fn to_field(value: U256) -> U256 {
    fr_to_u256(u256_to_fr(value))
}

fn u256_to_fr(value: U256) -> Fr {
    Fr::from_be_bytes_mod_order(&value.to_be_bytes::<32>())
}

fn fr_to_u256(value: Fr) -> U256 {
    U256::from_be_slice(&value.into_bigint().to_bytes_be())
}

fn hash(inputs: &[U256]) -> U256 {
    let mut hasher =
        Poseidon::<Fr>::new_circom(inputs.len()).expect("Failed to create Poseidon hasher");
    let inputs: Vec<Fr> = inputs.iter().copied().map(u256_to_fr).collect();
    let result = hasher.hash(&inputs).expect("Failed to compute Poseidon hash");
    fr_to_u256(result)
}

/// Poseidon hash with 1 input (identity commitment).
pub fn poseidon1(a: U256) -> U256 {
    hash(&[a])
}

/// Poseidon hash with 2 inputs.
/// Used for identity secrets, nullifier hashes and Merkle nodes.
pub fn poseidon2(a: U256, b: U256) -> U256 {
    hash(&[a, b])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_poseidon2_circom_vector() {
        // circomlibjs poseidon([1, 2])
        let expected = U256::from_str(
            "7853200120776062878684798364095072458815029376092732009249414926327459813530",
        )
        .unwrap();
        assert_eq!(poseidon2(U256::from(1u64), U256::from(2u64)), expected);
    }

    #[test]
    fn test_poseidon2_order_matters() {
        let a = U256::from(1u64);
        let b = U256::from(2u64);
        assert_ne!(poseidon2(a, b), poseidon2(b, a));
    }

    #[test]
    fn test_to_field_reduces_modulus() {
        assert_eq!(to_field(U256::from(5u64)), U256::from(5u64));
        assert!(to_field(U256::MAX) < U256::MAX);
        assert_eq!(to_field(to_field(U256::MAX)), to_field(U256::MAX));
    }
}
