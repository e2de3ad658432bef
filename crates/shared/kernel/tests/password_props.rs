use proptest::prelude::*;
use slms_kernel::security::{hash_password, verify_password};

proptest! {
    // Each case runs two full PBKDF2 derivations, so keep the count low.
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn hash_then_verify_round_trips(password in "[ -~]{1,64}") {
        let encoded = hash_password(&password).unwrap();

        prop_assert!(verify_password(&password, &encoded).unwrap());
        let wrong = format!("{password}!");
        prop_assert!(!verify_password(&wrong, &encoded).unwrap());
    }
}
