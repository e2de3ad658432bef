use proptest::prelude::*;
use slms_kernel::server::page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageParams};

proptest! {
    #[test]
    fn normalized_limit_stays_in_range(skip in any::<u64>(), limit in any::<u64>()) {
        let params = PageParams { skip, limit }.normalize();

        prop_assert!(params.limit >= 1);
        prop_assert!(params.limit <= MAX_PAGE_SIZE);
        prop_assert_eq!(params.skip, skip, "skip must pass through untouched");
    }

    #[test]
    fn in_range_limits_pass_through(limit in 1..=MAX_PAGE_SIZE) {
        let params = PageParams { skip: 0, limit }.normalize();
        prop_assert_eq!(params.limit, limit);
    }

    #[test]
    fn normalize_is_idempotent(skip in any::<u64>(), limit in any::<u64>()) {
        let once = PageParams { skip, limit }.normalize();
        let twice = once.normalize();

        prop_assert_eq!(once.skip, twice.skip);
        prop_assert_eq!(once.limit, twice.limit);
    }
}

#[test]
fn zero_limit_maps_to_default() {
    assert_eq!(PageParams { skip: 0, limit: 0 }.normalize().limit, DEFAULT_PAGE_SIZE);
}
