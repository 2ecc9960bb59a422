use permitsy_lib::visa_packages::{resolve_fees, VisaPackageInput};
use proptest::prelude::*;

proptest! {
    #[test]
    fn total_is_always_the_fee_sum_when_absent(
        gov in 0i64..10_000_000,
        serv in 0i64..10_000_000,
    ) {
        let input = VisaPackageInput {
            country_id: "country".into(),
            government_fee: Some(gov),
            service_fee: Some(serv),
            ..Default::default()
        };
        let (g, s, t) = resolve_fees(&input);
        prop_assert_eq!(g, gov);
        prop_assert_eq!(s, serv);
        prop_assert_eq!(t, gov + serv);
    }

    #[test]
    fn explicit_total_is_never_recomputed(
        gov in 0i64..1_000_000,
        serv in 0i64..1_000_000,
        total in 0i64..5_000_000,
    ) {
        let input = VisaPackageInput {
            country_id: "country".into(),
            government_fee: Some(gov),
            service_fee: Some(serv),
            total_price: Some(total),
            ..Default::default()
        };
        prop_assert_eq!(resolve_fees(&input).2, total);
    }

    #[test]
    fn absent_fees_never_panic(total in proptest::option::of(0i64..5_000_000)) {
        let input = VisaPackageInput {
            country_id: "country".into(),
            total_price: total,
            ..Default::default()
        };
        let (g, s, t) = resolve_fees(&input);
        prop_assert_eq!((g, s), (0, 0));
        prop_assert_eq!(t, total.unwrap_or(0));
    }
}
