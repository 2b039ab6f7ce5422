use proptest::prelude::*;
use proptest::test_runner::Config;

use rpt_core::{compare, compute_tile, Direction, MetricInput, Number};

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn equal_values_are_flat_with_zero_change(a in -1_000_000_i64..1_000_000_i64) {
        for (now, before) in [
            (Number::Int(a), Number::Int(a)),
            (Number::Int(a), Number::Float(a as f64)),
            (Number::Float(a as f64), Number::Float(a as f64)),
        ] {
            let c = compare(now, before);
            prop_assert_eq!(c.direction, Direction::Flat);
            prop_assert_eq!(c.change, 0.0);
        }
    }

    #[test]
    fn growth_over_a_positive_base_is_up(b in 1_i64..1_000_000_i64, delta in 1_i64..1_000_000_i64) {
        let a = b + delta;
        let c = compare(Number::Int(a), Number::Int(b));
        prop_assert_eq!(c.direction, Direction::Up);
        let expected = (a - b) as f64 / b as f64 * 100.0;
        prop_assert!((c.change - expected).abs() <= 1e-9 * expected.max(1.0));
        prop_assert!(c.change > 0.0);
    }

    #[test]
    fn smaller_now_is_down(b in 1_i64..1_000_000_i64, now in 0_i64..1_000_000_i64) {
        prop_assume!(now < b);
        let c = compare(Number::Int(now), Number::Int(b));
        prop_assert_eq!(c.direction, Direction::Down);
        let expected = (b - now) as f64 / b as f64 * 100.0;
        prop_assert!((c.change - expected).abs() <= 1e-9 * expected.max(1.0));
        prop_assert!(c.change > 0.0 && c.change <= 100.0);
    }

    #[test]
    fn zero_base_gives_infinite_change(now in 1_i64..1_000_000_i64) {
        let c = compare(Number::Int(now), Number::Int(0));
        prop_assert_eq!(c.direction, Direction::Up);
        prop_assert!(c.change.is_infinite());
        prop_assert_eq!(c.label("year"), "Up inf% on last year");
    }

    #[test]
    fn tile_label_names_the_direction(now in 0_i64..100_000_i64, before in 1_i64..100_000_i64) {
        let tile = compute_tile("t", now, Some(MetricInput::Int(before)), None, None).unwrap();
        let label = tile.label.unwrap();
        let word = match now.cmp(&before) {
            std::cmp::Ordering::Greater => "Up ",
            std::cmp::Ordering::Less => "Down ",
            std::cmp::Ordering::Equal => "Flat 0%",
        };
        prop_assert!(label.starts_with(word), "{}", label);
        prop_assert!(label.ends_with("% on last year"));
        prop_assert_eq!(tile.display_value, now.to_string());
    }
}
