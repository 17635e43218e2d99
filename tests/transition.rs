mod tests {
    use embassy_time::Duration;
    use mesh_lighting_node::{Timestamp, Transition};

    fn at(millis: u32) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    #[test]
    fn test_transition_ramp() {
        let mut transition = Transition::new(0, 1000, at(100), Duration::from_millis(1000));
        assert_eq!(transition.present_value(at(100)), 0);
        assert!(!transition.is_complete(at(100)));

        assert_eq!(transition.present_value(at(600)), 500);
        assert_eq!(transition.present_value(at(850)), 750);

        assert_eq!(transition.present_value(at(1100)), 1000);
        assert!(transition.is_complete(at(1100)));
    }

    #[test]
    fn test_transition_ramp_down() {
        let mut transition = Transition::new(0xFFFF, 0, at(0), Duration::from_millis(200));
        let half = transition.present_value(at(100));
        assert!(half.abs_diff(0x7FFF) <= 1, "{half}");
        assert_eq!(transition.present_value(at(200)), 0);
    }

    #[test]
    fn test_transition_zero_duration_jumps() {
        let mut transition = Transition::new(10, 0xB504, at(5000), Duration::from_millis(0));
        assert!(transition.is_complete(at(5000)));
        assert_eq!(transition.present_value(at(5000)), 0xB504);
    }

    #[test]
    fn test_transition_latches_target() {
        let mut transition = Transition::new(100, 200, at(0), Duration::from_millis(100));
        assert_eq!(transition.present_value(at(150)), 200);
        assert_eq!(transition.start_value(), 200);

        // A wrapped counter now reads as "before the end"; the latch holds.
        assert_eq!(transition.present_value(at(50)), 200);
    }

    #[test]
    fn test_transition_across_counter_wrap() {
        let start = at(u32::MAX - 49);
        let mut transition = Transition::new(0, 100, start, Duration::from_millis(100));
        assert_eq!(transition.present_value(at(0)), 50);
        assert_eq!(transition.present_value(at(50)), 100);
    }

    #[test]
    fn test_transition_settled() {
        let mut transition = Transition::settled(42);
        assert_eq!(transition.target_value(), 42);
        assert_eq!(transition.present_value(at(123_456)), 42);
        assert_eq!(Transition::default().target_value(), 0);
    }
}
