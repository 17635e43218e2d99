mod tests {
    use std::convert::Infallible;

    use embedded_hal::pwm::{ErrorType, SetDutyCycle};
    use mesh_lighting_node::output::{LIGHTNESS_MAX, ONE_TO_TEN_VOLT_FLOOR, lightness_to_linear};
    use mesh_lighting_node::{ChannelLevels, OutputDriver, OutputMapper, PwmOutput, TemperatureRange};

    fn mapper(floor: u16) -> OutputMapper {
        OutputMapper::new(floor, TemperatureRange::default())
    }

    #[test]
    fn test_zero_lightness_is_off() {
        assert_eq!(mapper(0).render(0, None), ChannelLevels::OFF);
        assert_eq!(mapper(ONE_TO_TEN_VOLT_FLOOR).render(0, Some(5000)), ChannelLevels::OFF);
    }

    #[test]
    fn test_without_temperature_only_cold() {
        let levels = mapper(0).render(LIGHTNESS_MAX, None);
        assert_eq!(levels, ChannelLevels { warm: 0, cold: 0xFFFF });
    }

    #[test]
    fn test_temperature_split() {
        let mapper = mapper(0);
        let range = mapper.temperature_range();

        let warmest = mapper.render(LIGHTNESS_MAX, Some(range.min()));
        assert_eq!(warmest, ChannelLevels { warm: 0xFFFF, cold: 0 });

        let coldest = mapper.render(LIGHTNESS_MAX, Some(range.max()));
        assert_eq!(coldest, ChannelLevels { warm: 0, cold: 0xFFFF });

        let mid = mapper.render(LIGHTNESS_MAX, Some(range.midpoint()));
        assert_eq!(mid.warm, mid.cold);
        assert!(mid.warm.abs_diff(0x7FFF) <= 1);
    }

    #[test]
    fn test_temperature_is_clamped() {
        let mapper = mapper(0);
        let below = mapper.render(LIGHTNESS_MAX, Some(100));
        assert_eq!(below, ChannelLevels { warm: 0xFFFF, cold: 0 });
        let above = mapper.render(LIGHTNESS_MAX, Some(u16::MAX));
        assert_eq!(above, ChannelLevels { warm: 0, cold: 0xFFFF });
    }

    #[test]
    fn test_output_floor() {
        let mapper = mapper(ONE_TO_TEN_VOLT_FLOOR);
        assert_eq!(mapper.level(1), ONE_TO_TEN_VOLT_FLOOR);
        assert_eq!(mapper.level(LIGHTNESS_MAX), 0xFFFF);
        for lightness in [1, 0x100, 0x4000, 0x8000, 0xC000] {
            assert!(mapper.level(lightness) >= ONE_TO_TEN_VOLT_FLOOR);
        }
    }

    #[test]
    fn test_curve_is_monotonic() {
        let mut previous = 0;
        for lightness in (0..=u16::MAX).step_by(257) {
            let linear = lightness_to_linear(lightness);
            assert!(linear >= previous, "{lightness}");
            previous = linear;
        }
    }

    #[test]
    fn test_temperature_range_orders_bounds() {
        let range = TemperatureRange::new(6500, 2700);
        assert_eq!(range.min(), 2700);
        assert_eq!(range.max(), 6500);
        assert_eq!(range.midpoint(), 4600);
        assert_eq!(range.clamp(2000), 2700);
    }

    #[derive(Default)]
    struct FakePwm {
        duty: u16,
    }

    impl ErrorType for FakePwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_pwm_output_scales_to_duty() {
        let mut output = PwmOutput::new(FakePwm::default(), FakePwm::default());
        output.write(ChannelLevels { warm: 0xFFFF, cold: 0 });
        let (warm, cold) = output.release();
        assert_eq!(warm.duty, 1000);
        assert_eq!(cold.duty, 0);
    }
}
