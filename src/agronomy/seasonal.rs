//! Seasonal and weather response curves for the synthetic agronomic model.
//!
//! Every factor is bounded to [0, 1] and the composite suitability is their
//! product, so any single prohibitive stressor drives the crop toward zero.

use crate::models::{CropProfile, WeatherObservation};
use std::f64::consts::PI;

/// Smallest spread accepted for any tolerance or width parameter.
pub const MIN_TOLERANCE: f64 = 1e-6;

/// Ceiling of the rainfall effect while in drought.
pub const DROUGHT_CAP: f64 = 0.5;

/// Floor of the rainfall effect when rain exceeds the adequate range.
pub const EXCESS_RAIN_FLOOR: f64 = 0.8;

/// Slope of the excess-rain decay, per multiple of the optimal rainfall.
pub const EXCESS_RAIN_SLOPE: f64 = 0.2;

/// Wind speed at which the crop is fully suppressed, m/s.
pub const WIND_CUTOFF_MPS: f64 = 15.0;

pub const HUMIDITY_LOW_PERCENT: f64 = 30.0;
pub const HUMIDITY_HIGH_PERCENT: f64 = 95.0;
pub const HUMIDITY_PENALTY: f64 = 0.95;

/// Seasonal baseline for a month.
///
/// Positive bases follow `-cos`, peaking mid-year; non-positive bases follow a
/// sine shifted by π/4.
pub fn seasonal_value(month: u32, base: f64, amplitude: f64, phase_shift: f64) -> f64 {
    let angle = ((month as f64 - 1.0 - phase_shift) / 12.0) * 2.0 * PI;
    let factor = if base > 0.0 {
        -angle.cos()
    } else {
        (angle + PI / 4.0).sin()
    };
    base + amplitude * factor
}

/// Circular distance between two months, so December and January are adjacent.
pub fn month_distance(month: u32, peak_month: u32) -> f64 {
    let diff = (month as i64 - peak_month as i64).unsigned_abs() % 12;
    diff.min(12 - diff) as f64
}

/// Gaussian bump around the peak growing month.
pub fn season_effect(month: u32, peak_month: u32, season_length: f64) -> f64 {
    let width = season_length.max(MIN_TOLERANCE);
    let d = month_distance(month, peak_month);
    (-(d * d) / (2.0 * width * width)).exp()
}

/// Gaussian response around the optimal temperature.
pub fn temperature_effect(temp: f64, opt_temp: f64, temp_tolerance: f64) -> f64 {
    let tol = temp_tolerance.max(MIN_TOLERANCE);
    let d = temp - opt_temp;
    (-(d * d) / (2.0 * tol * tol)).exp()
}

/// Piecewise rainfall response, clamped to [0, 1].
///
/// - drought (`rain < opt/3`): ramps 0 → 0.5
/// - adequate (`< opt + tolerance`): ramps 0.5 → 1.0
/// - excess: decays from 1.0 but never below 0.8
pub fn rainfall_effect(rain: f64, opt_rain: f64, rain_tolerance: f64) -> f64 {
    let opt = opt_rain.max(MIN_TOLERANCE);
    let tol = rain_tolerance.max(0.0);
    let drought_limit = opt / 3.0;
    let adequate_limit = opt + tol;

    let effect = if rain < drought_limit {
        rain / drought_limit * DROUGHT_CAP
    } else if rain < adequate_limit {
        DROUGHT_CAP
            + (1.0 - DROUGHT_CAP) * (rain - drought_limit) / (adequate_limit - drought_limit)
    } else {
        (1.0 - EXCESS_RAIN_SLOPE * (rain - adequate_limit) / opt).max(EXCESS_RAIN_FLOOR)
    };

    effect.clamp(0.0, 1.0)
}

/// Quadratic falloff, zero at or above [`WIND_CUTOFF_MPS`].
pub fn wind_penalty(wind: f64) -> f64 {
    (1.0 - (wind / WIND_CUTOFF_MPS).powi(2)).max(0.0)
}

/// Flat penalty for very dry or saturated air.
pub fn humidity_penalty(humidity: f64) -> f64 {
    if !(HUMIDITY_LOW_PERCENT..=HUMIDITY_HIGH_PERCENT).contains(&humidity) {
        HUMIDITY_PENALTY
    } else {
        1.0
    }
}

/// Product of all stressor effects for one crop under one observation.
pub fn composite_suitability(profile: &CropProfile, observation: &WeatherObservation) -> f64 {
    let season = season_effect(
        observation.month,
        profile.peak_month,
        profile.season_length,
    );
    let temperature = temperature_effect(
        observation.temperature_c,
        profile.opt_temp,
        profile.temp_tolerance,
    );
    let rainfall = rainfall_effect(
        observation.rainfall_or_zero(),
        profile.opt_rain,
        profile.rain_tolerance,
    );
    let wind = wind_penalty(observation.wind_speed_mps);
    let humidity = humidity_penalty(observation.humidity_percent);

    (season * temperature * rainfall * wind * humidity).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn profile() -> CropProfile {
        CropProfile {
            opt_temp: 24.0,
            temp_tolerance: 7.0,
            opt_rain: 90.0,
            rain_tolerance: 30.0,
            peak_month: 7,
            season_length: 2.5,
        }
    }

    fn observation(month: u32) -> WeatherObservation {
        WeatherObservation {
            temperature_c: 24.0,
            humidity_percent: 60.0,
            pressure_hpa: 1013.0,
            rainfall_mm: Some(100.0),
            wind_speed_mps: 0.0,
            month,
        }
    }

    #[test]
    fn seasonal_value_zero_amplitude_is_base() {
        for month in 1..=12 {
            assert_eq!(seasonal_value(month, 15.0, 0.0, 0.0), 15.0);
            assert_eq!(seasonal_value(month, -5.0, 0.0, 2.0), -5.0);
        }
    }

    #[test]
    fn seasonal_value_positive_base_peaks_mid_year() {
        // angle is π at month 7
        assert_relative_eq!(seasonal_value(7, 15.0, 15.0, 0.0), 30.0, epsilon = 1e-9);
        assert_relative_eq!(seasonal_value(1, 15.0, 15.0, 0.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn seasonal_value_non_positive_base_uses_shifted_sine() {
        let expected = (PI / 4.0).sin();
        assert_relative_eq!(seasonal_value(1, 0.0, 1.0, 0.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn season_effect_peaks_at_peak_month() {
        for peak in 1..=12 {
            assert_eq!(season_effect(peak, peak, 2.0), 1.0);
            for month in 1..=12 {
                if month != peak {
                    assert!(season_effect(month, peak, 2.0) < 1.0);
                }
            }
        }
    }

    #[test]
    fn season_effect_is_circularly_symmetric() {
        for peak in 1u32..=12 {
            for k in 0u32..=6 {
                let forward = (peak - 1 + k) % 12 + 1;
                let backward = (peak - 1 + 12 - k) % 12 + 1;
                assert_relative_eq!(
                    season_effect(forward, peak, 2.5),
                    season_effect(backward, peak, 2.5),
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn december_and_january_are_adjacent() {
        assert_eq!(month_distance(12, 1), 1.0);
        assert_eq!(month_distance(1, 12), 1.0);
        assert_eq!(month_distance(1, 7), 6.0);
    }

    #[test]
    fn effects_are_in_unit_interval() {
        for temp in [-10.0, 0.0, 18.0, 30.0, 45.0] {
            let e = temperature_effect(temp, 24.0, 6.0);
            assert!(e > 0.0 && e <= 1.0);
        }
        assert_eq!(temperature_effect(24.0, 24.0, 6.0), 1.0);
        for month in 1..=12 {
            let e = season_effect(month, 8, 2.0);
            assert!(e > 0.0 && e <= 1.0);
        }
    }

    #[test]
    fn zero_tolerance_does_not_produce_nan() {
        assert!(temperature_effect(20.0, 20.0, 0.0).is_finite());
        assert!(temperature_effect(25.0, 20.0, 0.0).is_finite());
        assert!(season_effect(3, 7, 0.0).is_finite());
        assert!(rainfall_effect(50.0, 0.0, 0.0).is_finite());
        assert!(rainfall_effect(0.0, 0.0, 0.0).is_finite());
    }

    #[test]
    fn rainfall_effect_monotonic_up_to_optimum() {
        let (opt, tol) = (120.0, 40.0);
        let mut previous = rainfall_effect(0.0, opt, tol);
        assert_eq!(previous, 0.0);
        let mut rain = 0.0;
        while rain <= opt {
            let e = rainfall_effect(rain, opt, tol);
            assert!(e >= previous - 1e-12, "not monotonic at {}", rain);
            previous = e;
            rain += 0.5;
        }
    }

    #[test]
    fn rainfall_effect_regime_boundaries() {
        let (opt, tol) = (90.0, 30.0);
        assert_relative_eq!(rainfall_effect(30.0, opt, tol), DROUGHT_CAP, epsilon = 1e-12);
        assert!(rainfall_effect(29.9, opt, tol) < DROUGHT_CAP);
        assert_relative_eq!(rainfall_effect(119.999, opt, tol), 1.0, epsilon = 1e-4);
        assert_eq!(rainfall_effect(120.0, opt, tol), 1.0);
    }

    #[test]
    fn excess_rain_never_below_floor() {
        let (opt, tol) = (60.0, 20.0);
        let mut rain = opt + tol;
        while rain <= 500.0 {
            let e = rainfall_effect(rain, opt, tol);
            assert!(e >= EXCESS_RAIN_FLOOR, "dropped below floor at {}", rain);
            assert!(e <= 1.0);
            rain += 1.0;
        }
        assert_eq!(rainfall_effect(1e6, opt, tol), EXCESS_RAIN_FLOOR);
    }

    #[test]
    fn wind_penalty_falloff() {
        assert_eq!(wind_penalty(0.0), 1.0);
        assert_relative_eq!(wind_penalty(7.5), 0.75, epsilon = 1e-12);
        assert_eq!(wind_penalty(15.0), 0.0);
        assert_eq!(wind_penalty(25.0), 0.0);
    }

    #[test]
    fn humidity_penalty_extremes() {
        assert_eq!(humidity_penalty(29.9), HUMIDITY_PENALTY);
        assert_eq!(humidity_penalty(30.0), 1.0);
        assert_eq!(humidity_penalty(95.0), 1.0);
        assert_eq!(humidity_penalty(95.1), HUMIDITY_PENALTY);
    }

    #[test]
    fn composite_is_product_of_factors() {
        let p = profile();
        let obs = observation(7);
        let expected = rainfall_effect(100.0, p.opt_rain, p.rain_tolerance);
        assert_relative_eq!(composite_suitability(&p, &obs), expected, epsilon = 1e-12);
    }

    #[test]
    fn composite_drops_with_any_prohibitive_factor() {
        let p = profile();
        let mut obs = observation(7);
        obs.wind_speed_mps = 20.0;
        assert_eq!(composite_suitability(&p, &obs), 0.0);

        let mut obs = observation(7);
        obs.rainfall_mm = Some(0.0);
        assert_eq!(composite_suitability(&p, &obs), 0.0);
    }

    #[test]
    fn composite_bounded_over_plausible_grid() {
        let p = profile();
        for month in 1..=12 {
            for temp in [-10.0, 5.0, 24.0, 45.0] {
                for rain in [0.0, 30.0, 150.0, 500.0] {
                    for wind in [0.0, 10.0, 25.0] {
                        let obs = WeatherObservation {
                            temperature_c: temp,
                            humidity_percent: 10.0,
                            pressure_hpa: 1000.0,
                            rainfall_mm: Some(rain),
                            wind_speed_mps: wind,
                            month,
                        };
                        let s = composite_suitability(&p, &obs);
                        assert!((0.0..=1.0).contains(&s));
                    }
                }
            }
        }
    }
}
