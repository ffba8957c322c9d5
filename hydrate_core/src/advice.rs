//! Recommended daily water intake from body and weather factors.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Unspecified,
}

impl FromStr for Gender {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Gender::Male,
            "female" | "f" => Gender::Female,
            _ => Gender::Unspecified,
        })
    }
}

/// Coarse weather condition as reported by a weather service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weather {
    Clear,
    Sunny,
    Rain,
    Cloudy,
    Other,
}

impl FromStr for Weather {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "clear" => Weather::Clear,
            "sunny" => Weather::Sunny,
            "rain" => Weather::Rain,
            "cloudy" | "clouds" => Weather::Cloudy,
            _ => Weather::Other,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntakeFactors {
    pub gender: Gender,
    pub bmi: f64,
    /// Degrees Celsius.
    pub temperature_c: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    pub weather: Weather,
}

pub const BASE_LITERS: f64 = 2.0;
pub const MIN_LITERS: f64 = 1.5;
pub const MAX_LITERS: f64 = 5.0;

/// Recommended litres per day, clamped to `[MIN_LITERS, MAX_LITERS]`.
pub fn recommend_liters(f: &IntakeFactors) -> f64 {
    let mut liters = BASE_LITERS;

    liters += match f.gender {
        Gender::Male => 0.5,
        Gender::Female => 0.3,
        Gender::Unspecified => 0.0,
    };

    if f.bmi > 25.0 {
        liters += 0.5;
    } else if f.bmi < 18.5 {
        liters += 0.2;
    }

    if f.temperature_c > 25.0 {
        liters += 1.0;
    } else if f.temperature_c > 15.0 {
        liters += 0.5;
    }

    if f.humidity > 60.0 {
        liters += 0.5;
    }

    liters += match f.weather {
        Weather::Clear | Weather::Sunny => 0.5,
        Weather::Rain | Weather::Cloudy => -0.2,
        Weather::Other => 0.0,
    };

    liters.clamp(MIN_LITERS, MAX_LITERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn factors(gender: Gender, bmi: f64, t: f64, h: f64, w: Weather) -> IntakeFactors {
        IntakeFactors {
            gender,
            bmi,
            temperature_c: t,
            humidity: h,
            weather: w,
        }
    }

    #[rstest]
    #[case(factors(Gender::Unspecified, 22.0, 10.0, 40.0, Weather::Other), 2.0)]
    #[case(factors(Gender::Male, 22.0, 20.0, 40.0, Weather::Other), 3.0)]
    #[case(factors(Gender::Female, 17.0, 10.0, 40.0, Weather::Rain), 2.3)]
    #[case(factors(Gender::Male, 30.0, 35.0, 80.0, Weather::Sunny), 5.0)]
    #[case(factors(Gender::Unspecified, 22.0, 15.0, 60.0, Weather::Cloudy), 1.8)]
    fn recommendation_table(#[case] f: IntakeFactors, #[case] expected: f64) {
        assert!((recommend_liters(&f) - expected).abs() < 1e-9);
    }

    #[test]
    fn parses_loose_strings() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("x".parse::<Gender>().unwrap(), Gender::Unspecified);
        assert_eq!("Clouds".parse::<Weather>().unwrap(), Weather::Cloudy);
        assert_eq!("Snow".parse::<Weather>().unwrap(), Weather::Other);
    }
}
