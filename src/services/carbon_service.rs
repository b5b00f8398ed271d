use crate::services::reference_data;
use serde::{Deserialize, Serialize};

/// Roughly what one mature tree absorbs in a year.
const CO2_PER_TREE_PER_YEAR_KG: f64 = 21.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Flight,
    Train,
    Bus,
    Car,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Flight,
        TransportMode::Train,
        TransportMode::Bus,
        TransportMode::Car,
    ];

    /// kg of CO2 per passenger-kilometre.
    pub fn emission_factor(&self) -> f64 {
        match self {
            TransportMode::Flight => 0.255,
            TransportMode::Train => 0.041,
            TransportMode::Bus => 0.089,
            TransportMode::Car => 0.171,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarbonAlternative {
    pub mode: TransportMode,
    pub co2_kg: f64,
    pub savings_kg: f64,
    pub savings_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarbonEstimate {
    pub destination: String,
    pub distance_km: f64,
    pub mode: TransportMode,
    pub co2_kg: f64,
    pub trees_to_offset: u32,
    pub alternatives: Vec<CarbonAlternative>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn emissions(distance_km: f64, mode: TransportMode) -> f64 {
    round1(distance_km * mode.emission_factor())
}

pub fn estimate_carbon(destination: &str, mode: TransportMode) -> CarbonEstimate {
    let distance_km = reference_data::distance_km(destination);
    let co2_kg = emissions(distance_km, mode);

    let mut alternatives: Vec<CarbonAlternative> = TransportMode::ALL
        .iter()
        .filter(|m| **m != mode)
        .map(|m| {
            let alt_co2 = emissions(distance_km, *m);
            let savings_kg = round1(co2_kg - alt_co2);
            let savings_percent = if co2_kg > 0.0 {
                round1(savings_kg / co2_kg * 100.0)
            } else {
                0.0
            };
            CarbonAlternative {
                mode: *m,
                co2_kg: alt_co2,
                savings_kg,
                savings_percent,
            }
        })
        .collect();

    alternatives.sort_by(|a, b| {
        a.co2_kg
            .partial_cmp(&b.co2_kg)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    CarbonEstimate {
        destination: destination.trim().to_string(),
        distance_km,
        mode,
        co2_kg,
        trees_to_offset: (co2_kg / CO2_PER_TREE_PER_YEAR_KG).ceil() as u32,
        alternatives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mumbai_by_flight() {
        let estimate = estimate_carbon("Mumbai", TransportMode::Flight);

        assert_eq!(estimate.distance_km, 1400.0);
        assert!(approx(estimate.co2_kg, 357.0));
        assert_eq!(estimate.trees_to_offset, 17);

        let train = &estimate.alternatives[0];
        assert_eq!(train.mode, TransportMode::Train);
        assert!(approx(train.co2_kg, 57.4));
        assert!(approx(train.savings_kg, 299.6));
        assert!(approx(train.savings_percent, 83.9));
    }

    #[test]
    fn test_alternatives_are_other_modes_ascending() {
        let estimate = estimate_carbon("Somewhere Unlisted", TransportMode::Car);

        assert_eq!(estimate.distance_km, 1000.0);
        let modes: Vec<TransportMode> = estimate.alternatives.iter().map(|a| a.mode).collect();
        assert_eq!(
            modes,
            vec![TransportMode::Train, TransportMode::Bus, TransportMode::Flight]
        );
        assert!(estimate
            .alternatives
            .windows(2)
            .all(|w| w[0].co2_kg <= w[1].co2_kg));
    }

    #[test]
    fn test_dirtier_alternative_has_negative_savings() {
        let estimate = estimate_carbon("Jaipur", TransportMode::Train);
        let flight = estimate
            .alternatives
            .iter()
            .find(|a| a.mode == TransportMode::Flight)
            .unwrap();

        assert!(flight.savings_kg < 0.0);
    }
}
