//! Route optimization types

use serde::{Deserialize, Serialize};

use super::Place;

/// Optimization algorithm offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Nearest neighbor
    #[default]
    Nn,
    /// Nearest neighbor refined with 2-opt
    Nn2opt,
    /// Genetic algorithm
    Ga,
}

impl Algorithm {
    /// Query-string value understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nn => "nn",
            Self::Nn2opt => "nn2opt",
            Self::Ga => "ga",
        }
    }

    /// Human-readable name shown in the shell
    pub fn label(&self) -> &'static str {
        match self {
            Self::Nn => "Nearest Neighbor",
            Self::Nn2opt => "NN + 2-opt",
            Self::Ga => "Genetic Algorithm",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nn" => Ok(Self::Nn),
            "nn2opt" => Ok(Self::Nn2opt),
            "ga" => Ok(Self::Ga),
            other => Err(format!("Unknown algorithm '{}'. Supported: nn, nn2opt, ga", other)),
        }
    }
}

/// Display-ready statistics for an optimized route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizeStats {
    pub distance_km: Option<f64>,
    pub duration_min: Option<f64>,
    pub stops: Option<usize>,
}

impl OptimizeStats {
    /// Distance with one decimal, e.g. "12.3 km"
    pub fn distance_label(&self) -> String {
        match self.distance_km {
            Some(km) => format!("{:.1} km", km),
            None => "N/A".to_string(),
        }
    }

    /// Duration rounded to whole minutes, e.g. "2 min"
    pub fn duration_label(&self) -> String {
        match self.duration_min {
            Some(min) => format!("{} min", min.round()),
            None => "N/A".to_string(),
        }
    }
}

/// Outcome of a successful optimization
///
/// `ordered_places` is the canonical sequence returned by the backend and is
/// what gets applied back into the itinerary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResult {
    pub ordered_places: Vec<Place>,
    pub stats: Option<OptimizeStats>,
    pub start: Option<Place>,
    pub end: Option<Place>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_round_trip_names() {
        for algo in [Algorithm::Nn, Algorithm::Nn2opt, Algorithm::Ga] {
            assert_eq!(algo.as_str().parse::<Algorithm>().unwrap(), algo);
        }
        assert!("dijkstra".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Nn2opt.label(), "NN + 2-opt");
    }

    #[test]
    fn test_stats_labels() {
        let stats = OptimizeStats {
            distance_km: Some(12.345),
            duration_min: Some(2.0833),
            stops: Some(3),
        };
        assert_eq!(stats.distance_label(), "12.3 km");
        assert_eq!(stats.duration_label(), "2 min");

        let empty = OptimizeStats::default();
        assert_eq!(empty.distance_label(), "N/A");
        assert_eq!(empty.duration_label(), "N/A");
    }
}
