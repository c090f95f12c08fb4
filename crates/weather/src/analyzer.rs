//! Weather Impact Analysis for Treatment Planning

use crate::CurrentWeather;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Rain intensity thresholds (mm/h), after pollution adjustment
const RAIN_LIGHT: f64 = 2.5;
const RAIN_MODERATE: f64 = 10.0;

/// Wind speed above which airborne debris becomes a concern (m/s)
const WIND_DEBRIS_THRESHOLD: f64 = 15.0;

/// Weather condition groups that carry airborne contaminants
const HIGH_POLLUTION_CONDITIONS: [&str; 5] = ["Haze", "Smoke", "Dust", "Sand", "Fog"];

/// Risk contributed by one weather factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Surroundings of a monitoring site, scaling runoff contamination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    Industrial,
    Urban,
    Suburban,
    Rural,
}

impl AreaType {
    /// Pollution factor applied to rainfall impact
    pub fn pollution_factor(&self) -> f64 {
        match self {
            AreaType::Industrial => 1.5,
            AreaType::Urban => 1.3,
            AreaType::Suburban => 1.1,
            AreaType::Rural => 1.0,
        }
    }
}

impl Default for AreaType {
    fn default() -> Self {
        AreaType::Suburban
    }
}

/// Assessment of one weather factor
#[derive(Debug, Clone, Serialize)]
pub struct ImpactAssessment {
    /// Risk this factor contributes
    pub risk: RiskLevel,
    /// Operator-facing explanation
    pub message: String,
    /// Factor-specific recommendations
    pub recommendations: Vec<&'static str>,
}

impl ImpactAssessment {
    fn low(message: impl Into<String>) -> Self {
        Self {
            risk: RiskLevel::Low,
            message: message.into(),
            recommendations: Vec::new(),
        }
    }

    fn new(risk: RiskLevel, message: impl Into<String>, recommendations: &[&'static str]) -> Self {
        Self {
            risk,
            message: message.into(),
            recommendations: recommendations.to_vec(),
        }
    }
}

/// Treatment system adjustments derived from the overall risk
#[derive(Debug, Clone, Serialize)]
pub struct TreatmentAdjustments {
    pub filtration_rate: &'static str,
    pub disinfection_level: &'static str,
    pub monitoring_frequency: &'static str,
    pub backup_systems: &'static str,
    /// Set when recent rainfall exceeds 5 mm/h
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_filtration: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turbidity_monitoring: Option<&'static str>,
    /// Set when temperature exceeds 25 °C
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disinfection_contact_time: Option<&'static str>,
}

/// Full analysis of current conditions at one site
#[derive(Debug, Clone, Serialize)]
pub struct ConditionAnalysis {
    pub temperature_impact: ImpactAssessment,
    pub humidity_impact: ImpactAssessment,
    pub rainfall_impact: ImpactAssessment,
    pub air_quality_impact: ImpactAssessment,
    /// Worst risk among temperature, rainfall and air quality
    pub overall_risk: RiskLevel,
    /// Consolidated, deduplicated recommendations
    pub recommendations: Vec<&'static str>,
    pub treatment_adjustments: TreatmentAdjustments,
}

/// Turns current weather into treatment impact analysis
#[derive(Debug, Default)]
pub struct WeatherAnalyzer;

impl WeatherAnalyzer {
    /// Create a new analyzer
    pub fn new() -> Self {
        Self
    }

    /// Analyze current conditions for a site of the given area type
    pub fn analyze(&self, weather: &CurrentWeather, area_type: AreaType) -> ConditionAnalysis {
        let temperature_impact = Self::temperature_impact(weather.temperature);
        let humidity_impact = Self::humidity_impact(weather.humidity);
        let rainfall_impact = Self::rainfall_impact(weather.rainfall_1h, area_type);
        let air_quality_impact = Self::air_quality_impact(&weather.condition, weather.wind_speed);

        // Humidity affects electronics, not source water, so it is excluded
        // from the overall risk the way the original analyzer excluded it.
        let overall_risk = temperature_impact
            .risk
            .max(rainfall_impact.risk)
            .max(air_quality_impact.risk);

        let mut recommendations = Vec::new();
        for impact in [
            &temperature_impact,
            &humidity_impact,
            &rainfall_impact,
            &air_quality_impact,
        ] {
            recommendations.extend(impact.recommendations.iter().copied());
        }
        match overall_risk {
            RiskLevel::High => recommendations.extend([
                "Increase monitoring frequency to every 15 minutes",
                "Activate all backup filtration systems",
                "Prepare for manual intervention if needed",
            ]),
            RiskLevel::Medium => recommendations.extend([
                "Increase monitoring frequency to every 30 minutes",
                "Review filter replacement schedule",
            ]),
            RiskLevel::Low => {}
        }
        // Dedup preserving first occurrence
        let mut seen = Vec::new();
        recommendations.retain(|r| {
            if seen.contains(r) {
                false
            } else {
                seen.push(r);
                true
            }
        });

        let treatment_adjustments = Self::treatment_adjustments(overall_risk, weather);

        debug!(risk = %overall_risk, "Weather conditions analyzed");

        ConditionAnalysis {
            temperature_impact,
            humidity_impact,
            rainfall_impact,
            air_quality_impact,
            overall_risk,
            recommendations,
            treatment_adjustments,
        }
    }

    fn temperature_impact(temperature: f64) -> ImpactAssessment {
        if temperature < 5.0 {
            ImpactAssessment::new(
                RiskLevel::Medium,
                "Low temperature may reduce filtration efficiency",
                &["Increase filtration time", "Monitor flow rate"],
            )
        } else if temperature > 30.0 {
            ImpactAssessment::new(
                RiskLevel::Medium,
                "High temperature may increase bacterial growth risk",
                &["Increase disinfection", "Monitor microbial levels"],
            )
        } else {
            ImpactAssessment::low("Temperature within normal range")
        }
    }

    fn humidity_impact(humidity: f64) -> ImpactAssessment {
        if humidity > 85.0 {
            ImpactAssessment::new(
                RiskLevel::Medium,
                "High humidity may affect electronic components",
                &["Check sensor calibration", "Monitor for condensation"],
            )
        } else if humidity < 30.0 {
            ImpactAssessment::new(
                RiskLevel::Low,
                "Low humidity - monitor for static buildup",
                &["Check electrical connections"],
            )
        } else {
            ImpactAssessment::low("Humidity within acceptable range")
        }
    }

    fn rainfall_impact(rainfall: f64, area_type: AreaType) -> ImpactAssessment {
        let adjusted = rainfall * area_type.pollution_factor();

        if rainfall == 0.0 {
            ImpactAssessment::low("No rainfall - stable source conditions")
        } else if adjusted < RAIN_LIGHT {
            ImpactAssessment::new(
                RiskLevel::Low,
                "Light rainfall - minimal impact on source water",
                &["Continue normal operation"],
            )
        } else if adjusted < RAIN_MODERATE {
            ImpactAssessment::new(
                RiskLevel::Medium,
                "Moderate rainfall - potential source water contamination",
                &["Increase pre-filtration", "Monitor turbidity closely"],
            )
        } else {
            ImpactAssessment::new(
                RiskLevel::High,
                "Heavy rainfall - significant contamination risk",
                &[
                    "Activate enhanced filtration",
                    "Increase monitoring frequency",
                    "Consider alternative source",
                ],
            )
        }
    }

    fn air_quality_impact(condition: &str, wind_speed: f64) -> ImpactAssessment {
        if HIGH_POLLUTION_CONDITIONS.contains(&condition) {
            ImpactAssessment::new(
                RiskLevel::High,
                format!("{condition} conditions may increase airborne contaminants"),
                &["Activate air filtration", "Increase water pre-treatment"],
            )
        } else if wind_speed > WIND_DEBRIS_THRESHOLD {
            ImpactAssessment::new(
                RiskLevel::Medium,
                "High winds may increase dust and debris",
                &["Monitor pre-filters", "Check intake protection"],
            )
        } else {
            ImpactAssessment::low("Good air quality conditions")
        }
    }

    fn treatment_adjustments(risk: RiskLevel, weather: &CurrentWeather) -> TreatmentAdjustments {
        let mut adjustments = match risk {
            RiskLevel::High => TreatmentAdjustments {
                filtration_rate: "increased",
                disinfection_level: "enhanced",
                monitoring_frequency: "high",
                backup_systems: "active",
                pre_filtration: None,
                turbidity_monitoring: None,
                disinfection_contact_time: None,
            },
            RiskLevel::Medium => TreatmentAdjustments {
                filtration_rate: "slightly_increased",
                disinfection_level: "increased",
                monitoring_frequency: "increased",
                backup_systems: "ready",
                pre_filtration: None,
                turbidity_monitoring: None,
                disinfection_contact_time: None,
            },
            RiskLevel::Low => TreatmentAdjustments {
                filtration_rate: "normal",
                disinfection_level: "normal",
                monitoring_frequency: "normal",
                backup_systems: "standby",
                pre_filtration: None,
                turbidity_monitoring: None,
                disinfection_contact_time: None,
            },
        };

        if weather.rainfall_1h > 5.0 {
            adjustments.pre_filtration = Some("enhanced");
            adjustments.turbidity_monitoring = Some("continuous");
        }
        if weather.temperature > 25.0 {
            adjustments.disinfection_contact_time = Some("extended");
        }

        adjustments
    }
}
