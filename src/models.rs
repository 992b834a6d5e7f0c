use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub calories_consumed: i32,
    pub calorie_goal: i32,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
    pub systolic: i32,
    pub diastolic: i32,
    pub weight: f64,
    pub exercise_minutes: u32,
    pub hydration_liters: f64,
    /// Ratio in `0.0..=1.0`.
    pub medication_adherence: f64,
    pub missed_doses: u32,
    pub steps: u32,
    #[serde(default)]
    pub sleep_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub systolic: i32,
    pub diastolic: i32,
    pub weight: f64,
    pub calories: i32,
}

/// Seven- and thirty-day series, each ascending by date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendBundle {
    pub seven_day: Vec<TrendPoint>,
    pub thirty_day: Vec<TrendPoint>,
}

impl TrendBundle {
    /// Reports ordering problems in either series. An empty result means the
    /// bundle honours the ascending, duplicate-free date invariant.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (name, points) in [("sevenDay", &self.seven_day), ("thirtyDay", &self.thirty_day)] {
            for pair in points.windows(2) {
                if pair[1].date == pair[0].date {
                    issues.push(format!("{name}: duplicate date {}", pair[1].date));
                } else if pair[1].date < pair[0].date {
                    issues.push(format!(
                        "{name}: {} follows {} out of order",
                        pair[1].date, pair[0].date
                    ));
                }
            }
        }
        issues
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardBundle {
    pub summary: DailySummary,
    pub trend: TrendBundle,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSignal {
    pub id: String,
    pub label: String,
    pub severity: Severity,
    pub description: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendStats {
    pub points: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub avg_systolic: f64,
    pub avg_diastolic: f64,
    pub max_systolic: i32,
    pub min_weight: f64,
    pub max_weight: f64,
    pub avg_calories: f64,
}
