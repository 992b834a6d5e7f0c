//! Deterministic fixture bundles.
//!
//! `mock_bundle` is the fallback when no real bundle can be loaded;
//! `backend_bundle` is what the local backend serves. Every value derives
//! from the `today` anchor, so the same date always yields the same bundle.

use chrono::{Duration, NaiveDate};

use crate::models::{DailySummary, DashboardBundle, TrendBundle, TrendPoint};

#[derive(Debug, Clone, Copy)]
struct Baseline {
    systolic: f64,
    diastolic: f64,
    weight: f64,
    calories: f64,
}

const SEVEN_DAY_BASE: Baseline = Baseline {
    systolic: 134.0,
    diastolic: 82.0,
    weight: 68.5,
    calories: 1880.0,
};

const THIRTY_DAY_BASE: Baseline = Baseline {
    systolic: 133.0,
    diastolic: 81.0,
    weight: 68.9,
    calories: 1820.0,
};

const BACKEND_BASE: Baseline = SEVEN_DAY_BASE;

pub fn mock_bundle(today: NaiveDate) -> DashboardBundle {
    DashboardBundle {
        summary: mock_summary(today),
        trend: TrendBundle {
            seven_day: generate_trend(today, 7, SEVEN_DAY_BASE),
            thirty_day: generate_trend(today, 30, THIRTY_DAY_BASE),
        },
        notes: vec![
            "캐시된 번들 응답으로 프런트의 초기 로딩을 단축합니다.".to_string(),
            "칼로리 초과, 복약 누락, 혈압 급상승을 리스크로 집계합니다.".to_string(),
        ],
    }
}

/// Bundle served by the backend: one baseline for both series and a stepped
/// `(offset % 4) * 1.2` modifier. Macro and sleep fields are not tracked there.
pub fn backend_bundle(today: NaiveDate) -> DashboardBundle {
    let summary = DailySummary {
        protein: 0.0,
        carbs: 0.0,
        fats: 0.0,
        sleep_hours: 0.0,
        ..mock_summary(today)
    };

    DashboardBundle {
        summary,
        trend: TrendBundle {
            seven_day: stepped_trend(today, 7, BACKEND_BASE),
            thirty_day: stepped_trend(today, 30, BACKEND_BASE),
        },
        notes: vec![
            "일일 요약과 7/30일 추세를 한 번에 제공하는 번들 API.".to_string(),
            "LRU 캐시 + TTL로 백엔드 부하를 줄이고 응답 지연을 최소화합니다.".to_string(),
        ],
    }
}

fn mock_summary(today: NaiveDate) -> DailySummary {
    DailySummary {
        date: today,
        calories_consumed: 1920,
        calorie_goal: 2000,
        protein: 110.0,
        carbs: 230.0,
        fats: 60.0,
        systolic: 138,
        diastolic: 86,
        weight: 68.4,
        exercise_minutes: 45,
        hydration_liters: 2.1,
        medication_adherence: 0.92,
        missed_doses: 1,
        steps: 8400,
        sleep_hours: 7.3,
    }
}

/// Sinusoidal series ending on `today`, oldest point first.
fn generate_trend(today: NaiveDate, days: u32, base: Baseline) -> Vec<TrendPoint> {
    (0..days)
        .rev()
        .map(|days_ago| {
            let modifier = (days_ago as f64 / 2.0).sin() * 2.0 + if days_ago % 3 == 0 { 3.0 } else { 0.0 };
            TrendPoint {
                date: today - Duration::days(i64::from(days_ago)),
                systolic: (base.systolic + modifier).round() as i32,
                diastolic: (base.diastolic + modifier / 2.0).round() as i32,
                weight: round_tenths(base.weight + modifier * 0.1 - 0.8),
                calories: (base.calories + modifier * 20.0).round() as i32,
            }
        })
        .collect()
}

/// Oldest point first; integer metrics truncate.
fn stepped_trend(today: NaiveDate, days: u32, base: Baseline) -> Vec<TrendPoint> {
    (0..days)
        .map(|offset| {
            let modifier = f64::from(offset % 4) * 1.2;
            TrendPoint {
                date: today - Duration::days(i64::from(days - offset - 1)),
                systolic: (base.systolic + modifier) as i32,
                diastolic: (base.diastolic + modifier * 0.5) as i32,
                weight: round_tenths(base.weight + modifier * 0.08),
                calories: (base.calories + modifier * 15.0) as i32,
            }
        })
        .collect()
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
