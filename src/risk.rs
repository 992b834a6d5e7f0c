use crate::models::{DailySummary, DashboardBundle, RiskSignal, Severity, TrendPoint};

pub const BP_SYSTOLIC_TRIGGER: i32 = 140;
pub const BP_SYSTOLIC_HIGH: i32 = 150;
pub const BP_DELTA_TRIGGER: i32 = 10;
pub const WEIGHT_DELTA_TRIGGER_KG: f64 = 1.5;
pub const CALORIE_OVERAGE_MEDIUM_KCAL: i32 = 150;
pub const ADHERENCE_FLOOR: f64 = 0.90;
pub const HYDRATION_FLOOR_LITERS: f64 = 1.5;

/// Runs every rule in fixed order and returns the signals that fired.
///
/// Missing trend points suppress the rules that depend on them; nothing here
/// can fail.
pub fn evaluate(bundle: &DashboardBundle) -> Vec<RiskSignal> {
    let recent = &bundle.trend.seven_day;
    let latest = recent.last();
    let prior = recent.len().checked_sub(2).and_then(|idx| recent.get(idx));

    [
        blood_pressure_surge(latest, prior),
        weight_shift(latest, prior),
        calorie_overage(&bundle.summary),
        medication_miss(&bundle.summary),
        low_hydration(&bundle.summary),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Highest severity among `signals`, if any fired.
pub fn peak_severity(signals: &[RiskSignal]) -> Option<Severity> {
    signals.iter().map(|signal| signal.severity).max()
}

fn blood_pressure_surge(latest: Option<&TrendPoint>, prior: Option<&TrendPoint>) -> Option<RiskSignal> {
    let latest = latest?;
    let delta = prior.map_or(0, |prior| latest.systolic - prior.systolic);

    if latest.systolic < BP_SYSTOLIC_TRIGGER && delta < BP_DELTA_TRIGGER {
        return None;
    }

    let severity = if latest.systolic >= BP_SYSTOLIC_HIGH {
        Severity::High
    } else {
        Severity::Medium
    };

    Some(signal(
        "bp-surge",
        "혈압 급상승",
        severity,
        format!(
            "최근 혈압 {}/{} mmHg, 하루 대비 {}포인트 상승",
            latest.systolic, latest.diastolic, delta
        ),
        "휴식 후 재측정, 필요 시 의료진에 알림",
    ))
}

fn weight_shift(latest: Option<&TrendPoint>, prior: Option<&TrendPoint>) -> Option<RiskSignal> {
    let delta = match (latest, prior) {
        (Some(latest), Some(prior)) => latest.weight - prior.weight,
        _ => 0.0,
    };

    if delta.abs() < WEIGHT_DELTA_TRIGGER_KG {
        return None;
    }

    let sign = if delta > 0.0 { "+" } else { "" };
    Some(signal(
        "weight-shift",
        "체중 급변",
        Severity::Medium,
        format!("하루 만에 체중이 {sign}{delta:.1}kg 변했습니다."),
        "염분·수분 섭취 확인 및 2회차 측정 권장",
    ))
}

fn calorie_overage(summary: &DailySummary) -> Option<RiskSignal> {
    if summary.calories_consumed <= summary.calorie_goal {
        return None;
    }

    let overage = summary.calories_consumed - summary.calorie_goal;
    let severity = if overage > CALORIE_OVERAGE_MEDIUM_KCAL {
        Severity::Medium
    } else {
        Severity::Low
    };

    Some(signal(
        "calorie-over",
        "칼로리 목표 초과",
        severity,
        format!("오늘 섭취량이 목표보다 {overage} kcal 높습니다."),
        "저녁 식단 조정 또는 추가 활동량 확보",
    ))
}

fn medication_miss(summary: &DailySummary) -> Option<RiskSignal> {
    if summary.medication_adherence >= ADHERENCE_FLOOR && summary.missed_doses == 0 {
        return None;
    }

    let severity = if summary.missed_doses > 1 {
        Severity::High
    } else {
        Severity::Medium
    };
    let percent = adherence_percent(summary);

    Some(signal(
        "medication-miss",
        "복약 누락 감지",
        severity,
        format!("복약 준수율 {percent}%, 누락 {}회", summary.missed_doses),
        "리마인더 확인 및 다음 복약 알림 강화",
    ))
}

fn low_hydration(summary: &DailySummary) -> Option<RiskSignal> {
    if summary.hydration_liters >= HYDRATION_FLOOR_LITERS {
        return None;
    }

    Some(signal(
        "hydration-low",
        "수분 부족",
        Severity::Low,
        format!("하루 수분 섭취가 {:.1}L로 낮습니다.", summary.hydration_liters),
        "다음 2시간 내 300~500ml 추가 섭취",
    ))
}

/// Adherence as a whole percentage, rounding halves away from zero.
pub fn adherence_percent(summary: &DailySummary) -> i64 {
    (summary.medication_adherence * 100.0).round() as i64
}

fn signal(id: &str, label: &str, severity: Severity, description: String, action: &str) -> RiskSignal {
    RiskSignal {
        id: id.to_string(),
        label: label.to_string(),
        severity,
        description,
        action: action.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrendBundle;
    use chrono::{Duration, NaiveDate};

    fn quiet_summary() -> DailySummary {
        DailySummary {
            date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            calories_consumed: 1800,
            calorie_goal: 2000,
            protein: 110.0,
            carbs: 230.0,
            fats: 60.0,
            systolic: 122,
            diastolic: 78,
            weight: 68.0,
            exercise_minutes: 30,
            hydration_liters: 2.0,
            medication_adherence: 1.0,
            missed_doses: 0,
            steps: 9000,
            sleep_hours: 7.5,
        }
    }

    fn points(values: &[(i32, f64)]) -> Vec<TrendPoint> {
        let start = NaiveDate::from_ymd_opt(2026, 1, 27).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(idx, (systolic, weight))| TrendPoint {
                date: start + Duration::days(idx as i64),
                systolic: *systolic,
                diastolic: 80,
                weight: *weight,
                calories: 1900,
            })
            .collect()
    }

    fn bundle(summary: DailySummary, seven_day: Vec<TrendPoint>) -> DashboardBundle {
        DashboardBundle {
            summary,
            trend: TrendBundle {
                seven_day,
                thirty_day: Vec::new(),
            },
            notes: Vec::new(),
        }
    }

    fn ids(signals: &[RiskSignal]) -> Vec<&str> {
        signals.iter().map(|signal| signal.id.as_str()).collect()
    }

    #[test]
    fn quiet_bundle_yields_no_signals() {
        let signals = evaluate(&bundle(quiet_summary(), points(&[(120, 68.0), (122, 68.2)])));
        assert!(signals.is_empty());
        assert_eq!(peak_severity(&signals), None);
    }

    #[test]
    fn bp_delta_triggers_medium_surge() {
        let signals = evaluate(&bundle(quiet_summary(), points(&[(130, 68.0), (142, 68.0)])));
        assert_eq!(ids(&signals), vec!["bp-surge"]);
        assert_eq!(signals[0].severity, Severity::Medium);
        assert!(signals[0].description.contains("142/80"));
        assert!(signals[0].description.contains("12포인트 상승"));
    }

    #[test]
    fn bp_severity_boundary_at_150() {
        let high = evaluate(&bundle(quiet_summary(), points(&[(148, 68.0), (150, 68.0)])));
        assert_eq!(high[0].severity, Severity::High);

        let medium = evaluate(&bundle(quiet_summary(), points(&[(148, 68.0), (149, 68.0)])));
        assert_eq!(medium[0].id, "bp-surge");
        assert_eq!(medium[0].severity, Severity::Medium);
    }

    #[test]
    fn bp_below_thresholds_stays_quiet() {
        let signals = evaluate(&bundle(quiet_summary(), points(&[(130, 68.0), (139, 68.0)])));
        assert!(signals.is_empty());
    }

    #[test]
    fn short_series_never_fires_delta_rules() {
        let empty = evaluate(&bundle(quiet_summary(), Vec::new()));
        assert!(empty.is_empty());

        let single = evaluate(&bundle(quiet_summary(), points(&[(135, 90.0)])));
        assert!(single.is_empty());
    }

    #[test]
    fn single_point_above_absolute_threshold_reports_zero_delta() {
        let signals = evaluate(&bundle(quiet_summary(), points(&[(145, 68.0)])));
        assert_eq!(ids(&signals), vec!["bp-surge"]);
        assert!(signals[0].description.contains("0포인트"));
    }

    #[test]
    fn weight_gain_reports_signed_delta() {
        let signals = evaluate(&bundle(quiet_summary(), points(&[(120, 68.0), (120, 69.6)])));
        assert_eq!(ids(&signals), vec!["weight-shift"]);
        assert_eq!(signals[0].severity, Severity::Medium);
        assert!(signals[0].description.contains("+1.6kg"));
    }

    #[test]
    fn weight_loss_reports_negative_delta() {
        let signals = evaluate(&bundle(quiet_summary(), points(&[(120, 70.0), (120, 68.0)])));
        assert_eq!(ids(&signals), vec!["weight-shift"]);
        assert!(signals[0].description.contains("-2.0kg"));
    }

    #[test]
    fn calorie_overage_tiers() {
        let mut summary = quiet_summary();
        summary.calories_consumed = 2200;
        let signals = evaluate(&bundle(summary.clone(), Vec::new()));
        assert_eq!(ids(&signals), vec!["calorie-over"]);
        assert_eq!(signals[0].severity, Severity::Medium);
        assert!(signals[0].description.contains("200 kcal"));

        summary.calories_consumed = 2150;
        let signals = evaluate(&bundle(summary.clone(), Vec::new()));
        assert_eq!(signals[0].severity, Severity::Low);

        summary.calories_consumed = 2000;
        assert!(evaluate(&bundle(summary, Vec::new())).is_empty());
    }

    #[test]
    fn medication_rules() {
        let mut summary = quiet_summary();
        summary.medication_adherence = 0.95;
        assert!(evaluate(&bundle(summary.clone(), Vec::new())).is_empty());

        summary.medication_adherence = 0.85;
        let signals = evaluate(&bundle(summary.clone(), Vec::new()));
        assert_eq!(ids(&signals), vec!["medication-miss"]);
        assert_eq!(signals[0].severity, Severity::Medium);
        assert_eq!(signals[0].description, "복약 준수율 85%, 누락 0회");

        summary.medication_adherence = 0.95;
        summary.missed_doses = 2;
        let signals = evaluate(&bundle(summary, Vec::new()));
        assert_eq!(signals[0].severity, Severity::High);
    }

    #[test]
    fn low_hydration_reports_one_decimal() {
        let mut summary = quiet_summary();
        summary.hydration_liters = 1.2;
        let signals = evaluate(&bundle(summary, Vec::new()));
        assert_eq!(ids(&signals), vec!["hydration-low"]);
        assert_eq!(signals[0].severity, Severity::Low);
        assert!(signals[0].description.contains("1.2L"));
    }

    #[test]
    fn signals_follow_rule_order_and_repeat_identically() {
        let mut summary = quiet_summary();
        summary.calories_consumed = 2100;
        summary.missed_doses = 3;
        summary.hydration_liters = 0.9;
        let input = bundle(summary, points(&[(140, 66.0), (155, 68.0)]));

        let first = evaluate(&input);
        assert_eq!(
            ids(&first),
            vec!["bp-surge", "weight-shift", "calorie-over", "medication-miss", "hydration-low"]
        );
        assert_eq!(peak_severity(&first), Some(Severity::High));
        assert_eq!(first, evaluate(&input));
    }

    #[test]
    fn weight_delta_of_exactly_threshold_fires() {
        for (prior, latest) in [(68.0, 69.5), (67.3, 68.8), (70.1, 68.6)] {
            let signals = evaluate(&bundle(quiet_summary(), points(&[(120, prior), (120, latest)])));
            assert_eq!(ids(&signals), vec!["weight-shift"], "{prior} -> {latest}");
        }
        let below = evaluate(&bundle(quiet_summary(), points(&[(120, 68.0), (120, 69.4)])));
        assert!(below.is_empty());
    }

    #[test]
    fn hydration_at_floor_stays_quiet() {
        let mut summary = quiet_summary();
        summary.hydration_liters = 1.5;
        assert!(evaluate(&bundle(summary.clone(), Vec::new())).is_empty());

        summary.hydration_liters = 1.49;
        assert_eq!(ids(&evaluate(&bundle(summary, Vec::new()))), vec!["hydration-low"]);
    }

    #[test]
    fn adherence_at_floor_without_misses_stays_quiet() {
        let mut summary = quiet_summary();
        summary.medication_adherence = 0.90;
        summary.missed_doses = 0;
        assert!(evaluate(&bundle(summary, Vec::new())).is_empty());
    }

    #[test]
    fn single_missed_dose_is_medium() {
        let mut summary = quiet_summary();
        summary.missed_doses = 1;
        let signals = evaluate(&bundle(summary, Vec::new()));
        assert_eq!(ids(&signals), vec!["medication-miss"]);
        assert_eq!(signals[0].severity, Severity::Medium);
        assert_eq!(signals[0].description, "복약 준수율 100%, 누락 1회");
    }

    #[test]
    fn adherence_percent_rounds_halves_up() {
        let mut summary = quiet_summary();
        summary.medication_adherence = 0.625;
        assert_eq!(adherence_percent(&summary), 63);
    }
}
