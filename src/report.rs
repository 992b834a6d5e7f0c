use std::fmt::Write;

use crate::models::{DashboardBundle, RiskSignal, TrendPoint, TrendStats};
use crate::risk;

pub fn trend_stats(points: &[TrendPoint]) -> TrendStats {
    let count = points.len();
    let mean = |total: f64| if count == 0 { 0.0 } else { total / count as f64 };

    TrendStats {
        points: count,
        first_date: points.first().map(|point| point.date),
        last_date: points.last().map(|point| point.date),
        avg_systolic: mean(points.iter().map(|point| f64::from(point.systolic)).sum()),
        avg_diastolic: mean(points.iter().map(|point| f64::from(point.diastolic)).sum()),
        max_systolic: points.iter().map(|point| point.systolic).max().unwrap_or(0),
        min_weight: points
            .iter()
            .map(|point| point.weight)
            .reduce(f64::min)
            .unwrap_or(0.0),
        max_weight: points
            .iter()
            .map(|point| point.weight)
            .reduce(f64::max)
            .unwrap_or(0.0),
        avg_calories: mean(points.iter().map(|point| f64::from(point.calories)).sum()),
    }
}

pub fn build_report(bundle: &DashboardBundle, signals: &[RiskSignal]) -> String {
    let summary = &bundle.summary;
    let mut output = String::new();

    let _ = writeln!(output, "# Health Dashboard Risk Report");
    let _ = writeln!(output, "Generated for {}", summary.date);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Signals");

    if signals.is_empty() {
        let _ = writeln!(output, "No thresholds crossed for this bundle.");
    } else {
        if let Some(peak) = risk::peak_severity(signals) {
            let _ = writeln!(output, "Peak severity: {peak}");
            let _ = writeln!(output);
        }
        for signal in signals {
            let _ = writeln!(
                output,
                "- [{}] {} ({}): {} -> {}",
                signal.severity, signal.label, signal.id, signal.description, signal.action
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Summary");
    let _ = writeln!(
        output,
        "- Calories: {} / {} kcal (protein {:.0}g, carbs {:.0}g, fats {:.0}g)",
        summary.calories_consumed, summary.calorie_goal, summary.protein, summary.carbs, summary.fats
    );
    let _ = writeln!(
        output,
        "- Blood pressure: {}/{} mmHg",
        summary.systolic, summary.diastolic
    );
    let _ = writeln!(output, "- Weight: {:.1} kg", summary.weight);
    let _ = writeln!(
        output,
        "- Activity: {} min exercise, {} steps, {:.1} h sleep",
        summary.exercise_minutes, summary.steps, summary.sleep_hours
    );
    let _ = writeln!(output, "- Hydration: {:.1} L", summary.hydration_liters);
    let _ = writeln!(
        output,
        "- Medication: {}% adherence, {} missed",
        risk::adherence_percent(summary),
        summary.missed_doses
    );

    for (title, points) in [
        ("7-Day Trend", &bundle.trend.seven_day),
        ("30-Day Trend", &bundle.trend.thirty_day),
    ] {
        let stats = trend_stats(points);
        let _ = writeln!(output);
        let _ = writeln!(output, "## {title}");

        match (stats.first_date, stats.last_date) {
            (Some(first), Some(last)) => {
                let _ = writeln!(output, "{} points from {} to {}", stats.points, first, last);
                let _ = writeln!(
                    output,
                    "- Avg blood pressure {:.1}/{:.1} mmHg (peak systolic {})",
                    stats.avg_systolic, stats.avg_diastolic, stats.max_systolic
                );
                let _ = writeln!(
                    output,
                    "- Weight range {:.1}-{:.1} kg",
                    stats.min_weight, stats.max_weight
                );
                let _ = writeln!(output, "- Avg calories {:.0} kcal", stats.avg_calories);
            }
            _ => {
                let _ = writeln!(output, "No trend points supplied.");
            }
        }
    }

    if !bundle.notes.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Notes");
        for note in &bundle.notes {
            let _ = writeln!(output, "- {note}");
        }
    }

    output
}

/// Writes one CSV row per signal, preceded by a header row.
pub fn write_signals_csv<W: std::io::Write>(writer: W, signals: &[RiskSignal]) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    if signals.is_empty() {
        csv_writer.write_record(["id", "label", "severity", "description", "action"])?;
    }
    for signal in signals {
        csv_writer.serialize(signal)?;
    }

    csv_writer.flush()?;
    Ok(())
}
