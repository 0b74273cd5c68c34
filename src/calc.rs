use crate::model::{
    BudgetEntry, Candidate, ExamReminder, ExamResult, Vote, MARKS_PER_SUBJECT, RESULT_SUBJECTS,
};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Letter-grade banding over a 0..=100 percentage. Thresholds are
/// fixed; no rounding is applied before banding.
pub fn grade_for_percentage(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "A+"
    } else if percentage >= 80.0 {
        "A"
    } else if percentage >= 70.0 {
        "B"
    } else if percentage >= 60.0 {
        "C"
    } else if percentage >= 50.0 {
        "D"
    } else {
        "F"
    }
}

pub fn total_marks(subjects: &BTreeMap<String, u32>) -> u32 {
    subjects.values().sum()
}

pub fn grade_for_subjects(subjects: &BTreeMap<String, u32>) -> &'static str {
    let max = (RESULT_SUBJECTS.len() as u32 * MARKS_PER_SUBJECT) as f64;
    let percentage = 100.0 * f64::from(total_marks(subjects)) / max;
    grade_for_percentage(percentage)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub rank: usize,
    #[serde(flatten)]
    pub result: ExamResult,
}

/// Top three results by total marks, descending. The sort is stable,
/// so ties keep insertion order.
pub fn leaderboard(results: &[ExamResult]) -> Vec<RankedResult> {
    let mut sorted: Vec<ExamResult> = results.to_vec();
    sorted.sort_by(|a, b| b.total_marks.cmp(&a.total_marks));
    sorted
        .into_iter()
        .take(3)
        .enumerate()
        .map(|(i, result)| RankedResult {
            rank: i + 1,
            result,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTally {
    pub candidate_id: String,
    pub name: String,
    pub roll_number: String,
    pub votes: usize,
    pub percentage: f64,
}

/// Per-candidate tallies from the vote list, sorted by count
/// descending (stable, so earlier-added candidates win ties).
/// Percentage is against all votes cast, including any whose
/// candidate no longer exists.
pub fn tally_votes(candidates: &[Candidate], votes: &[Vote]) -> Vec<CandidateTally> {
    let total = votes.len();
    let mut tallies: Vec<CandidateTally> = candidates
        .iter()
        .map(|c| {
            let count = votes.iter().filter(|v| v.candidate_id == c.id).count();
            CandidateTally {
                candidate_id: c.id.clone(),
                name: c.name.clone(),
                roll_number: c.roll_number.clone(),
                votes: count,
                percentage: if total > 0 {
                    100.0 * count as f64 / total as f64
                } else {
                    0.0
                },
            }
        })
        .collect();
    tallies.sort_by(|a, b| b.votes.cmp(&a.votes));
    tallies
}

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days until the exam, rounding any partial day up. Zero or
/// negative means the exam has passed.
pub fn days_until(exam_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff_ms = exam_date.signed_duration_since(now).num_milliseconds();
    // Ceiling division that also holds for negative remainders.
    diff_ms.div_euclid(MILLIS_PER_DAY)
        + if diff_ms.rem_euclid(MILLIS_PER_DAY) > 0 {
            1
        } else {
            0
        }
}

pub fn upcoming_reminders(reminders: &[ExamReminder], now: DateTime<Utc>) -> Vec<ExamReminder> {
    let mut upcoming: Vec<ExamReminder> = reminders
        .iter()
        .filter(|r| r.exam_date > now)
        .cloned()
        .collect();
    upcoming.sort_by_key(|r| r.exam_date);
    upcoming
}

pub fn month_key(entry: &BudgetEntry) -> String {
    format!("{:04}-{:02}", entry.date.year(), entry.date.month())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudget {
    pub month: String,
    pub entries: Vec<BudgetEntry>,
    pub category_totals: BTreeMap<String, f64>,
    pub total: f64,
    pub average_per_month: i64,
}

/// Aggregates one month's entries (optionally one student's), grouped
/// by category. The average-per-month figure spans the whole ledger:
/// total spend over all entries divided by the number of distinct
/// year-months present anywhere, not just the selected month.
pub fn monthly_budget(entries: &[BudgetEntry], month: &str, roll: Option<&str>) -> MonthlyBudget {
    let selected: Vec<BudgetEntry> = entries
        .iter()
        .filter(|e| month_key(e) == month && roll.map_or(true, |r| e.student_roll == r))
        .cloned()
        .collect();

    let mut category_totals: BTreeMap<String, f64> = BTreeMap::new();
    for e in &selected {
        *category_totals
            .entry(e.category.as_str().to_string())
            .or_insert(0.0) += e.amount;
    }
    let total: f64 = selected.iter().map(|e| e.amount).sum();

    let distinct_months: std::collections::BTreeSet<String> =
        entries.iter().map(month_key).collect();
    let overall: f64 = entries.iter().map(|e| e.amount).sum();
    let average_per_month = (overall / distinct_months.len().max(1) as f64).round() as i64;

    MonthlyBudget {
        month: month.to_string(),
        entries: selected,
        category_totals,
        total,
        average_per_month,
    }
}
