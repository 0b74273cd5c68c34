use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

/// The active session. Exactly one lives under the `currentUser` key;
/// absent means logged out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub role: Role,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_number: String,
    pub section: String,
    pub class: String,
}

/// Seat occupancy is a sparse "row-col" -> student name map over a
/// fixed 5x6 grid. Unassigned positions are simply absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatPlan {
    pub id: String,
    pub class: String,
    pub branch: String,
    pub seats: BTreeMap<String, String>,
}

pub const SEAT_ROWS: usize = 5;
pub const SEAT_COLS: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub roll_number: String,
}

/// Votes reference candidates by id. The vote list is the only source
/// of truth for tallies; there is no counter on Candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub candidate_id: String,
    pub voter_roll: String,
    pub cast_at: DateTime<Utc>,
}

pub const RESULT_SUBJECTS: [&str; 5] = ["Math", "English", "Science", "History", "Bengali"];
pub const MARKS_PER_SUBJECT: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: String,
    pub student_roll: String,
    pub student_name: String,
    pub subjects: BTreeMap<String, u32>,
    pub total_marks: u32,
    pub grade: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookLending {
    pub id: String,
    pub book_id: String,
    pub book_name: String,
    pub borrower_name: String,
    pub borrower_roll: String,
    pub borrow_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
}

impl BookLending {
    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamReminder {
    pub id: String,
    pub exam_name: String,
    pub subject: String,
    pub class: String,
    pub exam_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub id: String,
    pub english: String,
    pub bangla: String,
    pub added_by: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetCategory {
    Tuition,
    Transport,
    Food,
    Personal,
    Fees,
}

impl BudgetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetCategory::Tuition => "tuition",
            BudgetCategory::Transport => "transport",
            BudgetCategory::Food => "food",
            BudgetCategory::Personal => "personal",
            BudgetCategory::Fees => "fees",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tuition" => Some(BudgetCategory::Tuition),
            "transport" => Some(BudgetCategory::Transport),
            "food" => Some(BudgetCategory::Food),
            "personal" => Some(BudgetCategory::Personal),
            "fees" => Some(BudgetCategory::Fees),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetEntry {
    pub id: String,
    pub student_roll: String,
    pub category: BudgetCategory,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub added_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerGoal {
    pub id: String,
    pub student_roll: String,
    pub student_name: String,
    pub assigned_goal: String,
    pub description: String,
    pub based_on_results: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_gmail: Option<String>,
    pub added_by: String,
}

pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
