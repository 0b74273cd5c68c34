pub mod backup_exchange;
pub mod budget;
pub mod career;
pub mod contacts;
pub mod core;
pub mod dictionary;
pub mod lending;
pub mod reminders;
pub mod results;
pub mod seating;
pub mod session;
pub mod students;
pub mod voting;
