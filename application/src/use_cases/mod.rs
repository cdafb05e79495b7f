//! Use cases orchestrating the ports.

pub mod generate_question;
pub mod get_today;
pub mod submit_answer;
