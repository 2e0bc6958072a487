pub mod answer;
pub mod candidate;
pub mod chat;
