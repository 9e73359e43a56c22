pub mod chat;
pub mod health;
pub mod shared;
pub mod telegram;
