//! Wire types: request DTOs with validation rules, response envelopes

pub mod requests;
pub mod responses;
