//! # API Route Modules
//!
//! - `facematch`: the face comparison endpoint.

pub mod facematch;
