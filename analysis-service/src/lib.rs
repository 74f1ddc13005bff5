//! Stool photo analysis service.
//!
//! Receives a photo plus optional caller context, forwards it to the
//! analysis relay, and normalizes the reply into the stable response
//! contract (`contract` module) before returning it.

pub mod config;
pub mod contract;
pub mod handlers;
pub mod services;
pub mod startup;
