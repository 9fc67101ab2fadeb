//! Scenario tests driving the pipeline through scripted collaborators

mod bundle_submission_tests;
mod swap_engine_tests;
