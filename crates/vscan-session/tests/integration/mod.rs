//! Orchestrator tests against scripted transfers.

mod orchestrator_tests;
mod support;
