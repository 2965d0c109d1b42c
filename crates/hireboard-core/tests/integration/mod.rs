mod common;
mod marketplace_tests;
mod saved_job_tests;
