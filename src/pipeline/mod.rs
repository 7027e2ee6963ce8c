pub mod batch;
pub mod generator;
pub mod job_runner;
pub mod writer;
