// Module structure for the apitrail batch runner.

pub mod boot;
pub mod conf;
pub mod ingest;
pub mod report;
pub mod run;
