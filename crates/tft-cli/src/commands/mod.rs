pub mod completions;
pub mod ct;
pub mod report;
pub mod short_circuit;
