//! Metrics for the sharing core
//!
//! Counter names follow the `genaited_*_total` convention. Call
//! [`init_metrics`] once at startup so exporters can attach descriptions;
//! recording works without it.

use metrics::{counter, describe_counter};

/// Register descriptions for every counter this crate records
pub fn init_metrics() {
    describe_counter!(
        "genaited_join_attempts_total",
        "Total join-by-code attempts received"
    );
    describe_counter!(
        "genaited_join_results_total",
        "Join attempts by result (accepted, already_member, invalid_format, invalid_code)"
    );
    describe_counter!(
        "genaited_passcode_collisions_total",
        "Passcode inserts rejected by a unique index and retried"
    );
    describe_counter!(
        "genaited_resources_created_total",
        "Shared resources created, labeled by kind (tutor, group)"
    );
}

/// Record a join attempt before validation
pub fn record_join_attempt() {
    counter!("genaited_join_attempts_total").increment(1);
}

/// Record the terminal result of a join attempt
pub fn record_join_result(result: &'static str) {
    counter!("genaited_join_results_total", "result" => result).increment(1);
}

/// Record a passcode collision during resource creation
pub fn record_passcode_collision() {
    counter!("genaited_passcode_collisions_total").increment(1);
}

/// Record a created resource
pub fn record_resource_created(kind: &'static str) {
    counter!("genaited_resources_created_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_a_recorder_is_a_no_op() {
        // With no global recorder installed these must not panic.
        init_metrics();
        record_join_attempt();
        record_join_result("accepted");
        record_passcode_collision();
        record_resource_created("group");
    }
}
