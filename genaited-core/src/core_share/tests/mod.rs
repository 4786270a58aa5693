/*
    Integration tests for the sharing subsystem

    Test suite covering:
    - End-to-end join flows across both resource kinds
    - Idempotence and outcome taxonomy
    - Tutor-over-group precedence for colliding codes
    - Concurrent duplicate joins
    - The async facade
*/
