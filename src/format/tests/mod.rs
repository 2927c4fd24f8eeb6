//! Unit tests for dataset export.

mod backup_tests;
mod yolo_tests;
