mod common;

mod boot_tests;
mod event_tests;
