mod scan_tests;
mod test_helpers;
