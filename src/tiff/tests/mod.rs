//! Unit tests for the TIFF module

mod constants_tests;
mod reader_tests;
mod test_utils;
