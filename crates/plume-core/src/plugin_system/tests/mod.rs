
mod candidates_tests;
mod registry_tests;
