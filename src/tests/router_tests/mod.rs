mod board_flow_tests;
mod export_tests;
