pub mod csv_source;
pub mod grid_loader;
pub mod operation_parser;
